//! Trigger resolution: which active achievement definitions care about a
//! given event kind.
//!
//! The active catalog is small and changes rarely, so the resolver keeps a
//! TTL-cached snapshot and matches in memory rather than querying per event.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::RwLock;

use hodlboard_core::event_kind::EventKind;
use hodlboard_core::evaluator_id::EvaluatorId;
use hodlboard_core::trigger::{metric_source_kind, TriggerConfig, TriggerType};
use hodlboard_db::models::achievement::Achievement;
use hodlboard_db::repositories::achievement_repo::AchievementRepo;
use hodlboard_db::DbPool;

use crate::error::EngineError;

/// How long a cached catalog snapshot stays fresh.
const CATALOG_TTL: Duration = Duration::from_secs(60);

struct CatalogSnapshot {
    definitions: Arc<Vec<Achievement>>,
    fetched_at: Instant,
}

/// Maps incoming events to the achievement definitions they may affect.
#[derive(Clone)]
pub struct TriggerResolver {
    pool: DbPool,
    cache: Arc<RwLock<Option<CatalogSnapshot>>>,
}

impl TriggerResolver {
    pub fn new(pool: DbPool) -> Self {
        Self {
            pool,
            cache: Arc::new(RwLock::new(None)),
        }
    }

    /// Active definitions whose trigger listens to `kind`.
    ///
    /// Definitions with unparseable configs are skipped with a warning; a
    /// single bad row must not stall the whole pipeline.
    pub async fn resolve(&self, kind: EventKind) -> Result<Vec<Achievement>, EngineError> {
        let catalog = self.active_catalog().await?;
        let matched = catalog
            .iter()
            .filter(|def| Self::definition_matches(def, kind))
            .cloned()
            .collect();
        Ok(matched)
    }

    /// Drop the cached snapshot; the next resolve refetches.
    pub async fn invalidate(&self) {
        *self.cache.write().await = None;
    }

    async fn active_catalog(&self) -> Result<Arc<Vec<Achievement>>, EngineError> {
        {
            let guard = self.cache.read().await;
            if let Some(snapshot) = guard.as_ref() {
                if snapshot.fetched_at.elapsed() < CATALOG_TTL {
                    return Ok(Arc::clone(&snapshot.definitions));
                }
            }
        }

        let definitions = Arc::new(AchievementRepo::list_active(&self.pool).await?);
        let mut guard = self.cache.write().await;
        *guard = Some(CatalogSnapshot {
            definitions: Arc::clone(&definitions),
            fetched_at: Instant::now(),
        });
        tracing::debug!(count = definitions.len(), "Refreshed active achievement catalog");
        Ok(definitions)
    }

    fn definition_matches(definition: &Achievement, kind: EventKind) -> bool {
        let Some(trigger_type) = TriggerType::parse(&definition.trigger_type) else {
            tracing::warn!(
                achievement_id = definition.id,
                trigger_type = %definition.trigger_type,
                "Skipping definition with unknown trigger type"
            );
            return false;
        };
        match TriggerConfig::parse(trigger_type, &definition.trigger_config) {
            Ok(config) => config_matches(&config, kind),
            Err(error) => {
                tracing::warn!(
                    achievement_id = definition.id,
                    %error,
                    "Skipping definition with invalid trigger config"
                );
                false
            }
        }
    }
}

/// Whether a parsed trigger config listens to events of `kind`.
pub fn config_matches(config: &TriggerConfig, kind: EventKind) -> bool {
    match config {
        TriggerConfig::Count(count) => count.action == kind.action(),
        TriggerConfig::Threshold(threshold) => {
            metric_source_kind(&threshold.metric) == Some(kind)
        }
        TriggerConfig::Event(event) => event.event_type == kind.as_str(),
        TriggerConfig::Composite(composite) => composite
            .requirements
            .iter()
            .any(|r| r.action == kind.action()),
        TriggerConfig::Custom(custom) => {
            if custom.event_types.is_empty() {
                EvaluatorId::parse(&custom.evaluator)
                    .map(|id| id.default_listen_kinds().contains(&kind))
                    .unwrap_or(false)
            } else {
                custom.event_types.iter().any(|s| s == kind.as_str())
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
