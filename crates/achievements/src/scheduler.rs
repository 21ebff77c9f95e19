//! Background processing loop for the achievement event log.
//!
//! One tick claims a batch of pending events, evaluates every matching
//! definition for each, and finalizes the event row. Failures are isolated
//! per event: one bad payload marks that row failed and the batch continues.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use hodlboard_core::event_kind::EventKind;
use hodlboard_db::models::achievement_event::AchievementEvent;
use hodlboard_db::repositories::achievement_event_repo::AchievementEventRepo;
use hodlboard_db::DbPool;

use crate::completion::CompletionCoordinator;
use crate::error::EngineError;
use crate::evaluator::ProgressEvaluator;
use crate::resolver::TriggerResolver;

/// Tuning knobs for the scheduler loop.
#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    /// Delay between drain ticks.
    pub poll_interval: Duration,
    /// Maximum events claimed per tick.
    pub batch_size: i64,
    /// Age after which a `processing` claim is considered abandoned and
    /// requeued (crashed worker, failed finalize write).
    pub stale_claim_after: Duration,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(30),
            batch_size: 100,
            stale_claim_after: Duration::from_secs(600),
        }
    }
}

impl SchedulerConfig {
    /// Read overrides from the environment, falling back to defaults.
    ///
    /// `ACHIEVEMENTS_POLL_INTERVAL_SECS`, `ACHIEVEMENTS_BATCH_SIZE`, and
    /// `ACHIEVEMENTS_STALE_CLAIM_SECS`.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let poll_interval = std::env::var("ACHIEVEMENTS_POLL_INTERVAL_SECS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .map(Duration::from_secs)
            .unwrap_or(defaults.poll_interval);
        let batch_size = std::env::var("ACHIEVEMENTS_BATCH_SIZE")
            .ok()
            .and_then(|v| v.parse::<i64>().ok())
            .unwrap_or(defaults.batch_size);
        let stale_claim_after = std::env::var("ACHIEVEMENTS_STALE_CLAIM_SECS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .map(Duration::from_secs)
            .unwrap_or(defaults.stale_claim_after);
        Self {
            poll_interval,
            batch_size,
            stale_claim_after,
        }
    }
}

/// Drains the pending event queue on an interval.
pub struct AchievementScheduler {
    pool: DbPool,
    config: SchedulerConfig,
    resolver: TriggerResolver,
    coordinator: CompletionCoordinator,
    /// Guards against overlapping drains when a tick outlasts the interval.
    draining: Arc<AtomicBool>,
}

impl AchievementScheduler {
    pub fn new(
        pool: DbPool,
        config: SchedulerConfig,
        coordinator: CompletionCoordinator,
    ) -> Self {
        let resolver = TriggerResolver::new(pool.clone());
        Self {
            pool,
            config,
            resolver,
            coordinator,
            draining: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Run the drain loop until `shutdown` is cancelled.
    ///
    /// The first drain happens immediately; subsequent drains follow the
    /// configured interval.
    pub async fn run(&self, shutdown: CancellationToken) {
        let mut ticker = tokio::time::interval(self.config.poll_interval);
        tracing::info!(
            poll_interval_secs = self.config.poll_interval.as_secs(),
            batch_size = self.config.batch_size,
            "Achievement scheduler started"
        );

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    if let Err(error) = self.drain_once().await {
                        tracing::error!(%error, "Event drain tick failed");
                    }
                }
                _ = shutdown.cancelled() => {
                    tracing::info!("Achievement scheduler shutting down");
                    break;
                }
            }
        }
    }

    /// Claim and process one batch of pending events.
    ///
    /// Returns the number of events processed. A second call entering while
    /// one is in flight returns 0 immediately.
    pub async fn drain_once(&self) -> Result<usize, EngineError> {
        if self
            .draining
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            tracing::debug!("Drain already in flight, skipping tick");
            return Ok(0);
        }
        let result = self.drain_batch().await;
        self.draining.store(false, Ordering::Release);
        result
    }

    async fn drain_batch(&self) -> Result<usize, EngineError> {
        // Claims abandoned by a crashed worker (or left behind by a failed
        // finalize write) go back to pending before this tick claims.
        let requeued = AchievementEventRepo::requeue_stale(
            &self.pool,
            self.config.stale_claim_after.as_secs() as i64,
        )
        .await?;
        if requeued > 0 {
            tracing::warn!(requeued, "Requeued stale processing claims");
        }

        let events = AchievementEventRepo::claim_pending(&self.pool, self.config.batch_size).await?;
        if events.is_empty() {
            return Ok(0);
        }
        tracing::debug!(count = events.len(), "Claimed pending achievement events");

        let mut processed = 0;
        for event in &events {
            match self.process_event(event).await {
                Ok(()) => {
                    processed += 1;
                    // Finalize marks are best-effort: a failed write here
                    // must not abort the remaining claimed events. The row
                    // stays in processing and the stale requeue recovers it.
                    if let Err(error) =
                        AchievementEventRepo::mark_completed(&self.pool, event.id).await
                    {
                        tracing::error!(event_id = event.id, %error, "Failed to finalize event");
                    }
                }
                Err(error) => {
                    tracing::warn!(
                        event_id = event.id,
                        user_id = event.user_id,
                        event_type = %event.event_type,
                        %error,
                        "Event processing failed"
                    );
                    if let Err(mark_error) =
                        AchievementEventRepo::mark_failed(&self.pool, event.id, &error.to_string())
                            .await
                    {
                        tracing::error!(
                            event_id = event.id,
                            %mark_error,
                            "Failed to mark event as failed"
                        );
                    }
                }
            }
        }
        Ok(processed)
    }

    /// Evaluate every definition that listens to this event's kind.
    async fn process_event(&self, event: &AchievementEvent) -> Result<(), EngineError> {
        let Some(kind) = EventKind::parse(&event.event_type) else {
            return Err(EngineError::Unevaluable(format!(
                "Unknown event type: {}",
                event.event_type
            )));
        };

        let definitions = self.resolver.resolve(kind).await?;
        for definition in &definitions {
            let evaluation = ProgressEvaluator::evaluate(&self.pool, definition, event).await?;
            self.coordinator
                .apply(definition, event.user_id, &evaluation)
                .await?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_values() {
        let config = SchedulerConfig::default();
        assert_eq!(config.poll_interval, Duration::from_secs(30));
        assert_eq!(config.batch_size, 100);
        assert_eq!(config.stale_claim_after, Duration::from_secs(600));
    }

    #[test]
    fn from_env_falls_back_to_defaults() {
        // Unset in the test environment.
        std::env::remove_var("ACHIEVEMENTS_POLL_INTERVAL_SECS");
        std::env::remove_var("ACHIEVEMENTS_BATCH_SIZE");
        std::env::remove_var("ACHIEVEMENTS_STALE_CLAIM_SECS");
        let config = SchedulerConfig::from_env();
        assert_eq!(config.poll_interval, Duration::from_secs(30));
        assert_eq!(config.batch_size, 100);
        assert_eq!(config.stale_claim_after, Duration::from_secs(600));
    }
}
