//! Fire-and-forget event emission.
//!
//! [`EventEmitter`] is the typed façade other domains use to record user
//! activity. Emission is best-effort by contract: a failed append is logged
//! and swallowed so that instrumenting an unrelated domain action can never
//! fail that action. The return type is `()` on purpose.

use hodlboard_core::event_kind::EventKind;
use hodlboard_core::types::DbId;
use hodlboard_db::repositories::{AchievementEventRepo, NewEvent};
use hodlboard_db::DbPool;

/// Typed façade over the durable event log.
#[derive(Clone)]
pub struct EventEmitter {
    pool: DbPool,
}

impl EventEmitter {
    /// Create an emitter backed by the given pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Append one pending event. Never fails from the caller's perspective.
    pub async fn emit(&self, kind: EventKind, user_id: DbId, payload: serde_json::Value) {
        match AchievementEventRepo::insert(&self.pool, user_id, kind.as_str(), &payload).await {
            Ok(id) => {
                tracing::debug!(event_id = id, event_type = kind.as_str(), user_id, "Event emitted");
            }
            Err(e) => {
                tracing::error!(
                    error = %e,
                    event_type = kind.as_str(),
                    user_id,
                    "Failed to emit achievement event"
                );
            }
        }
    }

    /// Append a batch of events in one transaction. Best-effort, like `emit`.
    pub async fn emit_many(&self, events: Vec<(EventKind, DbId, serde_json::Value)>) {
        if events.is_empty() {
            return;
        }
        let count = events.len();
        let rows: Vec<NewEvent> = events
            .into_iter()
            .map(|(kind, user_id, payload)| NewEvent {
                user_id,
                event_type: kind.as_str().to_string(),
                payload,
            })
            .collect();

        if let Err(e) = AchievementEventRepo::insert_batch(&self.pool, &rows).await {
            tracing::error!(error = %e, count, "Failed to emit achievement event batch");
        } else {
            tracing::debug!(count, "Event batch emitted");
        }
    }
}
