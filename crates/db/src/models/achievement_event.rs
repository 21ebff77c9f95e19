//! Achievement event log entity model.

use serde::Serialize;
use sqlx::FromRow;

use hodlboard_core::event_kind::EventKind;
use hodlboard_core::types::{DbId, Timestamp};

/// A row from the `achievement_events` table.
///
/// Rows are immutable facts; only the processing columns (`claimed_at`,
/// `processed_at`, `processing_status`, `processing_error`) change, and only
/// through the scheduler.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct AchievementEvent {
    pub id: DbId,
    pub user_id: DbId,
    pub event_type: String,
    pub payload: serde_json::Value,
    pub triggered_at: Timestamp,
    /// Set when the scheduler claims the row; stale claims are requeued.
    pub claimed_at: Option<Timestamp>,
    pub processed_at: Option<Timestamp>,
    pub processing_status: String,
    pub processing_error: Option<String>,
}

impl AchievementEvent {
    /// The typed kind of this event, if the stored string is known.
    pub fn kind(&self) -> Option<EventKind> {
        EventKind::parse(&self.event_type)
    }
}
