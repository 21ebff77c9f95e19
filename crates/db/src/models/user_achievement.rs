//! Per-user achievement progress entity model.

use serde::Serialize;
use sqlx::FromRow;

use hodlboard_core::types::{DbId, Timestamp};

/// A row from the `user_achievements` table.
///
/// At most one row exists per (user, achievement); once `is_completed` is
/// true it never resets.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct UserAchievement {
    pub id: DbId,
    pub user_id: DbId,
    pub achievement_id: DbId,
    /// Evaluator-specific working-state snapshot.
    pub current_progress: serde_json::Value,
    pub progress_percentage: f64,
    pub is_completed: bool,
    pub completed_at: Option<Timestamp>,
    /// Final evaluation snapshot plus provenance (e.g. manual-award metadata).
    pub completion_data: Option<serde_json::Value>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}
