//! Achievement definition entity model and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use hodlboard_core::types::{DbId, Timestamp};

/// A row from the `achievements` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Achievement {
    pub id: DbId,
    /// Globally unique, immutable key, e.g. `"conversation_starter"`.
    pub key: String,
    pub name: String,
    pub description: String,
    pub category: String,
    /// Ordinal rarity; 1 is the most common tier.
    pub tier: i16,
    pub trigger_type: String,
    pub trigger_config: serde_json::Value,
    pub reward_xp: i64,
    pub reward_tokens: i64,
    pub reward_reputation: i64,
    pub badge_key: Option<String>,
    pub title_key: Option<String>,
    pub is_active: bool,
    /// Hidden from users until earned.
    pub is_secret: bool,
    /// Whether events logged before this definition was created count.
    /// When false, count and custom triggers only see events triggered at
    /// or after `created_at`.
    pub is_retroactive: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for `POST /api/v1/admin/achievements`.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateAchievement {
    #[validate(length(min = 1, max = 64))]
    pub key: String,
    #[validate(length(min = 1, max = 128))]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default = "default_category")]
    pub category: String,
    #[serde(default = "default_tier")]
    pub tier: i16,
    pub trigger_type: String,
    pub trigger_config: serde_json::Value,
    #[serde(default)]
    #[validate(range(min = 0))]
    pub reward_xp: i64,
    #[serde(default)]
    #[validate(range(min = 0))]
    pub reward_tokens: i64,
    #[serde(default)]
    #[validate(range(min = 0))]
    pub reward_reputation: i64,
    pub badge_key: Option<String>,
    pub title_key: Option<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub is_secret: bool,
    #[serde(default)]
    pub is_retroactive: bool,
}

/// DTO for `PUT /api/v1/admin/achievements/{id}`.
///
/// `key` is intentionally absent: it is immutable after creation.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateAchievement {
    #[validate(length(min = 1, max = 128))]
    pub name: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub tier: Option<i16>,
    pub trigger_type: Option<String>,
    pub trigger_config: Option<serde_json::Value>,
    #[validate(range(min = 0))]
    pub reward_xp: Option<i64>,
    #[validate(range(min = 0))]
    pub reward_tokens: Option<i64>,
    #[validate(range(min = 0))]
    pub reward_reputation: Option<i64>,
    pub badge_key: Option<String>,
    pub title_key: Option<String>,
    pub is_active: Option<bool>,
    pub is_secret: Option<bool>,
    pub is_retroactive: Option<bool>,
}

/// DTO for `POST /api/v1/admin/achievements/bulk`.
#[derive(Debug, Deserialize)]
pub struct BulkUpdateAchievements {
    pub ids: Vec<DbId>,
    pub is_active: Option<bool>,
    pub is_secret: Option<bool>,
    pub category: Option<String>,
    pub tier: Option<i16>,
}

/// Computed completion statistics for one achievement.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct AchievementStats {
    /// Users with any tracked progress.
    pub tracked_users: i64,
    /// Users who completed the achievement.
    pub completed_users: i64,
    /// `completed_users / tracked_users`, 0 when nothing is tracked.
    pub completion_rate: f64,
    /// Mean progress percentage across tracked users.
    pub average_progress: f64,
}

fn default_category() -> String {
    "general".to_string()
}

fn default_tier() -> i16 {
    1
}

fn default_true() -> bool {
    true
}
