//! Entity models: `FromRow` row structs and request DTOs.

pub mod achievement;
pub mod achievement_event;
pub mod user_achievement;

pub use achievement::{Achievement, AchievementStats, BulkUpdateAchievements, CreateAchievement, UpdateAchievement};
pub use achievement_event::AchievementEvent;
pub use user_achievement::UserAchievement;
