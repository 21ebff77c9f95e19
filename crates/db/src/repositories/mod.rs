//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` as the first argument.

pub mod achievement_event_repo;
pub mod achievement_repo;
pub mod user_achievement_repo;
pub mod user_metric_repo;

pub use achievement_event_repo::{AchievementEventRepo, NewEvent};
pub use achievement_repo::{AchievementFilter, AchievementRepo};
pub use user_achievement_repo::UserAchievementRepo;
pub use user_metric_repo::UserMetricRepo;
