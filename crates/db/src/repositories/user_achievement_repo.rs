//! Repository for per-user achievement progress.
//!
//! The conditional upsert here is the engine's idempotency boundary: a
//! single atomic write keyed on `(user_id, achievement_id)` that refuses to
//! touch rows already completed, so concurrent or duplicate evaluations of
//! the same pair converge to one completed row.

use sqlx::PgPool;

use hodlboard_core::types::DbId;

use crate::models::achievement::AchievementStats;
use crate::models::user_achievement::UserAchievement;

/// Column list for `user_achievements` queries.
const COLUMNS: &str = "id, user_id, achievement_id, current_progress, \
     progress_percentage, is_completed, completed_at, completion_data, \
     created_at, updated_at";

/// Provides progress and completion operations.
pub struct UserAchievementRepo;

impl UserAchievementRepo {
    /// Upsert partial (non-completing) progress.
    ///
    /// `GREATEST` keeps the stored percentage monotonically non-decreasing,
    /// and the conditional update leaves completed rows untouched.
    pub async fn upsert_progress(
        pool: &PgPool,
        user_id: DbId,
        achievement_id: DbId,
        progress: &serde_json::Value,
        percentage: f64,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO user_achievements \
                (user_id, achievement_id, current_progress, progress_percentage) \
             VALUES ($1, $2, $3, $4) \
             ON CONFLICT (user_id, achievement_id) DO UPDATE SET \
                current_progress = EXCLUDED.current_progress, \
                progress_percentage = GREATEST( \
                    user_achievements.progress_percentage, \
                    EXCLUDED.progress_percentage), \
                updated_at = now() \
             WHERE NOT user_achievements.is_completed",
        )
        .bind(user_id)
        .bind(achievement_id)
        .bind(progress)
        .bind(percentage.clamp(0.0, 100.0))
        .execute(pool)
        .await?;
        Ok(())
    }

    /// Finalize completion with a single conditional write.
    ///
    /// Returns `true` only when this call performed the incomplete ->
    /// complete transition; `false` means the pair was already completed and
    /// the row was left untouched. Callers dispatch rewards only on `true`.
    pub async fn complete(
        pool: &PgPool,
        user_id: DbId,
        achievement_id: DbId,
        progress: &serde_json::Value,
        completion_data: &serde_json::Value,
    ) -> Result<bool, sqlx::Error> {
        let transitioned: Option<DbId> = sqlx::query_scalar(
            "INSERT INTO user_achievements \
                (user_id, achievement_id, current_progress, progress_percentage, \
                 is_completed, completed_at, completion_data) \
             VALUES ($1, $2, $3, 100, TRUE, now(), $4) \
             ON CONFLICT (user_id, achievement_id) DO UPDATE SET \
                current_progress = EXCLUDED.current_progress, \
                progress_percentage = 100, \
                is_completed = TRUE, \
                completed_at = now(), \
                completion_data = EXCLUDED.completion_data, \
                updated_at = now() \
             WHERE NOT user_achievements.is_completed \
             RETURNING id",
        )
        .bind(user_id)
        .bind(achievement_id)
        .bind(progress)
        .bind(completion_data)
        .fetch_optional(pool)
        .await?;
        Ok(transitioned.is_some())
    }

    /// Fetch the progress row for one (user, achievement) pair.
    pub async fn get(
        pool: &PgPool,
        user_id: DbId,
        achievement_id: DbId,
    ) -> Result<Option<UserAchievement>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM user_achievements \
             WHERE user_id = $1 AND achievement_id = $2"
        );
        sqlx::query_as::<_, UserAchievement>(&query)
            .bind(user_id)
            .bind(achievement_id)
            .fetch_optional(pool)
            .await
    }

    /// List completions for one achievement, most recent first.
    pub async fn list_completions(
        pool: &PgPool,
        achievement_id: DbId,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<UserAchievement>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM user_achievements \
             WHERE achievement_id = $1 AND is_completed \
             ORDER BY completed_at DESC \
             LIMIT $2 OFFSET $3"
        );
        sqlx::query_as::<_, UserAchievement>(&query)
            .bind(achievement_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Completion-rate and average-progress statistics for one achievement.
    pub async fn stats(
        pool: &PgPool,
        achievement_id: DbId,
    ) -> Result<AchievementStats, sqlx::Error> {
        sqlx::query_as::<_, AchievementStats>(
            "SELECT \
                COUNT(*) AS tracked_users, \
                COUNT(*) FILTER (WHERE is_completed) AS completed_users, \
                CASE WHEN COUNT(*) = 0 THEN 0.0 \
                     ELSE COUNT(*) FILTER (WHERE is_completed)::float8 / COUNT(*)::float8 \
                END AS completion_rate, \
                COALESCE(AVG(progress_percentage), 0.0) AS average_progress \
             FROM user_achievements WHERE achievement_id = $1",
        )
        .bind(achievement_id)
        .fetch_one(pool)
        .await
    }
}
