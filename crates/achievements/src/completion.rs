//! Completion coordination: turn an evaluation into the right progress
//! write, and dispatch rewards exactly once per (user, achievement).
//!
//! The coordinator never fails a completion because a reward call failed;
//! reward dispatch is best-effort and each channel's failure is logged
//! independently.

use std::sync::Arc;

use serde_json::json;

use hodlboard_core::progress::ProgressEvaluation;
use hodlboard_core::types::DbId;
use hodlboard_db::models::achievement::Achievement;
use hodlboard_db::repositories::user_achievement_repo::UserAchievementRepo;
use hodlboard_db::DbPool;

use crate::error::EngineError;
use crate::rewards::{RewardSink, TokenCreditContext};

/// Applies evaluations to user progress rows and dispatches rewards.
#[derive(Clone)]
pub struct CompletionCoordinator {
    pool: DbPool,
    rewards: Arc<dyn RewardSink>,
}

impl CompletionCoordinator {
    pub fn new(pool: DbPool, rewards: Arc<dyn RewardSink>) -> Self {
        Self { pool, rewards }
    }

    /// Record an evaluation for one (achievement, user) pair.
    ///
    /// Completing evaluations go through the conditional completion upsert;
    /// rewards are dispatched only when this call performed the transition.
    /// Partial evaluations update progress without ever regressing it. A
    /// progress row appears on first non-zero progress: zero evaluations
    /// (an unmatched event trigger, a false custom predicate) write nothing.
    pub async fn apply(
        &self,
        definition: &Achievement,
        user_id: DbId,
        evaluation: &ProgressEvaluation,
    ) -> Result<(), EngineError> {
        let progress = json!({
            "current": evaluation.current,
            "target": evaluation.target,
        });

        if evaluation.is_completed {
            let completion_data = json!({
                "trigger_type": definition.trigger_type,
                "current": evaluation.current,
                "target": evaluation.target,
            });
            let newly_completed = UserAchievementRepo::complete(
                &self.pool,
                user_id,
                definition.id,
                &progress,
                &completion_data,
            )
            .await?;

            if newly_completed {
                tracing::info!(
                    user_id,
                    achievement_id = definition.id,
                    achievement_key = %definition.key,
                    "Achievement completed"
                );
                self.dispatch_rewards(definition, user_id).await;
            }
        } else if evaluation.percentage > 0.0 {
            UserAchievementRepo::upsert_progress(
                &self.pool,
                user_id,
                definition.id,
                &progress,
                evaluation.percentage,
            )
            .await?;
        }
        Ok(())
    }

    /// Grant an achievement to users directly, bypassing trigger evaluation.
    ///
    /// Goes through the same conditional completion write, so users who
    /// already earned the achievement are skipped and rewards still dispatch
    /// at most once. Returns the ids of users who were newly awarded.
    pub async fn award_manual(
        &self,
        definition: &Achievement,
        user_ids: &[DbId],
        reason: &str,
    ) -> Result<Vec<DbId>, EngineError> {
        let progress = json!({"current": 1, "target": 1});
        let completion_data = json!({
            "manually_awarded": true,
            "reason": reason,
        });

        let mut awarded = Vec::new();
        for &user_id in user_ids {
            let newly_completed = UserAchievementRepo::complete(
                &self.pool,
                user_id,
                definition.id,
                &progress,
                &completion_data,
            )
            .await?;
            if newly_completed {
                tracing::info!(
                    user_id,
                    achievement_id = definition.id,
                    reason,
                    "Achievement manually awarded"
                );
                self.dispatch_rewards(definition, user_id).await;
                awarded.push(user_id);
            }
        }
        Ok(awarded)
    }

    /// Dispatch all configured reward channels, logging failures per channel.
    async fn dispatch_rewards(&self, definition: &Achievement, user_id: DbId) {
        let reason = format!("achievement:{}", definition.key);

        if definition.reward_xp > 0 {
            if let Err(error) = self
                .rewards
                .credit_xp(user_id, definition.reward_xp, &reason)
                .await
            {
                tracing::error!(user_id, achievement_id = definition.id, %error, "XP credit failed");
            }
        }

        if definition.reward_tokens > 0 {
            let context = TokenCreditContext {
                source: "achievement",
                reason: reason.clone(),
                achievement_id: definition.id,
            };
            if let Err(error) = self
                .rewards
                .credit_tokens(user_id, definition.reward_tokens, &context)
                .await
            {
                tracing::error!(user_id, achievement_id = definition.id, %error, "Token credit failed");
            }
        }

        if definition.reward_reputation > 0 {
            if let Err(error) = self
                .rewards
                .credit_reputation(user_id, definition.reward_reputation, &reason)
                .await
            {
                tracing::error!(user_id, achievement_id = definition.id, %error, "Reputation credit failed");
            }
        }
    }
}
