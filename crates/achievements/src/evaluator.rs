//! Progress evaluation: one (achievement, user, event) triple in, one
//! [`ProgressEvaluation`] out.
//!
//! Each trigger type has its own algorithm. Count and threshold accumulate,
//! event and custom are binary, composite counts completed sub-requirements.

use hodlboard_core::event_kind::EventKind;
use hodlboard_core::progress::{clamped_percentage, ProgressEvaluation};
use hodlboard_core::trigger::{
    all_conditions_match, CompositeConfig, CompositeOperator, CountConfig, TriggerConfig,
    TriggerType,
};
use hodlboard_core::types::{DbId, Timestamp};
use hodlboard_db::models::achievement::Achievement;
use hodlboard_db::models::achievement_event::AchievementEvent;
use hodlboard_db::repositories::achievement_event_repo::AchievementEventRepo;
use hodlboard_db::repositories::user_metric_repo::UserMetricRepo;
use hodlboard_db::DbPool;

use crate::custom::CustomEvaluatorRegistry;
use crate::error::EngineError;

/// Evaluates trigger configs against the event log.
pub struct ProgressEvaluator;

impl ProgressEvaluator {
    /// Evaluate `definition` for the user who triggered `event`.
    ///
    /// The triggering event itself counts: a count trigger with target 5 is
    /// completed by the fifth matching event even though that row is still
    /// being processed. Non-retroactive definitions only see events logged
    /// after the definition was created.
    pub async fn evaluate(
        pool: &DbPool,
        definition: &Achievement,
        event: &AchievementEvent,
    ) -> Result<ProgressEvaluation, EngineError> {
        let trigger_type = TriggerType::parse(&definition.trigger_type).ok_or_else(|| {
            EngineError::Unevaluable(format!(
                "Achievement {} has unknown trigger type {}",
                definition.id, definition.trigger_type
            ))
        })?;
        let config =
            TriggerConfig::parse(trigger_type, &definition.trigger_config).map_err(|e| {
                EngineError::Unevaluable(format!(
                    "Achievement {} has invalid trigger config: {e}",
                    definition.id
                ))
            })?;

        // History floor for non-retroactive definitions: events logged
        // before the definition existed do not count.
        let floor = (!definition.is_retroactive).then_some(definition.created_at);

        match config {
            TriggerConfig::Count(count) => {
                Self::evaluate_count(pool, event.user_id, event.id, &count, floor).await
            }
            TriggerConfig::Threshold(threshold) => {
                let current =
                    UserMetricRepo::metric_value(pool, event.user_id, &threshold.metric).await?;
                Ok(ProgressEvaluation::from_count(current, threshold.target))
            }
            TriggerConfig::Event(trigger) => {
                let satisfied = event.event_type == trigger.event_type
                    && all_conditions_match(&trigger.conditions, &event.payload, event.triggered_at);
                Ok(ProgressEvaluation::from_bool(satisfied))
            }
            TriggerConfig::Composite(composite) => {
                Self::evaluate_composite(pool, event.user_id, event.id, &composite, floor).await
            }
            TriggerConfig::Custom(custom) => {
                let satisfied = CustomEvaluatorRegistry::evaluate(
                    pool,
                    event.user_id,
                    &custom,
                    event.triggered_at,
                    floor,
                )
                .await?;
                Ok(ProgressEvaluation::from_bool(satisfied))
            }
        }
    }

    async fn evaluate_count(
        pool: &DbPool,
        user_id: DbId,
        event_id: DbId,
        config: &CountConfig,
        floor: Option<Timestamp>,
    ) -> Result<ProgressEvaluation, EngineError> {
        let Some(kind) = EventKind::from_action(&config.action) else {
            return Err(EngineError::Unevaluable(format!(
                "Count trigger references unknown action {}",
                config.action
            )));
        };
        let current =
            AchievementEventRepo::count_for_user(pool, user_id, kind.as_str(), event_id, floor)
                .await?;
        Ok(ProgressEvaluation::from_count(current, config.target))
    }

    /// Composite progress is `completed / total` sub-requirements;
    /// completion follows the operator (`and`: all complete, `or`: any).
    async fn evaluate_composite(
        pool: &DbPool,
        user_id: DbId,
        event_id: DbId,
        config: &CompositeConfig,
        floor: Option<Timestamp>,
    ) -> Result<ProgressEvaluation, EngineError> {
        if config.requirements.is_empty() {
            return Err(EngineError::Unevaluable(
                "Composite trigger has no requirements".to_string(),
            ));
        }

        let mut subs = Vec::with_capacity(config.requirements.len());
        for requirement in &config.requirements {
            subs.push(Self::evaluate_count(pool, user_id, event_id, requirement, floor).await?);
        }
        Ok(combine_composite(config.operator, &subs))
    }
}

/// Composite progress is `completed / total` sub-requirements; partial
/// progress inside a sub-requirement does not count until it completes.
/// Completion follows the operator (`and`: all complete, `or`: any).
fn combine_composite(operator: CompositeOperator, subs: &[ProgressEvaluation]) -> ProgressEvaluation {
    let total = subs.len();
    let completed = subs.iter().filter(|s| s.is_completed).count();
    let is_completed = match operator {
        CompositeOperator::And => completed == total,
        CompositeOperator::Or => completed > 0,
    };
    let percentage = if is_completed {
        100.0
    } else {
        clamped_percentage(completed as i64, total as i64)
    };

    ProgressEvaluation {
        current: completed as i64,
        target: total as i64,
        percentage,
        is_completed,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
