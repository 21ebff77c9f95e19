//! Dispatch from evaluator ids to their predicate implementations.

use chrono::Duration;

use hodlboard_core::event_kind::EventKind;
use hodlboard_core::evaluator_id::EvaluatorId;
use hodlboard_core::trigger::CustomConfig;
use hodlboard_core::types::{DbId, Timestamp};
use hodlboard_db::models::achievement_event::AchievementEvent;
use hodlboard_db::repositories::achievement_event_repo::AchievementEventRepo;
use hodlboard_db::DbPool;

use crate::custom::{accuracy, holding, keywords, param_f64, param_i64, param_str_list, sequence, temporal, window};
use crate::error::EngineError;

/// Default lookback for evaluators without an explicit window (90 days).
const DEFAULT_LOOKBACK_HOURS: i64 = 2160;

/// Stateless dispatcher for the closed set of custom evaluators.
pub struct CustomEvaluatorRegistry;

impl CustomEvaluatorRegistry {
    /// Evaluate a custom trigger for one user: fetch the user's recent events
    /// once, filter to the evaluator's listen set, and run the predicate.
    ///
    /// `history_floor`, when set, bounds the fetch below (non-retroactive
    /// definitions pass their creation time).
    pub async fn evaluate(
        pool: &DbPool,
        user_id: DbId,
        config: &CustomConfig,
        now: Timestamp,
        history_floor: Option<Timestamp>,
    ) -> Result<bool, EngineError> {
        let Some(id) = EvaluatorId::parse(&config.evaluator) else {
            return Err(EngineError::Unevaluable(format!(
                "Unknown custom evaluator: {}",
                config.evaluator
            )));
        };

        // Fetch twice the evaluation window so window-relative predicates
        // (fomo_frenzy anchors on the crash, not on now) see enough history.
        let window_hours = param_i64(&config.params, "window_hours", 0);
        let lookback = if window_hours > 0 {
            window_hours * 2
        } else {
            DEFAULT_LOOKBACK_HOURS
        };
        let window_start = now - Duration::hours(lookback);
        let since = history_floor.map_or(window_start, |floor| window_start.max(floor));
        let events = AchievementEventRepo::list_for_user_since(pool, user_id, since).await?;

        let listen = Self::listen_kinds(id, config);
        let relevant: Vec<AchievementEvent> = events
            .into_iter()
            .filter(|e| listen.iter().any(|kind| e.event_type == kind.as_str()))
            .collect();

        Ok(Self::evaluate_history(id, config, &listen, &relevant, now))
    }

    /// Listen set for this trigger: the config override when present,
    /// otherwise the evaluator's defaults. Unknown kind strings are dropped.
    fn listen_kinds(id: EvaluatorId, config: &CustomConfig) -> Vec<EventKind> {
        if config.event_types.is_empty() {
            id.default_listen_kinds().to_vec()
        } else {
            config
                .event_types
                .iter()
                .filter_map(|s| EventKind::parse(s))
                .collect()
        }
    }

    /// Pure predicate dispatch over an already-fetched event slice.
    ///
    /// `events` must be sorted ascending by `(triggered_at, id)` and filtered
    /// to `listen` kinds; the repository query guarantees the ordering.
    pub fn evaluate_history(
        id: EvaluatorId,
        config: &CustomConfig,
        listen: &[EventKind],
        events: &[AchievementEvent],
        now: Timestamp,
    ) -> bool {
        let params = &config.params;
        match id {
            EvaluatorId::CumulativeLossInWindow => window::cumulative_amount_at_least(
                events,
                EventKind::WalletLoss,
                param_f64(params, "min_total", f64::MAX),
                param_i64(params, "window_hours", 24),
                now,
            ),
            EvaluatorId::TipVolumeInWindow => window::cumulative_amount_at_least(
                events,
                EventKind::TipSent,
                param_f64(params, "min_total", f64::MAX),
                param_i64(params, "window_hours", 24),
                now,
            ),
            EvaluatorId::DiamondHandsHold => holding::held_through_drawdown(
                events,
                param_f64(params, "min_held_days", f64::MAX),
                param_f64(params, "min_drawdown_pct", f64::MAX),
            ),
            EvaluatorId::PaperHandsExit => holding::sold_into_the_dip(
                events,
                param_f64(params, "max_held_minutes", 0.0),
                param_f64(params, "min_drop_pct", f64::MAX),
            ),
            EvaluatorId::RapidPoster
            | EvaluatorId::SerialNecromancer
            | EvaluatorId::LikeMagnet
            | EvaluatorId::MentionMagnet => window::count_at_least(
                events,
                listen,
                param_i64(params, "min_count", i64::MAX),
                param_i64(params, "window_hours", 24),
                now,
            ),
            EvaluatorId::WhaleTipper => window::count_with_min_amount(
                events,
                EventKind::TipSent,
                param_f64(params, "min_amount", f64::MAX),
                param_i64(params, "min_count", 1),
                param_i64(params, "window_hours", 24),
                now,
            ),
            EvaluatorId::FomoFrenzy => window::tips_after_crash(
                events,
                param_i64(params, "min_count", i64::MAX),
                param_i64(params, "window_hours", 24),
            ),
            EvaluatorId::PredictionOracle => accuracy::prediction_accuracy_at_least(
                events,
                param_i64(params, "min_samples", i64::MAX),
                param_f64(params, "min_accuracy", 1.0),
            ),
            EvaluatorId::SocialCombo => sequence::all_kinds_in_window(
                events,
                listen,
                param_i64(params, "window_hours", 24),
                now,
            ),
            EvaluatorId::CrashCombo => sequence::kinds_in_order_in_window(
                events,
                listen,
                param_i64(params, "window_hours", 24),
                now,
            ),
            EvaluatorId::NightOwl => {
                temporal::count_in_hour_range(events, 0, 5, param_i64(params, "min_count", i64::MAX))
            }
            EvaluatorId::EarlyBird => {
                temporal::count_in_hour_range(events, 5, 9, param_i64(params, "min_count", i64::MAX))
            }
            EvaluatorId::WeekendWarrior => {
                temporal::count_on_weekend(events, param_i64(params, "min_count", i64::MAX))
            }
            EvaluatorId::KeywordPoster => keywords::keyword_posts_at_least(
                events,
                &param_str_list(params, "keywords"),
                param_i64(params, "min_count", i64::MAX),
            ),
            EvaluatorId::StreakKeeper => {
                window::latest_streak_at_least(events, param_i64(params, "min_days", i64::MAX))
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
