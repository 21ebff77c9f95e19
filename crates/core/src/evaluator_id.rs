//! The closed registry of custom evaluator ids.
//!
//! Custom triggers name one of these ids in their config. Parsing happens at
//! definition time, so a definition that reaches the evaluation path always
//! carries a known id with its required parameters present.

use serde_json::{Map, Value};

use crate::error::CoreError;
use crate::event_kind::EventKind;

// ---------------------------------------------------------------------------
// EvaluatorId
// ---------------------------------------------------------------------------

/// Identifier of a registered custom evaluator predicate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EvaluatorId {
    /// Cumulative wallet loss >= `min_total` within `window_hours`.
    CumulativeLossInWindow,
    /// Cumulative tips sent >= `min_total` within `window_hours`.
    TipVolumeInWindow,
    /// Position held >= `min_held_days` through >= `min_drawdown_pct` drawdown.
    DiamondHandsHold,
    /// Position exited within `max_held_minutes` of a >= `min_drop_pct` dip.
    PaperHandsExit,
    /// >= `min_count` posts/replies within `window_hours`.
    RapidPoster,
    /// >= `min_count` tips of >= `min_amount` each within `window_hours`.
    WhaleTipper,
    /// >= `min_count` thread necromancies within `window_hours`.
    SerialNecromancer,
    /// >= `min_count` likes received within `window_hours`.
    LikeMagnet,
    /// >= `min_count` mentions received within `window_hours`.
    MentionMagnet,
    /// >= `min_count` tips sent within `window_hours` after a crash-sentiment event.
    FomoFrenzy,
    /// >= `min_samples` predictions with accuracy >= `min_accuracy`.
    PredictionOracle,
    /// All listen-set event kinds observed within `window_hours` (unordered).
    SocialCombo,
    /// Crash sentiment, then wallet loss, then a post, in order, within `window_hours`.
    CrashCombo,
    /// >= `min_count` events posted between 00:00 and 05:00 UTC.
    NightOwl,
    /// >= `min_count` events posted between 05:00 and 09:00 UTC.
    EarlyBird,
    /// >= `min_count` events on Saturday or Sunday.
    WeekendWarrior,
    /// >= `min_count` posts whose content contains any of `keywords`.
    KeywordPoster,
    /// Latest daily-streak payload reports >= `min_days` consecutive days.
    StreakKeeper,
}

/// Every registered evaluator id.
pub const ALL_EVALUATORS: [EvaluatorId; 18] = [
    EvaluatorId::CumulativeLossInWindow,
    EvaluatorId::TipVolumeInWindow,
    EvaluatorId::DiamondHandsHold,
    EvaluatorId::PaperHandsExit,
    EvaluatorId::RapidPoster,
    EvaluatorId::WhaleTipper,
    EvaluatorId::SerialNecromancer,
    EvaluatorId::LikeMagnet,
    EvaluatorId::MentionMagnet,
    EvaluatorId::FomoFrenzy,
    EvaluatorId::PredictionOracle,
    EvaluatorId::SocialCombo,
    EvaluatorId::CrashCombo,
    EvaluatorId::NightOwl,
    EvaluatorId::EarlyBird,
    EvaluatorId::WeekendWarrior,
    EvaluatorId::KeywordPoster,
    EvaluatorId::StreakKeeper,
];

impl EvaluatorId {
    /// String representation used in trigger configs.
    pub fn as_str(&self) -> &'static str {
        match self {
            EvaluatorId::CumulativeLossInWindow => "cumulative_loss_in_window",
            EvaluatorId::TipVolumeInWindow => "tip_volume_in_window",
            EvaluatorId::DiamondHandsHold => "diamond_hands_hold",
            EvaluatorId::PaperHandsExit => "paper_hands_exit",
            EvaluatorId::RapidPoster => "rapid_poster",
            EvaluatorId::WhaleTipper => "whale_tipper",
            EvaluatorId::SerialNecromancer => "serial_necromancer",
            EvaluatorId::LikeMagnet => "like_magnet",
            EvaluatorId::MentionMagnet => "mention_magnet",
            EvaluatorId::FomoFrenzy => "fomo_frenzy",
            EvaluatorId::PredictionOracle => "prediction_oracle",
            EvaluatorId::SocialCombo => "social_combo",
            EvaluatorId::CrashCombo => "crash_combo",
            EvaluatorId::NightOwl => "night_owl",
            EvaluatorId::EarlyBird => "early_bird",
            EvaluatorId::WeekendWarrior => "weekend_warrior",
            EvaluatorId::KeywordPoster => "keyword_poster",
            EvaluatorId::StreakKeeper => "streak_keeper",
        }
    }

    /// Parse from the config string form. Returns `None` for unknown ids.
    pub fn parse(s: &str) -> Option<Self> {
        ALL_EVALUATORS.iter().copied().find(|id| id.as_str() == s)
    }

    /// Parameter keys that must be present in the evaluator config.
    pub fn required_params(&self) -> &'static [&'static str] {
        match self {
            EvaluatorId::CumulativeLossInWindow | EvaluatorId::TipVolumeInWindow => {
                &["min_total", "window_hours"]
            }
            EvaluatorId::DiamondHandsHold => &["min_held_days", "min_drawdown_pct"],
            EvaluatorId::PaperHandsExit => &["max_held_minutes", "min_drop_pct"],
            EvaluatorId::RapidPoster
            | EvaluatorId::SerialNecromancer
            | EvaluatorId::LikeMagnet
            | EvaluatorId::MentionMagnet
            | EvaluatorId::FomoFrenzy => &["min_count", "window_hours"],
            EvaluatorId::WhaleTipper => &["min_amount", "window_hours"],
            EvaluatorId::PredictionOracle => &["min_samples", "min_accuracy"],
            EvaluatorId::SocialCombo | EvaluatorId::CrashCombo => &["window_hours"],
            EvaluatorId::NightOwl | EvaluatorId::EarlyBird | EvaluatorId::WeekendWarrior => {
                &["min_count"]
            }
            EvaluatorId::KeywordPoster => &["keywords", "min_count"],
            EvaluatorId::StreakKeeper => &["min_days"],
        }
    }

    /// Event kinds this evaluator listens to by default.
    ///
    /// A custom trigger config may override this with an explicit
    /// `event_types` list.
    pub fn default_listen_kinds(&self) -> &'static [EventKind] {
        match self {
            EvaluatorId::CumulativeLossInWindow => &[EventKind::WalletLoss],
            EvaluatorId::TipVolumeInWindow => &[EventKind::TipSent],
            EvaluatorId::DiamondHandsHold => &[EventKind::DiamondHands],
            EvaluatorId::PaperHandsExit => &[EventKind::PaperHands],
            EvaluatorId::RapidPoster => &[EventKind::PostCreated, EventKind::ReplyCreated],
            EvaluatorId::WhaleTipper => &[EventKind::TipSent],
            EvaluatorId::SerialNecromancer => &[EventKind::ThreadNecromancy],
            EvaluatorId::LikeMagnet => &[EventKind::LikeReceived],
            EvaluatorId::MentionMagnet => &[EventKind::MentionReceived],
            EvaluatorId::FomoFrenzy => &[EventKind::TipSent, EventKind::CrashSentiment],
            EvaluatorId::PredictionOracle => &[EventKind::MarketPrediction],
            EvaluatorId::SocialCombo => {
                &[EventKind::PostCreated, EventKind::LikeGiven, EventKind::TipSent]
            }
            EvaluatorId::CrashCombo => &[
                EventKind::CrashSentiment,
                EventKind::WalletLoss,
                EventKind::PostCreated,
            ],
            EvaluatorId::NightOwl | EvaluatorId::EarlyBird => {
                &[EventKind::PostCreated, EventKind::ReplyCreated]
            }
            EvaluatorId::WeekendWarrior => &[
                EventKind::PostCreated,
                EventKind::ReplyCreated,
                EventKind::ThreadCreated,
            ],
            EvaluatorId::KeywordPoster => &[EventKind::PostCreated, EventKind::ReplyCreated],
            EvaluatorId::StreakKeeper => &[EventKind::DailyStreak],
        }
    }

    /// Validate that every required parameter is present in `params`.
    pub fn validate_config(&self, params: &Map<String, Value>) -> Result<(), CoreError> {
        for key in self.required_params() {
            if !params.contains_key(*key) {
                return Err(CoreError::Validation(format!(
                    "Evaluator {} requires config field {key}",
                    self.as_str()
                )));
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn as_str_parse_round_trip_for_all_ids() {
        for id in ALL_EVALUATORS {
            assert_eq!(EvaluatorId::parse(id.as_str()), Some(id));
        }
    }

    #[test]
    fn parse_rejects_unknown_id() {
        assert_eq!(EvaluatorId::parse("astrology_aligned"), None);
    }

    #[test]
    fn there_are_eighteen_evaluators() {
        assert_eq!(ALL_EVALUATORS.len(), 18);
    }

    #[test]
    fn every_evaluator_has_a_listen_set() {
        for id in ALL_EVALUATORS {
            assert!(
                !id.default_listen_kinds().is_empty(),
                "{} has an empty listen set",
                id.as_str()
            );
        }
    }

    #[test]
    fn validate_config_accepts_complete_params() {
        let params = json!({"min_total": 1000, "window_hours": 24});
        let map = params.as_object().unwrap();
        assert!(EvaluatorId::CumulativeLossInWindow
            .validate_config(map)
            .is_ok());
    }

    #[test]
    fn validate_config_rejects_missing_params() {
        let params = json!({"min_total": 1000});
        let map = params.as_object().unwrap();
        let err = EvaluatorId::CumulativeLossInWindow
            .validate_config(map)
            .unwrap_err();
        assert!(err.to_string().contains("window_hours"));
    }

    #[test]
    fn keyword_poster_requires_keywords() {
        let params = json!({"min_count": 3});
        let map = params.as_object().unwrap();
        assert!(EvaluatorId::KeywordPoster.validate_config(map).is_err());
    }
}
