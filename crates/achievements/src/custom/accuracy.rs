//! Accuracy-over-population predicates.

use hodlboard_core::event_kind::EventKind;
use hodlboard_db::models::achievement_event::AchievementEvent;

/// At least `min_samples` scored market predictions with an overall accuracy
/// of at least `min_accuracy` (a ratio in `[0, 1]`). Backs `prediction_oracle`.
///
/// Only predictions carrying a boolean `correct` field count as samples;
/// unresolved predictions are excluded from both numerator and denominator.
pub fn prediction_accuracy_at_least(
    events: &[AchievementEvent],
    min_samples: i64,
    min_accuracy: f64,
) -> bool {
    let mut samples: i64 = 0;
    let mut correct: i64 = 0;

    for event in events
        .iter()
        .filter(|e| e.event_type == EventKind::MarketPrediction.as_str())
    {
        if let Some(was_correct) = event.payload.get("correct").and_then(|v| v.as_bool()) {
            samples += 1;
            if was_correct {
                correct += 1;
            }
        }
    }

    if samples < min_samples {
        return false;
    }
    correct as f64 / samples as f64 >= min_accuracy
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
