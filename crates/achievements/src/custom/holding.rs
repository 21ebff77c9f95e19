//! Duration-and-drawdown predicates over holding-behavior events.
//!
//! The portfolio tracker emits `diamond_hands` / `paper_hands` events whose
//! payloads summarize a closed or checkpointed position; these predicates
//! classify the summaries.

use hodlboard_core::event_kind::EventKind;
use hodlboard_db::models::achievement_event::AchievementEvent;

use serde_json::Value;

fn payload_f64(payload: &Value, key: &str) -> Option<f64> {
    payload.get(key).and_then(Value::as_f64)
}

/// Any position held >= `min_held_days` through a drawdown of at least
/// `min_drawdown_pct` percent. Backs `diamond_hands_hold`.
pub fn held_through_drawdown(
    events: &[AchievementEvent],
    min_held_days: f64,
    min_drawdown_pct: f64,
) -> bool {
    events
        .iter()
        .filter(|e| e.event_type == EventKind::DiamondHands.as_str())
        .any(|e| {
            let held = payload_f64(&e.payload, "held_days").unwrap_or(0.0);
            let drawdown = payload_f64(&e.payload, "max_drawdown_pct").unwrap_or(0.0);
            held >= min_held_days && drawdown >= min_drawdown_pct
        })
}

/// Any position dumped within `max_held_minutes` of a dip of at least
/// `min_drop_pct` percent. Backs `paper_hands_exit`.
pub fn sold_into_the_dip(
    events: &[AchievementEvent],
    max_held_minutes: f64,
    min_drop_pct: f64,
) -> bool {
    events
        .iter()
        .filter(|e| e.event_type == EventKind::PaperHands.as_str())
        .any(|e| {
            let held = payload_f64(&e.payload, "held_minutes");
            let drop = payload_f64(&e.payload, "drop_pct").unwrap_or(0.0);
            matches!(held, Some(m) if m <= max_held_minutes) && drop >= min_drop_pct
        })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::custom::testutil::{event, hours_ago};
    use chrono::Utc;
    use serde_json::json;

    #[test]
    fn diamond_hands_requires_both_duration_and_drawdown() {
        let now = Utc::now();
        let held_long_shallow = vec![event(
            1,
            EventKind::DiamondHands,
            hours_ago(now, 1),
            json!({"held_days": 90, "max_drawdown_pct": 10}),
        )];
        let held_short_deep = vec![event(
            2,
            EventKind::DiamondHands,
            hours_ago(now, 1),
            json!({"held_days": 3, "max_drawdown_pct": 80}),
        )];
        let qualifying = vec![event(
            3,
            EventKind::DiamondHands,
            hours_ago(now, 1),
            json!({"held_days": 45, "max_drawdown_pct": 60}),
        )];

        assert!(!held_through_drawdown(&held_long_shallow, 30.0, 50.0));
        assert!(!held_through_drawdown(&held_short_deep, 30.0, 50.0));
        assert!(held_through_drawdown(&qualifying, 30.0, 50.0));
    }

    #[test]
    fn diamond_hands_ignores_malformed_payloads() {
        let now = Utc::now();
        let events = vec![event(1, EventKind::DiamondHands, hours_ago(now, 1), json!({}))];
        assert!(!held_through_drawdown(&events, 1.0, 1.0));
    }

    #[test]
    fn paper_hands_requires_fast_exit_into_a_deep_dip() {
        let now = Utc::now();
        let panicked = vec![event(
            1,
            EventKind::PaperHands,
            hours_ago(now, 1),
            json!({"held_minutes": 12, "drop_pct": 25}),
        )];
        let patient = vec![event(
            2,
            EventKind::PaperHands,
            hours_ago(now, 1),
            json!({"held_minutes": 600, "drop_pct": 25}),
        )];
        let shallow = vec![event(
            3,
            EventKind::PaperHands,
            hours_ago(now, 1),
            json!({"held_minutes": 12, "drop_pct": 2}),
        )];

        assert!(sold_into_the_dip(&panicked, 30.0, 10.0));
        assert!(!sold_into_the_dip(&patient, 30.0, 10.0));
        assert!(!sold_into_the_dip(&shallow, 30.0, 10.0));
    }

    #[test]
    fn paper_hands_requires_held_minutes_field() {
        let now = Utc::now();
        let events = vec![event(
            1,
            EventKind::PaperHands,
            hours_ago(now, 1),
            json!({"drop_pct": 90}),
        )];
        assert!(!sold_into_the_dip(&events, 30.0, 10.0));
    }
}
