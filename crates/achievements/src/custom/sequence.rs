//! Multi-kind combination predicates over a trailing window.

use chrono::Duration;

use hodlboard_core::event_kind::EventKind;
use hodlboard_core::types::Timestamp;
use hodlboard_db::models::achievement_event::AchievementEvent;

/// At least one event of every kind in `kinds` inside the trailing window,
/// in any order. Backs `social_combo` and `crash_combo`.
pub fn all_kinds_in_window(
    events: &[AchievementEvent],
    kinds: &[EventKind],
    window_hours: i64,
    now: Timestamp,
) -> bool {
    if kinds.is_empty() {
        return false;
    }
    let cutoff = now - Duration::hours(window_hours);
    kinds.iter().all(|kind| {
        events
            .iter()
            .any(|e| e.event_type == kind.as_str() && e.triggered_at >= cutoff)
    })
}

/// One event of each kind in `kinds`, observed in that order, all inside the
/// trailing window. Later kinds must trigger strictly after the earlier match.
/// Backs `crash_combo`.
pub fn kinds_in_order_in_window(
    events: &[AchievementEvent],
    kinds: &[EventKind],
    window_hours: i64,
    now: Timestamp,
) -> bool {
    if kinds.is_empty() {
        return false;
    }
    let cutoff = now - Duration::hours(window_hours);

    // Events arrive sorted by (triggered_at, id); a single greedy pass finds
    // the earliest valid chain if one exists.
    let mut next = 0;
    for event in events.iter().filter(|e| e.triggered_at >= cutoff) {
        if event.event_type == kinds[next].as_str() {
            next += 1;
            if next == kinds.len() {
                return true;
            }
        }
    }
    false
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
