//! Time-of-day and day-of-week predicates.
//!
//! Hours are interpreted in UTC; the forum does not track user timezones.

use chrono::{Datelike, Timelike, Weekday};

use hodlboard_db::models::achievement_event::AchievementEvent;

/// At least `min_count` events whose UTC hour falls in `[start_hour, end_hour)`.
///
/// Backs `night_owl` (00:00-05:00) and `early_bird` (05:00-09:00).
pub fn count_in_hour_range(
    events: &[AchievementEvent],
    start_hour: u32,
    end_hour: u32,
    min_count: i64,
) -> bool {
    let count = events
        .iter()
        .filter(|e| {
            let hour = e.triggered_at.hour();
            hour >= start_hour && hour < end_hour
        })
        .count() as i64;
    count >= min_count
}

/// At least `min_count` events on a Saturday or Sunday (UTC).
/// Backs `weekend_warrior`.
pub fn count_on_weekend(events: &[AchievementEvent], min_count: i64) -> bool {
    let count = events
        .iter()
        .filter(|e| {
            matches!(e.triggered_at.weekday(), Weekday::Sat | Weekday::Sun)
        })
        .count() as i64;
    count >= min_count
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
