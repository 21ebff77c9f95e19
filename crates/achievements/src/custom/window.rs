//! Magnitude- and frequency-over-window predicates.

use chrono::Duration;

use hodlboard_core::event_kind::EventKind;
use hodlboard_core::types::Timestamp;
use hodlboard_db::models::achievement_event::AchievementEvent;

use super::amount_of;

/// Events of `kind` that fall inside the trailing window.
fn in_window<'a>(
    events: &'a [AchievementEvent],
    kind: EventKind,
    window_hours: i64,
    now: Timestamp,
) -> impl Iterator<Item = &'a AchievementEvent> {
    let cutoff = now - Duration::hours(window_hours);
    events
        .iter()
        .filter(move |e| e.event_type == kind.as_str() && e.triggered_at >= cutoff)
}

/// Cumulative payload `amount` of `kind` events >= `min_total` within the window.
///
/// Backs `cumulative_loss_in_window` and `tip_volume_in_window`.
pub fn cumulative_amount_at_least(
    events: &[AchievementEvent],
    kind: EventKind,
    min_total: f64,
    window_hours: i64,
    now: Timestamp,
) -> bool {
    let total: f64 = in_window(events, kind, window_hours, now)
        .map(|e| amount_of(&e.payload))
        .sum();
    total >= min_total
}

/// At least `min_count` events of any kind in `kinds` within the window.
///
/// Backs the frequency detectors: `rapid_poster`, `serial_necromancer`,
/// `like_magnet`, `mention_magnet`.
pub fn count_at_least(
    events: &[AchievementEvent],
    kinds: &[EventKind],
    min_count: i64,
    window_hours: i64,
    now: Timestamp,
) -> bool {
    let count = kinds
        .iter()
        .map(|kind| in_window(events, *kind, window_hours, now).count() as i64)
        .sum::<i64>();
    count >= min_count
}

/// At least `min_count` `kind` events of >= `min_amount` each within the window.
///
/// Backs `whale_tipper`.
pub fn count_with_min_amount(
    events: &[AchievementEvent],
    kind: EventKind,
    min_amount: f64,
    min_count: i64,
    window_hours: i64,
    now: Timestamp,
) -> bool {
    let count = in_window(events, kind, window_hours, now)
        .filter(|e| amount_of(&e.payload) >= min_amount)
        .count() as i64;
    count >= min_count
}

/// At least `min_count` tips sent within `window_hours` after some
/// crash-sentiment event. Backs `fomo_frenzy`.
pub fn tips_after_crash(
    events: &[AchievementEvent],
    min_count: i64,
    window_hours: i64,
) -> bool {
    let crash = EventKind::CrashSentiment.as_str();
    let tip = EventKind::TipSent.as_str();

    events
        .iter()
        .filter(|e| e.event_type == crash)
        .any(|c| {
            let window_end = c.triggered_at + Duration::hours(window_hours);
            let tips = events
                .iter()
                .filter(|e| {
                    e.event_type == tip
                        && e.triggered_at > c.triggered_at
                        && e.triggered_at <= window_end
                })
                .count() as i64;
            tips >= min_count
        })
}

/// Latest daily-streak event reports >= `min_days` consecutive days.
/// Backs `streak_keeper`.
pub fn latest_streak_at_least(events: &[AchievementEvent], min_days: i64) -> bool {
    events
        .iter()
        .filter(|e| e.event_type == EventKind::DailyStreak.as_str())
        .max_by_key(|e| (e.triggered_at, e.id))
        .and_then(|e| e.payload.get("streak_days").and_then(|v| v.as_i64()))
        .is_some_and(|days| days >= min_days)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
