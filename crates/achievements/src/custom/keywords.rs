//! Content-matching predicates.

use hodlboard_db::models::achievement_event::AchievementEvent;

/// At least `min_count` events whose payload `content` contains any of the
/// keywords, case-insensitively. Backs `keyword_poster`.
pub fn keyword_posts_at_least(
    events: &[AchievementEvent],
    keywords: &[String],
    min_count: i64,
) -> bool {
    if keywords.is_empty() {
        return false;
    }
    let needles: Vec<String> = keywords.iter().map(|k| k.to_lowercase()).collect();

    let count = events
        .iter()
        .filter(|e| {
            e.payload
                .get("content")
                .and_then(|v| v.as_str())
                .is_some_and(|content| {
                    let haystack = content.to_lowercase();
                    needles.iter().any(|n| haystack.contains(n.as_str()))
                })
        })
        .count() as i64;
    count >= min_count
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::custom::testutil::{event, hours_ago};
    use chrono::Utc;
    use hodlboard_core::event_kind::EventKind;
    use serde_json::json;

    fn post(id: i64, content: &str) -> AchievementEvent {
        event(
            id,
            EventKind::PostCreated,
            hours_ago(Utc::now(), id),
            json!({"content": content}),
        )
    }

    #[test]
    fn matches_are_case_insensitive() {
        let events = vec![
            post(1, "HODL till the moon"),
            post(2, "just hodl it"),
            post(3, "selling everything"),
        ];
        let keywords = vec!["hodl".to_string()];
        assert!(keyword_posts_at_least(&events, &keywords, 2));
        assert!(!keyword_posts_at_least(&events, &keywords, 3));
    }

    #[test]
    fn any_keyword_counts_the_post_once() {
        let events = vec![post(1, "hodl to the moon")];
        let keywords = vec!["hodl".to_string(), "moon".to_string()];
        assert!(keyword_posts_at_least(&events, &keywords, 1));
        assert!(!keyword_posts_at_least(&events, &keywords, 2));
    }

    #[test]
    fn posts_without_content_are_skipped() {
        let events = vec![event(
            1,
            EventKind::PostCreated,
            hours_ago(Utc::now(), 1),
            json!({}),
        )];
        assert!(!keyword_posts_at_least(&events, &["hodl".to_string()], 1));
    }

    #[test]
    fn empty_keyword_list_never_matches() {
        let events = vec![post(1, "anything")];
        assert!(!keyword_posts_at_least(&events, &[], 0));
    }
}
