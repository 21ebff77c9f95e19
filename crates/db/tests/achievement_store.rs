//! Integration tests for the event log and progress repositories.

use assert_matches::assert_matches;
use serde_json::json;
use sqlx::PgPool;

use hodlboard_db::models::achievement::CreateAchievement;
use hodlboard_db::repositories::{
    AchievementEventRepo, AchievementRepo, UserAchievementRepo, UserMetricRepo,
};

/// Insert a minimal count-trigger definition and return its ID.
async fn seed_achievement(pool: &PgPool, key: &str) -> i64 {
    let def = CreateAchievement {
        key: key.to_string(),
        name: key.to_string(),
        description: String::new(),
        category: "general".to_string(),
        tier: 1,
        trigger_type: "count".to_string(),
        trigger_config: json!({"action": "REPLY_CREATED", "target": 5}),
        reward_xp: 100,
        reward_tokens: 10,
        reward_reputation: 5,
        badge_key: None,
        title_key: None,
        is_active: true,
        is_secret: false,
        is_retroactive: false,
    };
    AchievementRepo::insert(pool, &def).await.unwrap().id
}

// ---------------------------------------------------------------------------
// Event log lifecycle
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn inserted_events_start_pending(pool: PgPool) {
    let id = AchievementEventRepo::insert(&pool, 1, "post_created", &json!({}))
        .await
        .unwrap();
    let event = AchievementEventRepo::get(&pool, id).await.unwrap().unwrap();
    assert_eq!(event.processing_status, "pending");
    assert!(event.processed_at.is_none());
}

#[sqlx::test(migrations = "./migrations")]
async fn claim_moves_pending_to_processing_oldest_first(pool: PgPool) {
    for i in 0..3 {
        AchievementEventRepo::insert(&pool, 1, "post_created", &json!({"n": i}))
            .await
            .unwrap();
    }

    let claimed = AchievementEventRepo::claim_pending(&pool, 2).await.unwrap();
    assert_eq!(claimed.len(), 2);
    assert!(claimed[0].triggered_at <= claimed[1].triggered_at);
    for event in &claimed {
        assert_eq!(event.processing_status, "processing");
    }

    // One event remains pending.
    let pending = AchievementEventRepo::count_by_status(&pool, "pending")
        .await
        .unwrap();
    assert_eq!(pending, 1);
}

#[sqlx::test(migrations = "./migrations")]
async fn claim_does_not_return_already_claimed_events(pool: PgPool) {
    AchievementEventRepo::insert(&pool, 1, "login", &json!({}))
        .await
        .unwrap();

    let first = AchievementEventRepo::claim_pending(&pool, 10).await.unwrap();
    assert_eq!(first.len(), 1);

    let second = AchievementEventRepo::claim_pending(&pool, 10).await.unwrap();
    assert!(second.is_empty());
}

#[sqlx::test(migrations = "./migrations")]
async fn stale_processing_claims_are_requeued(pool: PgPool) {
    let id = AchievementEventRepo::insert(&pool, 1, "login", &json!({}))
        .await
        .unwrap();
    let claimed = AchievementEventRepo::claim_pending(&pool, 10).await.unwrap();
    assert_matches!(claimed[0].claimed_at, Some(_));

    // A fresh claim is not stale.
    let requeued = AchievementEventRepo::requeue_stale(&pool, 600).await.unwrap();
    assert_eq!(requeued, 0);

    // Age the claim past the threshold, as if the worker died mid-batch.
    sqlx::query("UPDATE achievement_events SET claimed_at = now() - interval '1 hour'")
        .execute(&pool)
        .await
        .unwrap();

    let requeued = AchievementEventRepo::requeue_stale(&pool, 600).await.unwrap();
    assert_eq!(requeued, 1);

    let event = AchievementEventRepo::get(&pool, id).await.unwrap().unwrap();
    assert_eq!(event.processing_status, "pending");
    assert_matches!(event.claimed_at, None);

    // The requeued event is claimable again.
    let reclaimed = AchievementEventRepo::claim_pending(&pool, 10).await.unwrap();
    assert_eq!(reclaimed.len(), 1);
}

#[sqlx::test(migrations = "./migrations")]
async fn requeue_does_not_touch_finalized_events(pool: PgPool) {
    let id = AchievementEventRepo::insert(&pool, 1, "login", &json!({}))
        .await
        .unwrap();
    AchievementEventRepo::claim_pending(&pool, 10).await.unwrap();
    AchievementEventRepo::mark_completed(&pool, id).await.unwrap();

    sqlx::query("UPDATE achievement_events SET claimed_at = now() - interval '1 hour'")
        .execute(&pool)
        .await
        .unwrap();

    let requeued = AchievementEventRepo::requeue_stale(&pool, 600).await.unwrap();
    assert_eq!(requeued, 0);
}

#[sqlx::test(migrations = "./migrations")]
async fn mark_completed_is_terminal(pool: PgPool) {
    let id = AchievementEventRepo::insert(&pool, 1, "login", &json!({}))
        .await
        .unwrap();
    AchievementEventRepo::claim_pending(&pool, 1).await.unwrap();
    AchievementEventRepo::mark_completed(&pool, id).await.unwrap();

    let event = AchievementEventRepo::get(&pool, id).await.unwrap().unwrap();
    assert_eq!(event.processing_status, "completed");
    assert!(event.processed_at.is_some());

    // A completed event is never re-claimed.
    let reclaimed = AchievementEventRepo::claim_pending(&pool, 10).await.unwrap();
    assert!(reclaimed.is_empty());
}

#[sqlx::test(migrations = "./migrations")]
async fn mark_failed_records_error_detail(pool: PgPool) {
    let id = AchievementEventRepo::insert(&pool, 1, "login", &json!({}))
        .await
        .unwrap();
    AchievementEventRepo::claim_pending(&pool, 1).await.unwrap();
    AchievementEventRepo::mark_failed(&pool, id, "boom").await.unwrap();

    let event = AchievementEventRepo::get(&pool, id).await.unwrap().unwrap();
    assert_eq!(event.processing_status, "failed");
    assert_eq!(event.processing_error.as_deref(), Some("boom"));
}

#[sqlx::test(migrations = "./migrations")]
async fn count_includes_in_flight_triggering_row(pool: PgPool) {
    // Four already-completed qualifying events.
    for _ in 0..4 {
        let id = AchievementEventRepo::insert(&pool, 7, "reply_created", &json!({}))
            .await
            .unwrap();
        AchievementEventRepo::claim_pending(&pool, 10).await.unwrap();
        AchievementEventRepo::mark_completed(&pool, id).await.unwrap();
    }

    // The fifth is mid-processing.
    let fifth = AchievementEventRepo::insert(&pool, 7, "reply_created", &json!({}))
        .await
        .unwrap();
    AchievementEventRepo::claim_pending(&pool, 10).await.unwrap();

    let count = AchievementEventRepo::count_for_user(&pool, 7, "reply_created", fifth, None)
        .await
        .unwrap();
    assert_eq!(count, 5);

    // Another user's events do not leak in.
    let other = AchievementEventRepo::count_for_user(&pool, 8, "reply_created", fifth, None)
        .await
        .unwrap();
    assert_eq!(other, 0);
}

#[sqlx::test(migrations = "./migrations")]
async fn count_respects_since_cutoff(pool: PgPool) {
    let mut last = 0;
    for _ in 0..3 {
        last = AchievementEventRepo::insert(&pool, 7, "reply_created", &json!({}))
            .await
            .unwrap();
        AchievementEventRepo::claim_pending(&pool, 10).await.unwrap();
        AchievementEventRepo::mark_completed(&pool, last).await.unwrap();
    }
    // Two of the three predate the cutoff.
    sqlx::query("UPDATE achievement_events SET triggered_at = now() - interval '2 days' WHERE id <> $1")
        .bind(last)
        .execute(&pool)
        .await
        .unwrap();
    let cutoff = chrono::Utc::now() - chrono::Duration::days(1);

    let bounded =
        AchievementEventRepo::count_for_user(&pool, 7, "reply_created", last, Some(cutoff))
            .await
            .unwrap();
    assert_eq!(bounded, 1);

    let unbounded = AchievementEventRepo::count_for_user(&pool, 7, "reply_created", last, None)
        .await
        .unwrap();
    assert_eq!(unbounded, 3);
}

// ---------------------------------------------------------------------------
// Progress upserts
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn complete_is_idempotent(pool: PgPool) {
    let achievement_id = seed_achievement(&pool, "conversation_starter").await;

    let first = UserAchievementRepo::complete(
        &pool,
        42,
        achievement_id,
        &json!({"current": 5, "target": 5}),
        &json!({"manually_awarded": false}),
    )
    .await
    .unwrap();
    assert!(first, "first completion should transition");

    let second = UserAchievementRepo::complete(
        &pool,
        42,
        achievement_id,
        &json!({"current": 6, "target": 5}),
        &json!({"manually_awarded": false}),
    )
    .await
    .unwrap();
    assert!(!second, "duplicate completion must not transition again");

    let row = UserAchievementRepo::get(&pool, 42, achievement_id)
        .await
        .unwrap()
        .unwrap();
    assert!(row.is_completed);
    assert!(row.completed_at.is_some());
    // The duplicate call did not overwrite the first snapshot.
    assert_eq!(row.current_progress["current"], 5);
}

#[sqlx::test(migrations = "./migrations")]
async fn progress_percentage_never_regresses(pool: PgPool) {
    let achievement_id = seed_achievement(&pool, "steady_progress").await;

    UserAchievementRepo::upsert_progress(&pool, 1, achievement_id, &json!({}), 60.0)
        .await
        .unwrap();
    UserAchievementRepo::upsert_progress(&pool, 1, achievement_id, &json!({}), 40.0)
        .await
        .unwrap();

    let row = UserAchievementRepo::get(&pool, 1, achievement_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(row.progress_percentage, 60.0);
    assert!(!row.is_completed);
}

#[sqlx::test(migrations = "./migrations")]
async fn partial_progress_does_not_touch_completed_rows(pool: PgPool) {
    let achievement_id = seed_achievement(&pool, "locked_in").await;

    UserAchievementRepo::complete(&pool, 1, achievement_id, &json!({}), &json!({}))
        .await
        .unwrap();
    UserAchievementRepo::upsert_progress(&pool, 1, achievement_id, &json!({}), 10.0)
        .await
        .unwrap();

    let row = UserAchievementRepo::get(&pool, 1, achievement_id)
        .await
        .unwrap()
        .unwrap();
    assert!(row.is_completed);
    assert_eq!(row.progress_percentage, 100.0);
}

#[sqlx::test(migrations = "./migrations")]
async fn stats_reflect_completions_and_average(pool: PgPool) {
    let achievement_id = seed_achievement(&pool, "statistically_sound").await;

    UserAchievementRepo::complete(&pool, 1, achievement_id, &json!({}), &json!({}))
        .await
        .unwrap();
    UserAchievementRepo::upsert_progress(&pool, 2, achievement_id, &json!({}), 50.0)
        .await
        .unwrap();

    let stats = UserAchievementRepo::stats(&pool, achievement_id).await.unwrap();
    assert_eq!(stats.tracked_users, 2);
    assert_eq!(stats.completed_users, 1);
    assert!((stats.completion_rate - 0.5).abs() < f64::EPSILON);
    assert!((stats.average_progress - 75.0).abs() < f64::EPSILON);
}

#[sqlx::test(migrations = "./migrations")]
async fn stats_on_untracked_achievement_are_zero(pool: PgPool) {
    let achievement_id = seed_achievement(&pool, "nobody_yet").await;
    let stats = UserAchievementRepo::stats(&pool, achievement_id).await.unwrap();
    assert_eq!(stats.tracked_users, 0);
    assert_eq!(stats.completion_rate, 0.0);
}

// ---------------------------------------------------------------------------
// Derived metrics
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn count_metric_counts_events(pool: PgPool) {
    for _ in 0..3 {
        AchievementEventRepo::insert(&pool, 5, "post_created", &json!({}))
            .await
            .unwrap();
    }
    let value = UserMetricRepo::metric_value(&pool, 5, "total_posts").await.unwrap();
    assert_eq!(value, 3);
}

#[sqlx::test(migrations = "./migrations")]
async fn volume_metric_sums_payload_amounts(pool: PgPool) {
    for amount in [250, 750] {
        AchievementEventRepo::insert(&pool, 5, "tip_sent", &json!({"amount": amount}))
            .await
            .unwrap();
    }
    // A tip without an amount field is ignored rather than erroring.
    AchievementEventRepo::insert(&pool, 5, "tip_sent", &json!({}))
        .await
        .unwrap();

    let value = UserMetricRepo::metric_value(&pool, 5, "tip_volume_sent")
        .await
        .unwrap();
    assert_eq!(value, 1000);
}

#[sqlx::test(migrations = "./migrations")]
async fn unknown_metric_is_zero(pool: PgPool) {
    let value = UserMetricRepo::metric_value(&pool, 5, "total_rugs").await.unwrap();
    assert_eq!(value, 0);
}
