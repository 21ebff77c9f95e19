//! Repository for the `achievement_events` log.
//!
//! The log is append-only: rows are inserted as `pending`, claimed into
//! `processing` by the scheduler, and finalized as `completed` or `failed`.
//! Nothing here deletes rows.

use sqlx::PgPool;

use hodlboard_core::types::{DbId, Timestamp};

use crate::models::achievement_event::AchievementEvent;

/// Column list for `achievement_events` queries.
const COLUMNS: &str = "id, user_id, event_type, payload, triggered_at, \
     claimed_at, processed_at, processing_status, processing_error";

/// A not-yet-persisted event, used by batch appends.
#[derive(Debug, Clone)]
pub struct NewEvent {
    pub user_id: DbId,
    pub event_type: String,
    pub payload: serde_json::Value,
}

/// Provides read/write operations for the durable event log.
pub struct AchievementEventRepo;

impl AchievementEventRepo {
    /// Append a single pending event, returning the generated ID.
    pub async fn insert(
        pool: &PgPool,
        user_id: DbId,
        event_type: &str,
        payload: &serde_json::Value,
    ) -> Result<DbId, sqlx::Error> {
        sqlx::query_scalar(
            "INSERT INTO achievement_events (user_id, event_type, payload) \
             VALUES ($1, $2, $3) \
             RETURNING id",
        )
        .bind(user_id)
        .bind(event_type)
        .bind(payload)
        .fetch_one(pool)
        .await
    }

    /// Append a batch of pending events inside one transaction.
    pub async fn insert_batch(pool: &PgPool, events: &[NewEvent]) -> Result<(), sqlx::Error> {
        let mut tx = pool.begin().await?;

        for event in events {
            sqlx::query(
                "INSERT INTO achievement_events (user_id, event_type, payload) \
                 VALUES ($1, $2, $3)",
            )
            .bind(event.user_id)
            .bind(&event.event_type)
            .bind(&event.payload)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await
    }

    /// Atomically claim up to `batch_size` pending events for processing.
    ///
    /// The claim is a conditional status transition (`pending` ->
    /// `processing`) over rows locked with `FOR UPDATE SKIP LOCKED`, so a
    /// second scheduler instance running concurrently can never claim the
    /// same rows. Events are returned oldest-first.
    pub async fn claim_pending(
        pool: &PgPool,
        batch_size: i64,
    ) -> Result<Vec<AchievementEvent>, sqlx::Error> {
        let query = format!(
            "UPDATE achievement_events \
             SET processing_status = 'processing', claimed_at = now() \
             WHERE id IN ( \
                 SELECT id FROM achievement_events \
                 WHERE processing_status = 'pending' \
                 ORDER BY triggered_at ASC \
                 LIMIT $1 \
                 FOR UPDATE SKIP LOCKED \
             ) \
             RETURNING {COLUMNS}"
        );
        let mut claimed = sqlx::query_as::<_, AchievementEvent>(&query)
            .bind(batch_size)
            .fetch_all(pool)
            .await?;
        // RETURNING does not preserve the subquery order.
        claimed.sort_by_key(|e| (e.triggered_at, e.id));
        Ok(claimed)
    }

    /// Reset events stuck in `processing` back to `pending`.
    ///
    /// A claim that never finalizes (worker crash, storage error while
    /// marking the row) would otherwise strand the event. Rows claimed more
    /// than `stale_after_secs` ago become claimable again. Returns the
    /// number of requeued rows.
    pub async fn requeue_stale(pool: &PgPool, stale_after_secs: i64) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE achievement_events \
             SET processing_status = 'pending', claimed_at = NULL \
             WHERE processing_status = 'processing' \
               AND claimed_at < now() - ($1 * interval '1 second')",
        )
        .bind(stale_after_secs)
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }

    /// Mark a claimed event as successfully processed.
    pub async fn mark_completed(pool: &PgPool, id: DbId) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE achievement_events \
             SET processing_status = 'completed', processed_at = now() \
             WHERE id = $1 AND processing_status = 'processing'",
        )
        .bind(id)
        .execute(pool)
        .await?;
        Ok(())
    }

    /// Mark a claimed event as failed, recording the error detail.
    ///
    /// Failed events are not re-queued; the error column exists for
    /// observability and manual triage.
    pub async fn mark_failed(pool: &PgPool, id: DbId, error: &str) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE achievement_events \
             SET processing_status = 'failed', processed_at = now(), processing_error = $2 \
             WHERE id = $1 AND processing_status = 'processing'",
        )
        .bind(id)
        .bind(error)
        .execute(pool)
        .await?;
        Ok(())
    }

    /// Count a user's qualifying events of one type.
    ///
    /// Counts rows already processed plus the in-flight row identified by
    /// `include_event_id`, so the event being evaluated contributes to its
    /// own count (the Nth qualifying event completes a target-N
    /// achievement during its own drain). When `since` is set, only events
    /// triggered at or after it count.
    pub async fn count_for_user(
        pool: &PgPool,
        user_id: DbId,
        event_type: &str,
        include_event_id: DbId,
        since: Option<Timestamp>,
    ) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT COUNT(*) FROM achievement_events \
             WHERE user_id = $1 AND event_type = $2 \
               AND (processing_status = 'completed' OR id = $3) \
               AND ($4::timestamptz IS NULL OR triggered_at >= $4)",
        )
        .bind(user_id)
        .bind(event_type)
        .bind(include_event_id)
        .bind(since)
        .fetch_one(pool)
        .await
    }

    /// Fetch a user's event history since `since`, oldest-first.
    ///
    /// This is the single windowed fetch backing the custom evaluator
    /// registry; predicates filter the slice in memory.
    pub async fn list_for_user_since(
        pool: &PgPool,
        user_id: DbId,
        since: Timestamp,
    ) -> Result<Vec<AchievementEvent>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM achievement_events \
             WHERE user_id = $1 AND triggered_at >= $2 \
             ORDER BY triggered_at ASC, id ASC"
        );
        sqlx::query_as::<_, AchievementEvent>(&query)
            .bind(user_id)
            .bind(since)
            .fetch_all(pool)
            .await
    }

    /// Fetch one event by ID.
    pub async fn get(pool: &PgPool, id: DbId) -> Result<Option<AchievementEvent>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM achievement_events WHERE id = $1");
        sqlx::query_as::<_, AchievementEvent>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Count events currently in the given processing status.
    pub async fn count_by_status(pool: &PgPool, status: &str) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT COUNT(*) FROM achievement_events WHERE processing_status = $1",
        )
        .bind(status)
        .fetch_one(pool)
        .await
    }
}
