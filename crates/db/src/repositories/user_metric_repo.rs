//! Derived user metrics for threshold triggers.
//!
//! Metrics are aggregates computed on demand from the event log; the known
//! metric names live in `hodlboard_core::trigger::METRIC_SOURCES` and are
//! validated at definition time, so an unknown name here is a logic error
//! reported as zero.

use sqlx::PgPool;

use hodlboard_core::event_kind::EventKind;
use hodlboard_core::trigger::metric_source_kind;
use hodlboard_core::types::DbId;

/// Reads derived per-user aggregates from the event log.
pub struct UserMetricRepo;

impl UserMetricRepo {
    /// Current value of a named metric for one user.
    ///
    /// Count metrics count qualifying events; volume metrics sum the
    /// numeric `amount` field of the event payload.
    pub async fn metric_value(
        pool: &PgPool,
        user_id: DbId,
        metric: &str,
    ) -> Result<i64, sqlx::Error> {
        let Some(kind) = metric_source_kind(metric) else {
            tracing::warn!(metric, "Unknown metric requested, returning 0");
            return Ok(0);
        };

        match metric {
            "tip_volume_sent" | "wallet_loss_total" => {
                Self::sum_amount(pool, user_id, kind).await
            }
            _ => Self::count_events(pool, user_id, kind).await,
        }
    }

    async fn count_events(
        pool: &PgPool,
        user_id: DbId,
        kind: EventKind,
    ) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT COUNT(*) FROM achievement_events \
             WHERE user_id = $1 AND event_type = $2",
        )
        .bind(user_id)
        .bind(kind.as_str())
        .fetch_one(pool)
        .await
    }

    async fn sum_amount(
        pool: &PgPool,
        user_id: DbId,
        kind: EventKind,
    ) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT COALESCE(SUM((payload->>'amount')::numeric), 0)::bigint \
             FROM achievement_events \
             WHERE user_id = $1 AND event_type = $2 \
               AND payload ? 'amount'",
        )
        .bind(user_id)
        .bind(kind.as_str())
        .fetch_one(pool)
        .await
    }
}
