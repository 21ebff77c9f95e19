//! Outbound reward-credit boundary.
//!
//! The wallet, XP, and reputation services are external collaborators; the
//! engine talks to them through [`RewardSink`]. Dispatch failures are the
//! completion coordinator's to log — nothing here rolls back a completion.

use std::time::Duration;

use async_trait::async_trait;

use hodlboard_core::types::DbId;

/// HTTP request timeout for a single reward-credit call.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

// ---------------------------------------------------------------------------
// Error
// ---------------------------------------------------------------------------

/// Error type for reward dispatch failures.
#[derive(Debug, thiserror::Error)]
pub enum RewardError {
    /// The underlying HTTP request failed (network, DNS, timeout, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The remote service returned a non-2xx status code.
    #[error("Reward service returned HTTP {0}")]
    HttpStatus(u16),
}

// ---------------------------------------------------------------------------
// RewardSink
// ---------------------------------------------------------------------------

/// Context attached to a token credit so the wallet service can audit it.
#[derive(Debug, Clone, serde::Serialize)]
pub struct TokenCreditContext {
    pub source: &'static str,
    pub reason: String,
    pub achievement_id: DbId,
}

/// Destination for reward credits issued on achievement completion.
#[async_trait]
pub trait RewardSink: Send + Sync {
    async fn credit_xp(&self, user_id: DbId, amount: i64, reason: &str)
        -> Result<(), RewardError>;

    async fn credit_tokens(
        &self,
        user_id: DbId,
        amount: i64,
        context: &TokenCreditContext,
    ) -> Result<(), RewardError>;

    async fn credit_reputation(
        &self,
        user_id: DbId,
        amount: i64,
        reason: &str,
    ) -> Result<(), RewardError>;
}

// ---------------------------------------------------------------------------
// HttpRewardSink
// ---------------------------------------------------------------------------

/// Dispatches reward credits to the internal wallet/XP/reputation service
/// over HTTP.
pub struct HttpRewardSink {
    client: reqwest::Client,
    base_url: String,
}

impl HttpRewardSink {
    /// Create a sink targeting `base_url` (e.g. `http://wallet:8080`).
    pub fn new(base_url: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .expect("Failed to build reqwest HTTP client");
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    async fn post(&self, path: &str, body: &serde_json::Value) -> Result<(), RewardError> {
        let url = format!("{}{path}", self.base_url);
        let response = self.client.post(&url).json(body).send().await?;
        if !response.status().is_success() {
            return Err(RewardError::HttpStatus(response.status().as_u16()));
        }
        Ok(())
    }
}

#[async_trait]
impl RewardSink for HttpRewardSink {
    async fn credit_xp(
        &self,
        user_id: DbId,
        amount: i64,
        reason: &str,
    ) -> Result<(), RewardError> {
        self.post(
            "/internal/xp/credit",
            &serde_json::json!({"user_id": user_id, "amount": amount, "reason": reason}),
        )
        .await
    }

    async fn credit_tokens(
        &self,
        user_id: DbId,
        amount: i64,
        context: &TokenCreditContext,
    ) -> Result<(), RewardError> {
        self.post(
            "/internal/wallet/credit",
            &serde_json::json!({"user_id": user_id, "amount": amount, "context": context}),
        )
        .await
    }

    async fn credit_reputation(
        &self,
        user_id: DbId,
        amount: i64,
        reason: &str,
    ) -> Result<(), RewardError> {
        self.post(
            "/internal/reputation/credit",
            &serde_json::json!({"user_id": user_id, "amount": amount, "reason": reason}),
        )
        .await
    }
}

// ---------------------------------------------------------------------------
// NoopRewardSink
// ---------------------------------------------------------------------------

/// Sink that logs credits instead of dispatching them. Used in development
/// and in deployments where reward services are not yet wired.
pub struct NoopRewardSink;

#[async_trait]
impl RewardSink for NoopRewardSink {
    async fn credit_xp(
        &self,
        user_id: DbId,
        amount: i64,
        reason: &str,
    ) -> Result<(), RewardError> {
        tracing::info!(user_id, amount, reason, "XP credit (noop sink)");
        Ok(())
    }

    async fn credit_tokens(
        &self,
        user_id: DbId,
        amount: i64,
        context: &TokenCreditContext,
    ) -> Result<(), RewardError> {
        tracing::info!(user_id, amount, achievement_id = context.achievement_id, "Token credit (noop sink)");
        Ok(())
    }

    async fn credit_reputation(
        &self,
        user_id: DbId,
        amount: i64,
        reason: &str,
    ) -> Result<(), RewardError> {
        tracing::info!(user_id, amount, reason, "Reputation credit (noop sink)");
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
