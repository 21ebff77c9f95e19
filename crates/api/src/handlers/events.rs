//! Internal event ingestion for producer services not sharing this process.
//!
//! Emission is fire-and-forget end to end: the endpoint always returns 202
//! once the payload parses, matching the emitter's never-fails contract.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use hodlboard_core::event_kind::EventKind;
use hodlboard_core::error::CoreError;
use hodlboard_core::types::DbId;

use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// Body for `POST /api/v1/internal/events`.
#[derive(Debug, Deserialize)]
pub struct EmitEventRequest {
    pub user_id: DbId,
    /// Canonical event kind, e.g. `"reply_created"`.
    pub event_type: String,
    #[serde(default)]
    pub payload: serde_json::Value,
}

/// POST /api/v1/internal/events
///
/// Append one pending event to the durable log.
pub async fn emit_event(
    State(state): State<AppState>,
    Json(input): Json<EmitEventRequest>,
) -> AppResult<StatusCode> {
    let kind = EventKind::parse(&input.event_type).ok_or_else(|| {
        AppError::Core(CoreError::Validation(format!(
            "Unknown event type: {}",
            input.event_type
        )))
    })?;

    state.emitter.emit(kind, input.user_id, input.payload).await;

    Ok(StatusCode::ACCEPTED)
}
