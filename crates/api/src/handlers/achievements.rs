//! Handlers for achievement catalog administration.
//!
//! Trigger configs are validated here, at the admin boundary, via
//! [`TriggerConfig::parse`]; definitions that reach the evaluation pipeline
//! are always well-formed.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};
use validator::Validate;

use hodlboard_core::error::CoreError;
use hodlboard_core::trigger::{TriggerConfig, TriggerType};
use hodlboard_core::types::DbId;
use hodlboard_db::models::achievement::{
    Achievement, AchievementStats, BulkUpdateAchievements, CreateAchievement, UpdateAchievement,
};
use hodlboard_db::repositories::{AchievementFilter, AchievementRepo, UserAchievementRepo};

use crate::error::{AppError, AppResult};
use crate::query::PaginationParams;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Query / payload types
// ---------------------------------------------------------------------------

/// Query parameters for `GET /api/v1/admin/achievements`.
#[derive(Debug, Deserialize)]
pub struct ListParams {
    pub category: Option<String>,
    pub tier: Option<i16>,
    pub trigger_type: Option<String>,
    pub is_active: Option<bool>,
    pub is_secret: Option<bool>,
    /// Case-insensitive substring match over key, name, and description.
    pub search: Option<String>,
    // Flattening PaginationParams breaks number parsing under the query
    // deserializer, so the fields are inlined.
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl ListParams {
    fn page(&self) -> PaginationParams {
        PaginationParams {
            limit: self.limit,
            offset: self.offset,
        }
    }
}

/// Detail payload: the definition plus computed completion statistics.
#[derive(Debug, Serialize)]
pub struct AchievementDetail {
    #[serde(flatten)]
    pub achievement: Achievement,
    pub stats: AchievementStats,
}

/// Body for `POST /api/v1/admin/achievements/{id}/award`.
#[derive(Debug, Deserialize, Validate)]
pub struct ManualAwardRequest {
    #[validate(length(min = 1, max = 1000))]
    pub user_ids: Vec<DbId>,
    /// Audit reason recorded in `completion_data`.
    #[validate(length(min = 1, max = 512))]
    pub reason: String,
}

/// Response for the manual-award endpoint.
#[derive(Debug, Serialize)]
pub struct ManualAwardResponse {
    /// Users newly awarded by this call.
    pub awarded_user_ids: Vec<DbId>,
    /// Users skipped because they had already completed the achievement.
    pub skipped: usize,
}

// ---------------------------------------------------------------------------
// Validation helpers
// ---------------------------------------------------------------------------

/// Keys are stable references used in configs and reward audit trails:
/// lowercase snake_case only.
fn validate_key(key: &str) -> Result<(), AppError> {
    let ok = !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_');
    if ok {
        Ok(())
    } else {
        Err(AppError::Core(CoreError::Validation(format!(
            "Invalid achievement key '{key}': expected lowercase snake_case"
        ))))
    }
}

/// Parse and validate a (trigger_type, trigger_config) pair.
fn validate_trigger(trigger_type: &str, config: &serde_json::Value) -> Result<(), AppError> {
    let parsed_type = TriggerType::parse(trigger_type).ok_or_else(|| {
        AppError::Core(CoreError::Validation(format!(
            "Unknown trigger type: {trigger_type}"
        )))
    })?;
    TriggerConfig::parse(parsed_type, config)?;
    Ok(())
}

fn not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: "Achievement",
        id,
    })
}

// ---------------------------------------------------------------------------
// Catalog CRUD
// ---------------------------------------------------------------------------

/// GET /api/v1/admin/achievements
///
/// List definitions with optional filters and pagination.
pub async fn list_achievements(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> AppResult<impl IntoResponse> {
    let page = params.page();
    let filter = AchievementFilter {
        category: params.category,
        tier: params.tier,
        trigger_type: params.trigger_type,
        is_active: params.is_active,
        is_secret: params.is_secret,
        search: params.search,
    };
    let achievements =
        AchievementRepo::list(&state.pool, &filter, page.limit(), page.offset()).await?;

    Ok(Json(DataResponse { data: achievements }))
}

/// GET /api/v1/admin/achievements/{id}
///
/// Retrieve a single definition with computed completion statistics.
pub async fn get_achievement(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let achievement = AchievementRepo::get(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    let stats = UserAchievementRepo::stats(&state.pool, id).await?;

    Ok(Json(DataResponse {
        data: AchievementDetail { achievement, stats },
    }))
}

/// POST /api/v1/admin/achievements
///
/// Create a new definition. The trigger config is parsed and validated
/// before anything is persisted.
pub async fn create_achievement(
    State(state): State<AppState>,
    Json(input): Json<CreateAchievement>,
) -> AppResult<impl IntoResponse> {
    input.validate()?;
    validate_key(&input.key)?;
    validate_trigger(&input.trigger_type, &input.trigger_config)?;

    let achievement = AchievementRepo::insert(&state.pool, &input).await?;

    tracing::info!(
        achievement_id = achievement.id,
        key = %achievement.key,
        trigger_type = %achievement.trigger_type,
        "Achievement created",
    );

    Ok((StatusCode::CREATED, Json(DataResponse { data: achievement })))
}

/// PUT /api/v1/admin/achievements/{id}
///
/// Partially update a definition. `key` is immutable and not part of the
/// DTO. When the trigger changes, the resulting (type, config) pair is
/// re-validated against the stored row.
pub async fn update_achievement(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateAchievement>,
) -> AppResult<impl IntoResponse> {
    input.validate()?;

    if input.trigger_type.is_some() || input.trigger_config.is_some() {
        let existing = AchievementRepo::get(&state.pool, id)
            .await?
            .ok_or_else(|| not_found(id))?;
        let trigger_type = input
            .trigger_type
            .as_deref()
            .unwrap_or(&existing.trigger_type);
        let trigger_config = input
            .trigger_config
            .as_ref()
            .unwrap_or(&existing.trigger_config);
        validate_trigger(trigger_type, trigger_config)?;
    }

    let achievement = AchievementRepo::update(&state.pool, id, &input)
        .await?
        .ok_or_else(|| not_found(id))?;

    tracing::info!(achievement_id = id, key = %achievement.key, "Achievement updated");

    Ok(Json(DataResponse { data: achievement }))
}

/// POST /api/v1/admin/achievements/bulk
///
/// Apply a flag/tier/category patch to a list of definitions.
pub async fn bulk_update_achievements(
    State(state): State<AppState>,
    Json(input): Json<BulkUpdateAchievements>,
) -> AppResult<impl IntoResponse> {
    if input.ids.is_empty() {
        return Err(AppError::BadRequest("ids must not be empty".into()));
    }

    let updated = AchievementRepo::bulk_update(&state.pool, &input).await?;

    tracing::info!(requested = input.ids.len(), updated, "Bulk achievement update");

    Ok(Json(DataResponse {
        data: serde_json::json!({ "updated": updated }),
    }))
}

/// DELETE /api/v1/admin/achievements/{id}
///
/// Soft-deactivate a definition. Completion history is preserved.
pub async fn deactivate_achievement(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let deactivated = AchievementRepo::deactivate(&state.pool, id).await?;
    if !deactivated {
        return Err(not_found(id));
    }

    tracing::info!(achievement_id = id, "Achievement deactivated");

    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Completions and manual award
// ---------------------------------------------------------------------------

/// GET /api/v1/admin/achievements/{id}/completions
///
/// Paginated list of users who completed this achievement, newest first.
pub async fn list_completions(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Query(page): Query<PaginationParams>,
) -> AppResult<impl IntoResponse> {
    // 404 for unknown ids rather than an empty page.
    AchievementRepo::get(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;

    let completions =
        UserAchievementRepo::list_completions(&state.pool, id, page.limit(), page.offset())
            .await?;

    Ok(Json(DataResponse { data: completions }))
}

/// POST /api/v1/admin/achievements/{id}/award
///
/// Manually grant an achievement to a list of users. Idempotent per user:
/// users who already completed it are skipped, and rewards dispatch at most
/// once per (user, achievement).
pub async fn award_achievement(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<ManualAwardRequest>,
) -> AppResult<impl IntoResponse> {
    input.validate()?;

    let achievement = AchievementRepo::get(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;

    let awarded = state
        .coordinator
        .award_manual(&achievement, &input.user_ids, &input.reason)
        .await?;

    tracing::info!(
        achievement_id = id,
        awarded = awarded.len(),
        requested = input.user_ids.len(),
        reason = %input.reason,
        "Manual achievement award",
    );

    let skipped = input.user_ids.len() - awarded.len();
    Ok(Json(DataResponse {
        data: ManualAwardResponse {
            awarded_user_ids: awarded,
            skipped,
        },
    }))
}
