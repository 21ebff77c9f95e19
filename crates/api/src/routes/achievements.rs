//! Route definitions for achievement catalog administration.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::achievements;
use crate::state::AppState;

/// Admin catalog routes mounted at `/admin/achievements`.
///
/// ```text
/// GET    /                   -> list_achievements
/// POST   /                   -> create_achievement
/// POST   /bulk               -> bulk_update_achievements
/// GET    /{id}               -> get_achievement
/// PUT    /{id}               -> update_achievement
/// DELETE /{id}               -> deactivate_achievement
/// GET    /{id}/completions   -> list_completions
/// POST   /{id}/award         -> award_achievement
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(achievements::list_achievements).post(achievements::create_achievement),
        )
        .route("/bulk", post(achievements::bulk_update_achievements))
        .route(
            "/{id}",
            get(achievements::get_achievement)
                .put(achievements::update_achievement)
                .delete(achievements::deactivate_achievement),
        )
        .route("/{id}/completions", get(achievements::list_completions))
        .route("/{id}/award", post(achievements::award_achievement))
}
