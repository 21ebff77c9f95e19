pub mod achievements;
pub mod health;

use axum::routing::post;
use axum::Router;

use crate::handlers;
use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /internal/events                        event ingestion (POST)
///
/// /admin/achievements                     list, create
/// /admin/achievements/bulk                bulk flag/tier/category update (POST)
/// /admin/achievements/{id}                get (with stats), update, deactivate
/// /admin/achievements/{id}/completions    paginated completion listing
/// /admin/achievements/{id}/award          manual award (POST)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/internal/events", post(handlers::events::emit_event))
        .nest("/admin/achievements", achievements::router())
}
