use std::sync::Arc;

use hodlboard_achievements::{CompletionCoordinator, EventEmitter};

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: hodlboard_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Typed event emitter for producer domains hosted in this process.
    pub emitter: EventEmitter,
    /// Completion coordinator, used by the manual-award endpoint.
    pub coordinator: CompletionCoordinator,
}
