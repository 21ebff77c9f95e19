//! Engine-internal error type.

/// Errors raised while evaluating a single event.
///
/// These never escape the engine: the scheduler catches them per event and
/// marks the row failed; the emitter logs and swallows its own writes.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Unevaluable event: {0}")]
    Unevaluable(String),
}
