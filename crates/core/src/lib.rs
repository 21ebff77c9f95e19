//! Pure domain logic for the hodlboard achievement engine.
//!
//! This crate has zero internal dependencies so it can be used by the
//! repository layer, the evaluation engine, and the admin API alike:
//!
//! - [`types`] — shared ID and timestamp aliases.
//! - [`error`] — the domain error taxonomy.
//! - [`event_kind`] — the closed set of achievement event kinds and the
//!   event processing-status state machine.
//! - [`trigger`] — typed trigger configurations and condition evaluation.
//! - [`progress`] — progress arithmetic shared by all evaluators.
//! - [`evaluator_id`] — the closed registry of custom evaluator ids.

pub mod error;
pub mod evaluator_id;
pub mod event_kind;
pub mod progress;
pub mod trigger;
pub mod types;

pub use error::CoreError;
pub use evaluator_id::EvaluatorId;
pub use event_kind::{EventKind, ProcessingStatus};
pub use progress::ProgressEvaluation;
pub use trigger::{TriggerConfig, TriggerType};
