//! The achievement rules engine.
//!
//! Wiring, in data-flow order:
//!
//! - [`emitter`] — fire-and-forget append of domain events to the durable log.
//! - [`scheduler`] — periodic batch drain of pending events.
//! - [`resolver`] — matches an event kind against the active catalog.
//! - [`evaluator`] — the five progress-evaluation algorithms.
//! - [`custom`] — the registry of heuristic predicates over windowed history.
//! - [`completion`] — idempotent completion upsert and reward dispatch.
//! - [`rewards`] — the outbound reward-credit boundary.

pub mod completion;
pub mod custom;
pub mod emitter;
pub mod error;
pub mod evaluator;
pub mod resolver;
pub mod rewards;
pub mod scheduler;

pub use completion::CompletionCoordinator;
pub use emitter::EventEmitter;
pub use error::EngineError;
pub use evaluator::ProgressEvaluator;
pub use resolver::TriggerResolver;
pub use rewards::{HttpRewardSink, NoopRewardSink, RewardSink};
pub use scheduler::{AchievementScheduler, SchedulerConfig};
