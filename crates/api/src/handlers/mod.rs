//! HTTP handlers, grouped by resource.

pub mod achievements;
pub mod events;
