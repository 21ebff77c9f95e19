//! Custom evaluator registry and its predicate families.
//!
//! Every predicate is a pure function of (fetched event slice, config, now):
//! no hidden state, replayable, and unit-testable over synthetic slices. The
//! registry performs the single windowed fetch and dispatches.

pub mod accuracy;
pub mod holding;
pub mod keywords;
pub mod registry;
pub mod sequence;
pub mod temporal;
pub mod window;

pub use registry::CustomEvaluatorRegistry;

use serde_json::{Map, Value};

/// Read an integer parameter, falling back to `default` when absent or
/// non-numeric. Required parameters are enforced at definition time, so the
/// defaults here only cover optional knobs.
pub(crate) fn param_i64(params: &Map<String, Value>, key: &str, default: i64) -> i64 {
    params.get(key).and_then(Value::as_i64).unwrap_or(default)
}

/// Read a float parameter with a default.
pub(crate) fn param_f64(params: &Map<String, Value>, key: &str, default: f64) -> f64 {
    params.get(key).and_then(Value::as_f64).unwrap_or(default)
}

/// Read a string-list parameter; missing or malformed yields empty.
pub(crate) fn param_str_list(params: &Map<String, Value>, key: &str) -> Vec<String> {
    params
        .get(key)
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

/// The numeric `amount` field of an event payload, 0 when absent.
pub(crate) fn amount_of(payload: &Value) -> f64 {
    payload.get("amount").and_then(Value::as_f64).unwrap_or(0.0)
}

// ---------------------------------------------------------------------------
// Test helpers
// ---------------------------------------------------------------------------
