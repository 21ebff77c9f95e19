//! Typed trigger configurations for achievement definitions.
//!
//! Every achievement carries a `trigger_type` plus a JSON `trigger_config`.
//! [`TriggerConfig::parse`] turns that pair into a closed sum type, rejecting
//! malformed shapes, unknown actions, unknown event kinds, and unknown
//! evaluator ids at definition time. Evaluation never re-validates.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::CoreError;
use crate::evaluator_id::EvaluatorId;
use crate::event_kind::EventKind;
use crate::types::Timestamp;

// ---------------------------------------------------------------------------
// TriggerType
// ---------------------------------------------------------------------------

/// The five trigger kinds an achievement definition can use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerType {
    Count,
    Threshold,
    Event,
    Composite,
    Custom,
}

impl TriggerType {
    /// String representation for database storage.
    pub fn as_str(&self) -> &'static str {
        match self {
            TriggerType::Count => "count",
            TriggerType::Threshold => "threshold",
            TriggerType::Event => "event",
            TriggerType::Composite => "composite",
            TriggerType::Custom => "custom",
        }
    }

    /// Parse from the stored string form. Returns `None` for unknown values.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "count" => Some(TriggerType::Count),
            "threshold" => Some(TriggerType::Threshold),
            "event" => Some(TriggerType::Event),
            "composite" => Some(TriggerType::Composite),
            "custom" => Some(TriggerType::Custom),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Metric names (threshold triggers)
// ---------------------------------------------------------------------------

/// Derived user metrics a threshold trigger may reference.
///
/// Each metric is computed from the event log by the repository layer; the
/// second element is the event kind the metric aggregates over.
pub const METRIC_SOURCES: [(&str, EventKind); 10] = [
    ("total_posts", EventKind::PostCreated),
    ("total_replies", EventKind::ReplyCreated),
    ("total_threads", EventKind::ThreadCreated),
    ("total_logins", EventKind::Login),
    ("total_likes_given", EventKind::LikeGiven),
    ("total_likes_received", EventKind::LikeReceived),
    ("total_tips_sent", EventKind::TipSent),
    ("total_tips_received", EventKind::TipReceived),
    ("tip_volume_sent", EventKind::TipSent),
    ("wallet_loss_total", EventKind::WalletLoss),
];

/// The event kind that feeds a metric, or `None` for unknown metric names.
pub fn metric_source_kind(metric: &str) -> Option<EventKind> {
    METRIC_SOURCES
        .iter()
        .find(|(name, _)| *name == metric)
        .map(|(_, kind)| *kind)
}

// ---------------------------------------------------------------------------
// Condition operators (event triggers)
// ---------------------------------------------------------------------------

/// Comparison operator for a single payload-field condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConditionOp {
    Equals,
    GreaterThan,
    LessThan,
    Contains,
    WithinSeconds,
}

/// A single field-level condition against the triggering event's payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventCondition {
    pub field: String,
    pub operator: ConditionOp,
    pub value: Value,
}

impl EventCondition {
    /// Evaluate this condition against an event payload.
    ///
    /// `event_time` anchors the `within_seconds` operator: the payload field
    /// (RFC 3339 string or epoch seconds) must lie within the configured
    /// number of seconds of the event's own timestamp.
    pub fn matches(&self, payload: &Value, event_time: Timestamp) -> bool {
        let Some(field_value) = payload.get(&self.field) else {
            return false;
        };

        match self.operator {
            ConditionOp::Equals => {
                if let (Some(a), Some(b)) = (field_value.as_f64(), self.value.as_f64()) {
                    return a == b;
                }
                field_value == &self.value
            }
            ConditionOp::GreaterThan => match (field_value.as_f64(), self.value.as_f64()) {
                (Some(a), Some(b)) => a > b,
                _ => false,
            },
            ConditionOp::LessThan => match (field_value.as_f64(), self.value.as_f64()) {
                (Some(a), Some(b)) => a < b,
                _ => false,
            },
            ConditionOp::Contains => match (field_value.as_str(), self.value.as_str()) {
                (Some(haystack), Some(needle)) => {
                    haystack.to_lowercase().contains(&needle.to_lowercase())
                }
                _ => match field_value.as_array() {
                    Some(items) => items.contains(&self.value),
                    None => false,
                },
            },
            ConditionOp::WithinSeconds => {
                let Some(max_secs) = self.value.as_f64() else {
                    return false;
                };
                let Some(t) = parse_timestamp(field_value) else {
                    return false;
                };
                (event_time - t).num_seconds().unsigned_abs() as f64 <= max_secs
            }
        }
    }
}

/// Parse a payload value as a timestamp: RFC 3339 string or epoch seconds.
fn parse_timestamp(value: &Value) -> Option<Timestamp> {
    if let Some(s) = value.as_str() {
        return chrono::DateTime::parse_from_rfc3339(s)
            .ok()
            .map(|t| t.with_timezone(&chrono::Utc));
    }
    value
        .as_i64()
        .and_then(|secs| chrono::DateTime::from_timestamp(secs, 0))
}

/// True when every condition in the list holds (vacuously true when empty).
pub fn all_conditions_match(
    conditions: &[EventCondition],
    payload: &Value,
    event_time: Timestamp,
) -> bool {
    conditions.iter().all(|c| c.matches(payload, event_time))
}

// ---------------------------------------------------------------------------
// Per-kind config payloads
// ---------------------------------------------------------------------------

/// Config for a `count` trigger (and for composite sub-requirements).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CountConfig {
    /// Canonical action name, e.g. `"REPLY_CREATED"`.
    pub action: String,
    /// Number of qualifying events required.
    pub target: i64,
}

/// Config for a `threshold` trigger.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThresholdConfig {
    /// Derived metric name, e.g. `"total_posts"`.
    pub metric: String,
    /// Metric value required.
    pub target: i64,
}

/// Config for an `event` trigger (single-shot payload match).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventTriggerConfig {
    /// Exact event kind, e.g. `"post_created"`.
    pub event_type: String,
    /// Field conditions; all must hold. Empty means any event of the kind.
    #[serde(default)]
    pub conditions: Vec<EventCondition>,
}

/// How composite sub-requirements combine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompositeOperator {
    And,
    Or,
}

/// Config for a `composite` trigger.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompositeConfig {
    pub operator: CompositeOperator,
    pub requirements: Vec<CountConfig>,
}

/// Config for a `custom` trigger.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomConfig {
    /// Registered evaluator id, e.g. `"cumulative_loss_in_window"`.
    pub evaluator: String,
    /// Explicit listen-set override; defaults to the evaluator's own.
    #[serde(default)]
    pub event_types: Vec<String>,
    /// Free-form evaluator parameters.
    #[serde(default)]
    pub params: serde_json::Map<String, Value>,
}

// ---------------------------------------------------------------------------
// TriggerConfig
// ---------------------------------------------------------------------------

/// A validated, typed trigger configuration.
#[derive(Debug, Clone)]
pub enum TriggerConfig {
    Count(CountConfig),
    Threshold(ThresholdConfig),
    Event(EventTriggerConfig),
    Composite(CompositeConfig),
    Custom(CustomConfig),
}

impl TriggerConfig {
    /// Parse and validate a raw JSON config against its trigger type.
    ///
    /// This is the single validation point: definitions that pass here are
    /// safe to evaluate without further shape checks.
    pub fn parse(trigger_type: TriggerType, config: &Value) -> Result<Self, CoreError> {
        let parsed = match trigger_type {
            TriggerType::Count => TriggerConfig::Count(deserialize(config)?),
            TriggerType::Threshold => TriggerConfig::Threshold(deserialize(config)?),
            TriggerType::Event => TriggerConfig::Event(deserialize(config)?),
            TriggerType::Composite => TriggerConfig::Composite(deserialize(config)?),
            TriggerType::Custom => TriggerConfig::Custom(deserialize(config)?),
        };
        parsed.validate()?;
        Ok(parsed)
    }

    /// The trigger type this config belongs to.
    pub fn trigger_type(&self) -> TriggerType {
        match self {
            TriggerConfig::Count(_) => TriggerType::Count,
            TriggerConfig::Threshold(_) => TriggerType::Threshold,
            TriggerConfig::Event(_) => TriggerType::Event,
            TriggerConfig::Composite(_) => TriggerType::Composite,
            TriggerConfig::Custom(_) => TriggerType::Custom,
        }
    }

    fn validate(&self) -> Result<(), CoreError> {
        match self {
            TriggerConfig::Count(c) => validate_count(c),
            TriggerConfig::Threshold(c) => {
                if metric_source_kind(&c.metric).is_none() {
                    return Err(CoreError::Validation(format!(
                        "Unknown metric: {}",
                        c.metric
                    )));
                }
                validate_target(c.target)
            }
            TriggerConfig::Event(c) => {
                if EventKind::parse(&c.event_type).is_none() {
                    return Err(CoreError::Validation(format!(
                        "Unknown event type: {}",
                        c.event_type
                    )));
                }
                Ok(())
            }
            TriggerConfig::Composite(c) => {
                if c.requirements.is_empty() {
                    return Err(CoreError::Validation(
                        "Composite trigger requires at least one requirement".into(),
                    ));
                }
                for req in &c.requirements {
                    validate_count(req)?;
                }
                Ok(())
            }
            TriggerConfig::Custom(c) => {
                let Some(id) = EvaluatorId::parse(&c.evaluator) else {
                    return Err(CoreError::Validation(format!(
                        "Unknown evaluator: {}",
                        c.evaluator
                    )));
                };
                for et in &c.event_types {
                    if EventKind::parse(et).is_none() {
                        return Err(CoreError::Validation(format!(
                            "Unknown event type in listen set: {et}"
                        )));
                    }
                }
                id.validate_config(&c.params)
            }
        }
    }
}

fn deserialize<T: serde::de::DeserializeOwned>(config: &Value) -> Result<T, CoreError> {
    serde_json::from_value(config.clone())
        .map_err(|e| CoreError::Validation(format!("Malformed trigger config: {e}")))
}

fn validate_count(c: &CountConfig) -> Result<(), CoreError> {
    if EventKind::from_action(&c.action).is_none() {
        return Err(CoreError::Validation(format!(
            "Unknown action: {}",
            c.action
        )));
    }
    validate_target(c.target)
}

fn validate_target(target: i64) -> Result<(), CoreError> {
    if target < 1 {
        return Err(CoreError::Validation(format!(
            "Target must be at least 1, got {target}"
        )));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use serde_json::json;

    // -- TriggerType --

    #[test]
    fn trigger_type_round_trip() {
        for t in [
            TriggerType::Count,
            TriggerType::Threshold,
            TriggerType::Event,
            TriggerType::Composite,
            TriggerType::Custom,
        ] {
            assert_eq!(TriggerType::parse(t.as_str()), Some(t));
        }
        assert_eq!(TriggerType::parse("magic"), None);
    }

    // -- Count config --

    #[test]
    fn parse_valid_count_config() {
        let config = json!({"action": "REPLY_CREATED", "target": 5});
        let parsed = TriggerConfig::parse(TriggerType::Count, &config).unwrap();
        match parsed {
            TriggerConfig::Count(c) => {
                assert_eq!(c.action, "REPLY_CREATED");
                assert_eq!(c.target, 5);
            }
            other => panic!("expected count config, got {other:?}"),
        }
    }

    #[test]
    fn count_config_rejects_unknown_action() {
        let config = json!({"action": "REPLY_DELETED", "target": 5});
        assert!(TriggerConfig::parse(TriggerType::Count, &config).is_err());
    }

    #[test]
    fn count_config_rejects_zero_target() {
        let config = json!({"action": "REPLY_CREATED", "target": 0});
        assert!(TriggerConfig::parse(TriggerType::Count, &config).is_err());
    }

    #[test]
    fn count_config_rejects_missing_fields() {
        assert!(TriggerConfig::parse(TriggerType::Count, &json!({"target": 5})).is_err());
        assert!(
            TriggerConfig::parse(TriggerType::Count, &json!({"action": "LOGIN"})).is_err()
        );
    }

    // -- Threshold config --

    #[test]
    fn parse_valid_threshold_config() {
        let config = json!({"metric": "total_posts", "target": 100});
        assert!(TriggerConfig::parse(TriggerType::Threshold, &config).is_ok());
    }

    #[test]
    fn threshold_config_rejects_unknown_metric() {
        let config = json!({"metric": "total_rugs", "target": 100});
        assert!(TriggerConfig::parse(TriggerType::Threshold, &config).is_err());
    }

    // -- Event config --

    #[test]
    fn parse_valid_event_config() {
        let config = json!({
            "event_type": "post_created",
            "conditions": [
                {"field": "content", "operator": "contains", "value": "moon"}
            ]
        });
        assert!(TriggerConfig::parse(TriggerType::Event, &config).is_ok());
    }

    #[test]
    fn event_config_allows_empty_conditions() {
        let config = json!({"event_type": "thread_locked"});
        assert!(TriggerConfig::parse(TriggerType::Event, &config).is_ok());
    }

    #[test]
    fn event_config_rejects_unknown_event_type() {
        let config = json!({"event_type": "post_deleted"});
        assert!(TriggerConfig::parse(TriggerType::Event, &config).is_err());
    }

    #[test]
    fn event_config_rejects_unknown_operator() {
        let config = json!({
            "event_type": "post_created",
            "conditions": [{"field": "content", "operator": "regex", "value": ".*"}]
        });
        assert!(TriggerConfig::parse(TriggerType::Event, &config).is_err());
    }

    // -- Composite config --

    #[test]
    fn parse_valid_composite_config() {
        let config = json!({
            "operator": "and",
            "requirements": [
                {"action": "POST_CREATED", "target": 10},
                {"action": "TIP_SENT", "target": 3}
            ]
        });
        assert!(TriggerConfig::parse(TriggerType::Composite, &config).is_ok());
    }

    #[test]
    fn composite_config_rejects_empty_requirements() {
        let config = json!({"operator": "or", "requirements": []});
        assert!(TriggerConfig::parse(TriggerType::Composite, &config).is_err());
    }

    #[test]
    fn composite_config_rejects_bad_subrequirement() {
        let config = json!({
            "operator": "and",
            "requirements": [{"action": "NOT_AN_ACTION", "target": 1}]
        });
        assert!(TriggerConfig::parse(TriggerType::Composite, &config).is_err());
    }

    // -- Custom config --

    #[test]
    fn parse_valid_custom_config() {
        let config = json!({
            "evaluator": "cumulative_loss_in_window",
            "params": {"min_total": 1000, "window_hours": 24}
        });
        assert!(TriggerConfig::parse(TriggerType::Custom, &config).is_ok());
    }

    #[test]
    fn custom_config_rejects_unknown_evaluator() {
        let config = json!({"evaluator": "moon_phase", "params": {}});
        assert!(TriggerConfig::parse(TriggerType::Custom, &config).is_err());
    }

    #[test]
    fn custom_config_rejects_missing_required_params() {
        let config = json!({"evaluator": "cumulative_loss_in_window", "params": {}});
        assert!(TriggerConfig::parse(TriggerType::Custom, &config).is_err());
    }

    #[test]
    fn custom_config_rejects_unknown_listen_event_type() {
        let config = json!({
            "evaluator": "rapid_poster",
            "event_types": ["post_deleted"],
            "params": {"min_count": 5, "window_hours": 1}
        });
        assert!(TriggerConfig::parse(TriggerType::Custom, &config).is_err());
    }

    // -- Wrong shape for type --

    #[test]
    fn count_shape_rejected_for_event_type() {
        let config = json!({"action": "LOGIN", "target": 5});
        assert!(TriggerConfig::parse(TriggerType::Event, &config).is_err());
    }

    // -- Conditions --

    #[test]
    fn equals_condition_on_string() {
        let c = EventCondition {
            field: "symbol".into(),
            operator: ConditionOp::Equals,
            value: json!("DOGE"),
        };
        assert!(c.matches(&json!({"symbol": "DOGE"}), Utc::now()));
        assert!(!c.matches(&json!({"symbol": "BTC"}), Utc::now()));
    }

    #[test]
    fn equals_condition_on_number_ignores_json_number_form() {
        let c = EventCondition {
            field: "amount".into(),
            operator: ConditionOp::Equals,
            value: json!(5),
        };
        assert!(c.matches(&json!({"amount": 5.0}), Utc::now()));
    }

    #[test]
    fn greater_and_less_than_conditions() {
        let gt = EventCondition {
            field: "amount".into(),
            operator: ConditionOp::GreaterThan,
            value: json!(100),
        };
        let lt = EventCondition {
            field: "amount".into(),
            operator: ConditionOp::LessThan,
            value: json!(100),
        };
        assert!(gt.matches(&json!({"amount": 150}), Utc::now()));
        assert!(!gt.matches(&json!({"amount": 100}), Utc::now()));
        assert!(lt.matches(&json!({"amount": 50}), Utc::now()));
        assert!(!lt.matches(&json!({"amount": "many"}), Utc::now()));
    }

    #[test]
    fn contains_condition_is_case_insensitive() {
        let c = EventCondition {
            field: "content".into(),
            operator: ConditionOp::Contains,
            value: json!("moon"),
        };
        assert!(c.matches(&json!({"content": "TO THE MOON!"}), Utc::now()));
        assert!(!c.matches(&json!({"content": "bearish"}), Utc::now()));
    }

    #[test]
    fn contains_condition_on_array() {
        let c = EventCondition {
            field: "tags".into(),
            operator: ConditionOp::Contains,
            value: json!("defi"),
        };
        assert!(c.matches(&json!({"tags": ["nft", "defi"]}), Utc::now()));
        assert!(!c.matches(&json!({"tags": ["nft"]}), Utc::now()));
    }

    #[test]
    fn within_seconds_condition() {
        let now = Utc::now();
        let c = EventCondition {
            field: "posted_at".into(),
            operator: ConditionOp::WithinSeconds,
            value: json!(60),
        };
        let close = (now - chrono::Duration::seconds(30)).to_rfc3339();
        let far = (now - chrono::Duration::seconds(3600)).to_rfc3339();
        assert!(c.matches(&json!({"posted_at": close}), now));
        assert!(!c.matches(&json!({"posted_at": far}), now));
    }

    #[test]
    fn within_seconds_accepts_epoch_seconds() {
        let now = Utc::now();
        let c = EventCondition {
            field: "posted_at".into(),
            operator: ConditionOp::WithinSeconds,
            value: json!(60),
        };
        assert!(c.matches(&json!({"posted_at": now.timestamp() - 10}), now));
    }

    #[test]
    fn missing_field_never_matches() {
        let c = EventCondition {
            field: "content".into(),
            operator: ConditionOp::Contains,
            value: json!("moon"),
        };
        assert!(!c.matches(&json!({}), Utc::now()));
    }

    #[test]
    fn all_conditions_vacuously_true_when_empty() {
        assert!(all_conditions_match(&[], &json!({}), Utc::now()));
    }
}
