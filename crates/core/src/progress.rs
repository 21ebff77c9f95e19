//! Progress arithmetic shared by every trigger evaluator.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// ProgressEvaluation
// ---------------------------------------------------------------------------

/// The result of evaluating one (achievement, user, event) triple.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressEvaluation {
    pub current: i64,
    pub target: i64,
    /// Clamped to `[0, 100]`.
    pub percentage: f64,
    pub is_completed: bool,
}

impl ProgressEvaluation {
    /// Build an evaluation from a cumulative count against a target.
    ///
    /// Completion is `current >= target`; percentage is
    /// `min(current / target, 1) * 100`.
    pub fn from_count(current: i64, target: i64) -> Self {
        Self {
            current,
            target,
            percentage: clamped_percentage(current, target),
            is_completed: current >= target,
        }
    }

    /// Build a binary evaluation (event and custom triggers): 0% or 100%.
    pub fn from_bool(satisfied: bool) -> Self {
        Self::from_count(i64::from(satisfied), 1)
    }
}

/// `min(current / target, 1) * 100`, guarding against non-positive targets.
pub fn clamped_percentage(current: i64, target: i64) -> f64 {
    if target <= 0 {
        return 100.0;
    }
    let ratio = (current as f64 / target as f64).clamp(0.0, 1.0);
    ratio * 100.0
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn four_of_five_is_eighty_percent_incomplete() {
        let eval = ProgressEvaluation::from_count(4, 5);
        assert_eq!(eval.percentage, 80.0);
        assert!(!eval.is_completed);
    }

    #[test]
    fn five_of_five_completes() {
        let eval = ProgressEvaluation::from_count(5, 5);
        assert_eq!(eval.percentage, 100.0);
        assert!(eval.is_completed);
    }

    #[test]
    fn overshoot_is_clamped_to_hundred() {
        let eval = ProgressEvaluation::from_count(12, 5);
        assert_eq!(eval.percentage, 100.0);
        assert!(eval.is_completed);
    }

    #[test]
    fn zero_progress_is_zero_percent() {
        let eval = ProgressEvaluation::from_count(0, 5);
        assert_eq!(eval.percentage, 0.0);
        assert!(!eval.is_completed);
    }

    #[test]
    fn boolean_true_is_full_completion() {
        let eval = ProgressEvaluation::from_bool(true);
        assert_eq!(eval.current, 1);
        assert_eq!(eval.target, 1);
        assert_eq!(eval.percentage, 100.0);
        assert!(eval.is_completed);
    }

    #[test]
    fn boolean_false_is_zero() {
        let eval = ProgressEvaluation::from_bool(false);
        assert_eq!(eval.percentage, 0.0);
        assert!(!eval.is_completed);
    }

    #[test]
    fn non_positive_target_degrades_to_hundred() {
        assert_eq!(clamped_percentage(3, 0), 100.0);
    }
}
