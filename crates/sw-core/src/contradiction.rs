//! Contradiction rule and result types (spec.md §3, §4.6). Evaluation lives
//! on the `ContradictionValidatorWave` in `sw-waves`; this module holds the
//! declarative rule shape and the severity/resolution vocabulary.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::value::SignalValue;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Info,
    Warning,
    Error,
    Critical,
}

impl Severity {
    /// One level down from `self`, saturating at `Info`.
    pub fn downgrade(self) -> Severity {
        match self {
            Severity::Critical => Severity::Error,
            Severity::Error => Severity::Warning,
            Severity::Warning => Severity::Info,
            Severity::Info => Severity::Info,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationStatus {
    Clean,
    Info,
    Warning,
    Error,
    Critical,
}

impl From<Severity> for ValidationStatus {
    fn from(s: Severity) -> Self {
        match s {
            Severity::Info => ValidationStatus::Info,
            Severity::Warning => ValidationStatus::Warning,
            Severity::Error => ValidationStatus::Error,
            Severity::Critical => ValidationStatus::Critical,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleKind {
    ValueConflict,
    NumericDivergence,
    BooleanOpposite,
    MutuallyExclusive,
    MissingImplied,
    Custom,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionPolicy {
    PreferHigherConfidence,
    PreferMostRecent,
    MarkConflicting,
    RemoveBoth,
    EscalateToLlm,
    ManualReview,
}

/// `{rule_id, signal_key_a, signal_key_b, kind, threshold?, severity,
/// resolution, expected_values_a?, contradictory_values_b?, enabled,
/// min_confidence_threshold}` (spec.md §3).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContradictionRule {
    pub rule_id: String,
    pub signal_key_a: String,
    pub signal_key_b: String,
    pub kind: RuleKind,
    pub threshold: Option<f64>,
    pub severity: Severity,
    pub resolution: ResolutionPolicy,
    pub expected_values_a: Option<Vec<SignalValue>>,
    pub contradictory_values_b: Option<Vec<SignalValue>>,
    pub enabled: bool,
    pub min_confidence_threshold: f64,
}

impl ContradictionRule {
    pub fn new(rule_id: impl Into<String>, signal_key_a: impl Into<String>, signal_key_b: impl Into<String>, kind: RuleKind, severity: Severity, resolution: ResolutionPolicy) -> Self {
        ContradictionRule {
            rule_id: rule_id.into(),
            signal_key_a: signal_key_a.into(),
            signal_key_b: signal_key_b.into(),
            kind,
            threshold: None,
            severity,
            resolution,
            expected_values_a: None,
            contradictory_values_b: None,
            enabled: true,
            min_confidence_threshold: 0.0,
        }
    }

    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = Some(threshold);
        self
    }

    pub fn with_expected_values_a(mut self, values: Vec<SignalValue>) -> Self {
        self.expected_values_a = Some(values);
        self
    }

    pub fn with_contradictory_values_b(mut self, values: Vec<SignalValue>) -> Self {
        self.contradictory_values_b = Some(values);
        self
    }

    pub fn with_min_confidence(mut self, threshold: f64) -> Self {
        self.min_confidence_threshold = threshold;
        self
    }
}

/// `{rule, signal_a, signal_b?, explanation, effective_severity,
/// recommended_resolution, detected_at}` (spec.md §3).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContradictionResult {
    pub rule_id: String,
    pub signal_a_key: String,
    pub signal_b_key: Option<String>,
    pub explanation: String,
    pub effective_severity: Severity,
    pub recommended_resolution: ResolutionPolicy,
    pub detected_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn severity_downgrade_saturates_at_info() {
        assert_eq!(Severity::Critical.downgrade(), Severity::Error);
        assert_eq!(Severity::Info.downgrade(), Severity::Info);
    }

    #[test]
    fn severity_ord_matches_table_order() {
        assert!(Severity::Info < Severity::Warning);
        assert!(Severity::Warning < Severity::Error);
        assert!(Severity::Error < Severity::Critical);
    }
}
