//! [`Signal`] — the atomic, immutable observation emitted by waves
//! (spec.md §3, §4.1).

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreReason};
use crate::value::SignalValue;

/// Resolution rule applied when the same `(key, source)` is emitted more
/// than once across reruns of a wave (spec.md §3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AggregationStrategy {
    /// Highest confidence wins; ties broken by most recent timestamp.
    #[default]
    HighestConfidence,
    MostRecent,
    WeightedAverage,
    MajorityVote,
    /// Collect every emission into a `SignalValue::List`.
    Collect,
}

/// Atomic observation produced by a wave. See spec.md §3.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Signal {
    pub key: String,
    pub value: SignalValue,
    pub confidence: f64,
    pub source: String,
    pub tags: Vec<String>,
    pub timestamp: DateTime<Utc>,
    pub metadata: BTreeMap<String, String>,
}

impl PartialEq for Signal {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
            && self.source == other.source
            && self.timestamp == other.timestamp
    }
}

impl Signal {
    /// Construct a signal, validating the invariants from spec.md §4.1:
    /// non-empty key and `confidence ∈ [0, 1]`.
    pub fn new(
        key: impl Into<String>,
        value: impl Into<SignalValue>,
        confidence: f64,
        source: impl Into<String>,
    ) -> Result<Self, CoreError> {
        let key = key.into();
        if key.is_empty() {
            return Err(CoreError::from(CoreReason::InvalidSignal).with_detail("empty signal key"));
        }
        if !(0.0..=1.0).contains(&confidence) {
            return Err(CoreError::from(CoreReason::InvalidSignal)
                .with_detail(format!("confidence {confidence} out of [0,1] for key {key}")));
        }
        Ok(Signal {
            key,
            value: value.into(),
            confidence,
            source: source.into(),
            tags: Vec::new(),
            timestamp: Utc::now(),
            metadata: BTreeMap::new(),
        })
    }

    pub fn with_tags(mut self, tags: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// Resolve a newly emitted signal against an existing one for the same
    /// `(key, source)`, per the aggregation strategy. `existing` may be for
    /// a different source if the key's prior owner differs — callers only
    /// invoke this once both signals share the same key.
    pub fn aggregate(
        existing: &Signal,
        incoming: &Signal,
        strategy: AggregationStrategy,
    ) -> Result<Signal, CoreError> {
        if existing.key != incoming.key {
            return Err(CoreError::from(CoreReason::Aggregation)
                .with_detail("aggregation requires matching keys"));
        }
        let resolved = match strategy {
            AggregationStrategy::HighestConfidence => {
                if incoming.confidence > existing.confidence {
                    incoming.clone()
                } else if incoming.confidence < existing.confidence {
                    existing.clone()
                } else if incoming.timestamp >= existing.timestamp {
                    incoming.clone()
                } else {
                    existing.clone()
                }
            }
            AggregationStrategy::MostRecent => {
                if incoming.timestamp >= existing.timestamp {
                    incoming.clone()
                } else {
                    existing.clone()
                }
            }
            AggregationStrategy::WeightedAverage => {
                let (a, b) = (existing.value.as_f64(), incoming.value.as_f64());
                match (a, b) {
                    (Some(a), Some(b)) => {
                        let total_conf = existing.confidence + incoming.confidence;
                        let merged = if total_conf > 0.0 {
                            (a * existing.confidence + b * incoming.confidence) / total_conf
                        } else {
                            (a + b) / 2.0
                        };
                        let mut s = incoming.clone();
                        s.value = SignalValue::Float(merged);
                        s.confidence = (existing.confidence.max(incoming.confidence)).min(1.0);
                        s
                    }
                    _ => incoming.clone(),
                }
            }
            AggregationStrategy::MajorityVote => {
                // Without full emission history a majority vote degrades to
                // "most recent of the two" — a real vote count is kept by
                // the caller across the full emission set when it matters.
                if incoming.confidence >= existing.confidence {
                    incoming.clone()
                } else {
                    existing.clone()
                }
            }
            AggregationStrategy::Collect => {
                let mut items = match &existing.value {
                    SignalValue::List(items) => items.clone(),
                    other => vec![other.clone()],
                };
                items.push(incoming.value.clone());
                let mut s = incoming.clone();
                s.value = SignalValue::List(items);
                s.confidence = existing.confidence.max(incoming.confidence);
                s
            }
        };
        Ok(resolved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_empty_key() {
        assert!(Signal::new("", 1i64, 0.5, "test").is_err());
    }

    #[test]
    fn rejects_out_of_range_confidence() {
        assert!(Signal::new("a.b", 1i64, 1.5, "test").is_err());
        assert!(Signal::new("a.b", 1i64, -0.1, "test").is_err());
    }

    #[test]
    fn highest_confidence_wins() {
        let a = Signal::new("a.b", 1i64, 0.4, "w1").unwrap();
        let b = Signal::new("a.b", 2i64, 0.9, "w1").unwrap();
        let r = Signal::aggregate(&a, &b, AggregationStrategy::HighestConfidence).unwrap();
        assert_eq!(r.value, SignalValue::Int(2));
    }

    #[test]
    fn tie_breaks_by_most_recent() {
        let t0 = Utc::now();
        let t1 = t0 + chrono::Duration::seconds(1);
        let a = Signal::new("a.b", 1i64, 0.5, "w1").unwrap().with_timestamp(t0);
        let b = Signal::new("a.b", 2i64, 0.5, "w1").unwrap().with_timestamp(t1);
        let r = Signal::aggregate(&a, &b, AggregationStrategy::HighestConfidence).unwrap();
        assert_eq!(r.value, SignalValue::Int(2));
    }

    #[test]
    fn collect_accumulates_values() {
        let a = Signal::new("a.b", "x", 0.5, "w1").unwrap();
        let b = Signal::new("a.b", "y", 0.5, "w1").unwrap();
        let r = Signal::aggregate(&a, &b, AggregationStrategy::Collect).unwrap();
        assert_eq!(
            r.value,
            SignalValue::List(vec![SignalValue::Str("x".into()), SignalValue::Str("y".into())])
        );
    }

    #[test]
    fn serialize_round_trip_preserves_value_type() {
        let s = Signal::new("a.b", 3.5f64, 0.8, "w1").unwrap();
        let json = serde_json::to_string(&s).unwrap();
        let back: Signal = serde_json::from_str(&json).unwrap();
        assert_eq!(s.key, back.key);
        assert_eq!(s.value, back.value);
        assert_eq!(s.source, back.source);
    }
}
