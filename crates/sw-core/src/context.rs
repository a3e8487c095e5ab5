//! [`AnalysisContext`] — the per-image, single-writer scratchpad shared
//! across waves during one analysis (spec.md §3, §4.2).

use std::any::Any;
use std::collections::HashMap;

use tracing::warn;

use crate::signal::{AggregationStrategy, Signal};
use crate::value::SignalValue;

/// Opaque, untyped storage for inter-wave artifacts (decoded frames,
/// stabilized stacks, detection boxes). Entries own their contents and are
/// dropped with the context (spec.md §4.2).
#[derive(Default)]
struct ArtifactCache {
    entries: HashMap<String, Box<dyn Any + Send + Sync>>,
}

impl ArtifactCache {
    fn set(&mut self, key: impl Into<String>, value: impl Any + Send + Sync) {
        self.entries.insert(key.into(), Box::new(value));
    }

    fn get<T: 'static>(&self, key: &str) -> Option<&T> {
        self.entries.get(key).and_then(|v| v.downcast_ref::<T>())
    }
}

/// Per-image mutable scratchpad. Exactly one wave writes to it at a time;
/// never shared across invocations (spec.md §3).
pub struct AnalysisContext {
    signals: HashMap<String, Signal>,
    cache: ArtifactCache,
    pub image_hash: String,
}

impl AnalysisContext {
    pub fn new(image_hash: impl Into<String>) -> Self {
        AnalysisContext {
            signals: HashMap::new(),
            cache: ArtifactCache::default(),
            image_hash: image_hash.into(),
        }
    }

    /// Insert a signal, resolving against any prior value for the same key
    /// via `strategy`. Returns an error only if the prior value exists for
    /// a different key (a caller bug).
    pub fn set_value(
        &mut self,
        signal: Signal,
        strategy: AggregationStrategy,
    ) -> Result<(), crate::error::CoreError> {
        let key = signal.key.clone();
        let resolved = match self.signals.get(&key) {
            Some(existing) => Signal::aggregate(existing, &signal, strategy)?,
            None => signal,
        };
        self.signals.insert(key, resolved);
        Ok(())
    }

    /// Insert every signal a wave returned, using the default aggregation
    /// strategy (highest confidence, ties to most recent).
    pub fn ingest(&mut self, signals: Vec<Signal>) -> Result<(), crate::error::CoreError> {
        for signal in signals {
            self.set_value(signal, AggregationStrategy::HighestConfidence)?;
        }
        Ok(())
    }

    pub fn signal(&self, key: &str) -> Option<&Signal> {
        self.signals.get(key)
    }

    pub fn all_signals(&self) -> impl Iterator<Item = &Signal> {
        self.signals.values()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.signals.contains_key(key)
    }

    /// Read a signal's value coerced to `bool`, per the coercion contract
    /// in spec.md §4.2: numeric widening, `string<->number`, `bool<->{0,1}`,
    /// `string->enum`. Falls back to `default` and logs a warning when the
    /// signal is missing or cannot be coerced.
    pub fn get_bool(&self, key: &str, default: bool) -> bool {
        match self.signals.get(key) {
            None => default,
            Some(s) => s.value.as_bool().unwrap_or_else(|| {
                warn!(target: "sw_core::context", key, "could not coerce signal to bool, using default");
                default
            }),
        }
    }

    pub fn get_f64(&self, key: &str, default: f64) -> f64 {
        match self.signals.get(key) {
            None => default,
            Some(s) => s.value.as_f64().unwrap_or_else(|| {
                warn!(target: "sw_core::context", key, "could not coerce signal to f64, using default");
                default
            }),
        }
    }

    pub fn get_i64(&self, key: &str, default: i64) -> i64 {
        match self.signals.get(key) {
            None => default,
            Some(s) => s.value.as_i64().unwrap_or_else(|| {
                warn!(target: "sw_core::context", key, "could not coerce signal to i64, using default");
                default
            }),
        }
    }

    pub fn get_string(&self, key: &str, default: impl Into<String>) -> String {
        match self.signals.get(key) {
            None => default.into(),
            Some(s) => s.value.as_str_coerced().unwrap_or_else(|| {
                warn!(target: "sw_core::context", key, "could not coerce signal to string, using default");
                default.into()
            }),
        }
    }

    pub fn get_value(&self, key: &str) -> Option<&SignalValue> {
        self.signals.get(key).map(|s| &s.value)
    }

    /// True iff `route.skip.<name>` is present and truthy (spec.md §3).
    pub fn is_wave_skipped_by_routing(&self, wave_name: &str) -> bool {
        self.get_bool(&format!("route.skip.{wave_name}"), false)
    }

    pub fn set_cached<T: Any + Send + Sync>(&mut self, key: impl Into<String>, value: T) {
        self.cache.set(key, value);
    }

    pub fn get_cached<T: 'static>(&self, key: &str) -> Option<&T> {
        self.cache.get::<T>(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signal::Signal;

    #[test]
    fn missing_signal_returns_default() {
        let ctx = AnalysisContext::new("deadbeef");
        assert_eq!(ctx.get_f64("quality.edge_density", 0.5), 0.5);
    }

    #[test]
    fn coercion_string_to_number() {
        let mut ctx = AnalysisContext::new("deadbeef");
        let s = Signal::new("quality.edge_density", "0.42", 0.9, "quality").unwrap();
        ctx.set_value(s, AggregationStrategy::HighestConfidence).unwrap();
        assert_eq!(ctx.get_f64("quality.edge_density", 0.0), 0.42);
    }

    #[test]
    fn skip_by_routing_checks_truthy_skip_signal() {
        let mut ctx = AnalysisContext::new("deadbeef");
        assert!(!ctx.is_wave_skipped_by_routing("OcrWave"));
        let s = Signal::new("route.skip.OcrWave", true, 1.0, "AutoRoutingWave").unwrap();
        ctx.set_value(s, AggregationStrategy::HighestConfidence).unwrap();
        assert!(ctx.is_wave_skipped_by_routing("OcrWave"));
    }

    #[test]
    fn cache_round_trips_typed_artifact() {
        let mut ctx = AnalysisContext::new("deadbeef");
        ctx.set_cached("ocr.frames", vec![1u8, 2, 3]);
        assert_eq!(ctx.get_cached::<Vec<u8>>("ocr.frames"), Some(&vec![1u8, 2, 3]));
        assert_eq!(ctx.get_cached::<String>("ocr.frames"), None);
    }

    #[test]
    fn ingest_applies_default_aggregation() {
        let mut ctx = AnalysisContext::new("deadbeef");
        let a = Signal::new("a.b", 1i64, 0.3, "w").unwrap();
        let b = Signal::new("a.b", 2i64, 0.9, "w").unwrap();
        ctx.ingest(vec![a, b]).unwrap();
        assert_eq!(ctx.get_i64("a.b", 0), 2);
    }
}
