//! The Orchestrator: the pure step-function that runs every registered
//! wave over one [`AnalysisContext`] in priority order (spec.md §4.3
//! "Schedule algorithm"), then persists the resulting profile.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::Instrument;

use sw_core::{
    AnalysisContext, AnalysisProfile, ContentHash, Signal, WaveRegistry, parse_patterns, required_wave_tags,
};
use sw_store::SignalStore;

use crate::error::{RuntimeError, RuntimeReason, RuntimeResult};
use crate::metrics::RuntimeMetrics;

/// One analysis request: the bytes to hash, the path waves read pixels
/// from, pre-sized dimensions (spec.md §5 "pre-sized by caller"), and an
/// optional requested-signals query (spec.md §6).
pub struct AnalysisRequest<'a> {
    pub path: &'a str,
    pub image_bytes: &'a [u8],
    pub width: u32,
    pub height: u32,
    pub format: &'a str,
    pub requested_signals: Option<&'a str>,
}

/// Owns the registered waves and drives one image's analysis through them
/// (spec.md §4.3). Does not own the [`SignalStore`] or [`RuntimeMetrics`]
/// — those are shared across concurrently-analyzed images at the caller
/// level (spec.md §5).
pub struct Orchestrator {
    registry: WaveRegistry,
    wave_timeout: Duration,
}

impl Orchestrator {
    pub fn new(registry: WaveRegistry, wave_timeout: Duration) -> Self {
        Orchestrator { registry, wave_timeout }
    }

    pub fn registry(&self) -> &WaveRegistry {
        &self.registry
    }

    /// Runs the schedule algorithm of spec.md §4.3: probe the store, build
    /// the filtered ordered wave list, run each wave with a timeout and
    /// cancellation observed between waves, then persist the result.
    pub async fn analyze(
        &self,
        request: &AnalysisRequest<'_>,
        store: &SignalStore,
        metrics: &RuntimeMetrics,
        cancel: CancellationToken,
    ) -> RuntimeResult<Arc<AnalysisProfile>> {
        let hash = ContentHash::of_bytes(request.image_bytes);
        let patterns = parse_patterns(request.requested_signals.unwrap_or("*"))
            .map_err(|e| RuntimeError::from(RuntimeReason::Bootstrap).with_detail(e.to_string()))?;
        let required_tags = required_wave_tags(&patterns);

        if let Some(cached) = store
            .load_profile(hash.cache_key())
            .await
            .map_err(|e| RuntimeError::from(RuntimeReason::Bootstrap).with_detail(e.to_string()))?
        {
            if cached.is_complete_for(required_tags.as_ref()) {
                metrics.inc_cache_hit();
                sw_info!(store, hash = %hash.cache_key(), "cache hit, serving persisted profile");
                return Ok(cached);
            }
        }
        metrics.inc_cache_miss();

        let ordered = self.registry.ordered_for_tags(required_tags.as_ref());
        let mut ctx = AnalysisContext::new(hash.cache_key().to_string());
        ctx.set_cached("request.width", request.width);
        ctx.set_cached("request.height", request.height);
        ctx.set_cached("request.format", request.format.to_string());
        let mut tags_covered: std::collections::BTreeSet<String> = std::collections::BTreeSet::new();

        for wave in ordered {
            if cancel.is_cancelled() {
                return Err(RuntimeError::from(RuntimeReason::Cancelled).with_detail("cancellation observed between waves"));
            }
            if ctx.is_wave_skipped_by_routing(wave.name()) {
                metrics.inc_wave_skipped();
                let skip_signal = Signal::new(format!("wave.skipped.{}", wave.name()), true, 1.0, "Orchestrator")
                    .map_err(|e| RuntimeError::from(RuntimeReason::Bootstrap).with_detail(e.to_string()))?;
                ctx.set_value(skip_signal, sw_core::AggregationStrategy::MostRecent)
                    .map_err(|e| RuntimeError::from(RuntimeReason::Bootstrap).with_detail(e.to_string()))?;
                continue;
            }
            if !wave.should_run(request.path, &ctx) {
                continue;
            }

            let span = tracing::info_span!("wave", name = wave.name());
            let outcome = tokio::time::timeout(self.wave_timeout, wave.analyze(request.path, &mut ctx, &cancel))
                .instrument(span)
                .await;

            match outcome {
                Ok(Ok(signals)) => {
                    metrics.inc_wave_run();
                    if required_tags.is_some() {
                        tags_covered.extend(wave.tags().iter().cloned());
                    }
                    ctx.ingest(signals)
                        .map_err(|e| RuntimeError::from(RuntimeReason::Bootstrap).with_detail(e.to_string()))?;
                }
                Ok(Err(e)) => {
                    metrics.inc_wave_failed();
                    sw_warn!(wave, wave = wave.name(), error = %e, "wave failed, continuing with diagnostic signal");
                    let error_signal = Signal::new(format!("{}.error", wave.name()), e.to_string(), 0.0, wave.name())
                        .map_err(|e| RuntimeError::from(RuntimeReason::Bootstrap).with_detail(e.to_string()))?;
                    ctx.set_value(error_signal, sw_core::AggregationStrategy::MostRecent)
                        .map_err(|e| RuntimeError::from(RuntimeReason::Bootstrap).with_detail(e.to_string()))?;
                }
                Err(_elapsed) => {
                    metrics.inc_wave_failed();
                    sw_warn!(wave, wave = wave.name(), timeout_secs = self.wave_timeout.as_secs(), "wave timed out");
                    let error_signal = Signal::new(format!("{}.error", wave.name()), "timed out", 0.0, wave.name())
                        .map_err(|e| RuntimeError::from(RuntimeReason::Bootstrap).with_detail(e.to_string()))?;
                    ctx.set_value(error_signal, sw_core::AggregationStrategy::MostRecent)
                        .map_err(|e| RuntimeError::from(RuntimeReason::Bootstrap).with_detail(e.to_string()))?;
                }
            }
        }

        if ctx.get_bool("validation.contradiction.rejected", false) {
            sw_error!(sys, hash = %hash.cache_key(), "contradiction validator rejected analysis");
            return Err(RuntimeError::from(RuntimeReason::ContradictionRejected)
                .with_detail("critical contradiction with reject_on_critical policy"));
        }

        let mut profile = AnalysisProfile::new(hash.cache_key(), request.path, request.width, request.height, request.format);
        for signal in ctx.all_signals() {
            profile.insert(signal.clone());
        }
        profile.tags_covered = tags_covered;

        store
            .store_profile(hash.cache_key(), &profile)
            .await
            .map_err(|e| RuntimeError::from(RuntimeReason::Bootstrap).with_detail(e.to_string()))?;
        metrics.inc_images_analyzed();

        Ok(Arc::new(profile))
    }
}
