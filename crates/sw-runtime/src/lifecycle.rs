//! [`AnalysisService`] — the top-level handle bootstrapped from a
//! [`PipelineConfig`], owning the store, metrics, and orchestrator for the
//! lifetime of the process (spec.md §5, §9).

use std::path::Path;
use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio_util::sync::CancellationToken;

use sw_config::PipelineConfig;
use sw_core::{AnalysisProfile, WaveRegistry};
use sw_store::SignalStore;

use crate::error::{RuntimeError, RuntimeReason, RuntimeResult};
use crate::metrics::{MetricsSnapshot, RuntimeMetrics};
use crate::scheduler::{AnalysisRequest, Orchestrator};

/// Bootstrap, run, and shutdown handle for one pipeline instance.
///
/// `max_parallel_images` bounds how many images this service will analyze
/// concurrently (spec.md §5: concurrency is only across images, never
/// within one image's wave schedule). Callers acquire a permit via
/// [`analyze`](Self::analyze) before the orchestrator runs.
pub struct AnalysisService {
    orchestrator: Orchestrator,
    store: Arc<SignalStore>,
    metrics: Arc<RuntimeMetrics>,
    concurrency: Arc<Semaphore>,
    cancel: CancellationToken,
}

impl AnalysisService {
    /// Opens the signal store at `config.store.path` and wraps `registry`
    /// (the wave catalog assembled by the caller) into an orchestrator.
    #[tracing::instrument(name = "service.bootstrap", skip_all)]
    pub fn bootstrap(config: &PipelineConfig, registry: WaveRegistry) -> RuntimeResult<Self> {
        let store = SignalStore::open(&config.store.path, config.store.memory_cache_entries)
            .map_err(|e| RuntimeError::from(RuntimeReason::Bootstrap).with_detail(e.to_string()))?;
        sw_info!(
            sys,
            waves = registry.len(),
            store = %config.store.path.display(),
            "analysis service bootstrap complete"
        );

        Ok(AnalysisService {
            orchestrator: Orchestrator::new(registry, config.runtime.wave_timeout.as_duration()),
            store: Arc::new(store),
            metrics: Arc::new(RuntimeMetrics::new()),
            concurrency: Arc::new(Semaphore::new(config.runtime.max_parallel_images.max(1))),
            cancel: CancellationToken::new(),
        })
    }

    pub fn metrics(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }

    pub fn store(&self) -> &Arc<SignalStore> {
        &self.store
    }

    /// Requests cooperative shutdown: in-flight waves observe `cancel`
    /// between iterations and stop accepting new images.
    pub fn shutdown(&self) {
        sw_info!(sys, "analysis service shutdown requested");
        self.cancel.cancel();
    }

    /// Analyzes one image, bounded by the configured concurrency permit
    /// (spec.md §5). Cancellation is checked both while waiting for a
    /// permit and between waves inside the orchestrator.
    pub async fn analyze(&self, request: &AnalysisRequest<'_>) -> RuntimeResult<Arc<AnalysisProfile>> {
        if self.cancel.is_cancelled() {
            return Err(RuntimeError::from(RuntimeReason::Shutdown).with_detail("service is shutting down"));
        }
        let _permit = self
            .concurrency
            .acquire()
            .await
            .map_err(|_| RuntimeError::from(RuntimeReason::Shutdown).with_detail("concurrency semaphore closed"))?;

        self.orchestrator
            .analyze(request, &self.store, &self.metrics, self.cancel.clone())
            .await
    }

    /// Convenience wrapper that reads `path` into memory, stats it for
    /// dimensions via the caller-supplied decoder, and runs [`analyze`].
    /// Kept thin deliberately — actual pixel decoding lives with the
    /// concrete collaborators, not in the orchestration layer.
    pub async fn analyze_bytes(
        &self,
        path: &str,
        image_bytes: &[u8],
        width: u32,
        height: u32,
        format: &str,
        requested_signals: Option<&str>,
    ) -> RuntimeResult<Arc<AnalysisProfile>> {
        let request = AnalysisRequest {
            path,
            image_bytes,
            width,
            height,
            format,
            requested_signals,
        };
        self.analyze(&request).await
    }
}

/// Resolves `base_dir`-relative paths the same way [`tracing_init`] does,
/// used by callers assembling a [`PipelineConfig::store`] path before
/// bootstrap.
pub fn resolve_relative(base_dir: &Path, candidate: &Path) -> std::path::PathBuf {
    if candidate.is_relative() {
        base_dir.join(candidate)
    } else {
        candidate.to_path_buf()
    }
}
