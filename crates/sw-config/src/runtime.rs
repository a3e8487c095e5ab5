use serde::{Deserialize, Serialize};

use crate::types::HumanDuration;

/// Concurrency and timeout knobs for the orchestrator (spec.md §5).
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RuntimeConfig {
    /// Per-wave `analyze` timeout; a wave that exceeds this is treated as
    /// `WaveFailure`, not `Cancelled` (spec.md §5, §7).
    pub wave_timeout: HumanDuration,
    /// Default vision-LLM call timeout (spec.md §5: "LLM default 180s").
    pub llm_timeout: HumanDuration,
    /// Per-frame OCR call timeout inside the multi-frame pipeline.
    pub ocr_frame_timeout: HumanDuration,
    /// Upper bound on images analyzed concurrently by the caller
    /// (concurrency is intra-process, across images only — spec.md §5).
    pub max_parallel_images: usize,
    /// Bound on in-wave fan-out (e.g. OCR-per-frame during voting);
    /// defaults to the host's CPU count per spec.md §4.5 step 6.
    pub ocr_parallelism: usize,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        RuntimeConfig {
            wave_timeout: "30s".parse().expect("hardcoded duration must parse"),
            llm_timeout: "180s".parse().expect("hardcoded duration must parse"),
            ocr_frame_timeout: "10s".parse().expect("hardcoded duration must parse"),
            max_parallel_images: num_cpus::get(),
            ocr_parallelism: num_cpus::get(),
        }
    }
}
