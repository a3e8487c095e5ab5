//! Configuration types for the SignalWave pipeline: the root
//! `pipeline.toml` document, per-wave YAML manifests, and the shared
//! logging/metrics/human-readable value types.

pub mod error;
pub mod logging;
pub mod manifest;
pub mod metrics;
pub mod pipeline;
pub mod runtime;
pub mod types;
mod validate;

pub use error::{ConfigError, ConfigReason, ConfigResult};
pub use logging::{LogFormat, LoggingConfig};
pub use manifest::{load_manifests_dir, WaveDefaults, WaveManifest};
pub use metrics::MetricsConfig;
pub use pipeline::{ImagesConfig, PipelineConfig, StoreConfig};
pub use runtime::RuntimeConfig;
pub use types::{ByteSize, HumanDuration};
