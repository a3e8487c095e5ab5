//! `pipeline.toml` — the root configuration file (spec.md §6), mirroring
//! the teacher's `FusionConfig`: a raw deserialized shape resolved and
//! validated into [`PipelineConfig`].

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ConfigReason};
use crate::logging::LoggingConfig;
use crate::manifest::WaveDefaults;
use crate::metrics::MetricsConfig;
use crate::runtime::RuntimeConfig;
use crate::types::ByteSize;
use crate::validate;

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Path to the sled database directory backing `SignalStore`.
    pub path: PathBuf,
    pub memory_cache_entries: usize,
    pub routing_cache_entries: usize,
    #[serde(default)]
    pub memory_budget: Option<ByteSize>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        StoreConfig {
            path: PathBuf::from("./signalwave-store"),
            memory_cache_entries: 10_000,
            routing_cache_entries: 10_000,
            memory_budget: None,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ImagesConfig {
    /// `Images.Waves.<name>.Defaults.*` overrides, applied on top of the
    /// wave's own YAML manifest (spec.md §6).
    #[serde(default, rename = "Waves")]
    pub waves: HashMap<String, WaveOverrideRaw>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct WaveOverrideRaw {
    #[serde(default, rename = "Defaults")]
    pub defaults: WaveDefaults,
}

#[derive(Debug, Deserialize)]
struct PipelineConfigRaw {
    #[serde(default)]
    store: StoreConfig,
    #[serde(default)]
    runtime: RuntimeConfig,
    #[serde(default)]
    logging: LoggingConfig,
    #[serde(default)]
    metrics: MetricsConfig,
    /// Directory containing per-wave YAML manifests.
    #[serde(default = "default_waves_dir")]
    waves_dir: String,
    #[serde(default, rename = "Images")]
    images: ImagesConfig,
    /// If the contradiction validator's worst severity is `critical`,
    /// reject the profile (spec.md §4.6, §7 `ContradictionCritical`).
    #[serde(default = "default_reject_on_critical")]
    reject_on_critical: bool,
}

fn default_waves_dir() -> String {
    "waves".to_string()
}

fn default_reject_on_critical() -> bool {
    true
}

/// Resolved, validated root configuration (spec.md §6).
#[derive(Debug)]
pub struct PipelineConfig {
    pub store: StoreConfig,
    pub runtime: RuntimeConfig,
    pub logging: LoggingConfig,
    pub metrics: MetricsConfig,
    pub waves_dir: PathBuf,
    pub images: ImagesConfig,
    pub reject_on_critical: bool,
}

impl PipelineConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            ConfigError::from(ConfigReason::Load)
                .with_detail(format!("failed to read {}: {e}", path.display()))
        })?;
        content.parse()
    }

    /// The override `WaveDefaults` configured for `wave_name`, if any.
    pub fn wave_override(&self, wave_name: &str) -> Option<&WaveDefaults> {
        self.images.waves.get(wave_name).map(|o| &o.defaults)
    }
}

impl FromStr for PipelineConfig {
    type Err = ConfigError;

    fn from_str(toml_str: &str) -> Result<Self, Self::Err> {
        let raw: PipelineConfigRaw = toml::from_str(toml_str)
            .map_err(|e| ConfigError::from(ConfigReason::Parse).with_detail(e.to_string()))?;

        let config = PipelineConfig {
            store: raw.store,
            runtime: raw.runtime,
            logging: raw.logging,
            metrics: raw.metrics,
            waves_dir: PathBuf::from(raw.waves_dir),
            images: raw.images,
            reject_on_critical: raw.reject_on_critical,
        };

        validate::validate(&config)?;

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL_TOML: &str = r#"
[store]
path = "/tmp/signalwave-store"
memory_cache_entries = 5000
routing_cache_entries = 5000

[runtime]
wave_timeout = "30s"
llm_timeout = "180s"
ocr_frame_timeout = "10s"
max_parallel_images = 4
ocr_parallelism = 4
"#;

    #[test]
    fn parses_minimal_config() {
        let config: PipelineConfig = MINIMAL_TOML.parse().unwrap();
        assert_eq!(config.store.memory_cache_entries, 5000);
        assert_eq!(config.waves_dir, PathBuf::from("waves"));
        assert!(config.reject_on_critical);
    }

    #[test]
    fn rejects_zero_parallelism() {
        let bad = MINIMAL_TOML.replace("max_parallel_images = 4", "max_parallel_images = 0");
        assert!(bad.parse::<PipelineConfig>().is_err());
    }
}
