//! Per-wave YAML manifest (spec.md §6 "Wave configuration"): `name,
//! priority, tags, defaults.{weights, confidence, timing, features,
//! parameters}`, with hierarchical overrides from `Images.Waves.<name>.Defaults.*`
//! in `pipeline.toml` taking precedence.

use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{ConfigError, ConfigReason};

#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
pub struct WaveDefaults {
    #[serde(default)]
    pub weights: Map<String, Value>,
    #[serde(default)]
    pub confidence: Map<String, Value>,
    #[serde(default)]
    pub timing: Map<String, Value>,
    #[serde(default)]
    pub features: Map<String, Value>,
    #[serde(default)]
    pub parameters: Map<String, Value>,
}

impl WaveDefaults {
    /// Merge `overrides` on top of `self`, key-by-key within each section;
    /// an override key replaces the base key, keys absent from the
    /// override are left untouched.
    pub fn merge_overrides(&mut self, overrides: &WaveDefaults) {
        merge_section(&mut self.weights, &overrides.weights);
        merge_section(&mut self.confidence, &overrides.confidence);
        merge_section(&mut self.timing, &overrides.timing);
        merge_section(&mut self.features, &overrides.features);
        merge_section(&mut self.parameters, &overrides.parameters);
    }
}

fn merge_section(base: &mut Map<String, Value>, overrides: &Map<String, Value>) {
    for (k, v) in overrides {
        base.insert(k.clone(), v.clone());
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct WaveManifest {
    pub name: String,
    pub priority: i32,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub defaults: WaveDefaults,
}

impl WaveManifest {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            ConfigError::from(ConfigReason::Load)
                .with_detail(format!("failed to read {}: {e}", path.display()))
        })?;
        content.parse()
    }
}

impl std::str::FromStr for WaveManifest {
    type Err = ConfigError;

    fn from_str(yaml: &str) -> Result<Self, Self::Err> {
        serde_yaml::from_str(yaml)
            .map_err(|e| ConfigError::from(ConfigReason::Parse).with_detail(e.to_string()))
    }
}

/// Load every `*.yaml` manifest under `waves_dir`, keyed by wave name.
pub fn load_manifests_dir(
    waves_dir: impl AsRef<Path>,
) -> Result<std::collections::HashMap<String, WaveManifest>, ConfigError> {
    let dir = waves_dir.as_ref();
    let mut manifests = std::collections::HashMap::new();
    let entries = std::fs::read_dir(dir).map_err(|e| {
        ConfigError::from(ConfigReason::Load)
            .with_detail(format!("failed to read waves dir {}: {e}", dir.display()))
    })?;
    for entry in entries {
        let entry = entry.map_err(|e| {
            ConfigError::from(ConfigReason::Load).with_detail(format!("directory entry error: {e}"))
        })?;
        let path = entry.path();
        if path.extension().and_then(|e| e.to_str()) == Some("yaml") {
            let manifest = WaveManifest::load(&path)?;
            manifests.insert(manifest.name.clone(), manifest);
        }
    }
    Ok(manifests)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
name: OcrWave
priority: 60
tags: [ocr, content]
defaults:
  confidence:
    minimum: 0.4
  timing:
    timeout_ms: 5000
"#;

    #[test]
    fn parses_minimal_manifest() {
        let m: WaveManifest = SAMPLE.parse().unwrap();
        assert_eq!(m.name, "OcrWave");
        assert_eq!(m.priority, 60);
        assert_eq!(m.tags, vec!["ocr", "content"]);
        assert_eq!(m.defaults.confidence.get("minimum").unwrap(), 0.4);
    }

    #[test]
    fn override_replaces_only_present_keys() {
        let mut base = WaveDefaults::default();
        base.confidence.insert("minimum".into(), Value::from(0.4));
        base.confidence.insert("maximum".into(), Value::from(0.9));
        let mut overrides = WaveDefaults::default();
        overrides.confidence.insert("minimum".into(), Value::from(0.6));
        base.merge_overrides(&overrides);
        assert_eq!(base.confidence.get("minimum").unwrap(), 0.6);
        assert_eq!(base.confidence.get("maximum").unwrap(), 0.9);
    }
}
