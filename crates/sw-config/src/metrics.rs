use serde::Deserialize;

use crate::types::HumanDuration;

/// Runtime metrics settings. When disabled, `RuntimeMetrics` counters are
/// still updated (they're cheap atomics) but never logged.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
    pub enabled: bool,
    pub report_interval: HumanDuration,
}

fn default_report_interval() -> HumanDuration {
    "30s".parse().expect("hardcoded duration must parse")
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            report_interval: default_report_interval(),
        }
    }
}
