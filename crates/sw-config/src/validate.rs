use crate::error::{ConfigError, ConfigReason};
use crate::pipeline::PipelineConfig;

/// Internal validation, called automatically during `PipelineConfig::from_str` / `load`.
pub(crate) fn validate(config: &PipelineConfig) -> Result<(), ConfigError> {
    if config.runtime.max_parallel_images == 0 {
        return Err(ConfigError::from(ConfigReason::Validate)
            .with_detail("runtime.max_parallel_images must be > 0"));
    }
    if config.runtime.ocr_parallelism == 0 {
        return Err(ConfigError::from(ConfigReason::Validate)
            .with_detail("runtime.ocr_parallelism must be > 0"));
    }
    if config.runtime.wave_timeout.as_duration().is_zero() {
        return Err(ConfigError::from(ConfigReason::Validate)
            .with_detail("runtime.wave_timeout must be > 0"));
    }
    if config.runtime.llm_timeout.as_duration().is_zero() {
        return Err(ConfigError::from(ConfigReason::Validate)
            .with_detail("runtime.llm_timeout must be > 0"));
    }
    if config.store.memory_cache_entries == 0 {
        return Err(ConfigError::from(ConfigReason::Validate)
            .with_detail("store.memory_cache_entries must be > 0"));
    }
    if config.store.path.as_os_str().is_empty() {
        return Err(ConfigError::from(ConfigReason::Validate).with_detail("store.path must be non-empty"));
    }
    if config.metrics.enabled && config.metrics.report_interval.as_duration().is_zero() {
        return Err(ConfigError::from(ConfigReason::Validate)
            .with_detail("metrics.report_interval must be > 0 when metrics.enabled=true"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_default_config() {
        let config = "[store]\npath = \"/tmp/s\"\n".parse::<PipelineConfig>();
        assert!(config.is_ok());
    }
}
