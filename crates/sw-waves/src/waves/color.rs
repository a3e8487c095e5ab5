//! ColorWave (priority 100, tag `color`): delegates to the injected
//! [`ColorAnalyzer`] collaborator and stamps `color.*` signals.

use std::sync::Arc;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use sw_core::{priority, AnalysisContext, ColorAnalyzer, CoreError, CoreReason, ImageRef, Signal, Wave};

pub struct ColorWave {
    analyzer: Arc<dyn ColorAnalyzer>,
    tags: Vec<String>,
}

impl ColorWave {
    pub fn new(analyzer: Arc<dyn ColorAnalyzer>) -> Self {
        ColorWave { analyzer, tags: vec!["color".to_string()] }
    }
}

#[async_trait]
impl Wave for ColorWave {
    fn name(&self) -> &str {
        "Color"
    }

    fn priority(&self) -> i32 {
        priority::COLOR
    }

    fn tags(&self) -> &[String] {
        &self.tags
    }

    async fn analyze(
        &self,
        image_path: &str,
        _ctx: &mut AnalysisContext,
        _cancel: &CancellationToken,
    ) -> Result<Vec<Signal>, CoreError> {
        let image = ImageRef::from_path(image_path);
        let analysis = self
            .analyzer
            .analyze(&image)
            .map_err(|e| CoreError::from(CoreReason::WaveExecution).with_detail(e.to_string()))?;

        let mut signals = vec![Signal::new("color.is_grayscale", analysis.is_grayscale, 1.0, "Color")?];
        if !analysis.dominant_colors.is_empty() {
            let joined = analysis.dominant_colors.join(",");
            signals.push(Signal::new("color.dominant", joined, 0.9, "Color")?);
        }
        Ok(signals)
    }
}
