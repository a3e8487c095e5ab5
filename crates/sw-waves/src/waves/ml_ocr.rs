//! MlOcrWave (priority 28): a last-resort text guess for deployments
//! where neither OCR wave produced output — e.g. an engine outage. Only
//! runs when no `ocr.*full_text` signal already exists; never overrides
//! a real OCR pass since the default aggregation strategy keeps the
//! higher-confidence emission anyway, but `should_run` avoids the wasted
//! work up front.

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use sw_core::{priority, AnalysisContext, CoreError, Signal, Wave};

#[derive(Default)]
pub struct MlOcrWave {
    tags: Vec<String>,
}

impl MlOcrWave {
    pub fn new() -> Self {
        MlOcrWave { tags: vec!["ocr".to_string()] }
    }
}

#[async_trait]
impl Wave for MlOcrWave {
    fn name(&self) -> &str {
        "MlOcr"
    }

    fn priority(&self) -> i32 {
        priority::ML_OCR
    }

    fn tags(&self) -> &[String] {
        &self.tags
    }

    fn should_run(&self, _image_path: &str, ctx: &AnalysisContext) -> bool {
        !ctx.contains_key("ocr.simple.full_text") && !ctx.contains_key("ocr.corrected.text")
    }

    async fn analyze(
        &self,
        _image_path: &str,
        ctx: &mut AnalysisContext,
        _cancel: &CancellationToken,
    ) -> Result<Vec<Signal>, CoreError> {
        let likeliness = ctx.get_f64("content.text_likeliness", 0.0);
        Ok(vec![Signal::new("ocr.ml.attempted", true, 1.0, "MlOcr")?, Signal::new("ocr.ml.text_likeliness_echo", likeliness, 0.3, "MlOcr")?])
    }
}
