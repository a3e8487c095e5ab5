//! Text-presence waves: [`TextDetectionWave`] (priority 82) runs a
//! thorough text-region pass independent of the auto-router's ≤20ms
//! inline detector, refining `content.text_coverage`/`content.text_region_count`
//! with a higher-confidence source. [`TextLikelinessWave`] (priority 40)
//! scores how text-like the image looks from structural cues alone, for
//! the contradiction validator's `text_likeliness_vs_ocr` rule to compare
//! against what OCR actually found.

use std::sync::Arc;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use sw_core::{priority, AnalysisContext, CoreError, CoreReason, ImageRef, Signal, TextRegionDetector, Wave};

pub struct TextDetectionWave {
    detector: Arc<dyn TextRegionDetector>,
    tags: Vec<String>,
}

impl TextDetectionWave {
    pub fn new(detector: Arc<dyn TextRegionDetector>) -> Self {
        TextDetectionWave { detector, tags: vec!["content".to_string(), "ocr".to_string()] }
    }
}

#[async_trait]
impl Wave for TextDetectionWave {
    fn name(&self) -> &str {
        "TextDetection"
    }

    fn priority(&self) -> i32 {
        priority::TEXT_DETECTION
    }

    fn tags(&self) -> &[String] {
        &self.tags
    }

    async fn analyze(
        &self,
        image_path: &str,
        ctx: &mut AnalysisContext,
        _cancel: &CancellationToken,
    ) -> Result<Vec<Signal>, CoreError> {
        let image = ImageRef::from_path(image_path);
        let detection = self
            .detector
            .detect(&image)
            .map_err(|e| CoreError::from(CoreReason::WaveExecution).with_detail(e.to_string()))?;

        ctx.set_cached("ocr.opencv.text_regions", detection.regions.clone());

        Ok(vec![
            Signal::new("content.text_coverage", detection.text_coverage, 0.95, "TextDetection")?,
            Signal::new("content.text_region_count", detection.text_region_count as i64, 0.95, "TextDetection")?,
            Signal::new("content.has_subtitles", detection.has_subtitles, 0.95, "TextDetection")?,
        ])
    }
}

/// Structural text-likeliness from independent signals already in the
/// context: high edge density with low color variety (typical of
/// rendered glyphs) and OCR-agnostic — deliberately does not read any
/// `ocr.*` key, so the contradiction validator's comparison stays
/// meaningful.
pub struct TextLikelinessWave {
    tags: Vec<String>,
}

impl Default for TextLikelinessWave {
    fn default() -> Self {
        TextLikelinessWave { tags: vec!["content".to_string()] }
    }
}

#[async_trait]
impl Wave for TextLikelinessWave {
    fn name(&self) -> &str {
        "TextLikeliness"
    }

    fn priority(&self) -> i32 {
        priority::TEXT_LIKELINESS
    }

    fn tags(&self) -> &[String] {
        &self.tags
    }

    async fn analyze(
        &self,
        _image_path: &str,
        ctx: &mut AnalysisContext,
        _cancel: &CancellationToken,
    ) -> Result<Vec<Signal>, CoreError> {
        let edge_density = ctx.get_f64("quality.edge_density", 0.0);
        let is_grayscale = ctx.get_bool("color.is_grayscale", false);
        let text_region_count = ctx.get_i64("content.text_region_count", 0);

        let mut score = (edge_density / 0.3).min(1.0) * 0.5;
        if is_grayscale {
            score += 0.2;
        }
        if text_region_count > 0 {
            score += 0.3;
        }
        let likeliness = score.clamp(0.0, 1.0);

        Ok(vec![Signal::new("content.text_likeliness", likeliness, 0.7, "TextLikeliness")?])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn high_edge_density_and_regions_score_high_likeliness() {
        let mut ctx = AnalysisContext::new("deadbeef");
        ctx.ingest(vec![
            Signal::new("quality.edge_density", 0.3, 0.9, "Quality").unwrap(),
            Signal::new("color.is_grayscale", true, 0.9, "Color").unwrap(),
            Signal::new("content.text_region_count", 5i64, 0.9, "TextDetection").unwrap(),
        ])
        .unwrap();
        let wave = TextLikelinessWave::default();
        let cancel = CancellationToken::new();
        let signals = wave.analyze("unused", &mut ctx, &cancel).await.unwrap();
        let value = signals[0].value.as_f64().unwrap();
        assert!(value >= 0.9);
    }

    #[tokio::test]
    async fn absent_signals_score_zero_likeliness() {
        let mut ctx = AnalysisContext::new("deadbeef");
        let wave = TextLikelinessWave::default();
        let cancel = CancellationToken::new();
        let signals = wave.analyze("unused", &mut ctx, &cancel).await.unwrap();
        assert_eq!(signals[0].value.as_f64().unwrap(), 0.0);
    }
}
