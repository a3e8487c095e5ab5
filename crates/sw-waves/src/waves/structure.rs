//! Scene/quality/motion waves that round out the signal set consumed by
//! the contradiction validator and salience fusion:
//! - [`StructureWave`] (priority 52): classifies `content.type` from
//!   already-available edge/text/color signals.
//! - [`MotionWave`] (priority 48): for animated inputs, a coarse
//!   frame-difference motion estimate.
//! - [`QualityWave`] (priority 30): delegates to the injected
//!   [`QualityAnalyzer`] collaborator.

use std::sync::Arc;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use sw_core::{priority, AnalysisContext, CoreError, CoreReason, FrameExtractor, ImageRef, QualityAnalyzer, Signal, Wave};

#[derive(Default)]
pub struct StructureWave {
    tags: Vec<String>,
}

impl StructureWave {
    pub fn new() -> Self {
        StructureWave { tags: vec!["content".to_string()] }
    }
}

/// Heuristic content-type classification from already-emitted signals.
/// Order matters: more specific categories are checked first.
fn classify_content(edge_density: f64, text_region_count: i64, text_coverage: f64, is_grayscale: bool) -> &'static str {
    if text_coverage > 0.40 {
        "scanned_document"
    } else if text_region_count > 10 && edge_density > 0.15 {
        "screenshot"
    } else if edge_density > 0.25 && is_grayscale {
        "diagram"
    } else if edge_density > 0.20 && text_region_count > 3 {
        "chart"
    } else {
        "photo"
    }
}

#[async_trait]
impl Wave for StructureWave {
    fn name(&self) -> &str {
        "Structure"
    }

    fn priority(&self) -> i32 {
        priority::STRUCTURE
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
        let text_region_count = ctx.get_i64("content.text_region_count", 0);
        let text_coverage = ctx.get_f64("content.text_coverage", 0.0);
        let is_grayscale = ctx.get_bool("color.is_grayscale", false);

        let content_type = classify_content(edge_density, text_region_count, text_coverage, is_grayscale);
        Ok(vec![Signal::new("content.type", content_type, 0.6, "Structure")?])
    }
}

pub struct MotionWave {
    extractor: Arc<dyn FrameExtractor>,
    tags: Vec<String>,
}

impl MotionWave {
    pub fn new(extractor: Arc<dyn FrameExtractor>) -> Self {
        MotionWave { extractor, tags: vec!["motion".to_string()] }
    }
}

/// Mean absolute luma difference between consecutive frames, normalized
/// to `[0, 1]` by the 255 luma range. A coarse stand-in for real optical
/// flow, sufficient to distinguish "static" from "animated and busy".
fn frame_diff_magnitude(frames: &[sw_core::Raster]) -> f64 {
    if frames.len() < 2 {
        return 0.0;
    }
    let mut total = 0.0f64;
    let mut samples = 0usize;
    for pair in frames.windows(2) {
        let (a, b) = (&pair[0], &pair[1]);
        if a.luma.len() != b.luma.len() {
            continue;
        }
        for (x, y) in a.luma.iter().zip(b.luma.iter()) {
            total += (*x as f64 - *y as f64).abs();
            samples += 1;
        }
    }
    if samples == 0 {
        0.0
    } else {
        (total / samples as f64 / 255.0).clamp(0.0, 1.0)
    }
}

#[async_trait]
impl Wave for MotionWave {
    fn name(&self) -> &str {
        "Motion"
    }

    fn priority(&self) -> i32 {
        priority::MOTION
    }

    fn tags(&self) -> &[String] {
        &self.tags
    }

    fn should_run(&self, _image_path: &str, ctx: &AnalysisContext) -> bool {
        ctx.get_bool("identity.is_animated", false)
    }

    async fn analyze(
        &self,
        image_path: &str,
        _ctx: &mut AnalysisContext,
        _cancel: &CancellationToken,
    ) -> Result<Vec<Signal>, CoreError> {
        let image = ImageRef::from_path(image_path);
        let frames = self
            .extractor
            .extract_frames(&image)
            .await
            .map_err(|e| CoreError::from(CoreReason::WaveExecution).with_detail(e.to_string()))?;

        let magnitude = frame_diff_magnitude(&frames);
        let summary = if magnitude > 0.1 {
            "significant motion across frames"
        } else if magnitude > 0.02 {
            "subtle motion across frames"
        } else {
            "largely static across frames"
        };

        Ok(vec![
            Signal::new("motion.magnitude", magnitude, 0.7, "Motion")?,
            Signal::new("motion.summary", summary, 0.7, "Motion")?,
            Signal::new("complexity.frame_count", frames.len() as i64, 0.9, "Motion")?,
        ])
    }
}

pub struct QualityWave {
    analyzer: Arc<dyn QualityAnalyzer>,
    tags: Vec<String>,
}

impl QualityWave {
    pub fn new(analyzer: Arc<dyn QualityAnalyzer>) -> Self {
        QualityWave { analyzer, tags: vec!["quality".to_string()] }
    }
}

#[async_trait]
impl Wave for QualityWave {
    fn name(&self) -> &str {
        "Quality"
    }

    fn priority(&self) -> i32 {
        priority::QUALITY
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

        Ok(vec![
            Signal::new("quality.edge_density", analysis.edge_density, 0.85, "Quality")?,
            Signal::new("quality.blur_score", analysis.blur_score, 0.85, "Quality")?,
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sw_core::Raster;

    #[test]
    fn high_text_coverage_classifies_as_scanned_document() {
        assert_eq!(classify_content(0.1, 2, 0.5, false), "scanned_document");
    }

    #[test]
    fn low_signal_defaults_to_photo() {
        assert_eq!(classify_content(0.05, 0, 0.0, false), "photo");
    }

    #[test]
    fn identical_frames_have_zero_motion() {
        let frame = Raster::new(2, 2, vec![10, 10, 10, 10]);
        let frames = vec![frame.clone(), frame];
        assert_eq!(frame_diff_magnitude(&frames), 0.0);
    }

    #[test]
    fn differing_frames_have_positive_motion() {
        let a = Raster::new(2, 2, vec![0, 0, 0, 0]);
        let b = Raster::new(2, 2, vec![255, 255, 255, 255]);
        assert!(frame_diff_magnitude(&[a, b]) > 0.9);
    }
}
