//! The OCR wave family (spec.md §4.5, §4.4 skip table):
//! - [`OcrWave`] ("Ocr"): single-pass OCR for static images.
//! - [`AdvancedOcrWave`]: the multi-frame pipeline for animated inputs.
//! - [`OcrQualityWave`]: a confidence-summary pass over whichever ran.
//! - [`OcrVerificationWave`]: cross-checks OCR text against the vision
//!   model's caption/text answer.
//!
//! **Interlock.** Spec.md describes the interlock as "AdvancedOcr runs,
//! simple OCR checks and skips." Since `AdvancedOcr` only ever runs for
//! animated inputs, checking `identity.is_animated` directly in
//! [`OcrWave`] produces the identical observable outcome without making
//! `OcrWave`'s priority depend on `AdvancedOcrWave` having already run —
//! see DESIGN.md.

use std::sync::Arc;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use std::collections::BTreeMap;

use sw_core::{priority, AnalysisContext, CoreError, CoreReason, FrameExtractor, ImageRef, OcrEngine, Signal, VisionModel, Wave};
use sw_ocr::{jaccard_concordance, QualityMode, VerificationOutcome};

fn route_to_quality_mode(route_str: &str) -> QualityMode {
    match route_str {
        "fast" => QualityMode::Fast,
        "quality" => QualityMode::Quality,
        _ => QualityMode::Balanced,
    }
}

pub struct OcrWave {
    engine: Arc<dyn OcrEngine>,
    tags: Vec<String>,
}

impl OcrWave {
    pub fn new(engine: Arc<dyn OcrEngine>) -> Self {
        OcrWave { engine, tags: vec!["ocr".to_string(), "content".to_string()] }
    }
}

#[async_trait]
impl Wave for OcrWave {
    fn name(&self) -> &str {
        "Ocr"
    }

    fn priority(&self) -> i32 {
        priority::OCR_SIMPLE
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
        if ctx.get_bool("identity.is_animated", false) {
            return Ok(vec![Signal::new("ocr.simple.skipped", true, 1.0, "Ocr")?]);
        }

        let image = ImageRef::from_path(image_path);
        let regions = self
            .engine
            .extract_text_with_coordinates(&image)
            .await
            .map_err(|e| CoreError::from(CoreReason::WaveExecution).with_detail(e.to_string()))?;

        if regions.is_empty() {
            return Ok(vec![Signal::new("ocr.simple.full_text", String::new(), 0.5, "Ocr")?]);
        }

        let full_text = regions.iter().map(|r| r.text.as_str()).collect::<Vec<_>>().join(" ");
        let mean_confidence = regions.iter().map(|r| r.confidence).sum::<f64>() / regions.len() as f64;

        Ok(vec![
            Signal::new("ocr.simple.full_text", full_text, mean_confidence, "Ocr")?,
            Signal::new("ocr.simple.region_count", regions.len() as i64, mean_confidence, "Ocr")?,
            Signal::new("ocr.simple.confidence", mean_confidence, 1.0, "Ocr")?,
        ])
    }
}

pub struct AdvancedOcrWave {
    extractor: Arc<dyn FrameExtractor>,
    engine: Arc<dyn OcrEngine>,
    vision_model: Option<Arc<dyn VisionModel>>,
    ocr_parallelism: usize,
    tags: Vec<String>,
}

impl AdvancedOcrWave {
    pub fn new(
        extractor: Arc<dyn FrameExtractor>,
        engine: Arc<dyn OcrEngine>,
        vision_model: Option<Arc<dyn VisionModel>>,
        ocr_parallelism: usize,
    ) -> Self {
        AdvancedOcrWave {
            extractor,
            engine,
            vision_model,
            ocr_parallelism,
            tags: vec!["ocr".to_string(), "content".to_string()],
        }
    }
}

#[async_trait]
impl Wave for AdvancedOcrWave {
    fn name(&self) -> &str {
        "AdvancedOcr"
    }

    fn priority(&self) -> i32 {
        priority::ADVANCED_OCR
    }

    fn tags(&self) -> &[String] {
        &self.tags
    }

    fn should_run(&self, _image_path: &str, ctx: &AnalysisContext) -> bool {
        ctx.get_bool("identity.is_animated", false) && ctx.get_i64("identity.frame_count", 1) >= 2
    }

    async fn analyze(
        &self,
        image_path: &str,
        ctx: &mut AnalysisContext,
        _cancel: &CancellationToken,
    ) -> Result<Vec<Signal>, CoreError> {
        let image = ImageRef::from_path(image_path);
        let frames = self
            .extractor
            .extract_frames(&image)
            .await
            .map_err(|e| CoreError::from(CoreReason::WaveExecution).with_detail(e.to_string()))?;

        let mode = route_to_quality_mode(&ctx.get_string("route.selected", "balanced"));
        let vision_model = self.vision_model.as_deref();
        let result = sw_ocr::run(&frames, self.engine.as_ref(), vision_model, mode, self.ocr_parallelism).await?;

        let consensus_text = result
            .regions
            .iter()
            .map(|r| r.text.as_str())
            .collect::<Vec<_>>()
            .join(" ");
        let mean_confidence = if result.regions.is_empty() {
            0.0
        } else {
            result.regions.iter().map(|r| r.confidence).sum::<f64>() / result.regions.len() as f64
        };

        let mut signals = vec![
            Signal::new("ocr.advanced.performance", mean_confidence, 1.0, "AdvancedOcr")?,
            Signal::new("ocr.temporal_median.full_text", consensus_text.clone(), mean_confidence, "AdvancedOcr")?,
            Signal::new("ocr.voting.consensus_text", consensus_text.clone(), mean_confidence, "AdvancedOcr")?,
            Signal::new("ocr.corrected.text", consensus_text, mean_confidence, "AdvancedOcr")?,
            Signal::new("ocr.advanced.early_exit", result.early_exit, 1.0, "AdvancedOcr")?,
            Signal::new("ocr.advanced.partial", result.partial, 1.0, "AdvancedOcr")?,
            Signal::new("ocr.advanced.frames_used", result.frames_used as i64, 1.0, "AdvancedOcr")?,
        ];
        if let Some(detail) = result.error_detail {
            signals.push(Signal::new("ocr.advanced.error_detail", detail, 0.5, "AdvancedOcr")?);
        }
        ctx.set_cached("ocr.advanced.regions", result.regions);
        Ok(signals)
    }
}

pub struct OcrQualityWave {
    tags: Vec<String>,
}

impl OcrQualityWave {
    pub fn new() -> Self {
        OcrQualityWave { tags: vec!["ocr".to_string()] }
    }
}

#[async_trait]
impl Wave for OcrQualityWave {
    fn name(&self) -> &str {
        "OcrQuality"
    }

    fn priority(&self) -> i32 {
        priority::OCR_QUALITY
    }

    fn tags(&self) -> &[String] {
        &self.tags
    }

    fn should_run(&self, _image_path: &str, ctx: &AnalysisContext) -> bool {
        ctx.contains_key("ocr.simple.confidence") || ctx.contains_key("ocr.advanced.performance")
    }

    async fn analyze(
        &self,
        _image_path: &str,
        ctx: &mut AnalysisContext,
        _cancel: &CancellationToken,
    ) -> Result<Vec<Signal>, CoreError> {
        let confidence = if ctx.contains_key("ocr.advanced.performance") {
            ctx.get_f64("ocr.advanced.performance", 0.0)
        } else {
            ctx.get_f64("ocr.simple.confidence", 0.0)
        };
        Ok(vec![Signal::new("ocr.quality.confidence", confidence, 1.0, "OcrQuality")?])
    }
}

pub struct OcrVerificationWave {
    tags: Vec<String>,
}

impl Default for OcrVerificationWave {
    fn default() -> Self {
        OcrVerificationWave { tags: vec!["ocr".to_string(), "content".to_string()] }
    }
}

#[async_trait]
impl Wave for OcrVerificationWave {
    fn name(&self) -> &str {
        "OcrVerification"
    }

    fn priority(&self) -> i32 {
        priority::OCR_VERIFICATION
    }

    fn tags(&self) -> &[String] {
        &self.tags
    }

    fn should_run(&self, _image_path: &str, ctx: &AnalysisContext) -> bool {
        ctx.contains_key("vision.llm.text") && (ctx.contains_key("ocr.simple.full_text") || ctx.contains_key("ocr.corrected.text"))
    }

    async fn analyze(
        &self,
        _image_path: &str,
        ctx: &mut AnalysisContext,
        _cancel: &CancellationToken,
    ) -> Result<Vec<Signal>, CoreError> {
        let ocr_text = ctx.get_string("ocr.corrected.text", ctx.get_string("ocr.simple.full_text", ""));
        let llm_text = ctx.get_string("vision.llm.text", "");
        let avg_ocr_conf = ctx.get_f64("ocr.quality.confidence", 0.0);
        let outcome = sw_ocr::verify(&ocr_text, &llm_text, avg_ocr_conf);
        let concordance = jaccard_concordance(&ocr_text, &llm_text);

        let (winning_text, source) = match outcome {
            VerificationOutcome::TrustOcr => (ocr_text, "ocr"),
            VerificationOutcome::TrustLlm => (llm_text, "llm"),
        };

        let mut verified_text_signal = Signal::new("ocr.verified_text", winning_text, avg_ocr_conf.max(concordance), "OcrVerification")?;
        verified_text_signal.metadata = BTreeMap::from([
            ("source".to_string(), source.to_string()),
            ("concordance".to_string(), concordance.to_string()),
        ]);

        Ok(vec![
            Signal::new("ocr.concordance", concordance, 1.0, "OcrVerification")?,
            verified_text_signal,
        ])
    }
}
