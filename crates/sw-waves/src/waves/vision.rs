//! Vision-model-backed waves: [`VisionLlmWave`] (priority 50) asks a
//! vision LLM to caption/describe the image, [`ClipEmbeddingWave`]
//! (priority 70, tag `clip`/`embedding`) asks the same collaborator for
//! an embedding vector, and [`FaceDetectionWave`] (priority 75, tag
//! `face`) counts faces for the alt-text subject heuristic and the
//! `face_vs_icon` contradiction rule.

use std::sync::Arc;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use sw_core::{priority, AnalysisContext, CoreError, CoreReason, FaceDetector, ImageRef, Signal, VisionModel, Wave};

pub struct VisionLlmWave {
    model: Arc<dyn VisionModel>,
    tags: Vec<String>,
}

impl VisionLlmWave {
    pub fn new(model: Arc<dyn VisionModel>) -> Self {
        VisionLlmWave { model, tags: vec!["vision".to_string(), "llm".to_string()] }
    }
}

#[async_trait]
impl Wave for VisionLlmWave {
    fn name(&self) -> &str {
        "VisionLlm"
    }

    fn priority(&self) -> i32 {
        priority::VISION_LLM
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
        let caption = self
            .model
            .caption(&image)
            .await
            .map_err(|e| CoreError::from(CoreReason::WaveExecution).with_detail(e.to_string()))?;

        let mut signals = vec![Signal::new("vision.llm.caption", caption.clone(), 0.85, "VisionLlm")?];

        if ctx.contains_key("ocr.simple.full_text") || ctx.contains_key("ocr.corrected.text") {
            let text = self
                .model
                .ask(&image, "Transcribe any visible text in this image, verbatim.")
                .await
                .map_err(|e| CoreError::from(CoreReason::WaveExecution).with_detail(e.to_string()))?;
            signals.push(Signal::new("vision.llm.text", text, 0.75, "VisionLlm")?);
        }

        Ok(signals)
    }
}

pub struct ClipEmbeddingWave {
    model: Arc<dyn VisionModel>,
    tags: Vec<String>,
}

impl ClipEmbeddingWave {
    pub fn new(model: Arc<dyn VisionModel>) -> Self {
        ClipEmbeddingWave { model, tags: vec!["clip".to_string(), "embedding".to_string()] }
    }
}

#[async_trait]
impl Wave for ClipEmbeddingWave {
    fn name(&self) -> &str {
        "ClipEmbedding"
    }

    fn priority(&self) -> i32 {
        priority::CLIP_EMBEDDING_PRIMARY
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
        let embedding = self
            .model
            .embed(&image)
            .await
            .map_err(|e| CoreError::from(CoreReason::WaveExecution).with_detail(e.to_string()))?;

        let dimension_count = embedding.len() as i64;
        Ok(vec![
            Signal::new("clip.embedding", embedding, 0.9, "ClipEmbedding")?,
            Signal::new("clip.dimension_count", dimension_count, 0.9, "ClipEmbedding")?,
        ])
    }
}

pub struct FaceDetectionWave {
    detector: Arc<dyn FaceDetector>,
    tags: Vec<String>,
}

impl FaceDetectionWave {
    pub fn new(detector: Arc<dyn FaceDetector>) -> Self {
        FaceDetectionWave { detector, tags: vec!["face".to_string()] }
    }
}

#[async_trait]
impl Wave for FaceDetectionWave {
    fn name(&self) -> &str {
        "FaceDetection"
    }

    fn priority(&self) -> i32 {
        priority::FACE_DETECTION
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
        let detection = self
            .detector
            .detect(&image)
            .map_err(|e| CoreError::from(CoreReason::WaveExecution).with_detail(e.to_string()))?;

        Ok(vec![Signal::new("face.count", detection.face_count as i64, 0.9, "FaceDetection")?])
    }
}
