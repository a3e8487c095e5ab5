//! Concrete collaborator implementations: an HTTP-backed vision model
//! (spec.md §6 "Vision LLM transport"), and deterministic stand-ins for
//! the OCR engine, frame extractor, and sync analyzers used when a
//! deployment has none wired up. Real CV/ML backends are out of scope
//! (spec.md §1) — these exist so the wave catalog has something to call
//! in tests and minimal deployments.

use std::time::Duration;

use async_trait::async_trait;
use base64::Engine as _;
use serde::{Deserialize, Serialize};

use sw_core::{
    BoundingBox, CollaboratorError, ColorAnalysis, ColorAnalyzer, FaceDetectionResult, FaceDetector,
    FrameExtractor, ImageRef, OcrEngine, OcrRegion, QualityAnalysis, QualityAnalyzer, Raster,
    TextDetectionResult, TextRegionDetector, VisionModel,
};

/// HTTP POST to a generate endpoint: `{model, prompt, images: [base64],
/// stream: false}` → `{response: string}` (spec.md §6). `embed` reuses the
/// same endpoint with an embedding-style prompt and expects a JSON
/// `{embedding: [f32; N]}` body instead.
pub struct HttpVisionModel {
    client: reqwest::Client,
    endpoint: String,
    model: String,
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    images: Vec<String>,
    stream: bool,
}

#[derive(Deserialize)]
struct GenerateResponse {
    response: String,
}

#[derive(Deserialize)]
struct EmbedResponse {
    embedding: Vec<f32>,
}

impl HttpVisionModel {
    pub fn new(endpoint: impl Into<String>, model: impl Into<String>, timeout: Duration) -> Self {
        HttpVisionModel {
            client: reqwest::Client::builder()
                .timeout(timeout)
                .build()
                .unwrap_or_else(|_| reqwest::Client::new()),
            endpoint: endpoint.into(),
            model: model.into(),
        }
    }

    fn encode(image: &ImageRef) -> Result<String, CollaboratorError> {
        match image {
            ImageRef::Path(p) => {
                let bytes = std::fs::read(p)
                    .map_err(|e| CollaboratorError::Transport(format!("reading {}: {e}", p.display())))?;
                Ok(base64::engine::general_purpose::STANDARD.encode(bytes))
            }
            ImageRef::Raster(r) => Ok(base64::engine::general_purpose::STANDARD.encode(&r.luma)),
        }
    }

    async fn generate(&self, image: &ImageRef, prompt: &str) -> Result<String, CollaboratorError> {
        let body = GenerateRequest {
            model: &self.model,
            prompt,
            images: vec![Self::encode(image)?],
            stream: false,
        };
        let resp = self
            .client
            .post(&self.endpoint)
            .json(&body)
            .send()
            .await
            .map_err(|e| CollaboratorError::Transport(e.to_string()))?;
        let parsed: GenerateResponse = resp
            .json()
            .await
            .map_err(|e| CollaboratorError::InvalidResponse(e.to_string()))?;
        Ok(parsed.response)
    }
}

#[async_trait]
impl VisionModel for HttpVisionModel {
    async fn caption(&self, image: &ImageRef) -> Result<String, CollaboratorError> {
        self.generate(image, "Describe this image in one sentence.").await
    }

    async fn embed(&self, image: &ImageRef) -> Result<Vec<f32>, CollaboratorError> {
        let body = GenerateRequest {
            model: &self.model,
            prompt: "embed",
            images: vec![Self::encode(image)?],
            stream: false,
        };
        let resp = self
            .client
            .post(&self.endpoint)
            .json(&body)
            .send()
            .await
            .map_err(|e| CollaboratorError::Transport(e.to_string()))?;
        let parsed: EmbedResponse = resp
            .json()
            .await
            .map_err(|e| CollaboratorError::InvalidResponse(e.to_string()))?;
        Ok(parsed.embedding)
    }

    async fn ask(&self, image: &ImageRef, prompt: &str) -> Result<String, CollaboratorError> {
        self.generate(image, prompt).await
    }
}

/// Returns `CollaboratorError::Unavailable` for every call; used when a
/// deployment runs without a configured vision model (routes through Fast
/// skip sets typically avoid calling it at all).
#[derive(Debug, Default)]
pub struct NullVisionModel;

#[async_trait]
impl VisionModel for NullVisionModel {
    async fn caption(&self, _image: &ImageRef) -> Result<String, CollaboratorError> {
        Err(CollaboratorError::Unavailable("no vision model configured".into()))
    }

    async fn embed(&self, _image: &ImageRef) -> Result<Vec<f32>, CollaboratorError> {
        Err(CollaboratorError::Unavailable("no vision model configured".into()))
    }

    async fn ask(&self, _image: &ImageRef, _prompt: &str) -> Result<String, CollaboratorError> {
        Err(CollaboratorError::Unavailable("no vision model configured".into()))
    }
}

/// Always returns no regions. Used for deployments without an OCR engine
/// wired up — routing already skips OCR waves for caption-tier Fast
/// routes, so this only matters on Balanced/Quality misconfiguration.
#[derive(Debug, Default)]
pub struct NullOcrEngine;

#[async_trait]
impl OcrEngine for NullOcrEngine {
    async fn extract_text_with_coordinates(&self, _image: &ImageRef) -> Result<Vec<OcrRegion>, CollaboratorError> {
        Ok(Vec::new())
    }
}

/// Treats every input as a single-frame (non-animated) image: returns the
/// reference raster unmodified. Real GIF/WebP frame decoding is out of
/// scope (spec.md §1); a deployment wires a real decoder over this trait.
#[derive(Debug, Default)]
pub struct SingleFrameExtractor;

#[async_trait]
impl FrameExtractor for SingleFrameExtractor {
    async fn extract_frames(&self, image: &ImageRef) -> Result<Vec<Raster>, CollaboratorError> {
        match image.as_raster() {
            Some(r) => Ok(vec![r.clone()]),
            None => Err(CollaboratorError::Unavailable(
                "no frame decoder configured for on-disk animated containers".into(),
            )),
        }
    }
}

/// Deterministic placeholder text-region detector: reports no text. A
/// deployment wires a real MSER-like ≤20ms detector (spec.md §4.4) over
/// this trait; the AutoRouter only depends on the trait contract.
#[derive(Debug, Default)]
pub struct NullTextRegionDetector;

impl TextRegionDetector for NullTextRegionDetector {
    fn detect(&self, _image: &ImageRef) -> Result<TextDetectionResult, CollaboratorError> {
        Ok(TextDetectionResult::default())
    }
}

#[derive(Debug, Default)]
pub struct NullColorAnalyzer;

impl ColorAnalyzer for NullColorAnalyzer {
    fn analyze(&self, _image: &ImageRef) -> Result<ColorAnalysis, CollaboratorError> {
        Ok(ColorAnalysis::default())
    }
}

#[derive(Debug, Default)]
pub struct NullQualityAnalyzer;

impl QualityAnalyzer for NullQualityAnalyzer {
    fn analyze(&self, _image: &ImageRef) -> Result<QualityAnalysis, CollaboratorError> {
        Ok(QualityAnalysis::default())
    }
}

#[derive(Debug, Default)]
pub struct NullFaceDetector;

impl FaceDetector for NullFaceDetector {
    fn detect(&self, _image: &ImageRef) -> Result<FaceDetectionResult, CollaboratorError> {
        Ok(FaceDetectionResult::default())
    }
}

/// Ensures a detected bounding box list never escapes empty-by-default —
/// kept for callers that want a sentinel "nothing detected" box.
pub fn empty_bbox() -> BoundingBox {
    BoundingBox { x1: 0.0, y1: 0.0, x2: 0.0, y2: 0.0 }
}
