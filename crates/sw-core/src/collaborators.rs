//! Collaborator traits: the minimal capability seams for out-of-scope
//! external models and tools (vision LLM, OCR engine, color/quality
//! analyzers, inline text-region detector) — spec.md §1 "out of scope",
//! §5 "lazy, process-wide model sessions", §6 external interfaces.
//!
//! These live in `sw-core` (not `sw-waves`, where the wave catalog and
//! concrete implementations live) because `sw-ocr` also needs them for
//! its tier-3 sentinel re-query and its own OCR calls, and `sw-waves`
//! depends on `sw-ocr` — putting the traits in `sw-waves` would create a
//! cycle.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use thiserror::Error;

/// A single-channel (BT.709 luma) raster buffer, row-major. Used for the
/// in-memory composites the multi-frame OCR pipeline builds (temporal
/// median, stabilized frames) that never touch disk (spec.md §4.5).
#[derive(Debug, Clone, PartialEq)]
pub struct Raster {
    pub width: usize,
    pub height: usize,
    pub luma: Vec<u8>,
}

impl Raster {
    pub fn new(width: usize, height: usize, luma: Vec<u8>) -> Self {
        assert_eq!(luma.len(), width * height, "luma buffer must be width*height");
        Raster { width, height, luma }
    }

    pub fn get(&self, x: usize, y: usize) -> u8 {
        self.luma[y * self.width + x]
    }
}

/// A reference to an image, either a path on disk (pre-sized by the
/// caller per spec.md §6) or an in-memory raster composite produced
/// mid-pipeline (e.g. the OCR pipeline's temporal median).
#[derive(Debug, Clone)]
pub enum ImageRef {
    Path(PathBuf),
    Raster(Raster),
}

impl ImageRef {
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        ImageRef::Path(path.into())
    }

    pub fn from_raster(raster: Raster) -> Self {
        ImageRef::Raster(raster)
    }

    pub fn as_path(&self) -> Option<&Path> {
        match self {
            ImageRef::Path(p) => Some(p),
            ImageRef::Raster(_) => None,
        }
    }

    pub fn as_raster(&self) -> Option<&Raster> {
        match self {
            ImageRef::Raster(r) => Some(r),
            ImageRef::Path(_) => None,
        }
    }
}

#[derive(Debug, Clone, Error)]
pub enum CollaboratorError {
    #[error("model unavailable: {0}")]
    Unavailable(String),
    #[error("transport error: {0}")]
    Transport(String),
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

/// `{caption(img)->string, embed(img)->vector<512>, ask(img,prompt)->string}`
/// (spec.md §9). Florence-2 / CLIP / a generic vision LLM over HTTP each
/// implement this.
#[async_trait]
pub trait VisionModel: Send + Sync {
    async fn caption(&self, image: &ImageRef) -> Result<String, CollaboratorError>;
    async fn embed(&self, image: &ImageRef) -> Result<Vec<f32>, CollaboratorError>;
    async fn ask(&self, image: &ImageRef, prompt: &str) -> Result<String, CollaboratorError>;
}

#[derive(Debug, Clone, PartialEq)]
pub struct OcrRegion {
    pub text: String,
    pub confidence: f64,
    pub bbox: BoundingBox,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
}

impl BoundingBox {
    pub fn width(&self) -> f64 {
        self.x2 - self.x1
    }

    pub fn height(&self) -> f64 {
        self.y2 - self.y1
    }

    /// Intersection-over-union, used by temporal voting's cluster merge
    /// (spec.md §4.5 step 6).
    pub fn iou(&self, other: &BoundingBox) -> f64 {
        let ix1 = self.x1.max(other.x1);
        let iy1 = self.y1.max(other.y1);
        let ix2 = self.x2.min(other.x2);
        let iy2 = self.y2.min(other.y2);
        let iw = (ix2 - ix1).max(0.0);
        let ih = (iy2 - iy1).max(0.0);
        let intersection = iw * ih;
        if intersection <= 0.0 {
            return 0.0;
        }
        let union = self.width() * self.height() + other.width() * other.height() - intersection;
        if union <= 0.0 {
            0.0
        } else {
            intersection / union
        }
    }
}

/// Tesseract-like bindings: `extract_text_with_coordinates(image) ->
/// list<{text, confidence, bbox}>` (spec.md §6). Synchronous in the
/// original contract; implementations adapt to async via a worker pool.
#[async_trait]
pub trait OcrEngine: Send + Sync {
    async fn extract_text_with_coordinates(&self, image: &ImageRef) -> Result<Vec<OcrRegion>, CollaboratorError>;
}

/// The AutoRouter's inline fast text detector (spec.md §4.4): must run in
/// ≤20ms and therefore cannot be an async HTTP call.
pub trait TextRegionDetector: Send + Sync {
    fn detect(&self, image: &ImageRef) -> Result<TextDetectionResult, CollaboratorError>;
}

#[derive(Debug, Clone, Default)]
pub struct TextDetectionResult {
    pub text_coverage: f64,
    pub text_region_count: usize,
    pub has_subtitles: bool,
    pub regions: Vec<BoundingBox>,
}

pub trait ColorAnalyzer: Send + Sync {
    fn analyze(&self, image: &ImageRef) -> Result<ColorAnalysis, CollaboratorError>;
}

#[derive(Debug, Clone, Default)]
pub struct ColorAnalysis {
    pub is_grayscale: bool,
    pub dominant_colors: Vec<String>,
}

pub trait QualityAnalyzer: Send + Sync {
    fn analyze(&self, image: &ImageRef) -> Result<QualityAnalysis, CollaboratorError>;
}

#[derive(Debug, Clone, Default)]
pub struct QualityAnalysis {
    pub edge_density: f64,
    pub blur_score: f64,
}

/// Decodes an animated container into its constituent frames (spec.md
/// §4.5 step 1 feeds on this). Container parsing (GIF/WebP frame
/// extraction) is itself out of scope (spec.md §1) — implementations
/// wrap whatever decoder the deployment provides.
#[async_trait]
pub trait FrameExtractor: Send + Sync {
    async fn extract_frames(&self, image: &ImageRef) -> Result<Vec<Raster>, CollaboratorError>;
}

/// Face/icon discrimination (spec.md §4.6 `face_vs_icon`, §4.7 alt-text
/// subject counting). Real face detection models are out of scope
/// (spec.md §1); this is the seam a deployment wires one behind.
pub trait FaceDetector: Send + Sync {
    fn detect(&self, image: &ImageRef) -> Result<FaceDetectionResult, CollaboratorError>;
}

#[derive(Debug, Clone, Default)]
pub struct FaceDetectionResult {
    pub face_count: usize,
    pub boxes: Vec<BoundingBox>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn iou_of_identical_boxes_is_one() {
        let a = BoundingBox { x1: 0.0, y1: 0.0, x2: 10.0, y2: 10.0 };
        assert!((a.iou(&a) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn iou_of_disjoint_boxes_is_zero() {
        let a = BoundingBox { x1: 0.0, y1: 0.0, x2: 1.0, y2: 1.0 };
        let b = BoundingBox { x1: 10.0, y1: 10.0, x2: 11.0, y2: 11.0 };
        assert_eq!(a.iou(&b), 0.0);
    }
}
