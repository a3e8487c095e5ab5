//! Builds the default, fully-wired [`WaveRegistry`] for a deployment:
//! every wave from the catalog registered with its collaborators
//! injected. Collaborators default to the `Null*` stand-ins in
//! [`crate::collaborators`] when not overridden, so the registry is
//! usable out of the box in tests and minimal deployments.

use std::sync::Arc;

use sw_core::{ColorAnalyzer, FaceDetector, FrameExtractor, OcrEngine, QualityAnalyzer, TextRegionDetector, VisionModel, WaveRegistry};

use crate::collaborators::{
    NullColorAnalyzer, NullFaceDetector, NullOcrEngine, NullQualityAnalyzer, NullTextRegionDetector, NullVisionModel,
    SingleFrameExtractor,
};
use crate::waves::{
    AdvancedOcrWave, AutoRoutingWave, ClipEmbeddingWave, ColorWave, ContradictionValidatorWave,
    DigitalFingerprintWave, ExifForensicsWave, FaceDetectionWave, IdentityWave, MlOcrWave, MotionWave,
    OcrQualityWave, OcrVerificationWave, OcrWave, QualityWave, StructureWave, TextDetectionWave,
    TextLikelinessWave, VisionLlmWave,
};

/// Collaborator set a deployment wires in; defaults to the `Null*`
/// stand-ins for any field left unset.
pub struct Collaborators {
    pub ocr_engine: Arc<dyn OcrEngine>,
    pub vision_model: Arc<dyn VisionModel>,
    pub frame_extractor: Arc<dyn FrameExtractor>,
    pub text_region_detector: Arc<dyn TextRegionDetector>,
    pub color_analyzer: Arc<dyn ColorAnalyzer>,
    pub quality_analyzer: Arc<dyn QualityAnalyzer>,
    pub face_detector: Arc<dyn FaceDetector>,
}

impl Default for Collaborators {
    fn default() -> Self {
        Collaborators {
            ocr_engine: Arc::new(NullOcrEngine),
            vision_model: Arc::new(NullVisionModel),
            frame_extractor: Arc::new(SingleFrameExtractor),
            text_region_detector: Arc::new(NullTextRegionDetector),
            color_analyzer: Arc::new(NullColorAnalyzer),
            quality_analyzer: Arc::new(NullQualityAnalyzer),
            face_detector: Arc::new(NullFaceDetector),
        }
    }
}

/// Registers every wave in the catalog (spec.md §4.3 priority table) with
/// the given collaborators. `reject_on_critical` is threaded to the
/// contradiction validator (spec.md §4.6); `ocr_parallelism` bounds the
/// advanced OCR wave's in-wave fan-out (spec.md §4.5 step 6).
pub fn default_registry(collaborators: Collaborators, reject_on_critical: bool, ocr_parallelism: usize) -> WaveRegistry {
    let mut registry = WaveRegistry::new();

    registry.register(Box::new(IdentityWave::default()));
    registry.register(Box::new(ColorWave::new(collaborators.color_analyzer.clone())));
    registry.register(Box::new(AutoRoutingWave::new(collaborators.text_region_detector.clone())));
    registry.register(Box::new(ExifForensicsWave::new()));
    registry.register(Box::new(DigitalFingerprintWave::new()));
    registry.register(Box::new(TextDetectionWave::new(collaborators.text_region_detector.clone())));
    registry.register(Box::new(OcrWave::new(collaborators.ocr_engine.clone())));
    registry.register(Box::new(FaceDetectionWave::new(collaborators.face_detector.clone())));
    registry.register(Box::new(ClipEmbeddingWave::new(collaborators.vision_model.clone())));
    registry.register(Box::new(AdvancedOcrWave::new(
        collaborators.frame_extractor.clone(),
        collaborators.ocr_engine.clone(),
        Some(collaborators.vision_model.clone()),
        ocr_parallelism,
    )));
    registry.register(Box::new(OcrQualityWave::new()));
    registry.register(Box::new(OcrVerificationWave::default()));
    registry.register(Box::new(StructureWave::new()));
    registry.register(Box::new(VisionLlmWave::new(collaborators.vision_model.clone())));
    registry.register(Box::new(MotionWave::new(collaborators.frame_extractor.clone())));
    registry.register(Box::new(TextLikelinessWave::default()));
    registry.register(Box::new(QualityWave::new(collaborators.quality_analyzer.clone())));
    registry.register(Box::new(MlOcrWave::new()));
    registry.register(Box::new(ContradictionValidatorWave::new(reject_on_critical)));

    registry
}
