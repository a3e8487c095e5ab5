pub mod color;
pub mod contradiction;
pub mod forensics;
pub mod identity;
pub mod ml_ocr;
pub mod ocr;
pub mod routing;
pub mod structure;
pub mod text;
pub mod vision;

pub use color::ColorWave;
pub use contradiction::{built_in_rules, ContradictionValidatorWave};
pub use forensics::{DigitalFingerprintWave, ExifForensicsWave};
pub use identity::IdentityWave;
pub use ml_ocr::MlOcrWave;
pub use ocr::{AdvancedOcrWave, OcrQualityWave, OcrVerificationWave, OcrWave};
pub use routing::AutoRoutingWave;
pub use structure::{MotionWave, QualityWave, StructureWave};
pub use text::{TextDetectionWave, TextLikelinessWave};
pub use vision::{ClipEmbeddingWave, FaceDetectionWave, VisionLlmWave};
