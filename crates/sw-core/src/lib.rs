//! Signal data model, analysis context, wave contract, and shared types
//! for the SignalWave image-intelligence pipeline.

pub mod collaborators;
pub mod contradiction;
pub mod context;
pub mod error;
pub mod glob;
pub mod hash;
pub mod profile;
pub mod routing;
pub mod signal;
pub mod value;
pub mod wave;

pub use collaborators::{
    BoundingBox, CollaboratorError, ColorAnalysis, ColorAnalyzer, FaceDetectionResult, FaceDetector,
    FrameExtractor, ImageRef, OcrEngine, OcrRegion, QualityAnalysis, QualityAnalyzer, Raster,
    TextDetectionResult, TextRegionDetector, VisionModel,
};
pub use context::AnalysisContext;
pub use contradiction::{ContradictionResult, ContradictionRule, ResolutionPolicy, RuleKind, Severity, ValidationStatus};
pub use error::{CoreError, CoreReason, CoreResult};
pub use glob::{parse_patterns, required_wave_tags, KeyGlob};
pub use hash::ContentHash;
pub use profile::AnalysisProfile;
pub use routing::{Route, RoutingDecision, TextTier};
pub use signal::{AggregationStrategy, Signal};
pub use value::SignalValue;
pub use wave::{priority, Wave, WaveRegistry};
