//! Orchestration layer: drives the wave schedule over one image, owns the
//! process-wide signal store handle and metrics, and wires up tracing.

#[macro_use]
mod log_macros;

pub mod error;
pub mod lifecycle;
pub mod metrics;
pub mod scheduler;
pub mod tracing_init;

pub use error::{RuntimeError, RuntimeReason, RuntimeResult};
pub use lifecycle::AnalysisService;
pub use metrics::{MetricsSnapshot, RuntimeMetrics};
pub use scheduler::{AnalysisRequest, Orchestrator};
