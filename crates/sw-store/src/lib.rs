//! Content-addressed, durable cache for analysis profiles, routing
//! decisions, and user feedback (spec.md §4.8).

pub mod error;
pub mod feedback;
pub mod store;

pub use error::{StoreError, StoreReason, StoreResult};
pub use feedback::FeedbackRecord;
pub use store::{SignalStore, StoreStatistics};
