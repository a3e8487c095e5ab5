use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A user correction recorded against a cached profile. Appended, never
/// overwritten — the `feedback` table is a log, not a keyed table
/// (spec.md §4.8, §6 "A separate feedback table stores user corrections").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedbackRecord {
    pub image_hash: String,
    pub kind: String,
    pub original: String,
    pub corrected: String,
    pub confidence_adjustment: f64,
    pub note: Option<String>,
    pub recorded_at: DateTime<Utc>,
}
