//! Routing decision types (spec.md §3, §4.4). The AutoRouter wave itself
//! lives in `sw-waves` since it depends on the collaborator traits; this
//! module holds the data shapes it produces and that `sw-runtime`/`sw-store`
//! memoize.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Route {
    Fast,
    Balanced,
    Quality,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextTier {
    Caption,
    Moderate,
    Substantial,
    Document,
}

impl TextTier {
    /// `coverage < 0.10 -> caption; < 0.25 -> moderate; < 0.40 -> substantial; else document`
    /// (spec.md §4.4).
    pub fn from_coverage(coverage: f64) -> Self {
        if coverage < 0.10 {
            TextTier::Caption
        } else if coverage < 0.25 {
            TextTier::Moderate
        } else if coverage < 0.40 {
            TextTier::Substantial
        } else {
            TextTier::Document
        }
    }
}

/// `{route, text_tier, skip_waves, reason, decided_at}` (spec.md §3).
/// Cached in memory (LRU ≤10k, 24h TTL) and persisted in `SignalStore`
/// keyed by `image_hash`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoutingDecision {
    pub route: Route,
    pub text_tier: TextTier,
    pub skip_waves: BTreeSet<String>,
    pub reason: String,
    pub decided_at: DateTime<Utc>,
}

impl RoutingDecision {
    pub fn is_fresh(&self, ttl: chrono::Duration) -> bool {
        Utc::now() - self.decided_at < ttl
    }

    /// The default 24h TTL used by both the in-memory LRU and the
    /// persisted routing-decision table (spec.md §4.4).
    pub fn default_ttl() -> chrono::Duration {
        chrono::Duration::hours(24)
    }
}

/// Waves skipped for a given `(route, text_tier)` pair, per the
/// authoritative table in spec.md §4.4.
pub fn skip_set_for(route: Route, tier: TextTier) -> BTreeSet<String> {
    let names: &[&str] = match (route, tier) {
        (Route::Fast, TextTier::Caption) => &[
            "Ocr",
            "AdvancedOcr",
            "OcrVerification",
            "TextDetection",
            "ClipEmbedding",
            "FaceDetection",
        ],
        (Route::Fast, _) => &["AdvancedOcr", "OcrVerification", "ClipEmbedding", "FaceDetection"],
        (Route::Balanced, TextTier::Caption | TextTier::Moderate) => {
            &["AdvancedOcr", "OcrVerification", "ClipEmbedding"]
        }
        (Route::Balanced, TextTier::Substantial | TextTier::Document) => &["ClipEmbedding"],
        (Route::Quality, _) => &[],
    };
    names.iter().map(|s| s.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_tier_boundaries() {
        assert_eq!(TextTier::from_coverage(0.05), TextTier::Caption);
        assert_eq!(TextTier::from_coverage(0.10), TextTier::Moderate);
        assert_eq!(TextTier::from_coverage(0.25), TextTier::Substantial);
        assert_eq!(TextTier::from_coverage(0.40), TextTier::Document);
        assert_eq!(TextTier::from_coverage(0.99), TextTier::Document);
    }

    #[test]
    fn fast_caption_skips_ocr_family() {
        let skips = skip_set_for(Route::Fast, TextTier::Caption);
        assert!(skips.contains("Ocr"));
        assert!(skips.contains("FaceDetection"));
    }

    #[test]
    fn quality_skips_nothing() {
        let skips = skip_set_for(Route::Quality, TextTier::Document);
        assert!(skips.is_empty());
    }
}
