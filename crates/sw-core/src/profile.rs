//! [`AnalysisProfile`] — the serialized, persisted result of one
//! analysis: the final signal set plus enough metadata to judge
//! freshness and completeness against a requested-signals query
//! (spec.md §2 "data flow", §4.3 step 1, §4.8).

use std::collections::{BTreeSet, HashMap};

use serde::{Deserialize, Serialize};

use crate::signal::Signal;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisProfile {
    pub image_hash: String,
    pub path: String,
    pub width: u32,
    pub height: u32,
    pub format: String,
    pub signals: HashMap<String, Signal>,
    /// The union of wave tags that ran to produce this profile. Used by
    /// the orchestrator to decide whether a cached profile is "complete"
    /// for a newly requested signal set (spec.md §4.3 step 1).
    pub tags_covered: BTreeSet<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl AnalysisProfile {
    pub fn new(image_hash: impl Into<String>, path: impl Into<String>, width: u32, height: u32, format: impl Into<String>) -> Self {
        AnalysisProfile {
            image_hash: image_hash.into(),
            path: path.into(),
            width,
            height,
            format: format.into(),
            signals: HashMap::new(),
            tags_covered: BTreeSet::new(),
            created_at: chrono::Utc::now(),
        }
    }

    pub fn insert(&mut self, signal: Signal) {
        self.signals.insert(signal.key.clone(), signal);
    }

    /// A cached profile is "complete" for a query iff it covers every tag
    /// the query requires (spec.md §4.3 step 1). `None` means the query
    /// requires every wave, so only a full, untagged-filter profile
    /// qualifies — here that means `tags_covered` is empty, i.e. the
    /// profile was produced by an unfiltered run.
    pub fn is_complete_for(&self, required_tags: Option<&BTreeSet<&'static str>>) -> bool {
        match required_tags {
            None => self.tags_covered.is_empty(),
            Some(required) => required.iter().all(|t| self.tags_covered.contains(*t)),
        }
    }

    pub fn signal_count(&self) -> usize {
        self.signals.len()
    }

    pub fn unique_sources(&self) -> BTreeSet<&str> {
        self.signals.values().map(|s| s.source.as_str()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unfiltered_profile_is_complete_for_any_query() {
        let profile = AnalysisProfile::new("h", "p.png", 10, 10, "png");
        let mut required = BTreeSet::new();
        required.insert("motion");
        assert!(profile.is_complete_for(Some(&required)));
    }

    #[test]
    fn tag_filtered_profile_requires_covered_tags() {
        let mut profile = AnalysisProfile::new("h", "p.png", 10, 10, "png");
        profile.tags_covered.insert("color");
        let mut required = BTreeSet::new();
        required.insert("motion");
        assert!(!profile.is_complete_for(Some(&required)));
        profile.tags_covered.insert("motion");
        assert!(profile.is_complete_for(Some(&required)));
    }
}
