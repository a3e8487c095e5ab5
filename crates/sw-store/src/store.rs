//! [`SignalStore`] — the content-addressed, durable cache fronting every
//! analysis (spec.md §4.8). Durability is `sled`: an embedded,
//! log-structured key-value store giving crash-safe WAL-like durability
//! with concurrent lock-free reads, the same substitution the `knhk`
//! reference codebase made for its persistence layer after `rocksdb`
//! proved impossible to link cleanly there. An `lru::LruCache` fronts the
//! `profiles` tree so repeated lookups of hot images never touch disk.

use std::path::Path;
use std::sync::Mutex as StdMutex;

use lru::LruCache;
use sled::Db;
use std::num::NonZeroUsize;
use std::sync::Arc;
use tokio::sync::Mutex;

use sw_core::{AnalysisProfile, RoutingDecision};

use crate::error::{StoreError, StoreReason};
use crate::feedback::FeedbackRecord;

const TREE_PROFILES: &str = "profiles";
const TREE_ROUTING: &str = "routing_decisions";
const TREE_FEEDBACK: &str = "feedback";

/// Aggregate counts returned by [`SignalStore::statistics`] (spec.md §4.8).
#[derive(Debug, Clone, Copy, Default)]
pub struct StoreStatistics {
    pub image_count: usize,
    pub signal_count: usize,
    pub unique_source_count: usize,
}

pub struct SignalStore {
    db: Db,
    profiles_lru: StdMutex<LruCache<String, Arc<AnalysisProfile>>>,
    /// Serializes writes per hash are not distinguished by key here — sled
    /// already serializes its own writes; this mutex exists purely to make
    /// the single-flight guarantee in spec.md §4.3 step 1 observable at the
    /// orchestrator level.
    write_lock: Mutex<()>,
}

impl SignalStore {
    pub fn open(path: impl AsRef<Path>, memory_cache_entries: usize) -> Result<Self, StoreError> {
        let db = sled::open(path.as_ref()).map_err(|e| {
            StoreError::from(StoreReason::Open)
                .with_detail(format!("failed to open store at {}: {e}", path.as_ref().display()))
        })?;
        let capacity = NonZeroUsize::new(memory_cache_entries.max(1)).expect("checked non-zero above");
        Ok(SignalStore {
            db,
            profiles_lru: StdMutex::new(LruCache::new(capacity)),
            write_lock: Mutex::new(()),
        })
    }

    fn tree(&self, name: &str) -> Result<sled::Tree, StoreError> {
        self.db
            .open_tree(name)
            .map_err(|e| StoreError::from(StoreReason::Durability).with_detail(format!("open tree {name}: {e}")))
    }

    pub async fn store_profile(&self, hash: &str, profile: &AnalysisProfile) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock().await;
        let tree = self.tree(TREE_PROFILES)?;
        let bytes = serde_json::to_vec(profile)
            .map_err(|e| StoreError::from(StoreReason::Serialize).with_detail(e.to_string()))?;
        tree.insert(hash.as_bytes(), bytes)
            .map_err(|e| StoreError::from(StoreReason::Durability).with_detail(e.to_string()))?;
        tree.flush_async()
            .await
            .map_err(|e| StoreError::from(StoreReason::Durability).with_detail(e.to_string()))?;
        self.profiles_lru
            .lock()
            .expect("lru mutex poisoned")
            .put(hash.to_string(), Arc::new(profile.clone()));
        Ok(())
    }

    pub async fn load_profile(&self, hash: &str) -> Result<Option<Arc<AnalysisProfile>>, StoreError> {
        if let Some(hit) = self.profiles_lru.lock().expect("lru mutex poisoned").get(hash).cloned() {
            return Ok(Some(hit));
        }
        let tree = self.tree(TREE_PROFILES)?;
        let raw = tree
            .get(hash.as_bytes())
            .map_err(|e| StoreError::from(StoreReason::Durability).with_detail(e.to_string()))?;
        match raw {
            None => Ok(None),
            Some(bytes) => {
                let profile: AnalysisProfile = serde_json::from_slice(&bytes)
                    .map_err(|e| StoreError::from(StoreReason::Serialize).with_detail(e.to_string()))?;
                let profile = Arc::new(profile);
                self.profiles_lru
                    .lock()
                    .expect("lru mutex poisoned")
                    .put(hash.to_string(), profile.clone());
                Ok(Some(profile))
            }
        }
    }

    pub async fn store_routing_decision(&self, hash: &str, decision: &RoutingDecision) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock().await;
        let tree = self.tree(TREE_ROUTING)?;
        let bytes = serde_json::to_vec(decision)
            .map_err(|e| StoreError::from(StoreReason::Serialize).with_detail(e.to_string()))?;
        tree.insert(hash.as_bytes(), bytes)
            .map_err(|e| StoreError::from(StoreReason::Durability).with_detail(e.to_string()))?;
        Ok(())
    }

    pub fn load_routing_decision(&self, hash: &str) -> Result<Option<RoutingDecision>, StoreError> {
        let tree = self.tree(TREE_ROUTING)?;
        let raw = tree
            .get(hash.as_bytes())
            .map_err(|e| StoreError::from(StoreReason::Durability).with_detail(e.to_string()))?;
        raw.map(|bytes| {
            serde_json::from_slice(&bytes)
                .map_err(|e| StoreError::from(StoreReason::Serialize).with_detail(e.to_string()))
        })
        .transpose()
    }

    pub async fn store_feedback(
        &self,
        hash: &str,
        kind: impl Into<String>,
        original: impl Into<String>,
        corrected: impl Into<String>,
        confidence_adjustment: f64,
        note: Option<String>,
    ) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock().await;
        let tree = self.tree(TREE_FEEDBACK)?;
        let seq = self
            .db
            .generate_id()
            .map_err(|e| StoreError::from(StoreReason::Durability).with_detail(e.to_string()))?;
        let key = format!("{hash}#{seq}");
        let record = FeedbackRecord {
            image_hash: hash.to_string(),
            kind: kind.into(),
            original: original.into(),
            corrected: corrected.into(),
            confidence_adjustment,
            note,
            recorded_at: chrono::Utc::now(),
        };
        let bytes = serde_json::to_vec(&record)
            .map_err(|e| StoreError::from(StoreReason::Serialize).with_detail(e.to_string()))?;
        tree.insert(key.as_bytes(), bytes)
            .map_err(|e| StoreError::from(StoreReason::Durability).with_detail(e.to_string()))?;
        Ok(())
    }

    /// `{image_count, signal_count, unique_source_count}` (spec.md §4.8).
    /// Scans the `profiles` tree; acceptable since this is a diagnostics
    /// path, not part of the analysis hot path.
    pub fn statistics(&self) -> Result<StoreStatistics, StoreError> {
        let tree = self.tree(TREE_PROFILES)?;
        let mut stats = StoreStatistics::default();
        let mut sources = std::collections::HashSet::new();
        for entry in tree.iter() {
            let (_, bytes) = entry
                .map_err(|e| StoreError::from(StoreReason::Durability).with_detail(e.to_string()))?;
            let profile: AnalysisProfile = serde_json::from_slice(&bytes)
                .map_err(|e| StoreError::from(StoreReason::Serialize).with_detail(e.to_string()))?;
            stats.image_count += 1;
            stats.signal_count += profile.signal_count();
            for source in profile.unique_sources() {
                sources.insert(source.to_string());
            }
        }
        stats.unique_source_count = sources.len();
        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sw_core::{Route, TextTier};

    fn temp_store() -> (SignalStore, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let store = SignalStore::open(dir.path(), 100).unwrap();
        (store, dir)
    }

    #[tokio::test]
    async fn store_and_load_profile_round_trips() {
        let (store, _dir) = temp_store();
        let mut profile = AnalysisProfile::new("hash1", "img.png", 10, 10, "png");
        profile.insert(sw_core::Signal::new("identity.format", "png", 0.9, "IdentityWave").unwrap());
        store.store_profile("hash1", &profile).await.unwrap();
        let loaded = store.load_profile("hash1").await.unwrap().unwrap();
        assert_eq!(loaded.image_hash, "hash1");
        assert_eq!(loaded.signal_count(), 1);
    }

    #[tokio::test]
    async fn load_missing_profile_returns_none() {
        let (store, _dir) = temp_store();
        assert!(store.load_profile("does-not-exist").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn routing_decision_round_trips() {
        let (store, _dir) = temp_store();
        let decision = RoutingDecision {
            route: Route::Fast,
            text_tier: TextTier::Caption,
            skip_waves: Default::default(),
            reason: "test".into(),
            decided_at: chrono::Utc::now(),
        };
        store.store_routing_decision("hash1", &decision).await.unwrap();
        let loaded = store.load_routing_decision("hash1").unwrap().unwrap();
        assert_eq!(loaded.route, Route::Fast);
    }

    #[tokio::test]
    async fn statistics_counts_profiles() {
        let (store, _dir) = temp_store();
        let mut profile = AnalysisProfile::new("hash1", "img.png", 10, 10, "png");
        profile.insert(sw_core::Signal::new("a.b", 1i64, 0.9, "w1").unwrap());
        store.store_profile("hash1", &profile).await.unwrap();
        let stats = store.statistics().unwrap();
        assert_eq!(stats.image_count, 1);
        assert_eq!(stats.signal_count, 1);
        assert_eq!(stats.unique_source_count, 1);
    }
}
