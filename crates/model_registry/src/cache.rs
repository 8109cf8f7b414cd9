//! TTL cache for generated assets, keyed by request fingerprint.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use generation_structs::MeshAsset;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, info};

/// How long a cached asset stays valid.
pub const CACHE_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// How often the background sweeper evicts expired entries.
pub const SWEEP_INTERVAL: Duration = Duration::from_secs(60 * 60);

/// One cached asset with its insertion time.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub asset: MeshAsset,
    pub is_fallback: bool,
    inserted_at: Instant,
}

/// In-memory asset cache with per-entry expiry.
#[derive(Debug)]
pub struct AssetCache {
    entries: HashMap<String, CacheEntry>,
    ttl: Duration,
}

impl Default for AssetCache {
    fn default() -> Self {
        Self::new()
    }
}

impl AssetCache {
    #[must_use]
    pub fn new() -> Self {
        Self::with_ttl(CACHE_TTL)
    }

    #[must_use]
    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            entries: HashMap::new(),
            ttl,
        }
    }

    /// Looks up a fingerprint key. An entry is live strictly before the
    /// TTL boundary; at or past it, the lookup misses. Expired entries
    /// stay in the map until the next [`sweep`](Self::sweep).
    pub fn get(&self, key: &str) -> Option<CacheEntry> {
        let entry = self.entries.get(key)?;
        if entry.inserted_at.elapsed() >= self.ttl {
            debug!(key = %key, "Ignoring expired cache entry");
            return None;
        }
        Some(entry.clone())
    }

    pub fn insert(&mut self, key: impl Into<String>, asset: MeshAsset, is_fallback: bool) {
        self.entries.insert(
            key.into(),
            CacheEntry {
                asset,
                is_fallback,
                inserted_at: Instant::now(),
            },
        );
    }

    /// Removes every expired entry, returning how many were dropped.
    pub fn sweep(&mut self) -> usize {
        let before = self.entries.len();
        let ttl = self.ttl;
        self.entries
            .retain(|_, entry| entry.inserted_at.elapsed() < ttl);
        before - self.entries.len()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

/// Cache handle shared between the registry and the sweeper task. The
/// lock is never held across an await.
pub type SharedCache = Arc<Mutex<AssetCache>>;

#[must_use]
pub fn shared_cache() -> SharedCache {
    Arc::new(Mutex::new(AssetCache::new()))
}

/// Spawns the hourly eviction task.
pub fn spawn_sweeper(cache: SharedCache) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(SWEEP_INTERVAL);
        ticker.tick().await; // first tick fires immediately
        loop {
            ticker.tick().await;
            let evicted = cache.lock().expect("cache lock poisoned").sweep();
            if evicted > 0 {
                info!(evicted = evicted, "Swept expired cache entries");
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use generation_structs::{Fingerprint, MeshAsset};
    use placeholder::synthesize;

    fn some_asset(prompt: &str) -> MeshAsset {
        synthesize(&Fingerprint::from_text(prompt))
    }

    #[tokio::test(start_paused = true)]
    async fn hit_within_ttl() {
        let mut cache = AssetCache::new();
        cache.insert("text:a red cube", some_asset("a red cube"), false);

        tokio::time::advance(Duration::from_secs(60)).await;
        assert!(cache.get("text:a red cube").is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn entry_lives_strictly_before_the_ttl_boundary() {
        let mut cache = AssetCache::new();
        cache.insert("k", some_asset("k"), false);

        tokio::time::advance(CACHE_TTL - Duration::from_secs(1)).await;
        assert!(cache.get("k").is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn entry_at_the_ttl_boundary_misses_without_eviction() {
        let mut cache = AssetCache::new();
        cache.insert("k", some_asset("k"), false);

        tokio::time::advance(CACHE_TTL).await;
        assert!(cache.get("k").is_none());
        // Lookups never mutate the store; only the sweep evicts.
        assert_eq!(cache.len(), 1);

        assert_eq!(cache.sweep(), 1);
        assert!(cache.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn sweep_drops_only_expired_entries() {
        let mut cache = AssetCache::new();
        cache.insert("old", some_asset("old"), false);

        tokio::time::advance(CACHE_TTL).await;
        cache.insert("fresh", some_asset("fresh"), false);

        assert_eq!(cache.sweep(), 1);
        assert_eq!(cache.len(), 1);
        assert!(cache.get("fresh").is_some());
    }

    #[test]
    fn missing_key_misses() {
        let cache = AssetCache::new();
        assert!(cache.get("text:nothing").is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn sweeper_evicts_in_the_background() {
        let cache = shared_cache();
        cache
            .lock()
            .unwrap()
            .insert("stale", some_asset("stale"), false);

        let sweeper = spawn_sweeper(Arc::clone(&cache));
        // Let the sweeper register its interval before the clock jumps.
        tokio::task::yield_now().await;

        tokio::time::advance(CACHE_TTL + SWEEP_INTERVAL).await;
        // Give the sweeper task a chance to observe the tick.
        for _ in 0..4 {
            tokio::task::yield_now().await;
        }

        assert!(cache.lock().unwrap().is_empty());
        sweeper.abort();
    }
}
