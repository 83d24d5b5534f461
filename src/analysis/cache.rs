use std::collections::HashMap;
use std::time::Duration;

use tokio::sync::RwLock;
use tokio::time::Instant;
use tracing::info;

use super::types::NutritionData;

/// Default time-to-live for a cached analysis (24 hours)
const DEFAULT_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// Default cap on distinct cached descriptions
const DEFAULT_MAX_ENTRIES: usize = 100;

struct CachedEntry {
    data: NutritionData,
    inserted_at: Instant,
}

/// Time-boxed memo of prior analysis results, keyed by the lowercased
/// description string.
///
/// Expiry is lazy: stale entries are skipped at read time and only removed
/// when eviction needs their slot. Concurrent lookups share a read lock;
/// inserts take the write lock.
pub struct ResponseCache {
    entries: RwLock<HashMap<String, CachedEntry>>,
    ttl: Duration,
    max_entries: usize,
}

impl ResponseCache {
    pub fn new(ttl: Duration, max_entries: usize) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            ttl,
            max_entries,
        }
    }

    /// Look up a fresh entry. Expired entries are never returned.
    pub async fn get(&self, key: &str) -> Option<NutritionData> {
        let entries = self.entries.read().await;
        let entry = entries.get(key)?;

        if entry.inserted_at.elapsed() > self.ttl {
            return None;
        }

        Some(entry.data.clone())
    }

    /// Insert a result, evicting the single oldest entry if the cap is
    /// exceeded.
    pub async fn insert(&self, key: String, data: NutritionData) {
        let mut entries = self.entries.write().await;
        entries.insert(
            key,
            CachedEntry {
                data,
                inserted_at: Instant::now(),
            },
        );

        if entries.len() > self.max_entries {
            let oldest = entries
                .iter()
                .min_by_key(|(_, entry)| entry.inserted_at)
                .map(|(key, _)| key.clone());

            if let Some(key) = oldest {
                entries.remove(&key);
                info!("Analysis cache full: evicted oldest entry '{}'", key);
            }
        }
    }

    /// Number of physically present entries, including expired ones
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

impl Default for ResponseCache {
    fn default() -> Self {
        Self::new(DEFAULT_TTL, DEFAULT_MAX_ENTRIES)
    }
}
