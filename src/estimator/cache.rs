use std::path::PathBuf;

use sha2::{Digest, Sha256};
use tracing::{debug, warn};

use super::NutritionEstimate;
use crate::storage;

/// Content-addressed store of estimator answers, one file per normalized input.
/// Entries never expire.
#[derive(Debug, Clone)]
pub struct ContentCache {
    dir: PathBuf,
}

impl ContentCache {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Hex SHA-256 of the normalized text.
    pub fn key(normalized: &str) -> String {
        hex::encode(Sha256::digest(normalized.as_bytes()))
    }

    fn path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }

    /// An unreadable entry counts as a miss.
    pub async fn get(&self, key: &str) -> Option<NutritionEstimate> {
        match storage::read_json::<NutritionEstimate>(&self.path(key)).await {
            Ok(hit) => {
                if hit.is_some() {
                    debug!(%key, "estimate cache hit");
                }
                hit
            }
            Err(e) => {
                warn!(%key, error = %e, "ignoring unreadable cache entry");
                None
            }
        }
    }

    pub async fn put(&self, key: &str, estimate: &NutritionEstimate) -> anyhow::Result<()> {
        storage::write_json(&self.path(key), estimate).await?;
        debug!(%key, "estimate cached");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> NutritionEstimate {
        NutritionEstimate {
            calories: 155.0,
            gram_carbs: 1.1,
            gram_proteins: 13.0,
            gram_fats: 11.0,
            feedback: "good protein".into(),
            quantity: 2.0,
            star_rating: Some(4),
        }
    }

    #[test]
    fn key_is_deterministic_and_content_sensitive() {
        assert_eq!(ContentCache::key("2 eggs"), ContentCache::key("2 eggs"));
        assert_ne!(ContentCache::key("2 eggs"), ContentCache::key("3 eggs"));
        assert_eq!(ContentCache::key("2 eggs").len(), 64);
    }

    #[tokio::test]
    async fn miss_then_hit() {
        let dir = tempfile::tempdir().unwrap();
        let cache = ContentCache::new(dir.path().join("cache-llm"));
        let key = ContentCache::key("2 eggs");

        assert!(cache.get(&key).await.is_none());
        cache.put(&key, &sample()).await.unwrap();
        assert_eq!(cache.get(&key).await, Some(sample()));
        assert!(dir.path().join("cache-llm").join(format!("{key}.json")).exists());
    }

    #[tokio::test]
    async fn corrupt_entry_is_a_miss() {
        let dir = tempfile::tempdir().unwrap();
        let cache = ContentCache::new(dir.path());
        let key = ContentCache::key("toast");
        std::fs::write(dir.path().join(format!("{key}.json")), "garbage").unwrap();
        assert!(cache.get(&key).await.is_none());
    }
}
