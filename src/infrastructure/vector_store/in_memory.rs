//! In-memory vector store implementation using moka

use std::time::Duration;

use async_trait::async_trait;
use moka::future::Cache as MokaCache;
use tracing::debug;
use uuid::Uuid;

use crate::domain::DomainError;
use crate::domain::vector_store::{expiry_secs, VectorDocument, VectorStore, VectorStoreConfig};

pub const DEFAULT_MAX_ENTRIES: u64 = 10_000;

/// Document entry stored in moka
#[derive(Debug, Clone)]
struct StoredDocument {
    document: VectorDocument,
    /// Expiration timestamp (millis since epoch), if saved with a TTL
    expires_at: Option<u64>,
}

/// Thread-safe in-memory vector store using moka
///
/// Performs an exact linear KNN scan with the configured metric, so results
/// follow the same normalization and threshold rules as the Redis store.
/// Useful for tests and single-process deployments.
#[derive(Debug)]
pub struct InMemoryVectorStore {
    documents: MokaCache<String, StoredDocument>,
    config: VectorStoreConfig,
}

impl InMemoryVectorStore {
    pub fn new(config: VectorStoreConfig) -> Result<Self, DomainError> {
        Self::with_max_entries(config, DEFAULT_MAX_ENTRIES)
    }

    /// Bound the number of stored documents
    ///
    /// The bound is best-effort: moka's admission policy decides what stays
    /// once the store is full, so a save at capacity can be dropped without an
    /// error and never show up in later searches.
    pub fn with_max_entries(config: VectorStoreConfig, max_entries: u64) -> Result<Self, DomainError> {
        config.validate()?;

        Ok(Self {
            documents: MokaCache::builder().max_capacity(max_entries).build(),
            config,
        })
    }

    pub fn config(&self) -> &VectorStoreConfig {
        &self.config
    }

    /// Number of stored documents, including expired ones not yet purged
    pub fn len(&self) -> u64 {
        self.documents.entry_count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn current_time_millis() -> u64 {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis() as u64
    }

    fn is_expired(entry: &StoredDocument, now: u64) -> bool {
        entry.expires_at.is_some_and(|expires_at| now >= expires_at)
    }

    async fn insert(&self, document: VectorDocument, expires_at: Option<u64>) {
        let id = Uuid::new_v4().to_string();
        self.documents
            .insert(id, StoredDocument { document, expires_at })
            .await;
    }
}

#[async_trait]
impl VectorStore for InMemoryVectorStore {
    async fn save(&self, document: VectorDocument) -> Result<(), DomainError> {
        self.config.check_dimensions(document.vector())?;
        self.insert(document, None).await;
        Ok(())
    }

    async fn save_with_ttl(
        &self,
        document: VectorDocument,
        ttl: Duration,
    ) -> Result<(), DomainError> {
        self.config.check_dimensions(document.vector())?;

        let expires_at = Self::current_time_millis().saturating_add(expiry_secs(ttl) * 1000);
        self.insert(document, Some(expires_at)).await;
        Ok(())
    }

    async fn similarity_search(
        &self,
        vector: &[f32],
    ) -> Result<Option<VectorDocument>, DomainError> {
        self.config.check_dimensions(vector)?;

        let metric = self.config.metric_type;
        let now = Self::current_time_millis();
        let mut expired = Vec::new();
        let mut nearest: Option<(f64, VectorDocument)> = None;

        for (id, entry) in self.documents.iter() {
            if Self::is_expired(&entry, now) {
                expired.push(id);
                continue;
            }

            let distance = metric.distance(vector, entry.document.vector());
            if distance.is_nan() {
                continue;
            }

            if nearest.as_ref().is_none_or(|(best, _)| distance < *best) {
                nearest = Some((distance, entry.document));
            }
        }

        for id in expired {
            self.documents.invalidate(id.as_str()).await;
        }

        let Some((distance, document)) = nearest else {
            return Ok(None);
        };

        let similarity = metric.normalize(distance);
        if !self.config.is_hit(similarity) {
            debug!(
                similarity,
                threshold = self.config.similarity_threshold,
                "Nearest document below similarity threshold"
            );
            return Ok(None);
        }

        Ok(Some(document))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::vector_store::MetricType;

    fn store() -> InMemoryVectorStore {
        InMemoryVectorStore::new(VectorStoreConfig::new(3).with_similarity_threshold(0.99)).unwrap()
    }

    #[tokio::test]
    async fn test_save_and_search() {
        let store = store();
        let document = VectorDocument::new(vec![1.0, 2.0, 3.0], "Some query1", "Some answer1");

        store.save(document.clone()).await.unwrap();

        let found = store.similarity_search(&[1.0, 2.0, 3.0]).await.unwrap();
        assert_eq!(found, Some(document));
    }

    #[tokio::test]
    async fn test_empty_store_is_miss() {
        let found = store().similarity_search(&[1.0, 2.0, 3.0]).await.unwrap();

        assert!(found.is_none());
    }

    #[tokio::test]
    async fn test_finds_nearest_of_two() {
        let store = store();
        let first = VectorDocument::new(vec![150.3, 240.7, 450.2], "Some query3", "Some answer3");
        let second = VectorDocument::new(vec![1500.3, -2400.7, 4500.2], "Some query4", "Some answer4");

        store.save(first).await.unwrap();
        store.save(second.clone()).await.unwrap();

        let found = store.similarity_search(&[1500.3, -2400.7, 4500.2]).await.unwrap();
        assert_eq!(found, Some(second));
    }

    #[tokio::test]
    async fn test_below_threshold_is_miss() {
        let store = store();
        store
            .save(VectorDocument::new(vec![1.0, 0.0, 0.0], "k", "v"))
            .await
            .unwrap();

        let found = store.similarity_search(&[0.0, 1.0, 0.0]).await.unwrap();

        assert!(found.is_none());
    }

    #[tokio::test]
    async fn test_duplicate_keys_coexist() {
        let store = store();
        store
            .save(VectorDocument::new(vec![1.0, 0.0, 0.0], "same", "first"))
            .await
            .unwrap();
        store
            .save(VectorDocument::new(vec![0.0, 1.0, 0.0], "same", "second"))
            .await
            .unwrap();
        store.documents.run_pending_tasks().await;

        assert_eq!(store.len(), 2);
    }

    #[tokio::test]
    async fn test_save_with_ttl_expires() {
        let store = store();
        let document = VectorDocument::new(vec![15.3, 24.7, 45.2], "Some query2", "Some answer2");

        store
            .save_with_ttl(document.clone(), Duration::from_secs(1))
            .await
            .unwrap();

        assert_eq!(
            store.similarity_search(&[15.3, 24.7, 45.2]).await.unwrap(),
            Some(document)
        );

        tokio::time::sleep(Duration::from_millis(1100)).await;

        assert!(store.similarity_search(&[15.3, 24.7, 45.2]).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_sub_second_ttl_lasts_a_full_second() {
        let store = store();
        let document = VectorDocument::new(vec![1.0, 2.0, 3.0], "k", "v");

        store
            .save_with_ttl(document.clone(), Duration::from_millis(200))
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_millis(500)).await;

        assert_eq!(store.similarity_search(&[1.0, 2.0, 3.0]).await.unwrap(), Some(document));
    }

    #[tokio::test]
    async fn test_huge_ttl_is_kept() {
        let store = store();
        let document = VectorDocument::new(vec![1.0, 2.0, 3.0], "k", "v");

        store
            .save_with_ttl(document.clone(), Duration::from_secs(u64::MAX / 500))
            .await
            .unwrap();
        store
            .save_with_ttl(document.clone(), Duration::MAX)
            .await
            .unwrap();

        assert_eq!(store.similarity_search(&[1.0, 2.0, 3.0]).await.unwrap(), Some(document));
    }

    #[tokio::test]
    async fn test_capacity_bound_is_best_effort() {
        let store =
            InMemoryVectorStore::with_max_entries(VectorStoreConfig::new(3), 1).unwrap();

        store
            .save(VectorDocument::new(vec![1.0, 0.0, 0.0], "first", "1"))
            .await
            .unwrap();
        store
            .save(VectorDocument::new(vec![0.0, 1.0, 0.0], "second", "2"))
            .await
            .unwrap();
        store.documents.run_pending_tasks().await;

        assert!(store.len() <= 1);
    }

    #[tokio::test]
    async fn test_nan_vector_does_not_shadow_match() {
        let store = store();
        let document = VectorDocument::new(vec![1.0, 2.0, 3.0], "k", "v");

        store
            .save(VectorDocument::new(vec![f32::NAN, 0.0, 0.0], "broken", "nan"))
            .await
            .unwrap();
        store.save(document.clone()).await.unwrap();

        assert_eq!(store.similarity_search(&[1.0, 2.0, 3.0]).await.unwrap(), Some(document));
    }

    #[tokio::test]
    async fn test_dimension_mismatch() {
        let store = store();

        let save = store.save(VectorDocument::new(vec![1.0], "k", "v")).await;
        let search = store.similarity_search(&[1.0, 2.0]).await;

        assert!(matches!(save, Err(DomainError::DimensionMismatch { expected: 3, actual: 1 })));
        assert!(matches!(search, Err(DomainError::DimensionMismatch { .. })));
    }

    #[tokio::test]
    async fn test_l2_metric() {
        let config = VectorStoreConfig::new(2)
            .with_metric_type(MetricType::L2)
            .with_similarity_threshold(0.5);
        let store = InMemoryVectorStore::new(config).unwrap();
        store
            .save(VectorDocument::new(vec![0.0, 0.0], "origin", "zero"))
            .await
            .unwrap();

        // squared distance 0.5 -> similarity ~0.667
        assert!(store.similarity_search(&[0.5, 0.5]).await.unwrap().is_some());
        // squared distance 8 -> similarity ~0.111
        assert!(store.similarity_search(&[2.0, 2.0]).await.unwrap().is_none());
    }

    #[test]
    fn test_invalid_config_rejected() {
        assert!(InMemoryVectorStore::new(VectorStoreConfig::new(0)).is_err());
    }
}
