//! Semantic caching service
//!
//! Composes an embedding provider with a vector store: keys are embedded on
//! write and on lookup, and lookups return the value of the nearest stored key
//! that clears the store's similarity threshold.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use crate::domain::DomainError;
use crate::domain::embedding::{EmbeddingProvider, EmbeddingRequest};
use crate::domain::semantic_cache::SemanticCache;
use crate::domain::vector_store::{VectorDocument, VectorStore};

/// Semantic cache backed by an embedding provider and a vector store
///
/// Collaborator failures are propagated unchanged; `Ok(None)` only ever means
/// no stored key was close enough.
pub struct SemanticCacheService {
    embedding_provider: Arc<dyn EmbeddingProvider>,
    vector_store: Arc<dyn VectorStore>,
    model: String,
}

impl fmt::Debug for SemanticCacheService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SemanticCacheService")
            .field("embedding_provider", &self.embedding_provider)
            .field("vector_store", &"<VectorStore>")
            .field("model", &self.model)
            .finish()
    }
}

impl SemanticCacheService {
    /// Create a service embedding with the provider's default model
    pub fn new(
        embedding_provider: Arc<dyn EmbeddingProvider>,
        vector_store: Arc<dyn VectorStore>,
    ) -> Self {
        let model = embedding_provider.default_model().to_string();

        Self {
            embedding_provider,
            vector_store,
            model,
        }
    }

    /// Embed with a specific model instead of the provider default
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    async fn generate_embedding(&self, text: &str) -> Result<Vec<f32>, DomainError> {
        let request = EmbeddingRequest::single(&self.model, text);
        let response = self.embedding_provider.embed(request).await?;

        response.into_first_vector().ok_or_else(|| {
            DomainError::provider(self.embedding_provider.provider_name(), "No embedding returned")
        })
    }
}

#[async_trait]
impl SemanticCache for SemanticCacheService {
    async fn set(&self, key: &str, value: &str) -> Result<(), DomainError> {
        let vector = self.generate_embedding(key).await?;

        self.vector_store
            .save(VectorDocument::new(vector, key, value))
            .await?;

        debug!(key, "Cached value");
        Ok(())
    }

    async fn set_with_ttl(
        &self,
        key: &str,
        value: &str,
        ttl: Duration,
    ) -> Result<(), DomainError> {
        let vector = self.generate_embedding(key).await?;

        self.vector_store
            .save_with_ttl(VectorDocument::new(vector, key, value), ttl)
            .await?;

        debug!(key, ttl_secs = ttl.as_secs(), "Cached value with TTL");
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<String>, DomainError> {
        let vector = self.generate_embedding(key).await?;

        match self.vector_store.similarity_search(&vector).await? {
            Some(document) => {
                debug!(key, matched_key = document.key(), "Semantic cache hit");
                Ok(Some(document.into_value()))
            }
            None => {
                debug!(key, "Semantic cache miss");
                Ok(None)
            }
        }
    }
}
