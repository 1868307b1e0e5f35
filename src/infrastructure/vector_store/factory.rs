//! Vector store factory for runtime selection

use std::sync::Arc;

use serde::Deserialize;
use tracing::info;

use super::in_memory::{InMemoryVectorStore, DEFAULT_MAX_ENTRIES};
use super::redis::{RedisConnectionConfig, RedisVectorStore};
use crate::domain::DomainError;
use crate::domain::vector_store::{VectorStore, VectorStoreConfig};

/// Supported vector store backends
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VectorStoreType {
    /// Redis Stack with RedisJSON and RediSearch
    #[default]
    Redis,
    /// Process-local store using moka
    #[serde(alias = "memory", alias = "inmemory")]
    InMemory,
}

impl std::fmt::Display for VectorStoreType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VectorStoreType::Redis => write!(f, "redis"),
            VectorStoreType::InMemory => write!(f, "in_memory"),
        }
    }
}

impl std::str::FromStr for VectorStoreType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "redis" => Ok(VectorStoreType::Redis),
            "in_memory" | "inmemory" | "memory" => Ok(VectorStoreType::InMemory),
            _ => Err(DomainError::configuration(format!(
                "Unknown vector store backend: {}. Valid backends: redis, in_memory",
                s
            ))),
        }
    }
}

/// Backend selection plus the settings every store shares
#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    #[serde(default)]
    pub backend: VectorStoreType,

    #[serde(flatten)]
    pub vector: VectorStoreConfig,

    /// Capacity of the in-memory backend
    #[serde(default = "default_max_entries")]
    pub max_entries: u64,
}

fn default_max_entries() -> u64 {
    DEFAULT_MAX_ENTRIES
}

impl StoreConfig {
    pub fn new(backend: VectorStoreType, vector: VectorStoreConfig) -> Self {
        Self {
            backend,
            vector,
            max_entries: DEFAULT_MAX_ENTRIES,
        }
    }
}

/// Factory for creating vector stores
pub struct VectorStoreFactory;

impl VectorStoreFactory {
    /// Creates a store; the Redis backend connects and bootstraps its index first
    pub async fn create(
        config: &StoreConfig,
        redis: &RedisConnectionConfig,
    ) -> Result<Arc<dyn VectorStore>, DomainError> {
        let store: Arc<dyn VectorStore> = match config.backend {
            VectorStoreType::Redis => {
                Arc::new(RedisVectorStore::connect(redis, config.vector.clone()).await?)
            }
            VectorStoreType::InMemory => Arc::new(InMemoryVectorStore::with_max_entries(
                config.vector.clone(),
                config.max_entries,
            )?),
        };

        info!(
            "Using {} vector store '{}' ({} dimensions, {} metric, threshold {})",
            config.backend,
            config.vector.index_name,
            config.vector.vector_dimensionality,
            config.vector.metric_type,
            config.vector.similarity_threshold
        );

        Ok(store)
    }
}
