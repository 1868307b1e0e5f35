//! Vector store trait

use std::time::Duration;

use async_trait::async_trait;

#[cfg(test)]
use mockall::automock;

use super::VectorDocument;
use crate::domain::DomainError;

/// Longest expiration a store applies (100 years); longer TTLs are clamped to it
pub const MAX_TTL: Duration = Duration::from_secs(100 * 365 * 24 * 60 * 60);

/// Whole seconds after which a document saved with `ttl` expires
///
/// Sub-second TTLs round up to one second so they never mean "no expiry";
/// anything past [`MAX_TTL`] is clamped so engines never see an out-of-range
/// or negative expiration.
pub fn expiry_secs(ttl: Duration) -> u64 {
    ttl.as_secs().clamp(1, MAX_TTL.as_secs())
}

/// Storage and nearest-neighbor retrieval of [`VectorDocument`]s
///
/// Implementations must be safe to call concurrently; they hold no mutable
/// state beyond what their client or pool manages internally.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Persist a document with no expiration
    async fn save(&self, document: VectorDocument) -> Result<(), DomainError>;

    /// Persist a document that stops being searchable once `ttl` has elapsed
    async fn save_with_ttl(&self, document: VectorDocument, ttl: Duration)
    -> Result<(), DomainError>;

    /// Return the single nearest live document, if its normalized similarity
    /// to `vector` reaches the configured threshold
    async fn similarity_search(&self, vector: &[f32])
    -> Result<Option<VectorDocument>, DomainError>;
}
