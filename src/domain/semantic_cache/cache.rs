//! Semantic cache trait

use std::fmt::Debug;
use std::time::Duration;

use async_trait::async_trait;

use crate::domain::DomainError;

/// Key/value cache whose lookups match on meaning rather than exact keys
///
/// Keys are natural-language text. `get("most populated city in the USA?")`
/// can return the value stored under `"largest city in USA by population"`
/// when the two embed close enough together.
#[async_trait]
pub trait SemanticCache: Send + Sync + Debug {
    /// Store a value with no expiration
    async fn set(&self, key: &str, value: &str) -> Result<(), DomainError>;

    /// Store a value that becomes unreachable once `ttl` has elapsed
    async fn set_with_ttl(&self, key: &str, value: &str, ttl: Duration)
    -> Result<(), DomainError>;

    /// Look up the value of the closest stored key meeting the similarity threshold
    ///
    /// `Ok(None)` is a miss; errors are reserved for failing collaborators.
    async fn get(&self, key: &str) -> Result<Option<String>, DomainError>;
}
