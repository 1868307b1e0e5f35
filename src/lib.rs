//! Semantic cache
//!
//! A key/value cache whose lookups match on meaning:
//! - Keys are embedded through a pluggable provider (Ollama, OpenAI)
//! - Documents live in a vector store (Redis Stack or in-memory)
//! - Lookups return the nearest stored key's value above a similarity threshold

pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::AppConfig;
pub use domain::semantic_cache::SemanticCache;
pub use domain::DomainError;
pub use infrastructure::services::SemanticCacheService;
