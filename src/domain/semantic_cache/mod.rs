//! Semantic cache domain trait
//!
//! Provides vector-based caching that matches semantically similar queries
//! rather than requiring exact key matches.

mod cache;

pub use cache::SemanticCache;
