//! Vector store domain models and traits
//!
//! Documents pair an embedding with its source text and a cached value;
//! stores answer top-1 nearest-neighbor queries filtered by a similarity
//! threshold.

mod config;
mod document;
mod metric;
mod store;

pub use config::{VectorAlgorithm, VectorStoreConfig};
pub use document::VectorDocument;
pub use metric::MetricType;
pub use store::{expiry_secs, VectorStore, MAX_TTL};

#[cfg(test)]
pub use store::MockVectorStore;
