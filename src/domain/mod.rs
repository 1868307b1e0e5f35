//! Domain layer: core types and traits, independent of any backend

pub mod embedding;
pub mod error;
pub mod semantic_cache;
pub mod vector_store;

pub use error::DomainError;
