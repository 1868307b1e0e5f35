//! Embedding provider implementations

mod factory;
mod ollama;
mod openai;

pub use factory::{EmbeddingConfig, EmbeddingProviderFactory, EmbeddingProviderType};
pub use ollama::OllamaEmbeddingProvider;
pub use openai::OpenAiEmbeddingProvider;
