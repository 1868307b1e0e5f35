//! Embedding provider factory for runtime selection

use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;
use tracing::info;

use super::ollama::OllamaEmbeddingProvider;
use super::openai::OpenAiEmbeddingProvider;
use crate::domain::DomainError;
use crate::domain::embedding::EmbeddingProvider;
use crate::infrastructure::http_client::HttpClient;

/// Supported embedding providers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmbeddingProviderType {
    #[default]
    Ollama,
    #[serde(alias = "open_ai")]
    OpenAi,
}

impl std::fmt::Display for EmbeddingProviderType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EmbeddingProviderType::Ollama => write!(f, "ollama"),
            EmbeddingProviderType::OpenAi => write!(f, "openai"),
        }
    }
}

impl std::str::FromStr for EmbeddingProviderType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "ollama" => Ok(EmbeddingProviderType::Ollama),
            "openai" | "open_ai" => Ok(EmbeddingProviderType::OpenAi),
            _ => Err(DomainError::configuration(format!(
                "Unknown embedding provider: {}. Valid providers: ollama, openai",
                s
            ))),
        }
    }
}

/// Embedding provider settings
#[derive(Debug, Clone, Deserialize)]
pub struct EmbeddingConfig {
    #[serde(default)]
    pub provider: EmbeddingProviderType,
    /// Model name; the provider's default when absent
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub base_url: Option<String>,
    /// API key (OpenAI only)
    #[serde(default)]
    pub api_key: Option<String>,
    /// HTTP request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    30
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: EmbeddingProviderType::default(),
            model: None,
            base_url: None,
            api_key: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Factory for creating embedding providers
pub struct EmbeddingProviderFactory;

impl EmbeddingProviderFactory {
    /// Creates a provider from configuration
    pub fn create(config: &EmbeddingConfig) -> Result<Arc<dyn EmbeddingProvider>, DomainError> {
        let client = HttpClient::with_timeout(Duration::from_secs(config.timeout_secs))?;

        let provider: Arc<dyn EmbeddingProvider> = match config.provider {
            EmbeddingProviderType::Ollama => {
                let mut provider = match &config.base_url {
                    Some(url) => OllamaEmbeddingProvider::with_base_url(client, url),
                    None => OllamaEmbeddingProvider::new(client),
                };
                if let Some(model) = &config.model {
                    provider = provider.with_model(model);
                }
                Arc::new(provider)
            }
            EmbeddingProviderType::OpenAi => {
                let api_key = config.api_key.clone().ok_or_else(|| {
                    DomainError::configuration("api_key is required for the openai provider")
                })?;
                let mut provider = match &config.base_url {
                    Some(url) => OpenAiEmbeddingProvider::with_base_url(client, api_key, url),
                    None => OpenAiEmbeddingProvider::new(client, api_key),
                };
                if let Some(model) = &config.model {
                    provider = provider.with_model(model);
                }
                Arc::new(provider)
            }
        };

        info!(
            "Using {} embedding provider with model {}",
            provider.provider_name(),
            provider.default_model()
        );

        Ok(provider)
    }
}
