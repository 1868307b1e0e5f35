//! Cache commands - one-shot set and get against the configured backends

use std::time::Duration;

use tracing::{info, warn};

use super::{GetArgs, SetArgs};
use crate::config::AppConfig;
use crate::domain::semantic_cache::SemanticCache;
use crate::infrastructure::embedding::EmbeddingProviderFactory;
use crate::infrastructure::logging;
use crate::infrastructure::services::SemanticCacheService;
use crate::infrastructure::vector_store::VectorStoreFactory;

pub const NO_ANSWER: &str = "No answer found";

/// Store a value, optionally with a TTL
pub async fn set(args: SetArgs) -> anyhow::Result<()> {
    let cache = build_cache().await?;

    match args.ttl_secs {
        Some(secs) => {
            cache
                .set_with_ttl(&args.key, &args.value, Duration::from_secs(secs))
                .await?
        }
        None => cache.set(&args.key, &args.value).await?,
    }

    info!("Stored value for '{}'", args.key);
    Ok(())
}

/// Print the matched value, or a notice on a miss
pub async fn get(args: GetArgs) -> anyhow::Result<()> {
    let cache = build_cache().await?;

    let answer = cache.get(&args.key).await?;
    println!("{}", answer.as_deref().unwrap_or(NO_ANSWER));

    Ok(())
}

async fn build_cache() -> anyhow::Result<SemanticCacheService> {
    dotenvy::dotenv().ok();

    let config = AppConfig::load()?;
    logging::init_logging(&config.logging);

    let provider = EmbeddingProviderFactory::create(&config.embedding)?;
    let expected = config.store.vector.vector_dimensionality;

    if let Some(dims) = provider.dimensions(provider.default_model()) {
        if dims != expected {
            warn!(
                "Model {} produces {} dimensions but the store expects {}",
                provider.default_model(),
                dims,
                expected
            );
        }
    }

    let store = VectorStoreFactory::create(&config.store, &config.redis).await?;

    Ok(SemanticCacheService::new(provider, store))
}
