//! Vector store implementations

mod factory;
mod in_memory;
mod redis;
mod schema;

pub use factory::{StoreConfig, VectorStoreFactory, VectorStoreType};
pub use in_memory::InMemoryVectorStore;
pub use redis::{IdGenerator, IndexStatus, RedisConnectionConfig, RedisVectorStore};
pub use schema::{RedisSchema, KEY_PREFIX};
