mod in_memory;
pub mod redis;

pub use in_memory::{InMemoryDocumentStore, InMemorySettingsStore};
pub use self::redis::{RedisDocumentStore, RedisSettingsStore};
