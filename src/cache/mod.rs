mod keys;
mod memory;
mod redis_cache;

pub use keys::{exchange_rate_key, supported_currencies_key};
pub use memory::InMemoryCache;
pub use redis_cache::RedisCache;

use crate::Result;

/// Хранилище строковых значений по ключу
#[async_trait::async_trait]
pub trait KeyValueCache: Send + Sync {
    /// `None` если ключа нет
    async fn get(&self, key: &str) -> Result<Option<String>>;
    /// Перезаписывает значение без условий
    async fn set(&self, key: &str, value: &str) -> Result<()>;
}
