use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::RwLock;

use super::KeyValueCache;
use crate::{AppError, Result};

/// Кэш в памяти процесса, только для тестов: `run` всегда работает с Redis
#[derive(Default)]
pub struct InMemoryCache {
    entries: RwLock<HashMap<String, String>>,
    unavailable: AtomicBool,
}

impl InMemoryCache {
    pub fn new() -> Self {
        Self::default()
    }
    /// Переводит кэш в режим, где каждая операция возвращает ошибку
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }
    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
    fn check(&self) -> Result<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            let err = redis::RedisError::from((redis::ErrorKind::IoError, "cache is unavailable"));
            return Err(AppError::Cache(err));
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl KeyValueCache for InMemoryCache {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        self.check()?;
        Ok(self.entries.read().await.get(key).cloned())
    }
    async fn set(&self, key: &str, value: &str) -> Result<()> {
        self.check()?;
        self.entries
            .write()
            .await
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}
