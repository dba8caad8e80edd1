use std::time::Duration;

use redis::aio::ConnectionManager;
use redis::AsyncCommands;

use super::KeyValueCache;
use crate::Result;

/// Клиент Redis поверх мультиплексированного соединения с автоматическим переподключением
#[derive(Clone)]
pub struct RedisCache {
    connection: ConnectionManager,
    ttl: Option<Duration>,
}

impl RedisCache {
    pub async fn connect(url: &str, ttl: Option<Duration>) -> Result<Self> {
        let client = redis::Client::open(url)?;
        let connection = ConnectionManager::new(client).await?;
        tracing::info!("Подключилась к Redis");
        Ok(Self { connection, ttl })
    }
}

#[async_trait::async_trait]
impl KeyValueCache for RedisCache {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let mut connection = self.connection.clone();
        let value: Option<String> = connection.get(key).await?;
        Ok(value)
    }
    async fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut connection = self.connection.clone();
        match self.ttl {
            Some(ttl) => {
                connection
                    .set_ex::<_, _, ()>(key, value, ttl.as_secs())
                    .await?
            }
            None => connection.set::<_, _, ()>(key, value).await?,
        }
        Ok(())
    }
}
