use std::time::Duration;

use chrono::NaiveDate;
use serde_json::Value;

use crate::Result;

/// Источник курсов валют
#[async_trait::async_trait]
pub trait ExchangeApi: Send + Sync {
    /// Тело ответа как есть, ожидается объект `код -> название`
    async fn fetch_supported_currencies(&self) -> Result<Value>;
    /// Тело ответа как есть, ожидается объект с полем `rates`
    async fn fetch_historical_rate(&self, date: NaiveDate, from: &str, to: &str) -> Result<Value>;
}

/// Клиент openexchangerates.org
#[derive(Clone)]
pub struct OpenExchangeClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl OpenExchangeClient {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .gzip(true)
            .timeout(timeout)
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        })
    }

    async fn get_json(&self, url: &str, query: &[(&str, &str)]) -> Result<Value> {
        let response = self.client.get(url).query(query).send().await?;
        let status = response.status();
        if !status.is_success() {
            tracing::warn!("upstream responded {status} for {url}");
        }
        let body = response.json::<Value>().await?;
        Ok(body)
    }
}

#[async_trait::async_trait]
impl ExchangeApi for OpenExchangeClient {
    async fn fetch_supported_currencies(&self) -> Result<Value> {
        let url = format!("{}/currencies.json", self.base_url);
        self.get_json(&url, &[]).await
    }

    async fn fetch_historical_rate(&self, date: NaiveDate, from: &str, to: &str) -> Result<Value> {
        let url = format!("{}/historical/{}.json", self.base_url, date.format("%Y-%m-%d"));
        let query = [("app_id", self.api_key.as_str()), ("base", from), ("symbols", to)];
        self.get_json(&url, &query).await
    }
}
