use std::sync::Arc;

use serde_json::Value;

use crate::cache::{exchange_rate_key, supported_currencies_key, KeyValueCache};
use crate::exchange_client::ExchangeApi;
use crate::models::{today, ExchangeRequest, SupportedCurrencies};
use crate::{AppError, Result};

/// Список валют и конвертация с кэшированием ответов поставщика
#[derive(Clone)]
pub struct CurrencyService {
    cache: Arc<dyn KeyValueCache>,
    api: Arc<dyn ExchangeApi>,
}

impl CurrencyService {
    pub fn new(cache: Arc<dyn KeyValueCache>, api: Arc<dyn ExchangeApi>) -> Self {
        Self { cache, api }
    }

    /// Валюты на сегодня: из кэша, иначе у поставщика
    pub async fn supported_currencies(&self) -> Result<SupportedCurrencies> {
        let key = supported_currencies_key(today());
        if let Some(cached) = self.cached(&key).await {
            match serde_json::from_str::<SupportedCurrencies>(&cached) {
                Ok(currencies) => {
                    tracing::debug!("{key}: взяла список валют из кэша");
                    return Ok(currencies);
                }
                Err(e) => tracing::warn!("{key}: не удалось разобрать кэш, иду к поставщику: {e}"),
            }
        }
        let body = self.api.fetch_supported_currencies().await?;
        let currencies: SupportedCurrencies = serde_json::from_value(body).map_err(|e| {
            AppError::UnexpectedResponse(format!("currency list is not a code -> name map: {e}"))
        })?;
        if currencies.is_empty() {
            tracing::warn!("Поставщик вернул пустой список валют, не кэширую");
        } else {
            tracing::info!("Получено {} валют от поставщика", currencies.len());
            self.store(key, serde_json::to_string(&currencies)?);
        }
        Ok(currencies)
    }

    /// Переводит сумму по курсу на `historic_date` (по умолчанию сегодня).
    /// В кэш попадает курс, а не результат, поэтому ключ не зависит от суммы.
    pub async fn convert(&self, request: &ExchangeRequest) -> Result<f64> {
        let date = request.historic_date.unwrap_or_else(today);
        let from = request.currency_from.as_str();
        let to = request.currency_to.as_str();
        let key = exchange_rate_key(from, to, date);
        if let Some(cached) = self.cached(&key).await {
            match cached.trim().parse::<f64>() {
                Ok(rate) => {
                    tracing::debug!("{key}: курс {rate} из кэша");
                    return Ok(rate * request.amount);
                }
                Err(e) => tracing::warn!("{key}: в кэше не число '{cached}': {e}"),
            }
        }
        let body = self.api.fetch_historical_rate(date, from, to).await?;
        let rate = extract_rate(&body, to).map_err(|reason| AppError::RateUnavailable {
            from: from.to_string(),
            to: to.to_string(),
            date,
            reason,
        })?;
        tracing::debug!("{key}: курс {rate} от поставщика");
        self.store(key, rate.to_string());
        Ok(rate * request.amount)
    }

    /// Ошибка кэша не роняет запрос, считаем что значения нет
    async fn cached(&self, key: &str) -> Option<String> {
        match self.cache.get(key).await {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!("{key}: кэш недоступен, работаю без него: {e}");
                None
            }
        }
    }

    /// Запись в кэш в фоне, ответ её не ждёт
    fn store(&self, key: String, value: String) {
        let cache = self.cache.clone();
        tokio::spawn(async move {
            match cache.set(&key, &value).await {
                Ok(()) => tracing::debug!("{key}: сохранила в кэш"),
                Err(e) => tracing::warn!("{key}: не удалось сохранить в кэш: {e}"),
            }
        });
    }
}

fn extract_rate(body: &Value, to: &str) -> core::result::Result<f64, String> {
    if let Some(rate) = body
        .get("rates")
        .and_then(|rates| rates.get(to))
        .and_then(Value::as_f64)
    {
        return Ok(rate);
    }
    let reason = ["description", "message"]
        .iter()
        .find_map(|field| body.get(*field).and_then(Value::as_str))
        .map(str::to_string)
        .unwrap_or_else(|| format!("no rate for {to} in upstream response"));
    Err(reason)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::InMemoryCache;
    use anyhow::Result;
    use chrono::NaiveDate;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingApi {
        currencies: Value,
        rates: Value,
        currency_calls: AtomicUsize,
        rate_calls: AtomicUsize,
    }

    impl CountingApi {
        fn new(currencies: Value, rates: Value) -> Arc<Self> {
            Arc::new(Self {
                currencies,
                rates,
                currency_calls: AtomicUsize::new(0),
                rate_calls: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait::async_trait]
    impl ExchangeApi for CountingApi {
        async fn fetch_supported_currencies(&self) -> crate::Result<Value> {
            self.currency_calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.currencies.clone())
        }
        async fn fetch_historical_rate(
            &self,
            _date: NaiveDate,
            _from: &str,
            _to: &str,
        ) -> crate::Result<Value> {
            self.rate_calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.rates.clone())
        }
    }

    fn service(cache: &Arc<InMemoryCache>, api: &Arc<CountingApi>) -> CurrencyService {
        CurrencyService::new(cache.clone(), api.clone())
    }

    // даёт фоновой записи в кэш отработать
    async fn settle() {
        for _ in 0..10 {
            tokio::task::yield_now().await;
        }
    }

    fn jan_17() -> NaiveDate {
        NaiveDate::from_ymd_opt(2022, 1, 17).unwrap()
    }

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-9,
            "expected {expected}, got {actual}"
        );
    }

    #[tokio::test]
    async fn test_cache_hit_does_not_call_upstream() -> Result<()> {
        let cache = Arc::new(InMemoryCache::new());
        cache.set("GBP_USD_2022-01-17", "1.35").await?;
        let api = CountingApi::new(json!({}), json!({}));
        let request = ExchangeRequest::new("GBP", "USD", 22.0).on(jan_17());
        let result = service(&cache, &api).convert(&request).await?;
        assert_close(result, 29.7);
        assert_eq!(api.rate_calls.load(Ordering::SeqCst), 0);
        Ok(())
    }

    #[tokio::test]
    async fn test_cache_miss_fetches_and_stores_rate() -> Result<()> {
        let cache = Arc::new(InMemoryCache::new());
        let api = CountingApi::new(json!({}), json!({"rates": {"USD": 1.35}}));
        let request = ExchangeRequest::new("GBP", "USD", 22.0).on(jan_17());
        let result = service(&cache, &api).convert(&request).await?;
        assert_close(result, 29.7);
        settle().await;
        assert_eq!(
            cache.get("GBP_USD_2022-01-17").await?.as_deref(),
            Some("1.35")
        );
        assert_eq!(api.rate_calls.load(Ordering::SeqCst), 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_amount_is_not_part_of_the_key() -> Result<()> {
        let cache = Arc::new(InMemoryCache::new());
        let api = CountingApi::new(json!({}), json!({"rates": {"USD": 1.5}}));
        let service = service(&cache, &api);
        service
            .convert(&ExchangeRequest::new("GBP", "USD", 10.0).on(jan_17()))
            .await?;
        settle().await;
        let second = service
            .convert(&ExchangeRequest::new("GBP", "USD", 4.0).on(jan_17()))
            .await?;
        assert_close(second, 6.0);
        assert_eq!(api.rate_calls.load(Ordering::SeqCst), 1);
        assert_eq!(cache.len().await, 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_missing_rates_is_rate_unavailable_and_not_cached() -> Result<()> {
        let cache = Arc::new(InMemoryCache::new());
        let api = CountingApi::new(
            json!({}),
            json!({"error": true, "status": 400, "description": "Invalid base currency"}),
        );
        let request = ExchangeRequest::new("GBP", "XXX", 22.0).on(jan_17());
        let result = service(&cache, &api).convert(&request).await;
        match result {
            Err(AppError::RateUnavailable { to, reason, .. }) => {
                assert_eq!(to, "XXX");
                assert_eq!(reason, "Invalid base currency");
            }
            other => panic!("expected RateUnavailable, got {other:?}"),
        }
        settle().await;
        assert!(cache.is_empty().await);
        Ok(())
    }

    #[tokio::test]
    async fn test_default_date_is_today() -> Result<()> {
        let cache = Arc::new(InMemoryCache::new());
        let api = CountingApi::new(json!({}), json!({"rates": {"USD": 2.0}}));
        let result = service(&cache, &api)
            .convert(&ExchangeRequest::new("GBP", "USD", 3.0))
            .await?;
        assert_close(result, 6.0);
        settle().await;
        let key = exchange_rate_key("GBP", "USD", today());
        assert_eq!(cache.get(&key).await?.as_deref(), Some("2"));
        Ok(())
    }

    #[tokio::test]
    async fn test_corrupt_cached_rate_falls_back_to_upstream() -> Result<()> {
        let cache = Arc::new(InMemoryCache::new());
        cache.set("GBP_USD_2022-01-17", "not-a-number").await?;
        let api = CountingApi::new(json!({}), json!({"rates": {"USD": 1.25}}));
        let request = ExchangeRequest::new("GBP", "USD", 4.0).on(jan_17());
        let result = service(&cache, &api).convert(&request).await?;
        assert_close(result, 5.0);
        assert_eq!(api.rate_calls.load(Ordering::SeqCst), 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_unavailable_cache_degrades_to_upstream() -> Result<()> {
        let cache = Arc::new(InMemoryCache::new());
        cache.set_unavailable(true);
        let api = CountingApi::new(
            json!({"USD": "United States Dollar"}),
            json!({"rates": {"USD": 1.35}}),
        );
        let service = service(&cache, &api);
        let request = ExchangeRequest::new("GBP", "USD", 22.0).on(jan_17());
        assert_close(service.convert(&request).await?, 29.7);
        assert_eq!(service.supported_currencies().await?.len(), 1);
        settle().await;
        cache.set_unavailable(false);
        assert!(cache.is_empty().await);
        Ok(())
    }

    #[tokio::test]
    async fn test_supported_currencies_cached_for_the_day() -> Result<()> {
        let cache = Arc::new(InMemoryCache::new());
        let api = CountingApi::new(
            json!({"GBP": "British Pound Sterling", "USD": "United States Dollar"}),
            json!({}),
        );
        let service = service(&cache, &api);
        let first = service.supported_currencies().await?;
        settle().await;
        let second = service.supported_currencies().await?;
        assert_eq!(first, second);
        assert_eq!(second.get("GBP").map(String::as_str), Some("British Pound Sterling"));
        assert_eq!(api.currency_calls.load(Ordering::SeqCst), 1);
        let key = supported_currencies_key(today());
        assert!(cache.get(&key).await?.is_some());
        Ok(())
    }

    #[tokio::test]
    async fn test_empty_currency_list_not_cached() -> Result<()> {
        let cache = Arc::new(InMemoryCache::new());
        let api = CountingApi::new(json!({}), json!({}));
        let currencies = service(&cache, &api).supported_currencies().await?;
        assert!(currencies.is_empty());
        settle().await;
        assert!(cache.is_empty().await);
        Ok(())
    }

    #[tokio::test]
    async fn test_malformed_currency_list_is_unexpected_response() {
        let cache = Arc::new(InMemoryCache::new());
        let api = CountingApi::new(json!(["GBP", "USD"]), json!({}));
        let result = service(&cache, &api).supported_currencies().await;
        assert!(matches!(result, Err(AppError::UnexpectedResponse(_))));
    }

    #[test]
    fn test_extract_rate() {
        assert_eq!(extract_rate(&json!({"rates": {"USD": 1.35}}), "USD"), Ok(1.35));
        assert_eq!(
            extract_rate(&json!({"rates": {}}), "USD"),
            Err("no rate for USD in upstream response".to_string())
        );
        assert_eq!(
            extract_rate(&json!({"message": "invalid_app_id"}), "USD"),
            Err("invalid_app_id".to_string())
        );
    }
}
