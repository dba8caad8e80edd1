mod error;
use std::sync::Arc;

pub use error::{AppError, Result};
pub mod cache;
pub mod config;
pub mod currency_service;
pub mod exchange_client;
pub mod models;
pub mod routes;

use cache::RedisCache;
use config::Settings;
use currency_service::CurrencyService;
use exchange_client::OpenExchangeClient;
use models::AppState;

/// Поднимает соединение с Redis и клиент поставщика, запускает HTTP сервер
pub async fn run(settings: Settings) -> Result<()> {
    tracing::info!("Подключаюсь к Redis");
    let cache = Arc::new(RedisCache::connect(&settings.redis_url, settings.cache_ttl).await?);
    let api = Arc::new(OpenExchangeClient::new(
        settings.base_api_url.clone(),
        settings.api_key.clone(),
        settings.request_timeout,
    )?);
    let service = CurrencyService::new(cache, api);
    let app = routes::init(AppState::new(service), settings.request_timeout);

    let listener = tokio::net::TcpListener::bind(settings.bind_addr)
        .await
        .map_err(|e| AppError::Config(format!("bind {}: {e}", settings.bind_addr)))?;
    tracing::info!("Слушаю {}", settings.bind_addr);
    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        tracing::error!("{e:?}");
    }
    tracing::info!("Сервер остановлен");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("ctrl-c handler: {e:?}");
        }
    };
    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("SIGTERM handler: {e:?}");
                std::future::pending::<()>().await
            }
        }
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();
    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    tracing::info!("Получен сигнал остановки");
}
