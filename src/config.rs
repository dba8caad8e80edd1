use std::net::SocketAddr;
use std::time::Duration;

use crate::{AppError, Result};

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8000";
const DEFAULT_CACHE_TTL_HOURS: u64 = 48;
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;

/// Настройки сервиса, читаются из переменных окружения
#[derive(Debug, Clone)]
pub struct Settings {
    pub api_key: String,
    pub base_api_url: String,
    pub redis_url: String,
    pub bind_addr: SocketAddr,
    /// `None` - ключи в кэше живут без срока
    pub cache_ttl: Option<Duration>,
    pub request_timeout: Duration,
}

impl Settings {
    /// Загружает `.env` (если есть) и читает настройки из окружения
    pub fn from_env() -> Result<Self> {
        if let Err(e) = dotenvy::dotenv() {
            tracing::debug!(".env not loaded: {e}");
        }
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |name: &str| {
            lookup(name)
                .filter(|v| !v.trim().is_empty())
                .ok_or_else(|| AppError::Config(format!("{name} not set")))
        };
        let api_key = required("API_KEY")?;
        let base_api_url = required("BASE_API_URL")?.trim_end_matches('/').to_string();
        let redis_url = required("REDIS_URL")?;

        let bind_addr = lookup("BIND_ADDR")
            .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string())
            .parse::<SocketAddr>()
            .map_err(|e| AppError::Config(format!("BIND_ADDR: {e}")))?;
        let ttl_hours = parse_u64(&lookup, "CACHE_TTL_HOURS", DEFAULT_CACHE_TTL_HOURS)?;
        let ttl_secs = ttl_hours
            .checked_mul(60 * 60)
            .ok_or_else(|| AppError::Config(format!("CACHE_TTL_HOURS: {ttl_hours} is too large")))?;
        let cache_ttl = (ttl_secs > 0).then(|| Duration::from_secs(ttl_secs));
        let timeout_secs = parse_u64(&lookup, "REQUEST_TIMEOUT_SECS", DEFAULT_REQUEST_TIMEOUT_SECS)?;

        Ok(Self {
            api_key,
            base_api_url,
            redis_url,
            bind_addr,
            cache_ttl,
            request_timeout: Duration::from_secs(timeout_secs),
        })
    }
}

fn parse_u64<F>(lookup: &F, name: &str, default: u64) -> Result<u64>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(name) {
        Some(raw) => raw
            .trim()
            .parse::<u64>()
            .map_err(|e| AppError::Config(format!("{name}: {e}"))),
        None => Ok(default),
    }
}
