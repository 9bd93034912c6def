use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};

#[derive(Debug, Clone)]
pub struct Config {
    pub httpd_addr: SocketAddr,
    /// Base URL of the REST data store. `None` runs against the in-memory store.
    pub data_store_url: Option<String>,
    pub data_seed_file: Option<PathBuf>,
    pub store_timeout: Duration,
    pub store_write_retries: u32,
    pub session_ttl: chrono::Duration,
    pub session_purge_interval: Duration,
    /// How long a booking placed with an idempotency key can be replayed.
    pub idempotency_ttl: chrono::Duration,
    pub bcrypt_cost: u32,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            httpd_addr: SocketAddr::from(([127, 0, 0, 1], 3030)),
            data_store_url: None,
            data_seed_file: None,
            store_timeout: Duration::from_secs(10),
            store_write_retries: 2,
            session_ttl: chrono::Duration::minutes(600),
            session_purge_interval: Duration::from_secs(300),
            idempotency_ttl: chrono::Duration::hours(24),
            bcrypt_cost: bcrypt::DEFAULT_COST,
        }
    }
}

fn env_opt(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn env_parse<T>(key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    env_opt(key)
        .map(|raw| {
            raw.trim()
                .parse::<T>()
                .with_context(|| format!("Environment variable {} has an invalid value '{}'", key, raw))
        })
        .transpose()
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv::dotenv().ok();
        let defaults = Config::default();
        let bcrypt_cost = env_parse::<u32>("BCRYPT_COST")?.unwrap_or(defaults.bcrypt_cost);
        if !(4..=31).contains(&bcrypt_cost) {
            anyhow::bail!("BCRYPT_COST must be between 4 and 31, got {}", bcrypt_cost);
        }
        Ok(Config {
            httpd_addr: env_parse("HTTPD_ADDR")?.unwrap_or(defaults.httpd_addr),
            data_store_url: env_opt("DATA_STORE_URL"),
            data_seed_file: env_opt("DATA_SEED_FILE").map(PathBuf::from),
            store_timeout: env_parse::<u64>("STORE_TIMEOUT_SECONDS")?
                .map(Duration::from_secs)
                .unwrap_or(defaults.store_timeout),
            store_write_retries: env_parse("STORE_WRITE_RETRIES")?
                .unwrap_or(defaults.store_write_retries),
            session_ttl: env_parse::<i64>("SESSION_TTL_MINUTES")?
                .map(chrono::Duration::minutes)
                .unwrap_or(defaults.session_ttl),
            session_purge_interval: env_parse::<u64>("SESSION_PURGE_SECONDS")?
                .map(Duration::from_secs)
                .unwrap_or(defaults.session_purge_interval),
            idempotency_ttl: env_parse::<i64>("IDEMPOTENCY_TTL_MINUTES")?
                .map(chrono::Duration::minutes)
                .unwrap_or(defaults.idempotency_ttl),
            bcrypt_cost,
        })
    }
}
