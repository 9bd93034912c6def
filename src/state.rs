use std::collections::HashMap;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::sync::Mutex;

use crate::config::Config;
use crate::integration::memory_store::MemoryStore;
use crate::integration::rest_store::RestStore;
use crate::integration::DataStore;
use crate::methods::booking::Replay;
use crate::methods::id_allocator::IdSequencer;
use crate::methods::tokens::SessionStore;

/// Everything a request handler needs, handed to each route through a
/// filter rather than kept in globals.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub store: Arc<dyn DataStore>,
    pub sessions: Arc<SessionStore>,
    pub ids: Arc<IdSequencer>,
    /// Completed placements by (user id, idempotency key), kept for
    /// `idempotency_ttl`. The mutex also serializes placements.
    pub placements: Arc<Mutex<HashMap<(String, String), Replay>>>,
    /// Held from an email uniqueness check until the user record is written.
    pub accounts: Arc<Mutex<()>>,
}

impl AppState {
    pub fn new(config: Config, store: Arc<dyn DataStore>) -> Self {
        AppState {
            sessions: Arc::new(SessionStore::new(config.session_ttl)),
            config: Arc::new(config),
            store,
            ids: Arc::new(IdSequencer::new()),
            placements: Arc::new(Mutex::new(HashMap::new())),
            accounts: Arc::new(Mutex::new(())),
        }
    }

    pub async fn from_config(config: Config) -> Result<Self> {
        let store: Arc<dyn DataStore> = match (&config.data_store_url, &config.data_seed_file) {
            (Some(url), _) => {
                log::info!("using REST data store at {}", url);
                Arc::new(
                    RestStore::new(url, config.store_timeout)
                        .context("Failed to build data store client")?,
                )
            }
            (None, Some(seed)) => {
                log::info!("using in-memory data store seeded from {}", seed.display());
                Arc::new(MemoryStore::from_seed_file(seed).await?)
            }
            (None, None) => {
                log::warn!("DATA_STORE_URL not set, using an empty in-memory data store");
                Arc::new(MemoryStore::new())
            }
        };
        Ok(AppState::new(config, store))
    }
}
