//! Developer portal library
//!
//! Logs an engineer in through the identity provider's implicit flow, shows
//! the identity token's claims, and exercises the preferences API with that
//! token as the bearer credential.

#![deny(dead_code)]

pub mod api;
pub mod auth;
pub mod config;
pub mod web;

use api::{ApiCallError, ApiClient, ApiOperation, ApiResults};
use auth::{FileStore, KeyValueStore, MemoryStore, Session};
use config::Config;
use std::sync::Arc;
use tokio::sync::RwLock;

pub struct AppState {
    pub config: Arc<Config>,
    pub session: Session,
    pub api_client: ApiClient,
    /// Latest result per operation key
    pub results: Arc<RwLock<ApiResults>>,
}

impl AppState {
    pub fn new(config: Config, store: Arc<dyn KeyValueStore>) -> anyhow::Result<Self> {
        let api_client = ApiClient::new(
            config.portal.api_base_url.clone(),
            config.http_connect_timeout_secs,
        )
        .map_err(|e| anyhow::anyhow!("Failed to build HTTP client for the preferences API: {}", e))?;

        Ok(Self {
            config: Arc::new(config),
            session: Session::new(store),
            api_client,
            results: Arc::new(RwLock::new(ApiResults::new())),
        })
    }

    pub async fn run_operation(&self, operation: &ApiOperation) -> Result<(), ApiCallError> {
        api::run_operation(&self.session, &self.api_client, &self.results, operation).await
    }
}

/// Open the key/value store selected by `SESSION_STORE_PATH`
pub fn open_store(config: &Config) -> Arc<dyn KeyValueStore> {
    match &config.session_store_path {
        Some(path) => {
            let store = FileStore::open(path);
            tracing::info!(path = %store.path().display(), "Using file-backed session store");
            Arc::new(store)
        }
        None => {
            tracing::info!("Using in-memory session store; sessions end with the process");
            Arc::new(MemoryStore::new())
        }
    }
}
