//! Application state for the web layer.

use std::sync::Arc;

use crate::config::EngineConfig;
use crate::shohoz::ShohozClient;
use crate::store::MatrixStore;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Railway API client
    pub client: Arc<ShohozClient>,

    /// Engine tuning
    pub config: Arc<EngineConfig>,

    /// Matrices built for recent requests
    pub store: MatrixStore,
}

impl AppState {
    pub fn new(client: ShohozClient, config: EngineConfig, store: MatrixStore) -> Self {
        Self {
            client: Arc::new(client),
            config: Arc::new(config),
            store,
        }
    }
}
