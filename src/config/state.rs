// Application state module
// Everything a request handler needs, built once at startup

use std::path::PathBuf;

use super::types::Config;
use crate::handler::RouteTable;
use crate::http::CorsPolicy;
use crate::storage::{RecordStore, StoreError};

/// Application state
pub struct AppState {
    pub config: Config,
    pub store: RecordStore,
    pub routes: RouteTable,
    pub cors: CorsPolicy,
    pub script_path: PathBuf,
}

impl AppState {
    /// Create `AppState`, making sure the data directory exists
    pub fn new(config: &Config) -> Result<Self, StoreError> {
        let store = RecordStore::new(&config.storage.data_dir);
        store.ensure_dir()?;

        Ok(Self {
            config: config.clone(),
            store,
            routes: RouteTable::new(),
            cors: CorsPolicy::from_origins(&config.cors.allowed_origins),
            script_path: config.script_path(),
        })
    }
}
