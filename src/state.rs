use std::sync::Arc;

use crate::config::EngineConfig;
use crate::db::Database;
use crate::oracle::OracleClient;

/// Shared application state. The engine holds no derived data between
/// requests; every leaderboard is recomputed from the ledger.
pub struct AppState {
    /// Trade ledger (read-mostly; writes come from the ingestion path)
    pub db: Arc<Database>,
    /// External price oracle client
    pub oracle: OracleClient,
    pub config: EngineConfig,
}

impl AppState {
    pub fn new() -> Self {
        Self::with_db_path("data/leaderboard.db")
    }

    pub fn with_db_path(db_path: &str) -> Self {
        // Ensure data directory exists
        if let Some(parent) = std::path::Path::new(db_path).parent() {
            std::fs::create_dir_all(parent).ok();
        }

        let db = Database::new(db_path).expect("Failed to open database");

        Self {
            db: Arc::new(db),
            oracle: OracleClient::new(),
            config: EngineConfig::from_env(),
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}
