/// Shared application state
use crate::config::ServerConfig;
use crate::db::TimetableDbManager;

/// State shared across all request handlers.
pub struct AppState {
    pub db: TimetableDbManager,
    pub config: ServerConfig,
}

impl AppState {
    pub fn new(config: ServerConfig) -> Self {
        let db = TimetableDbManager::new(&config.db_path);
        AppState { db, config }
    }
}
