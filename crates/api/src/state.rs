use std::sync::Arc;

use lectern_storage::ObjectStore;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc`). Both services
/// are constructed once at startup and live for the process lifetime.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: lectern_db::DbPool,
    /// Object store for book assets (S3 or local filesystem).
    pub store: Arc<dyn ObjectStore>,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
}
