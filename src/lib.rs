pub mod config;
pub mod db;
pub mod error;

use sqlx::PgPool;
use std::sync::Arc;
use tracing::info;

pub use error::AppError;
pub type Result<T> = std::result::Result<T, AppError>;
pub use config::Settings;

pub use db::{DbOperations, PropertyFilter};

/// Process-scoped handles: settings and the one shared connection pool.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Settings>,
    pub db_pool: Arc<PgPool>,
}

impl AppState {
    pub async fn new(config: Settings) -> Result<Self> {
        // Initialize database connection pool
        let db_pool = db::connect_pool(&config.database)
            .await
            .map_err(|e| AppError::DatabaseError(error::DatabaseError::ConnectionError(e.to_string())))?;

        info!(
            max_connections = config.database.max_connections,
            "database pool connected"
        );

        Ok(Self {
            config: Arc::new(config),
            db_pool: Arc::new(db_pool),
        })
    }

    /// Query service bound to the shared pool and the configured row limits.
    pub fn queries(&self) -> DbOperations {
        DbOperations::with_limits(self.db_pool.clone(), self.config.query)
    }

    pub async fn shutdown(&self) -> Result<()> {
        // Close database connections
        self.db_pool.close().await;
        info!("database pool closed");
        Ok(())
    }
}
