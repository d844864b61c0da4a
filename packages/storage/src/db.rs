// ABOUTME: Database connection management and storage initialization
// ABOUTME: Provides shared access to the SQLite pool, storage layers, and change feed

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};
use tracing::{debug, info};

use crate::changes::ChangeFeed;
use crate::error::StorageError;
use crate::memory::MemoryStorage;
use crate::metrics::MetricsStorage;
use crate::projects::ProjectStorage;
use crate::users::UserStorage;

/// Shared database state for API handlers and the synchronizer
#[derive(Clone)]
pub struct DbState {
    pub pool: SqlitePool,
    pub user_storage: Arc<UserStorage>,
    pub project_storage: Arc<ProjectStorage>,
    pub metrics_storage: Arc<MetricsStorage>,
    pub memory_storage: Arc<MemoryStorage>,
    pub change_feed: ChangeFeed,
}

impl DbState {
    /// Create database state from an already migrated pool
    pub fn new(pool: SqlitePool, change_feed_capacity: usize) -> Self {
        let change_feed = ChangeFeed::new(change_feed_capacity);

        Self {
            user_storage: Arc::new(UserStorage::new(pool.clone())),
            project_storage: Arc::new(ProjectStorage::new(pool.clone(), change_feed.clone())),
            metrics_storage: Arc::new(MetricsStorage::new(pool.clone(), change_feed.clone())),
            memory_storage: Arc::new(MemoryStorage::new(pool.clone())),
            change_feed,
            pool,
        }
    }

    /// Open (creating if needed) the database file, configure SQLite, and run migrations
    pub async fn init_with_path(
        database_path: Option<PathBuf>,
        change_feed_capacity: usize,
    ) -> Result<Self, StorageError> {
        let database_path = database_path.unwrap_or_else(agentboard_core::default_database_path);

        if let Some(parent) = database_path.parent() {
            std::fs::create_dir_all(parent).map_err(StorageError::Io)?;
        }

        let database_url = format!("sqlite:{}?mode=rwc", database_path.display());
        debug!("Connecting to database: {}", database_url);

        let pool = SqlitePoolOptions::new()
            .max_connections(10)
            .acquire_timeout(Duration::from_secs(30))
            .connect(&database_url)
            .await
            .map_err(StorageError::Sqlx)?;

        for pragma in [
            "PRAGMA journal_mode = WAL",
            "PRAGMA synchronous = NORMAL",
            "PRAGMA busy_timeout = 5000",
        ] {
            sqlx::query(pragma)
                .execute(&pool)
                .await
                .map_err(StorageError::Sqlx)?;
        }

        info!("Database connection established");

        Self::migrate(&pool).await?;
        Ok(Self::new(pool, change_feed_capacity))
    }

    /// Single-connection in-memory database, migrated and ready for tests and demos
    pub async fn in_memory(change_feed_capacity: usize) -> Result<Self, StorageError> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .map_err(StorageError::Sqlx)?;

        Self::migrate(&pool).await?;
        Ok(Self::new(pool, change_feed_capacity))
    }

    async fn migrate(pool: &SqlitePool) -> Result<(), StorageError> {
        // Per-connection setting; the pool enables it on connect as well
        sqlx::query("PRAGMA foreign_keys = ON")
            .execute(pool)
            .await
            .map_err(StorageError::Sqlx)?;

        sqlx::migrate!("./migrations")
            .run(pool)
            .await
            .map_err(StorageError::Migration)?;

        debug!("Database migrations completed");
        Ok(())
    }
}
