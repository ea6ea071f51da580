//! Database connection and pool management

use mailsink_common::config::DatabaseConfig;
use mailsink_common::{Error, Result};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;
use std::time::Duration;
use tracing::info;

/// Database pool wrapper
///
/// Opened once at startup and cloned into every session and handler. Clones
/// share the same underlying pool; only the owner that opened it should call
/// [`DatabasePool::close`].
#[derive(Clone)]
pub struct DatabasePool {
    pool: SqlitePool,
}

impl DatabasePool {
    /// Create a new database pool from configuration
    pub async fn new(config: &DatabaseConfig) -> Result<Self> {
        let options = Self::build_options(config)?;

        info!(
            backend = %config.backend,
            path = %config.path.display(),
            "Connecting to database"
        );

        let pool_options = if config.is_in_memory() {
            // Every connection to `:memory:` is a separate database, so pin one.
            SqlitePoolOptions::new()
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            SqlitePoolOptions::new()
                .max_connections(config.max_connections)
                .min_connections(config.min_connections)
        };

        let pool = pool_options
            .acquire_timeout(Duration::from_secs(30))
            .connect_with(options)
            .await
            .map_err(|e| Error::Database(format!("Failed to connect: {}", e)))?;

        info!("Database connection established");

        Ok(Self { pool })
    }

    /// Open and migrate a private in-memory database
    pub async fn in_memory() -> Result<Self> {
        let db = Self::new(&DatabaseConfig::in_memory()).await?;
        db.migrate().await?;
        Ok(db)
    }

    /// Build SQLite connect options from configuration
    fn build_options(config: &DatabaseConfig) -> Result<SqliteConnectOptions> {
        match config.backend.as_str() {
            "sqlite" if config.is_in_memory() => SqliteConnectOptions::from_str("sqlite::memory:")
                .map(|options| options.foreign_keys(true))
                .map_err(|e| Error::Config(format!("Invalid database options: {}", e))),
            "sqlite" => Ok(SqliteConnectOptions::new()
                .filename(&config.path)
                .create_if_missing(true)
                .foreign_keys(true)),
            other => Err(Error::Config(format!(
                "Unsupported database backend: {} (only sqlite is supported)",
                other
            ))),
        }
    }

    /// Get the underlying pool
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Run database migrations
    pub async fn migrate(&self) -> Result<()> {
        info!("Running database migrations");

        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| Error::Database(format!("Migration failed: {}", e)))?;

        info!("Database migrations completed");
        Ok(())
    }

    /// Check database health
    pub async fn health_check(&self) -> Result<()> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| Error::Database(format!("Health check failed: {}", e)))?;
        Ok(())
    }

    /// Close every connection in the pool
    pub async fn close(&self) {
        self.pool.close().await;
        info!("Database connections closed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_in_memory_pool() {
        let db = DatabasePool::in_memory().await.unwrap();
        db.health_check().await.unwrap();

        let tables: Vec<String> = sqlx::query_scalar(
            "SELECT name FROM sqlite_master WHERE type = 'table' AND name IN ('projects', 'emails') ORDER BY name",
        )
        .fetch_all(db.pool())
        .await
        .unwrap();
        assert_eq!(tables, vec!["emails".to_string(), "projects".to_string()]);
    }

    #[tokio::test]
    async fn test_file_pool_created_and_migrated_twice() {
        let dir = tempfile::tempdir().unwrap();
        let config = DatabaseConfig {
            path: dir.path().join("mailsink.db"),
            ..DatabaseConfig::default()
        };

        let db = DatabasePool::new(&config).await.unwrap();
        db.migrate().await.unwrap();
        db.close().await;

        // Reopening an existing database must not re-apply the schema
        let db = DatabasePool::new(&config).await.unwrap();
        db.migrate().await.unwrap();
        db.health_check().await.unwrap();
        db.close().await;
    }

    #[tokio::test]
    async fn test_unsupported_backend() {
        let config = DatabaseConfig {
            backend: "postgres".to_string(),
            ..DatabaseConfig::default()
        };

        let err = DatabasePool::new(&config).await.err().unwrap();
        assert_eq!(err.code(), "CONFIG_ERROR");
    }
}
