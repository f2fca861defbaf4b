//! Database connection management

use sqlx::postgres::{PgPool, PgPoolOptions};
use std::time::Duration;

use crate::config::DatabaseConfig;

/// PostgreSQL database connection pool
pub struct Database {
    pool: PgPool,
}

impl Database {
    /// Create a new database connection pool
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, sqlx::Error> {
        let pool = PgPoolOptions::new()
            .max_connections(config.pool_max)
            .min_connections(config.pool_min)
            .acquire_timeout(Duration::from_millis(config.acquire_timeout_ms))
            .idle_timeout(Duration::from_millis(config.idle_timeout_ms))
            .connect(&config.url())
            .await?;

        tracing::info!(
            host = %config.host,
            database = %config.database,
            pool_max = config.pool_max,
            "PostgreSQL connection pool established"
        );
        Ok(Self { pool })
    }

    /// Connect with bounded exponential backoff.
    ///
    /// Used at startup so the service survives the database coming up after it.
    pub async fn connect_with_retry(config: &DatabaseConfig) -> Result<Self, sqlx::Error> {
        let max_retries = 10;
        let mut retry_delay_ms = 1000u64;

        for attempt in 1..=max_retries {
            match Self::connect(config).await {
                Ok(db) => return Ok(db),
                Err(e) if attempt < max_retries => {
                    tracing::warn!(
                        attempt,
                        error = %e,
                        retry_in_ms = retry_delay_ms,
                        "PostgreSQL connection failed, retrying"
                    );
                    tokio::time::sleep(Duration::from_millis(retry_delay_ms)).await;
                    retry_delay_ms = (retry_delay_ms * 2).min(30_000);
                }
                Err(e) => return Err(e),
            }
        }
        unreachable!("retry loop returns on the final attempt")
    }

    /// Get a reference to the connection pool
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Check database health
    pub async fn health_check(&self) -> Result<(), sqlx::Error> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DatabaseConfig;

    // Note: These tests require a running PostgreSQL instance

    #[tokio::test]
    #[ignore = "requires PostgreSQL database"]
    async fn test_database_connect_success() {
        let db = Database::connect(&DatabaseConfig::default()).await;
        assert!(db.is_ok(), "Should connect to PostgreSQL successfully");
    }

    #[tokio::test]
    #[ignore = "requires PostgreSQL database"]
    async fn test_database_connect_invalid_url() {
        let config = DatabaseConfig {
            port: 9999,
            acquire_timeout_ms: 500,
            ..DatabaseConfig::default()
        };
        let db = Database::connect(&config).await;
        assert!(db.is_err(), "Should fail with invalid connection target");
    }

    #[tokio::test]
    #[ignore = "requires PostgreSQL database"]
    async fn test_database_health_check() {
        let db = Database::connect(&DatabaseConfig::default())
            .await
            .expect("Failed to connect");

        let health = db.health_check().await;
        assert!(health.is_ok(), "Health check should pass");
    }
}
