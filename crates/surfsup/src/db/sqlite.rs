use log::info;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::time::Duration;
use surfsup_core::is_readable_file;

use super::Error;

pub const STATION_TABLE: &str = "station";
pub const MEASUREMENT_TABLE: &str = "measurement";

/// Read-only pool over a pre-populated climate dataset file.
///
/// Every query acquires a pooled connection for its own duration, so no
/// cursor or session state is shared between requests.
#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
    path: String,
}

impl Database {
    pub async fn new(path: &str, max_connections: u32) -> Result<Self, Error> {
        if !is_readable_file(path) {
            return Err(Error::DataUnavailable(format!(
                "dataset file not found: {}",
                path
            )));
        }

        let options = SqliteConnectOptions::new()
            .filename(path)
            .read_only(true)
            .create_if_missing(false)
            .pragma("busy_timeout", "5000")
            .pragma("cache_size", "-64000")
            .pragma("temp_store", "MEMORY");

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections.max(1))
            .acquire_timeout(Duration::from_secs(30))
            .connect_with(options)
            .await
            .map_err(|e| Error::DataUnavailable(format!("failed to open {}: {}", path, e)))?;

        let db = Self {
            pool,
            path: path.to_owned(),
        };

        db.health_check().await?;
        info!("Climate dataset opened read-only at: {}", path);

        Ok(db)
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Check connectivity, page integrity and that both record tables exist.
    pub async fn health_check(&self) -> Result<(), Error> {
        sqlx::query("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| Error::DataUnavailable(format!("connectivity check failed: {}", e)))?;

        let result: String = sqlx::query_scalar("PRAGMA quick_check;")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| Error::DataUnavailable(format!("integrity check failed: {}", e)))?;
        if result != "ok" {
            return Err(Error::DataUnavailable(format!(
                "integrity check failed: {}",
                result
            )));
        }

        for table in [STATION_TABLE, MEASUREMENT_TABLE] {
            let found: Option<String> = sqlx::query_scalar(
                "SELECT name FROM sqlite_master WHERE type = 'table' AND name = ?",
            )
            .bind(table)
            .fetch_optional(&self.pool)
            .await?;
            if found.is_none() {
                return Err(Error::DataUnavailable(format!(
                    "missing table `{}` in {}",
                    table, self.path
                )));
            }
        }

        Ok(())
    }

    pub async fn close(&self) {
        self.pool.close().await;
        info!("Climate dataset closed: {}", self.path);
    }
}
