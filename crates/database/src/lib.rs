//! SQLite persistence layer for the nutrition coach.
//!
//! The application keeps its durable state as a handful of named slots, each
//! holding one JSON document. This crate stores those slots using SQLx with
//! SQLite and knows nothing about their contents.
//!
//! # Example
//!
//! ```no_run
//! use database::{slot, Database};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Connect and run migrations
//!     let db = Database::connect("sqlite:coach.db?mode=rwc").await?;
//!     db.migrate().await?;
//!
//!     // Write and read back a slot
//!     slot::upsert_slots(db.pool(), &[("profile", r#"{"name":"Jeffrey"}"#)]).await?;
//!     let stored = slot::get_slot(db.pool(), "profile").await?;
//!     assert!(stored.is_some());
//!
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod models;
pub mod slot;

pub use error::{DatabaseError, Result};
pub use models::StoredSlot;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::str::FromStr;
use std::time::Duration;

/// Database connection wrapper.
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Default pool size for database connections.
    const DEFAULT_POOL_SIZE: u32 = 5;

    /// Connect to a SQLite database.
    ///
    /// The URL should be in the format `sqlite:path/to/db.sqlite?mode=rwc`.
    /// Use `?mode=rwc` to create the database file if it doesn't exist. A
    /// missing parent directory is created.
    ///
    /// # Example
    ///
    /// ```no_run
    /// # async fn example() -> database::Result<()> {
    /// // File database
    /// let db = database::Database::connect("sqlite:data/coach.db?mode=rwc").await?;
    ///
    /// // In-memory database (for testing; one connection so every query
    /// // sees the same database)
    /// let db = database::Database::connect_with_pool_size("sqlite::memory:", 1).await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn connect(url: &str) -> Result<Self> {
        Self::connect_with_pool_size(url, Self::DEFAULT_POOL_SIZE).await
    }

    /// Connect to a SQLite database with a custom pool size.
    pub async fn connect_with_pool_size(url: &str, pool_size: u32) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(url)?
            .create_if_missing(true)
            .busy_timeout(Duration::from_secs(5));

        if let Some(parent) = options.get_filename().parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let pool = SqlitePoolOptions::new()
            .max_connections(pool_size)
            .acquire_timeout(Duration::from_secs(30))
            .connect_with(options)
            .await?;

        tracing::info!("Connected to state store: {} (pool size: {})", url, pool_size);

        Ok(Self { pool })
    }

    /// Create the slot table if needed. Safe to call on every start.
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        tracing::debug!("State store schema up to date");
        Ok(())
    }

    /// Get a reference to the connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Close the database connection pool.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn test_db() -> Database {
        let db = Database::connect_with_pool_size("sqlite::memory:", 1)
            .await
            .unwrap();
        db.migrate().await.unwrap();
        db
    }

    #[tokio::test]
    async fn test_migrate_is_repeatable() {
        let db = test_db().await;
        db.migrate().await.unwrap();
        assert!(slot::get_slot(db.pool(), "profile").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_file_database_persists_across_connections() {
        let path = std::env::temp_dir().join(format!("coach-db-test-{}.db", std::process::id()));
        let _ = std::fs::remove_file(&path);
        let url = format!("sqlite:{}?mode=rwc", path.display());

        let db = Database::connect(&url).await.unwrap();
        db.migrate().await.unwrap();
        slot::upsert_slots(db.pool(), &[("journal", "[]")])
            .await
            .unwrap();
        db.close().await;

        let db = Database::connect(&url).await.unwrap();
        let stored = slot::get_slot(db.pool(), "journal").await.unwrap();
        assert_eq!(stored.map(|s| s.payload).as_deref(), Some("[]"));
        db.close().await;

        let _ = std::fs::remove_file(&path);
    }
}
