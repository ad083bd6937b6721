//! SQLite persistence for the household assistant.
//!
//! This crate stores conversation turns, keyword rules, scheduled prompts,
//! device mappings and the tool audit log using SQLx with SQLite. Write
//! functions for administrator-managed tables validate their input and
//! report problems as [`ValidationError`].
//!
//! # Example
//!
//! ```no_run
//! use database::{Database, turns};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Connect and run migrations
//!     let db = Database::connect("sqlite:household.db?mode=rwc").await?;
//!     db.migrate().await?;
//!
//!     turns::insert_turn(db.pool(), "+15551234567", "user", "turn on the lamp").await?;
//!     let history = turns::recent_turns(db.pool(), "+15551234567", 20).await?;
//!     assert_eq!(history.len(), 1);
//!
//!     Ok(())
//! }
//! ```

pub mod device_mapping;
pub mod error;
pub mod keyword;
pub mod models;
pub mod schedule;
pub mod tool_audit;
pub mod turns;
pub mod validation;

pub use error::{DatabaseError, Result};
pub use models::{
    ConversationTurn, DeviceMapping, KeywordKind, KeywordRule, NewDeviceMapping, NewKeywordRule,
    NewScheduledPrompt, ScheduledPrompt, ToolAuditEntry,
};
pub use validation::ValidationError;

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
    /// Set high enough to handle concurrent conversations across senders.
    const DEFAULT_POOL_SIZE: u32 = 20;

    /// Connect to a SQLite database.
    ///
    /// The URL should be in the format `sqlite:path/to/db.sqlite?mode=rwc`.
    /// Use `?mode=rwc` to create the database file if it doesn't exist.
    ///
    /// # Example
    ///
    /// ```no_run
    /// # async fn example() -> database::Result<()> {
    /// // File database
    /// let db = database::Database::connect("sqlite:data/household.db?mode=rwc").await?;
    ///
    /// // In-memory database (for testing); one connection so every query sees the same data
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
            .foreign_keys(true)
            .busy_timeout(Duration::from_secs(5));

        let pool = SqlitePoolOptions::new()
            .max_connections(pool_size)
            .acquire_timeout(Duration::from_secs(30))
            .connect_with(options)
            .await?;

        tracing::info!(
            "Connected to database: {} (pool size: {})",
            url,
            pool_size
        );

        Ok(Self { pool })
    }

    /// Run database migrations.
    ///
    /// This should be called once after connecting to ensure the schema is up to date.
    pub async fn migrate(&self) -> Result<()> {
        tracing::info!("Running database migrations...");

        sqlx::migrate!("./migrations").run(&self.pool).await?;

        tracing::info!("Migrations complete");
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
