//! # tagnote-db
//!
//! PostgreSQL database layer for tagnote.
//!
//! This crate provides:
//! - Connection pool management
//! - Repository implementations for records and tags
//! - A transaction-backed unit of work
//!
//! ## Example
//!
//! ```rust,ignore
//! use tagnote_db::Database;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let db = Database::connect("postgres://localhost/tagnote").await?;
//!     let tags = db.tags.find_all().await?;
//!     println!("{} tags", tags.len());
//!     Ok(())
//! }
//! ```

pub mod pool;
pub mod records;
pub mod tags;
pub mod unit_of_work;

use async_trait::async_trait;

// Re-export core types
pub use tagnote_core::*;

pub use pool::{create_pool, create_pool_with_config, log_pool_metrics, PoolConfig};
pub use records::PgRecordRepository;
pub use tags::PgTagRepository;
pub use unit_of_work::{PgUnitOfWork, PgUnitOfWorkProvider};

/// Escape LIKE/ILIKE wildcard characters (`%`, `_`, `\`) in user input.
pub fn escape_like(input: &str) -> String {
    input
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

/// Combined database context with all repositories.
#[derive(Clone)]
pub struct Database {
    /// The underlying connection pool.
    pub pool: sqlx::Pool<sqlx::Postgres>,
    /// Record repository for CRUD and tag-set queries.
    pub records: PgRecordRepository,
    /// Tag repository for lookup, creation, and cleanup.
    pub tags: PgTagRepository,
}

impl Database {
    /// Create a new Database instance from a connection pool.
    pub fn new(pool: sqlx::Pool<sqlx::Postgres>) -> Self {
        Self {
            records: PgRecordRepository::new(pool.clone()),
            tags: PgTagRepository::new(pool.clone()),
            pool,
        }
    }

    /// Create a new Database instance by connecting to the given URL.
    pub async fn connect(url: &str) -> Result<Self> {
        let pool = create_pool(url).await?;
        Ok(Self::new(pool))
    }

    /// Create with custom pool configuration.
    pub async fn connect_with_config(url: &str, config: PoolConfig) -> Result<Self> {
        let pool = create_pool_with_config(url, config).await?;
        Ok(Self::new(pool))
    }

    /// Run pending migrations.
    #[cfg(feature = "migrations")]
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("../../migrations")
            .run(&self.pool)
            .await
            .map_err(|e| Error::Database(sqlx::Error::Migrate(Box::new(e))))?;
        Ok(())
    }

    /// Get the underlying connection pool.
    pub fn pool(&self) -> &sqlx::Pool<sqlx::Postgres> {
        &self.pool
    }

    /// Record repository handle for use-case wiring.
    pub fn record_repository(&self) -> std::sync::Arc<dyn RecordRepository> {
        std::sync::Arc::new(self.records.clone())
    }

    /// Tag repository handle for use-case wiring.
    pub fn tag_repository(&self) -> std::sync::Arc<dyn TagRepository> {
        std::sync::Arc::new(self.tags.clone())
    }

    /// Unit-of-work provider handle for use-case wiring.
    pub fn unit_of_work_provider(&self) -> std::sync::Arc<dyn UnitOfWorkProvider> {
        std::sync::Arc::new(PgUnitOfWorkProvider::new(self.pool.clone()))
    }
}

#[async_trait]
impl UnitOfWorkProvider for Database {
    async fn unit_of_work(&self) -> Result<Box<dyn UnitOfWork>> {
        Ok(Box::new(PgUnitOfWork::new(self.pool.clone())))
    }
}
