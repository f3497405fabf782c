//! PostgreSQL persistence backend.
//!
//! One [`PostgresStore`] implements both `UserStore` and `EventStore` over
//! a shared connection pool, so cross-entity cascades (user deletion,
//! event deletion) run inside single transactions.
//!
//! Queries are runtime-checked (`sqlx::query`/`query_as`) so the crate
//! builds without a live `DATABASE_URL`.
//!
//! # Example
//!
//! ```no_run
//! use gather_server::stores::PostgresStore;
//! use sqlx::PgPool;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let pool = PgPool::connect("postgresql://localhost/gather").await?;
//! let store = PostgresStore::new(pool);
//! store.migrate().await?;
//! # Ok(())
//! # }
//! ```

mod event;
mod user;

use crate::error::{ApiError, Result};
use sqlx::PgPool;

/// PostgreSQL store for users, events, attendances, and profiles.
#[derive(Debug, Clone)]
pub struct PostgresStore {
    /// PostgreSQL connection pool.
    pool: PgPool,
}

impl PostgresStore {
    /// Create a new PostgreSQL store.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Run database migrations.
    ///
    /// # Errors
    ///
    /// Returns error if migrations fail.
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| ApiError::Database(format!("Migration failed: {e}")))?;
        Ok(())
    }

    /// Access the underlying pool.
    #[must_use]
    pub(crate) const fn pool(&self) -> &PgPool {
        &self.pool
    }
}

/// Whether a sqlx error is a unique-constraint violation.
pub(crate) fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.is_unique_violation())
}
