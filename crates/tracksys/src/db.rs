//! Database connection and pool management.

use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use sqlx::AnyPool;
use sqlx::any::AnyPoolOptions;
use std::time::Duration;
use tracing::instrument;

const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(5);
const FIXTURE_SCHEMA: &str = include_str!("../fixtures/schema.sql");

/// Database connection pool for the record store.
#[derive(Debug, Clone)]
pub struct Database {
    pool: AnyPool,
}

impl Database {
    /// Connect to the record store at the given URL (`mysql://…`, `sqlite:…`).
    #[instrument(skip(url))]
    pub async fn connect(url: &str, max_connections: u32) -> Result<Self> {
        sqlx::any::install_default_drivers();
        let pool = AnyPoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(ACQUIRE_TIMEOUT)
            .connect(url)
            .await
            .or_raise(|| ErrorKind::Database)?;
        Ok(Self { pool })
    }

    /// Connect to an empty in-memory database carrying the subset of the
    /// schema that iiifman reads.
    ///
    /// Note:
    /// - In-memory databases are destroyed when the connection closes, so
    ///   the pool is limited to one connection that is never recycled.
    /// - Do NOT apply `#[cfg(test)]` so that other crates can also use this in their tests.
    pub async fn connect_in_memory() -> Result<Self> {
        sqlx::any::install_default_drivers();
        let pool = AnyPoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await
            .or_raise(|| ErrorKind::Database)?;
        for statement in FIXTURE_SCHEMA.split(';').map(str::trim).filter(|s| !s.is_empty()) {
            sqlx::query(statement).execute(&pool).await.or_raise(|| ErrorKind::Database)?;
        }
        Ok(Self { pool })
    }

    /// Get a reference to the underlying connection pool.
    pub fn pool(&self) -> &AnyPool {
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

    #[tokio::test]
    async fn test_connect_in_memory() {
        let db = Database::connect_in_memory().await.unwrap();
        assert!(!db.pool().is_closed());
        let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM metadata").fetch_one(db.pool()).await.unwrap();
        assert_eq!(row.0, 0);
        db.close().await;
        assert!(db.pool().is_closed());
    }

    #[tokio::test]
    async fn test_connect_refused() {
        let result = Database::connect("mysql://iiifman@127.0.0.1:1/tracksys", 1).await;
        assert!(matches!(&*result.unwrap_err(), ErrorKind::Database));
    }
}
