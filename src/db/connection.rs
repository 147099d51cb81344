//! Catalog database handle
//!
//! One pooled SQLite file holds the recipe catalog, user calendars and
//! reviews. `Database::open` is the entry point for every binary: it creates
//! the data directory, applies pending migrations and reports the schema
//! version it ended up on.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::OpenFlags;
use thiserror::Error;
use tracing::info;

use super::migrations;

/// Server handlers, nutrition fetches and the seeding tool share one pool
const POOL_SIZE: u32 = 10;

/// How long a writer waits on a locked catalog before failing
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Error)]
pub enum DbError {
    #[error("Database connection error: {0}")]
    Connection(#[from] r2d2::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Could not create data directory: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0} not found")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    Invalid(String),
}

pub type DbResult<T> = Result<T, DbError>;

/// Shared handle to the catalog; clones share the pool
#[derive(Clone)]
pub struct Database {
    pool: Arc<Pool<SqliteConnectionManager>>,
}

impl Database {
    /// Open the catalog at `path`, creating it if needed, and bring its
    /// schema up to date
    pub fn open<P: AsRef<Path>>(path: P) -> DbResult<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let database = Self::new(path)?;
        let version = database.with_conn(|conn| {
            migrations::run_migrations(conn)?;
            migrations::get_schema_version(conn)
        })?;
        info!(path = %path.display(), version, "Catalog database ready");

        Ok(database)
    }

    /// Pool over `path` without touching the schema
    pub fn new<P: AsRef<Path>>(path: P) -> DbResult<Self> {
        let manager = SqliteConnectionManager::file(path)
            .with_flags(
                OpenFlags::SQLITE_OPEN_READ_WRITE
                    | OpenFlags::SQLITE_OPEN_CREATE
                    | OpenFlags::SQLITE_OPEN_URI,
            )
            .with_init(|conn| {
                // Cascades from recipes and users depend on foreign keys
                conn.execute_batch(
                    "PRAGMA foreign_keys = ON;
                     PRAGMA journal_mode = WAL;
                     PRAGMA synchronous = NORMAL;
                     PRAGMA temp_store = MEMORY;",
                )?;
                conn.busy_timeout(BUSY_TIMEOUT)?;
                Ok(())
            });

        let pool = Pool::builder().max_size(POOL_SIZE).build(manager)?;

        Ok(Self {
            pool: Arc::new(pool),
        })
    }

    pub fn get_conn(&self) -> DbResult<PooledConnection<SqliteConnectionManager>> {
        Ok(self.pool.get()?)
    }

    /// Run `f` on a pooled connection
    pub fn with_conn<F, T>(&self, f: F) -> DbResult<T>
    where
        F: FnOnce(&rusqlite::Connection) -> DbResult<T>,
    {
        let conn = self.get_conn()?;
        f(&conn)
    }

    /// Run `f` on a pooled connection that can open transactions
    pub fn with_conn_mut<F, T>(&self, f: F) -> DbResult<T>
    where
        F: FnOnce(&mut rusqlite::Connection) -> DbResult<T>,
    {
        let mut conn = self.get_conn()?;
        f(&mut conn)
    }

    /// Schema version currently applied to the catalog
    pub fn schema_version(&self) -> DbResult<i32> {
        self.with_conn(migrations::get_schema_version)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_creates_directory_and_migrates() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("data").join("catalog.db");

        let database = Database::open(&path).unwrap();
        assert!(path.exists());
        assert_eq!(database.schema_version().unwrap(), migrations::SCHEMA_VERSION);

        let tables: i64 = database
            .with_conn(|conn| {
                Ok(conn.query_row(
                    "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name IN ('recipes', 'calendar_entries', 'reviews')",
                    [],
                    |row| row.get(0),
                )?)
            })
            .unwrap();
        assert_eq!(tables, 3);
    }

    #[test]
    fn test_reopen_keeps_data() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("catalog.db");

        let database = Database::open(&path).unwrap();
        database
            .with_conn(|conn| {
                conn.execute("INSERT INTO recipes (name) VALUES ('Pho')", [])?;
                Ok(())
            })
            .unwrap();
        drop(database);

        let reopened = Database::open(&path).unwrap();
        let count: i64 = reopened
            .with_conn(|conn| Ok(conn.query_row("SELECT COUNT(*) FROM recipes", [], |row| row.get(0))?))
            .unwrap();
        assert_eq!(count, 1);
    }

    #[test]
    fn test_new_leaves_schema_alone() {
        let dir = tempfile::tempdir().unwrap();
        let database = Database::new(dir.path().join("raw.db")).unwrap();
        assert_eq!(database.schema_version().unwrap(), 0);
    }
}
