//! SQLite connection pool for the key-value table

use crate::{DbError, Result};
use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use std::path::Path;
use std::time::Duration;

pub type DbPool = Pool<SqliteConnectionManager>;

/// Whole-value writes from the UI thread plus the occasional reader
const MAX_CONNECTIONS: u32 = 2;

/// Open a pool over the database file at `path`.
///
/// Connections are opened on first use; a write that cannot get the lock
/// within the busy timeout fails instead of blocking the caller forever.
pub fn init_pool(path: &Path) -> Result<DbPool> {
    let manager = SqliteConnectionManager::file(path).with_init(|conn| {
        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA busy_timeout = 2000;
        ",
        )
    });

    build(manager, MAX_CONNECTIONS)
}

/// A private in-memory database. One connection, since each SQLite
/// memory connection is a separate database.
pub fn init_memory_pool() -> Result<DbPool> {
    build(SqliteConnectionManager::memory(), 1)
}

fn build(manager: SqliteConnectionManager, max_size: u32) -> Result<DbPool> {
    Pool::builder()
        .max_size(max_size)
        .min_idle(Some(0))
        .connection_timeout(Duration::from_secs(5))
        .build(manager)
        .map_err(|e| DbError::Pool(e.to_string()))
}
