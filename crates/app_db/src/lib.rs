//! FileDeck Persistence Layer
//!
//! Provides:
//! - `KeyValueStore`: whole-value JSON storage keyed by string
//! - SQLite backend (r2d2 pool) for durable state
//! - In-memory backend for tests and ephemeral sessions
//! - `JsonSlot<T>`: a typed repository bound to one key

mod sqlite;
mod memory;
mod schema;
mod pool;
mod slot;

pub use sqlite::SqliteStore;
pub use memory::MemoryStore;
pub use pool::{DbPool, init_pool, init_memory_pool};
pub use schema::migrate;
pub use slot::JsonSlot;

use directories::ProjectDirs;
use std::path::PathBuf;
use thiserror::Error;

/// Persisted keys
pub mod keys {
    pub const FILES: &str = "fileManager_files";
    pub const SAVED_SEARCHES: &str = "savedSearches";
    pub const RECENT_QUERIES: &str = "recentSearchQueries";
    pub const CLIPBOARD: &str = "fileManager_clipboard";
}

/// Database errors
#[derive(Error, Debug)]
pub enum DbError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Pool error: {0}")]
    Pool(String),

    #[error("Migration error: {0}")]
    Migration(String),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("Record not found: {0}")]
    NotFound(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, DbError>;

/// Whole-value storage of JSON strings.
///
/// Writes overwrite the previous value; there are no partial updates.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn put(&self, key: &str, value: &str) -> Result<()>;
    fn remove(&self, key: &str) -> Result<bool>;
    fn keys(&self) -> Result<Vec<String>>;
}

/// Get the database directory
pub fn db_dir() -> PathBuf {
    ProjectDirs::from("com", "FileDeck", "FileDeck")
        .map(|dirs| dirs.data_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("./data"))
}

/// Open the durable store at `path`, or in the default data directory
pub fn open(path: Option<PathBuf>) -> Result<SqliteStore> {
    let db_path = path.unwrap_or_else(|| db_dir().join("state.db"));
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let pool = init_pool(&db_path)?;
    migrate(&pool)?;

    tracing::info!("Database initialized at {:?}", db_path);
    Ok(SqliteStore::new(pool))
}
