//! SQLite key-value operations

use crate::{DbError, DbPool, KeyValueStore, Result};
use rusqlite::OptionalExtension;

/// Durable key-value store backed by the `kv` table
#[derive(Clone)]
pub struct SqliteStore {
    pool: DbPool,
}

impl SqliteStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    fn conn(&self) -> Result<r2d2::PooledConnection<r2d2_sqlite::SqliteConnectionManager>> {
        self.pool.get().map_err(|e| DbError::Pool(e.to_string()))
    }
}

impl KeyValueStore for SqliteStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let conn = self.conn()?;
        let value = conn
            .query_row("SELECT value FROM kv WHERE key = ?1", [key], |row| row.get(0))
            .optional()?;
        Ok(value)
    }

    fn put(&self, key: &str, value: &str) -> Result<()> {
        let conn = self.conn()?;
        conn.execute(
            r#"
            INSERT INTO kv (key, value) VALUES (?1, ?2)
            ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = strftime('%s', 'now')
            "#,
            rusqlite::params![key, value],
        )?;
        tracing::trace!("Stored {} ({} bytes)", key, value.len());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<bool> {
        let conn = self.conn()?;
        let rows = conn.execute("DELETE FROM kv WHERE key = ?1", [key])?;
        Ok(rows > 0)
    }

    fn keys(&self) -> Result<Vec<String>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare("SELECT key FROM kv ORDER BY key")?;
        let rows = stmt.query_map([], |row| row.get(0))?;

        let mut keys = Vec::new();
        for row in rows {
            keys.push(row?);
        }

        Ok(keys)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{init_memory_pool, init_pool, migrate};
    use tempfile::NamedTempFile;

    fn store(file: &NamedTempFile) -> SqliteStore {
        let pool = init_pool(file.path()).unwrap();
        migrate(&pool).unwrap();
        SqliteStore::new(pool)
    }

    #[test]
    fn test_put_get_overwrite() {
        let file = NamedTempFile::new().unwrap();
        let store = store(&file);

        assert_eq!(store.get("savedSearches").unwrap(), None);
        store.put("savedSearches", "[]").unwrap();
        store.put("savedSearches", "[1]").unwrap();
        assert_eq!(store.get("savedSearches").unwrap().as_deref(), Some("[1]"));
        assert_eq!(store.keys().unwrap(), vec!["savedSearches".to_string()]);
    }

    #[test]
    fn test_remove() {
        let file = NamedTempFile::new().unwrap();
        let store = store(&file);

        store.put("k", "v").unwrap();
        assert!(store.remove("k").unwrap());
        assert!(!store.remove("k").unwrap());
    }

    #[test]
    fn test_survives_reopen() {
        let file = NamedTempFile::new().unwrap();
        store(&file).put("recentSearchQueries", r#"["report"]"#).unwrap();

        let reopened = store(&file);
        assert_eq!(
            reopened.get("recentSearchQueries").unwrap().as_deref(),
            Some(r#"["report"]"#)
        );
    }

    #[test]
    fn test_memory_backed_store() {
        let pool = init_memory_pool().unwrap();
        migrate(&pool).unwrap();
        let store = SqliteStore::new(pool);

        store.put("fileManager_clipboard", "{}").unwrap();
        assert_eq!(store.keys().unwrap(), vec!["fileManager_clipboard".to_string()]);
    }
}
