//! SQLite implementation of the ChainStore trait.
//!
//! The primary storage backend. It uses rusqlite with bundled SQLite,
//! wrapped in async via tokio::spawn_blocking.

use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension};

use supply_ledger_core::{now_millis, BlockRecord, HashFormat};

use crate::error::{Result, StoreError};
use crate::migration;
use crate::traits::{ChainStore, StoredChain};

/// SQLite-based store implementation.
///
/// Thread-safe via internal Mutex. All operations use spawn_blocking
/// to avoid blocking the async runtime.
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    /// Open a SQLite database at the given path.
    ///
    /// Creates the file, and any missing parent directories, and runs
    /// migrations if it doesn't exist.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let mut conn = Connection::open(path)?;
        migration::migrate(&mut conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Open an in-memory SQLite database.
    pub fn open_memory() -> Result<Self> {
        let mut conn = Connection::open_in_memory()?;
        migration::migrate(&mut conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Run `f` against the connection on the blocking thread pool.
    async fn with_conn<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut Connection) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let conn = self.conn.clone();

        tokio::task::spawn_blocking(move || {
            let mut conn = conn
                .lock()
                .map_err(|e| StoreError::Task(format!("mutex poisoned: {}", e)))?;
            f(&mut conn)
        })
        .await
        .map_err(|e| StoreError::Task(format!("spawn_blocking failed: {}", e)))?
    }
}

#[async_trait]
impl ChainStore for SqliteStore {
    async fn save_chain(
        &self,
        key: &str,
        format: HashFormat,
        records: &[BlockRecord],
    ) -> Result<()> {
        let text = serde_json::to_string(records)?;
        let key_owned = key.to_string();
        let block_count = records.len() as i64;

        self.with_conn(move |conn| {
            conn.execute(
                "INSERT INTO chains (storage_key, records, block_count, updated_at, hash_format)
                 VALUES (?1, ?2, ?3, ?4, ?5)
                 ON CONFLICT(storage_key) DO UPDATE SET
                    records = excluded.records,
                    block_count = excluded.block_count,
                    updated_at = excluded.updated_at,
                    hash_format = excluded.hash_format",
                params![key_owned, text, block_count, now_millis(), format.as_str()],
            )?;
            Ok(())
        })
        .await?;

        tracing::debug!(key, %format, blocks = block_count, "saved chain");
        Ok(())
    }

    async fn load_chain(&self, key: &str) -> Result<Option<StoredChain>> {
        let key_owned = key.to_string();

        let row: Option<(String, String)> = self
            .with_conn(move |conn| {
                let row = conn
                    .query_row(
                        "SELECT hash_format, records FROM chains WHERE storage_key = ?1",
                        params![key_owned],
                        |row| Ok((row.get(0)?, row.get(1)?)),
                    )
                    .optional()?;
                Ok(row)
            })
            .await?;

        let Some((format, text)) = row else {
            return Ok(None);
        };

        let hash_format: HashFormat = format
            .parse::<HashFormat>()
            .map_err(|e| StoreError::Serialization(e.to_string()))?;
        let blocks: Vec<BlockRecord> = serde_json::from_str(&text)?;
        tracing::debug!(key, format = %hash_format, blocks = blocks.len(), "loaded chain");
        Ok(Some(StoredChain {
            hash_format,
            blocks,
        }))
    }

    async fn delete_chain(&self, key: &str) -> Result<bool> {
        let key_owned = key.to_string();

        self.with_conn(move |conn| {
            let deleted = conn.execute(
                "DELETE FROM chains WHERE storage_key = ?1",
                params![key_owned],
            )?;
            Ok(deleted > 0)
        })
        .await
    }

    async fn list_keys(&self) -> Result<Vec<String>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare("SELECT storage_key FROM chains ORDER BY storage_key")?;
            let keys = stmt
                .query_map([], |row| row.get(0))?
                .collect::<std::result::Result<Vec<String>, _>>()?;
            Ok(keys)
        })
        .await
    }
}
