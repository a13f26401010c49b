//! Flat key-value storage for serialized documents.
//!
//! The video store writes its whole bookmark list as one blob under a fixed
//! key, so the backend only needs whole-value get/set/remove.

use std::sync::Arc;

use chrono::Utc;
use rusqlite::{params, OptionalExtension};

use crate::database::connection::Database;
use crate::types::errors::StoreError;

/// Trait defining key-value storage operations.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError>;
    fn set(&self, key: &str, value: &[u8]) -> Result<(), StoreError>;
    fn remove(&self, key: &str) -> Result<(), StoreError>;
}

/// Key-value store backed by the `kv_store` SQLite table.
pub struct SqliteKeyValueStore {
    db: Arc<Database>,
}

impl SqliteKeyValueStore {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }
}

impl KeyValueStore for SqliteKeyValueStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        self.db
            .connection()
            .query_row(
                "SELECT value FROM kv_store WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()
            .map_err(|e| StoreError::DatabaseError(e.to_string()))
    }

    fn set(&self, key: &str, value: &[u8]) -> Result<(), StoreError> {
        self.db
            .connection()
            .execute(
                "INSERT OR REPLACE INTO kv_store (key, value, updated_at) VALUES (?1, ?2, ?3)",
                params![key, value, Utc::now().timestamp()],
            )
            .map_err(|e| StoreError::DatabaseError(e.to_string()))?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.db
            .connection()
            .execute("DELETE FROM kv_store WHERE key = ?1", params![key])
            .map_err(|e| StoreError::DatabaseError(e.to_string()))?;
        Ok(())
    }
}
