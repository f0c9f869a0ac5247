// ==========================================
// School Admin Dashboard - Config Manager
// ==========================================
// Key-value configuration stored in the config_kv table (global scope).
// Missing keys fall back to compiled defaults.
// ==========================================

use crate::config::import_config_trait::{
    ImportConfigReader, DEFAULT_ERROR_PREVIEW_LIMIT, DEFAULT_GUARDIAN_NAME,
    DEFAULT_GUARDIAN_PHONE, DEFAULT_UPSERT_BATCH_SIZE,
};
use crate::db::open_sqlite_connection;
use async_trait::async_trait;
use rusqlite::{params, Connection};
use std::error::Error;
use std::sync::{Arc, Mutex};

pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
}

impl ConfigManager {
    pub fn new(db_path: &str) -> Result<Self, Box<dyn Error>> {
        let conn = open_sqlite_connection(db_path)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Reuse an existing connection; reapplies the uniform PRAGMAs
    /// (idempotent) so behavior matches a fresh connection.
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Result<Self, Box<dyn Error>> {
        {
            let guard = conn.lock().map_err(|e| format!("lock poisoned: {}", e))?;
            crate::db::configure_sqlite_connection(&guard)?;
        }
        Ok(Self { conn })
    }

    fn get_config_value(&self, key: &str) -> Result<Option<String>, Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("lock poisoned: {}", e))?;

        let result = conn.query_row(
            "SELECT value FROM config_kv WHERE scope_id = 'global' AND key = ?1",
            params![key],
            |row| row.get::<_, String>(0),
        );

        match result {
            Ok(value) => Ok(Some(value)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(Box::new(e)),
        }
    }

    fn get_usize_or(&self, key: &str, default: usize) -> Result<usize, Box<dyn Error>> {
        match self.get_config_value(key)? {
            Some(raw) => Ok(raw.trim().parse::<usize>().unwrap_or(default)),
            None => Ok(default),
        }
    }
}

#[async_trait]
impl ImportConfigReader for ConfigManager {
    async fn get_upsert_batch_size(&self) -> Result<usize, Box<dyn Error>> {
        let size = self.get_usize_or("import_batch_size", DEFAULT_UPSERT_BATCH_SIZE)?;
        // A zero batch size would make the batcher spin.
        Ok(size.max(1))
    }

    async fn get_error_preview_limit(&self) -> Result<usize, Box<dyn Error>> {
        self.get_usize_or("import_error_preview_limit", DEFAULT_ERROR_PREVIEW_LIMIT)
    }

    async fn get_guardian_name_placeholder(&self) -> Result<String, Box<dyn Error>> {
        Ok(self
            .get_config_value("guardian_name_placeholder")?
            .unwrap_or_else(|| DEFAULT_GUARDIAN_NAME.to_string()))
    }

    async fn get_guardian_phone_placeholder(&self) -> Result<String, Box<dyn Error>> {
        Ok(self
            .get_config_value("guardian_phone_placeholder")?
            .unwrap_or_else(|| DEFAULT_GUARDIAN_PHONE.to_string()))
    }
}
