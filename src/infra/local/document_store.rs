use chrono::Utc;
use serde::{de::DeserializeOwned, Serialize};
use sqlx::SqlitePool;
use tokio::sync::Mutex;
use tracing::{error, warn};
use crate::error::AppError;

/// Logical keys of the local store. Each holds one JSON document.
pub mod keys {
    pub const USERS: &str = "trainer_users";
    pub const SESSION: &str = "trainer_session";
    pub const CUSTOMERS: &str = "trainer_customers";
    pub const APPOINTMENTS: &str = "trainer_appointments";
    pub const PAYMENTS: &str = "trainer_payments";
    pub const TRAINING_RECORDS: &str = "trainer_training_records";
}

/// Key -> JSON text, backed by a single SQLite table.
///
/// Missing or unparsable documents read as empty. Read-modify-write goes
/// through [`LocalDocumentStore::update_list`], which holds a process-wide
/// lock so two writers can't interleave on the same list.
pub struct LocalDocumentStore {
    pool: SqlitePool,
    write_lock: Mutex<()>,
}

impl LocalDocumentStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool, write_lock: Mutex::new(()) }
    }

    async fn read_raw(&self, key: &str) -> Result<Option<String>, AppError> {
        sqlx::query_scalar::<_, String>("SELECT value FROM local_store WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    pub async fn load_list<T: DeserializeOwned>(&self, key: &str) -> Result<Vec<T>, AppError> {
        let Some(raw) = self.read_raw(key).await? else {
            return Ok(Vec::new());
        };
        match serde_json::from_str::<Vec<T>>(&raw) {
            Ok(items) => Ok(items),
            Err(e) => {
                warn!("Malformed document under '{}', treating as empty: {}", key, e);
                Ok(Vec::new())
            }
        }
    }

    pub async fn load_value<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, AppError> {
        let Some(raw) = self.read_raw(key).await? else {
            return Ok(None);
        };
        match serde_json::from_str::<T>(&raw) {
            Ok(value) => Ok(Some(value)),
            Err(e) => {
                warn!("Malformed document under '{}', ignoring: {}", key, e);
                Ok(None)
            }
        }
    }

    pub async fn save<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<(), AppError> {
        let text = serde_json::to_string(value).map_err(|e| {
            error!("Serializing '{}' failed: {}", key, e);
            AppError::Storage(format!("could not serialize {}", key))
        })?;

        sqlx::query(
            "INSERT INTO local_store (key, value, updated_at) VALUES (?, ?, ?)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at"
        )
            .bind(key)
            .bind(text)
            .bind(Utc::now())
            .execute(&self.pool)
            .await
            .map_err(AppError::Database)?;
        Ok(())
    }

    pub async fn remove(&self, key: &str) -> Result<(), AppError> {
        sqlx::query("DELETE FROM local_store WHERE key = ?")
            .bind(key)
            .execute(&self.pool)
            .await
            .map_err(AppError::Database)?;
        Ok(())
    }

    /// Loads the list, lets `f` edit it, and writes it back only if `f` succeeds.
    pub async fn update_list<T, R, F>(&self, key: &str, f: F) -> Result<R, AppError>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce(&mut Vec<T>) -> Result<R, AppError>,
    {
        let _guard = self.write_lock.lock().await;
        let mut items: Vec<T> = self.load_list(key).await?;
        let result = f(&mut items)?;
        self.save(key, &items).await?;
        Ok(result)
    }
}
