//! Key-value repository for the local fallback store.

use chrono::Utc;
use serde::{de::DeserializeOwned, Serialize};
use sqlx::{Row, SqlitePool};

use crate::errors::AppError;
use crate::models::{default_trips, AdminCredentials, LocalSession, Message, Trip};

/// Storage keys, matching the site's browser-storage layout.
pub mod keys {
    pub const TRIPS: &str = "zentura_trips";
    pub const MESSAGES: &str = "zentura_messages";
    pub const ADMIN: &str = "zentura_admin";
    pub const ADMIN_SESSION: &str = "zentura_admin_session";
    pub const SITE_CONTENT: &str = "zentura_site_content";
}

/// Local key-value store over SQLite.
#[derive(Clone)]
pub struct LocalStore {
    pool: SqlitePool,
}

impl LocalStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Read the raw JSON text stored under `key`.
    pub async fn get_raw(&self, key: &str) -> Result<Option<String>, AppError> {
        let row = sqlx::query("SELECT value FROM kv WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(|r| r.get("value")))
    }

    /// Read and decode the document under `key`. Corrupt JSON reads as absent.
    pub async fn get_json<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, AppError> {
        let Some(raw) = self.get_raw(key).await? else {
            return Ok(None);
        };
        match serde_json::from_str(&raw) {
            Ok(value) => Ok(Some(value)),
            Err(e) => {
                tracing::warn!("Ignoring unreadable value under {}: {}", key, e);
                Ok(None)
            }
        }
    }

    /// Encode and store a document under `key`, replacing any previous value.
    pub async fn set_json<T: Serialize>(&self, key: &str, value: &T) -> Result<(), AppError> {
        let raw = serde_json::to_string(value)
            .map_err(|e| AppError::Internal(format!("Failed to encode {}: {}", key, e)))?;
        let now = Utc::now().to_rfc3339();

        sqlx::query(
            "INSERT INTO kv (key, value, updated_at) VALUES (?, ?, ?) ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at"
        )
        .bind(key)
        .bind(&raw)
        .bind(&now)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn remove(&self, key: &str) -> Result<(), AppError> {
        sqlx::query("DELETE FROM kv WHERE key = ?")
            .bind(key)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Write default collections and credentials under any key that is still missing.
    pub async fn seed(&self, credentials: &AdminCredentials) -> Result<(), AppError> {
        if self.get_raw(keys::TRIPS).await?.is_none() {
            tracing::info!("Seeding local store with {} sample trips", default_trips().len());
            self.set_json(keys::TRIPS, &default_trips()).await?;
        }
        if self.get_raw(keys::MESSAGES).await?.is_none() {
            self.set_json(keys::MESSAGES, &Vec::<Message>::new()).await?;
        }
        if self.get_raw(keys::ADMIN).await?.is_none() {
            self.set_json(keys::ADMIN, credentials).await?;
        }
        Ok(())
    }

    // ==================== COLLECTIONS ====================

    pub async fn load_trips(&self) -> Result<Vec<Trip>, AppError> {
        Ok(self.get_json(keys::TRIPS).await?.unwrap_or_default())
    }

    pub async fn save_trips(&self, trips: &[Trip]) -> Result<(), AppError> {
        self.set_json(keys::TRIPS, &trips).await
    }

    pub async fn load_messages(&self) -> Result<Vec<Message>, AppError> {
        Ok(self.get_json(keys::MESSAGES).await?.unwrap_or_default())
    }

    pub async fn save_messages(&self, messages: &[Message]) -> Result<(), AppError> {
        self.set_json(keys::MESSAGES, &messages).await
    }

    pub async fn load_site_content(&self) -> Result<Option<serde_json::Value>, AppError> {
        self.get_json(keys::SITE_CONTENT).await
    }

    pub async fn save_site_content(&self, content: &serde_json::Value) -> Result<(), AppError> {
        self.set_json(keys::SITE_CONTENT, content).await
    }

    // ==================== ADMIN ====================

    pub async fn load_credentials(&self) -> Result<Option<AdminCredentials>, AppError> {
        self.get_json(keys::ADMIN).await
    }

    pub async fn load_session(&self) -> Result<Option<LocalSession>, AppError> {
        self.get_json(keys::ADMIN_SESSION).await
    }

    pub async fn save_session(&self, session: &LocalSession) -> Result<(), AppError> {
        self.set_json(keys::ADMIN_SESSION, session).await
    }

    pub async fn clear_session(&self) -> Result<(), AppError> {
        self.remove(keys::ADMIN_SESSION).await
    }
}
