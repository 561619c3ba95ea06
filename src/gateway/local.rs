//! Backend over the local key-value store, used when no hosted service is configured.

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;

use super::{Backend, Bearer};
use crate::auth::constant_time_compare;
use crate::db::LocalStore;
use crate::errors::AppError;
use crate::models::{
    AuthSession, AuthUser, ImageUpload, LocalSession, Message, MessageStatus, StoredImage, Trip,
};

pub struct LocalBackend {
    store: LocalStore,
    /// Held across every load-modify-save of a stored collection.
    writes: Mutex<()>,
}

impl LocalBackend {
    pub fn new(store: LocalStore) -> Self {
        Self {
            store,
            writes: Mutex::new(()),
        }
    }
}

#[async_trait]
impl Backend for LocalBackend {
    fn name(&self) -> &'static str {
        "local"
    }

    async fn load_site_content(&self) -> Result<Option<serde_json::Value>, AppError> {
        self.store.load_site_content().await
    }

    async fn store_site_content(
        &self,
        _bearer: Bearer<'_>,
        content: &serde_json::Value,
    ) -> Result<(), AppError> {
        self.store.save_site_content(content).await
    }

    async fn list_trips(&self) -> Result<Vec<Trip>, AppError> {
        self.store.load_trips().await
    }

    async fn has_trips(&self) -> Result<bool, AppError> {
        Ok(!self.store.load_trips().await?.is_empty())
    }

    async fn insert_trips(&self, _bearer: Bearer<'_>, trips: &[Trip]) -> Result<Vec<Trip>, AppError> {
        let now = Utc::now().to_rfc3339();
        let created: Vec<Trip> = trips
            .iter()
            .map(|trip| {
                let mut trip = trip.clone();
                if trip.id.trim().is_empty() {
                    trip.id = uuid::Uuid::new_v4().to_string();
                }
                trip.created_at = Some(now.clone());
                trip.updated_at = None;
                trip
            })
            .collect();

        // Stored newest first
        let _guard = self.writes.lock().await;
        let mut all = created.clone();
        all.extend(self.store.load_trips().await?);
        self.store.save_trips(&all).await?;
        Ok(created)
    }

    async fn update_trip(&self, _bearer: Bearer<'_>, trip: &Trip) -> Result<(), AppError> {
        let _guard = self.writes.lock().await;
        let mut trips = self.store.load_trips().await?;
        let existing = trips
            .iter_mut()
            .find(|t| t.id == trip.id)
            .ok_or_else(|| AppError::NotFound(format!("Trip {} not found", trip.id)))?;

        let created_at = existing.created_at.take();
        *existing = Trip {
            created_at,
            updated_at: Some(Utc::now().to_rfc3339()),
            ..trip.clone()
        };
        self.store.save_trips(&trips).await
    }

    async fn delete_trip(&self, _bearer: Bearer<'_>, id: &str) -> Result<(), AppError> {
        let _guard = self.writes.lock().await;
        let mut trips = self.store.load_trips().await?;
        let before = trips.len();
        trips.retain(|t| t.id != id);
        if trips.len() == before {
            return Err(AppError::NotFound(format!("Trip {} not found", id)));
        }
        self.store.save_trips(&trips).await
    }

    async fn list_messages(&self, _bearer: Bearer<'_>) -> Result<Vec<Message>, AppError> {
        self.store.load_messages().await
    }

    async fn insert_message(&self, message: &Message) -> Result<(), AppError> {
        let _guard = self.writes.lock().await;
        let mut messages = self.store.load_messages().await?;
        messages.insert(0, message.clone());
        self.store.save_messages(&messages).await
    }

    async fn set_message_status(
        &self,
        _bearer: Bearer<'_>,
        id: &str,
        status: MessageStatus,
    ) -> Result<(), AppError> {
        let _guard = self.writes.lock().await;
        let mut messages = self.store.load_messages().await?;
        let message = messages
            .iter_mut()
            .find(|m| m.id == id)
            .ok_or_else(|| AppError::NotFound(format!("Message {} not found", id)))?;
        message.status = status;
        self.store.save_messages(&messages).await
    }

    async fn put_object(
        &self,
        _bearer: Bearer<'_>,
        _path: &str,
        _upload: &ImageUpload,
    ) -> Result<(), AppError> {
        // File storage only exists on the hosted backend
        Err(AppError::NotConfigured)
    }

    fn public_url(&self, path: &str) -> String {
        path.to_string()
    }

    async fn list_objects(&self, _bearer: Bearer<'_>, _prefix: &str) -> Result<Vec<StoredImage>, AppError> {
        Ok(Vec::new())
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthSession, AppError> {
        let credentials = self
            .store
            .load_credentials()
            .await?
            .ok_or_else(|| AppError::Unauthorized("No admin account configured".to_string()))?;

        let username = email.split('@').next().unwrap_or(email);
        let user_ok = constant_time_compare(username, &credentials.username);
        let pass_ok = constant_time_compare(password, &credentials.password);
        if !(user_ok && pass_ok) {
            return Err(AppError::Unauthorized("Invalid login credentials".to_string()));
        }

        let session = LocalSession {
            username: credentials.username.clone(),
            created_at: Utc::now().to_rfc3339(),
            token: uuid::Uuid::new_v4().to_string(),
        };
        self.store.save_session(&session).await?;

        Ok(AuthSession {
            access_token: session.token,
            refresh_token: None,
            user: AuthUser {
                id: credentials.username,
                email: Some(email.to_string()),
            },
        })
    }

    async fn sign_out(&self, _token: &str) -> Result<(), AppError> {
        self.store.clear_session().await
    }

    async fn get_user(&self, token: &str) -> Result<Option<AuthUser>, AppError> {
        Ok(self
            .store
            .load_session()
            .await?
            .filter(|session| constant_time_compare(token, &session.token))
            .map(|session| AuthUser {
                id: session.username,
                email: None,
            }))
    }

    async fn is_admin(&self, _bearer: Bearer<'_>, user_id: &str) -> Result<bool, AppError> {
        Ok(self
            .store
            .load_credentials()
            .await?
            .map(|c| c.username == user_id)
            .unwrap_or(false))
    }

    async fn clear_local_session(&self) -> Result<(), AppError> {
        self.store.clear_session().await
    }
}
