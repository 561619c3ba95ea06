//! Data gateway.
//!
//! [`Gateway`] is the only path from handlers to persisted data. It owns the
//! degradation policy (defaults for failed reads, a fixed error for writes when no
//! backend exists) while a [`Backend`] implementation does the raw I/O against either
//! the hosted service or the local key-value store.

mod local;
mod supabase;

#[cfg(test)]
pub mod testing;

pub use local::LocalBackend;
pub use supabase::SupabaseBackend;

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use rand::Rng;

use crate::errors::AppError;
use crate::merge::merge_site_content;
use crate::models::{
    default_trips, AuthSession, AuthUser, ImageUpload, Message, MessageStatus, SiteContent,
    StoredImage, Trip, DEFAULT_IMAGE_PREFIX,
};

/// Access token of the signed-in admin, when the call is made on their behalf.
pub type Bearer<'a> = Option<&'a str>;

/// Raw storage operations. Implementations report every failure as an error and
/// leave fallback decisions to [`Gateway`].
#[async_trait]
pub trait Backend: Send + Sync {
    fn name(&self) -> &'static str;

    async fn load_site_content(&self) -> Result<Option<serde_json::Value>, AppError>;
    async fn store_site_content(
        &self,
        bearer: Bearer<'_>,
        content: &serde_json::Value,
    ) -> Result<(), AppError>;

    /// All trips, newest first.
    async fn list_trips(&self) -> Result<Vec<Trip>, AppError>;
    async fn has_trips(&self) -> Result<bool, AppError>;
    /// Insert trips, returning them with their assigned ids.
    async fn insert_trips(&self, bearer: Bearer<'_>, trips: &[Trip]) -> Result<Vec<Trip>, AppError>;
    async fn update_trip(&self, bearer: Bearer<'_>, trip: &Trip) -> Result<(), AppError>;
    async fn delete_trip(&self, bearer: Bearer<'_>, id: &str) -> Result<(), AppError>;

    /// All inquiries, newest first.
    async fn list_messages(&self, bearer: Bearer<'_>) -> Result<Vec<Message>, AppError>;
    async fn insert_message(&self, message: &Message) -> Result<(), AppError>;
    async fn set_message_status(
        &self,
        bearer: Bearer<'_>,
        id: &str,
        status: MessageStatus,
    ) -> Result<(), AppError>;

    /// Store an object at `path`, overwriting any existing one.
    async fn put_object(
        &self,
        bearer: Bearer<'_>,
        path: &str,
        upload: &ImageUpload,
    ) -> Result<(), AppError>;
    fn public_url(&self, path: &str) -> String;
    async fn list_objects(&self, bearer: Bearer<'_>, prefix: &str) -> Result<Vec<StoredImage>, AppError>;

    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthSession, AppError>;
    async fn sign_out(&self, token: &str) -> Result<(), AppError>;
    /// The user owning `token`, or `None` when the token is not a live session.
    async fn get_user(&self, token: &str) -> Result<Option<AuthUser>, AppError>;
    /// Allow-list membership of `user_id`.
    async fn is_admin(&self, bearer: Bearer<'_>, user_id: &str) -> Result<bool, AppError>;
    /// Remove any session traces this backend keeps on our side.
    async fn clear_local_session(&self) -> Result<(), AppError> {
        Ok(())
    }
}

/// A read result that always carries usable data, plus the error that forced a
/// fallback, if any.
#[derive(Debug, Clone)]
pub struct Fetched<T> {
    pub data: T,
    pub error: Option<AppError>,
}

impl<T> Fetched<T> {
    pub fn ok(data: T) -> Self {
        Self { data, error: None }
    }

    pub fn degraded(data: T, error: AppError) -> Self {
        Self {
            data,
            error: Some(error),
        }
    }
}

/// Options for [`Gateway::fetch_trips`].
#[derive(Debug, Clone, Copy, Default)]
pub struct FetchTrips {
    /// Serve the sample trips instead of an empty or failed listing.
    pub fallback: bool,
}

/// Typed data operations with graceful degradation.
#[derive(Clone)]
pub struct Gateway {
    backend: Option<Arc<dyn Backend>>,
}

impl Gateway {
    pub fn new(backend: Arc<dyn Backend>) -> Self {
        Self {
            backend: Some(backend),
        }
    }

    /// Degraded mode: static defaults for reads, "not configured" for writes.
    pub fn unconfigured() -> Self {
        Self { backend: None }
    }

    pub fn is_ready(&self) -> bool {
        self.backend.is_some()
    }

    pub fn backend_name(&self) -> &'static str {
        self.backend.as_ref().map(|b| b.name()).unwrap_or("none")
    }

    fn backend(&self) -> Result<&Arc<dyn Backend>, AppError> {
        self.backend.as_ref().ok_or(AppError::NotConfigured)
    }

    // ==================== SITE CONTENT ====================

    /// The content document reconciled with defaults. Never blocks the page on a
    /// missing or failing backend.
    pub async fn fetch_site_content(&self) -> Fetched<SiteContent> {
        let Some(backend) = &self.backend else {
            return Fetched::ok(SiteContent::default());
        };
        match backend.load_site_content().await {
            Ok(stored) => Fetched::ok(merge_site_content(stored.as_ref())),
            Err(e) => {
                tracing::warn!("Falling back to default site content: {}", e);
                Fetched::degraded(SiteContent::default(), e)
            }
        }
    }

    pub async fn save_site_content(
        &self,
        bearer: Bearer<'_>,
        content: &SiteContent,
    ) -> Result<(), AppError> {
        let backend = self.backend()?;
        let document = serde_json::to_value(content)
            .map_err(|e| AppError::Internal(format!("Failed to encode site content: {}", e)))?;
        backend.store_site_content(bearer, &document).await
    }

    // ==================== TRIPS ====================

    pub async fn fetch_trips(&self, options: FetchTrips) -> Fetched<Vec<Trip>> {
        let fallback = || if options.fallback { default_trips() } else { Vec::new() };

        let Some(backend) = &self.backend else {
            return Fetched::ok(fallback());
        };
        match backend.list_trips().await {
            Ok(trips) if trips.is_empty() => Fetched::ok(fallback()),
            Ok(trips) => Fetched::ok(trips),
            Err(e) => {
                tracing::warn!("Failed to fetch trips: {}", e);
                Fetched::degraded(fallback(), e)
            }
        }
    }

    pub async fn create_trip(&self, bearer: Bearer<'_>, trip: &Trip) -> Result<Trip, AppError> {
        let backend = self.backend()?;
        let mut created = backend.insert_trips(bearer, std::slice::from_ref(trip)).await?;
        created
            .pop()
            .ok_or_else(|| AppError::Backend("Trip insert returned no row".to_string()))
    }

    pub async fn update_trip(&self, bearer: Bearer<'_>, trip: &Trip) -> Result<(), AppError> {
        let backend = self.backend()?;
        if trip.id.trim().is_empty() {
            return Err(AppError::Validation("Trip id is required for updates".to_string()));
        }
        backend.update_trip(bearer, trip).await
    }

    pub async fn delete_trip(&self, bearer: Bearer<'_>, id: &str) -> Result<(), AppError> {
        self.backend()?.delete_trip(bearer, id).await
    }

    /// Insert the sample trips when no trip exists yet. Returns how many were added.
    pub async fn seed_trips_if_empty(&self, bearer: Bearer<'_>) -> Result<usize, AppError> {
        let backend = self.backend()?;
        if backend.has_trips().await? {
            return Ok(0);
        }
        let inserted = backend.insert_trips(bearer, &default_trips()).await?;
        tracing::info!("Seeded {} sample trips", inserted.len());
        Ok(inserted.len())
    }

    // ==================== MESSAGES ====================

    pub async fn fetch_messages(&self, bearer: Bearer<'_>) -> Fetched<Vec<Message>> {
        let Some(backend) = &self.backend else {
            return Fetched::ok(Vec::new());
        };
        match backend.list_messages(bearer).await {
            Ok(messages) => Fetched::ok(messages),
            Err(e) => {
                tracing::warn!("Failed to fetch messages: {}", e);
                Fetched::degraded(Vec::new(), e)
            }
        }
    }

    pub async fn add_message(&self, message: &Message) -> Result<(), AppError> {
        self.backend()?.insert_message(message).await
    }

    pub async fn update_message_status(
        &self,
        bearer: Bearer<'_>,
        id: &str,
        status: MessageStatus,
    ) -> Result<(), AppError> {
        self.backend()?.set_message_status(bearer, id, status).await
    }

    // ==================== IMAGES ====================

    /// Upload a file under `prefix` and return its public URL.
    pub async fn upload_image(
        &self,
        bearer: Bearer<'_>,
        upload: Option<&ImageUpload>,
        prefix: Option<&str>,
    ) -> Result<String, AppError> {
        let backend = self.backend()?;
        let upload =
            upload.ok_or_else(|| AppError::Validation("No file provided".to_string()))?;
        let prefix = prefix.filter(|p| !p.is_empty()).unwrap_or(DEFAULT_IMAGE_PREFIX);

        let path = image_path(prefix, &upload.file_name);
        backend.put_object(bearer, &path, upload).await?;
        tracing::info!("Uploaded image to {}", path);
        Ok(backend.public_url(&path))
    }

    pub async fn list_images(&self, bearer: Bearer<'_>, prefix: Option<&str>) -> Fetched<Vec<StoredImage>> {
        let Some(backend) = &self.backend else {
            return Fetched::ok(Vec::new());
        };
        let prefix = prefix.filter(|p| !p.is_empty()).unwrap_or(DEFAULT_IMAGE_PREFIX);
        match backend.list_objects(bearer, prefix).await {
            Ok(images) => Fetched::ok(images),
            Err(e) => {
                tracing::warn!("Failed to list images: {}", e);
                Fetched::degraded(Vec::new(), e)
            }
        }
    }

    // ==================== AUTH ====================

    pub async fn sign_in(&self, email: &str, password: &str) -> Result<AuthSession, AppError> {
        self.backend()?.sign_in(email, password).await
    }

    pub async fn sign_out(&self, token: &str) -> Result<(), AppError> {
        self.backend()?.sign_out(token).await
    }

    pub async fn get_session(&self, token: &str) -> Result<Option<AuthUser>, AppError> {
        match &self.backend {
            Some(backend) => backend.get_user(token).await,
            None => Ok(None),
        }
    }

    /// Allow-list membership. Lookup failures come back as errors, never panics.
    pub async fn check_admin_access(
        &self,
        bearer: Bearer<'_>,
        user_id: &str,
    ) -> Result<bool, AppError> {
        self.backend()?.is_admin(bearer, user_id).await
    }

    pub async fn clear_auth_session(&self) -> Result<(), AppError> {
        match &self.backend {
            Some(backend) => backend.clear_local_session().await,
            None => Ok(()),
        }
    }
}

/// Bucket-relative object path: `<prefix>/<millis>_<token>.<ext>`.
pub fn image_path(prefix: &str, file_name: &str) -> String {
    let extension = file_name.rsplit('.').next().unwrap_or(file_name);
    format!(
        "{}/{}_{}.{}",
        prefix.trim_end_matches('/'),
        Utc::now().timestamp_millis(),
        random_token(6),
        extension
    )
}

fn random_token(len: usize) -> String {
    const ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    let mut rng = rand::rng();
    (0..len)
        .map(|_| ALPHABET[rng.random_range(0..ALPHABET.len())] as char)
        .collect()
}
