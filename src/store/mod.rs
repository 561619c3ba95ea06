//! Versioned cache of what the dashboard and the public page show.
//!
//! Every refresh and every content save bumps the version. The version is echoed as
//! `revisionId` in API responses, and content saves carrying a stale one are rejected.

use serde::Serialize;
use tokio::sync::RwLock;

use crate::errors::AppError;
use crate::gateway::{Bearer, FetchTrips, Gateway};
use crate::models::{Message, SiteContent, Trip};

/// Point-in-time copy of the cache.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreSnapshot {
    pub version: i64,
    pub content: SiteContent,
    pub trips: Vec<Trip>,
    pub messages: Vec<Message>,
}

/// Result of a refresh: the new snapshot plus any read that fell back to defaults.
#[derive(Debug, Clone)]
pub struct Refreshed {
    pub snapshot: StoreSnapshot,
    pub warnings: Vec<String>,
}

pub struct ClientStore {
    inner: RwLock<StoreSnapshot>,
}

impl ClientStore {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(StoreSnapshot {
                version: 0,
                content: SiteContent::default(),
                trips: Vec::new(),
                messages: Vec::new(),
            }),
        }
    }

    pub async fn version(&self) -> i64 {
        self.inner.read().await.version
    }

    pub async fn snapshot(&self) -> StoreSnapshot {
        self.inner.read().await.clone()
    }

    pub async fn content(&self) -> SiteContent {
        self.inner.read().await.content.clone()
    }

    pub async fn find_trip(&self, id: &str) -> Option<Trip> {
        self.inner
            .read()
            .await
            .trips
            .iter()
            .find(|t| t.id == id)
            .cloned()
    }

    pub async fn find_message(&self, id: &str) -> Option<Message> {
        self.inner
            .read()
            .await
            .messages
            .iter()
            .find(|m| m.id == id)
            .cloned()
    }

    /// Reload content, trips and messages from the gateway.
    pub async fn refresh(&self, gateway: &Gateway, bearer: Bearer<'_>) -> Refreshed {
        let (content, trips, messages) = tokio::join!(
            gateway.fetch_site_content(),
            gateway.fetch_trips(FetchTrips::default()),
            gateway.fetch_messages(bearer),
        );

        let warnings: Vec<String> = [content.error, trips.error, messages.error]
            .into_iter()
            .flatten()
            .map(|e| e.message())
            .collect();

        let mut inner = self.inner.write().await;
        inner.content = content.data;
        inner.trips = trips.data;
        inner.messages = messages.data;
        inner.version += 1;
        tracing::debug!(version = inner.version, "Store refreshed");

        Refreshed {
            snapshot: inner.clone(),
            warnings,
        }
    }

    /// Persist `content` and cache it. The write lock is held across the backend call
    /// so concurrent saves are serialized.
    pub async fn save_content(
        &self,
        gateway: &Gateway,
        bearer: Bearer<'_>,
        expected_version: Option<i64>,
        content: SiteContent,
    ) -> Result<i64, AppError> {
        let mut inner = self.inner.write().await;
        if let Some(expected) = expected_version {
            if expected != inner.version {
                return Err(AppError::Conflict {
                    message: format!(
                        "Version mismatch: expected {}, current {}",
                        expected, inner.version
                    ),
                    current_version: inner.version,
                });
            }
        }

        gateway.save_site_content(bearer, &content).await?;
        inner.content = content;
        inner.version += 1;
        Ok(inner.version)
    }
}

impl Default for ClientStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::testing::MockBackend;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_refresh_bumps_version() {
        let gateway = Gateway::new(Arc::new(MockBackend::new()));
        gateway.seed_trips_if_empty(None).await.unwrap();
        let store = ClientStore::new();
        assert_eq!(store.version().await, 0);

        let refreshed = store.refresh(&gateway, None).await;
        assert_eq!(refreshed.snapshot.version, 1);
        assert_eq!(refreshed.snapshot.trips.len(), 3);
        assert!(refreshed.warnings.is_empty());

        let id = refreshed.snapshot.trips[0].id.clone();
        assert!(store.find_trip(&id).await.is_some());
        assert!(store.find_trip("missing").await.is_none());
    }

    #[tokio::test]
    async fn test_refresh_reports_degraded_reads() {
        let backend = Arc::new(MockBackend::new());
        backend.fail_reads(true);
        let store = ClientStore::new();

        let refreshed = store.refresh(&Gateway::new(backend), None).await;
        assert_eq!(refreshed.warnings.len(), 3);
        assert_eq!(refreshed.snapshot.content, SiteContent::default());
        assert!(refreshed.snapshot.trips.is_empty());
    }

    #[tokio::test]
    async fn test_stale_save_is_rejected() {
        let gateway = Gateway::new(Arc::new(MockBackend::new()));
        let store = ClientStore::new();
        store.refresh(&gateway, None).await;

        let mut content = store.content().await;
        content.hero.badge = "Winter escapes".to_string();
        let version = store
            .save_content(&gateway, None, Some(1), content.clone())
            .await
            .unwrap();
        assert_eq!(version, 2);

        let err = store
            .save_content(&gateway, None, Some(1), content)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict { current_version: 2, .. }));
        assert_eq!(store.content().await.hero.badge, "Winter escapes");
    }

    #[tokio::test]
    async fn test_failed_save_leaves_cache_untouched() {
        let store = ClientStore::new();
        let mut content = SiteContent::default();
        content.hero.title = "Changed".to_string();

        let err = store
            .save_content(&Gateway::unconfigured(), None, None, content)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotConfigured));
        assert_eq!(store.version().await, 0);
        assert_eq!(store.content().await, SiteContent::default());
    }
}
