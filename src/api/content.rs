//! Dashboard and site copy endpoints.

use axum::{extract::State, Extension, Json};
use serde::Serialize;

use super::{error, success, ApiResult};
use crate::auth::AdminContext;
use crate::editors::SiteContentForm;
use crate::models::{Message, SiteContent, Trip, VersionedContent};
use crate::AppState;

/// Everything the dashboard shows after a refresh.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Dashboard {
    pub username: String,
    pub backend: &'static str,
    pub content: SiteContent,
    pub trips: Vec<Trip>,
    pub messages: Vec<Message>,
    pub warnings: Vec<String>,
}

/// GET /api/admin/dashboard - Refresh and return the dashboard data.
pub async fn get_dashboard(
    State(state): State<AppState>,
    Extension(admin): Extension<AdminContext>,
) -> ApiResult<Dashboard> {
    let refreshed = state
        .store
        .refresh(&state.gateway, Some(&admin.token))
        .await;
    let snapshot = refreshed.snapshot;

    success(
        Dashboard {
            username: admin.user.label(),
            backend: state.gateway.backend_name(),
            content: snapshot.content,
            trips: snapshot.trips,
            messages: snapshot.messages,
            warnings: refreshed.warnings,
        },
        snapshot.version,
    )
}

/// PUT /api/admin/content - Apply the site form and save the copy.
pub async fn update_content(
    State(state): State<AppState>,
    Extension(admin): Extension<AdminContext>,
    Json(form): Json<SiteContentForm>,
) -> ApiResult<VersionedContent> {
    let snapshot = state.store.snapshot().await;
    let expected_version = form.expected_version.unwrap_or(snapshot.version);
    let content = form.apply(snapshot.content);

    match state
        .store
        .save_content(
            &state.gateway,
            Some(&admin.token),
            Some(expected_version),
            content.clone(),
        )
        .await
    {
        Ok(version) => {
            tracing::info!(version, "Site content saved");
            success(VersionedContent { version, content }, version)
        }
        Err(e) => {
            let current = state.store.version().await;
            error(e, current)
        }
    }
}
