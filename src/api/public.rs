//! Public page and catalogue endpoints.

use axum::{extract::State, response::Html, Json};

use super::{error, success, ApiResult};
use crate::editors::{submit_contact, ContactForm};
use crate::gateway::FetchTrips;
use crate::models::{Message, Trip, VersionedContent};
use crate::render::render_home_page;
use crate::AppState;

/// GET / - Render the public page.
pub async fn home_page(State(state): State<AppState>) -> Html<String> {
    let (content, trips) = tokio::join!(
        state.gateway.fetch_site_content(),
        state.gateway.fetch_trips(FetchTrips { fallback: true }),
    );
    Html(render_home_page(&content.data, &trips.data))
}

/// GET /api/content - Site copy merged over defaults.
pub async fn get_content(State(state): State<AppState>) -> ApiResult<VersionedContent> {
    let version = state.store.version().await;
    let content = state.gateway.fetch_site_content().await;
    success(
        VersionedContent {
            version,
            content: content.data,
        },
        version,
    )
}

/// GET /api/trips - Trip catalogue, sample trips when none exist.
pub async fn list_public_trips(State(state): State<AppState>) -> ApiResult<Vec<Trip>> {
    let revision_id = state.store.version().await;
    let trips = state
        .gateway
        .fetch_trips(FetchTrips { fallback: true })
        .await;
    success(trips.data, revision_id)
}

/// POST /api/messages - Submit the contact form.
pub async fn create_message(
    State(state): State<AppState>,
    Json(form): Json<ContactForm>,
) -> ApiResult<Message> {
    let revision_id = state.store.version().await;

    match submit_contact(&state.gateway, form).await {
        Ok(message) => success(message, revision_id),
        Err(e) => error(e, revision_id),
    }
}
