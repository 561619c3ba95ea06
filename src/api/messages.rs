//! Admin inquiry endpoints.

use axum::{
    extract::{Path, State},
    Extension,
};
use serde::Serialize;

use super::{error, refresh_store, success, ApiResult};
use crate::auth::AdminContext;
use crate::editors::toggle_message_status;
use crate::models::{Message, MessageStatus};
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct StatusChange {
    pub id: String,
    pub status: MessageStatus,
}

/// GET /api/admin/messages - All inquiries, newest first.
pub async fn list_messages(
    State(state): State<AppState>,
    Extension(admin): Extension<AdminContext>,
) -> ApiResult<Vec<Message>> {
    let revision_id = state.store.version().await;
    let messages = state.gateway.fetch_messages(Some(&admin.token)).await;

    match messages.error {
        Some(e) => error(e, revision_id),
        None => success(messages.data, revision_id),
    }
}

/// POST /api/admin/messages/{id}/toggle - Flip between new and resolved.
pub async fn toggle_message(
    State(state): State<AppState>,
    Extension(admin): Extension<AdminContext>,
    Path(id): Path<String>,
) -> ApiResult<StatusChange> {
    let revision_id = state.store.version().await;

    match toggle_message_status(&state.gateway, Some(&admin.token), &state.store, &id).await {
        Ok(status) => success(StatusChange { id, status }, refresh_store(&state, &admin).await),
        Err(e) => error(e, revision_id),
    }
}
