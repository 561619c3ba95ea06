//! Admin trip endpoints.

use axum::{
    extract::{Path, State},
    Extension, Json,
};
use serde::Serialize;

use super::{error, refresh_store, success, ApiResult};
use crate::auth::AdminContext;
use crate::editors::TripForm;
use crate::gateway::FetchTrips;
use crate::models::Trip;
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct SeedResult {
    pub inserted: usize,
}

/// GET /api/admin/trips - Stored trips, without sample fallback.
pub async fn list_trips(State(state): State<AppState>) -> ApiResult<Vec<Trip>> {
    let revision_id = state.store.version().await;
    let trips = state.gateway.fetch_trips(FetchTrips::default()).await;

    match trips.error {
        Some(e) => error(e, revision_id),
        None => success(trips.data, revision_id),
    }
}

/// GET /api/admin/trips/{id}/form - Editor form prefilled from the cached trip.
pub async fn get_trip_form(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<TripForm> {
    let revision_id = state.store.version().await;

    match state.trip_editor.open(&state.store, Some(&id)).await {
        Ok(form) => success(form, revision_id),
        Err(e) => error(e, revision_id),
    }
}

/// POST /api/admin/trips - Create a trip from the editor form.
pub async fn create_trip(
    State(state): State<AppState>,
    Extension(admin): Extension<AdminContext>,
    Json(mut form): Json<TripForm>,
) -> ApiResult<Trip> {
    let revision_id = state.store.version().await;
    form.id.clear();

    match state
        .trip_editor
        .submit(&state.gateway, Some(&admin.token), form)
        .await
    {
        Ok(trip) => success(trip, refresh_store(&state, &admin).await),
        Err(e) => error(e, revision_id),
    }
}

/// PUT /api/admin/trips/{id} - Replace a trip from the editor form.
pub async fn update_trip(
    State(state): State<AppState>,
    Extension(admin): Extension<AdminContext>,
    Path(id): Path<String>,
    Json(mut form): Json<TripForm>,
) -> ApiResult<Trip> {
    let revision_id = state.store.version().await;
    form.id = id;

    match state
        .trip_editor
        .submit(&state.gateway, Some(&admin.token), form)
        .await
    {
        Ok(trip) => success(trip, refresh_store(&state, &admin).await),
        Err(e) => error(e, revision_id),
    }
}

/// DELETE /api/admin/trips/{id} - Delete a trip.
pub async fn delete_trip(
    State(state): State<AppState>,
    Extension(admin): Extension<AdminContext>,
    Path(id): Path<String>,
) -> ApiResult<()> {
    let revision_id = state.store.version().await;

    match state.gateway.delete_trip(Some(&admin.token), &id).await {
        Ok(()) => {
            tracing::info!(%id, "Trip deleted");
            success((), refresh_store(&state, &admin).await)
        }
        Err(e) => error(e, revision_id),
    }
}

/// POST /api/admin/trips/seed - Insert the sample trips into an empty table.
pub async fn seed_trips(
    State(state): State<AppState>,
    Extension(admin): Extension<AdminContext>,
) -> ApiResult<SeedResult> {
    let revision_id = state.store.version().await;

    match state.gateway.seed_trips_if_empty(Some(&admin.token)).await {
        Ok(inserted) => success(SeedResult { inserted }, refresh_store(&state, &admin).await),
        Err(e) => error(e, revision_id),
    }
}
