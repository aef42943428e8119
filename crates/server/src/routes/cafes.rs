//! Cafe route handlers.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};

use cafe_finder_core::CafeId;

use crate::db::Storage;
use crate::error::Result;
use crate::middleware::{RequireAuth, RequirePrivileged};
use crate::models::{Cafe, CafeInput};
use crate::state::AppState;

/// List every cafe, oldest first.
pub async fn index<S: Storage>(State(state): State<AppState<S>>) -> Result<Json<Vec<Cafe>>> {
    Ok(Json(state.registry().list().await?))
}

/// Show a single cafe.
pub async fn show<S: Storage>(
    State(state): State<AppState<S>>,
    Path(id): Path<CafeId>,
) -> Result<Json<Cafe>> {
    Ok(Json(state.registry().get(id).await?))
}

/// Add a cafe.
pub async fn create<S: Storage>(
    State(state): State<AppState<S>>,
    RequireAuth(user): RequireAuth,
    Json(input): Json<CafeInput>,
) -> Result<(StatusCode, Json<Cafe>)> {
    let cafe = state.registry().create(input).await?;
    tracing::debug!(user_id = %user.id, cafe_id = %cafe.id, "cafe submitted");

    Ok((StatusCode::CREATED, Json(cafe)))
}

/// Replace every field of a cafe.
pub async fn update<S: Storage>(
    State(state): State<AppState<S>>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<CafeId>,
    Json(input): Json<CafeInput>,
) -> Result<Json<Cafe>> {
    let cafe = state.registry().update(id, input).await?;
    tracing::debug!(user_id = %user.id, cafe_id = %cafe.id, "cafe edited");

    Ok(Json(cafe))
}

/// Delete a cafe (administrator only).
pub async fn destroy<S: Storage>(
    State(state): State<AppState<S>>,
    RequirePrivileged(admin): RequirePrivileged,
    Path(id): Path<CafeId>,
) -> Result<StatusCode> {
    state.registry().delete(&admin, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
