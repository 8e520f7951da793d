use axum::{Json, extract::State, http::StatusCode};
use serde::Serialize;

use crate::AppState;
use crate::auth::AuthUser;
use crate::error::Result;
use crate::models::{Mantra, NewMantra};
use crate::routes::extract::{ApiJson, ApiPath};
use crate::routes::response::{AddResponse, ApiResponse};
use crate::services::mantras as service;

#[derive(Debug, Serialize)]
pub struct MantrasData {
    pub mantras: Vec<Mantra>,
}

#[derive(Debug, Serialize)]
pub struct MantraData {
    pub mantra: Mantra,
}

/// GET /mantras
pub async fn list_mantras(State(state): State<AppState>) -> Result<Json<ApiResponse<MantrasData>>> {
    let mantras = service::list(&state.db).await?;

    Ok(Json(ApiResponse::success(MantrasData { mantras })))
}

/// GET /mantras/{id}
pub async fn get_mantra(
    State(state): State<AppState>,
    ApiPath(mantra_id): ApiPath<u64>,
) -> Result<Json<ApiResponse<MantraData>>> {
    let mantra = service::get(&state.db, mantra_id).await?;

    Ok(Json(ApiResponse::success(MantraData { mantra })))
}

/// POST /mantras
pub async fn create_mantra(
    user: AuthUser,
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<NewMantra>,
) -> Result<(StatusCode, Json<ApiResponse<MantraData>>)> {
    let mantra = service::create(&state.db, user.id(), payload).await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(MantraData { mantra }).with_message("Mantra created")),
    ))
}

/// POST /mantras/{id}/like
pub async fn like_mantra(
    user: AuthUser,
    State(state): State<AppState>,
    ApiPath(mantra_id): ApiPath<u64>,
) -> Result<Json<AddResponse>> {
    let outcome = service::like(&state.db, mantra_id, user.id()).await?;

    Ok(Json(AddResponse::new(
        outcome.already_exists(),
        "Mantra liked",
        "Mantra already liked",
    )))
}

/// DELETE /mantras/{id}/like
pub async fn unlike_mantra(
    user: AuthUser,
    State(state): State<AppState>,
    ApiPath(mantra_id): ApiPath<u64>,
) -> Result<Json<ApiResponse<()>>> {
    service::unlike(&state.db, mantra_id, user.id()).await?;

    Ok(Json(ApiResponse::message("Like removed")))
}
