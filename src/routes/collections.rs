use axum::{Json, extract::State, http::StatusCode};
use serde::{Deserialize, Serialize};

use crate::AppState;
use crate::auth::AuthUser;
use crate::error::Result;
use crate::models::{Collection, CollectionChanges, Mantra};
use crate::routes::extract::{ApiJson, ApiPath};
use crate::routes::response::{AddResponse, ApiResponse};
use crate::services::collections as service;

#[derive(Debug, Deserialize)]
pub struct CreateCollectionRequest {
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CollectionsData {
    pub collections: Vec<Collection>,
}

#[derive(Debug, Serialize)]
pub struct CollectionData {
    pub collection: Collection,
}

#[derive(Debug, Serialize)]
pub struct CollectionDetailData {
    pub collection: Collection,
    pub mantras: Vec<Mantra>,
}

/// GET /collections
pub async fn list_collections(
    user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<CollectionsData>>> {
    let collections = service::list(&state.db, user.id()).await?;

    Ok(Json(ApiResponse::success(CollectionsData { collections })))
}

/// GET /collections/{id}
pub async fn get_collection(
    user: AuthUser,
    State(state): State<AppState>,
    ApiPath(collection_id): ApiPath<u64>,
) -> Result<Json<ApiResponse<CollectionDetailData>>> {
    let (collection, mantras) = service::detail(&state.db, collection_id, user.id()).await?;

    Ok(Json(ApiResponse::success(CollectionDetailData {
        collection,
        mantras,
    })))
}

/// POST /collections
pub async fn create_collection(
    user: AuthUser,
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<CreateCollectionRequest>,
) -> Result<(StatusCode, Json<ApiResponse<CollectionData>>)> {
    let collection = service::create(
        &state.db,
        user.id(),
        &payload.name,
        payload.description.as_deref(),
    )
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(CollectionData { collection }).with_message("Collection created")),
    ))
}

/// PUT /collections/{id}
///
/// Partial update: fields left out of the body are unchanged.
pub async fn update_collection(
    user: AuthUser,
    State(state): State<AppState>,
    ApiPath(collection_id): ApiPath<u64>,
    ApiJson(changes): ApiJson<CollectionChanges>,
) -> Result<Json<ApiResponse<CollectionData>>> {
    let collection = service::update(&state.db, collection_id, user.id(), changes).await?;

    Ok(Json(
        ApiResponse::success(CollectionData { collection }).with_message("Collection updated"),
    ))
}

/// DELETE /collections/{id}
pub async fn delete_collection(
    user: AuthUser,
    State(state): State<AppState>,
    ApiPath(collection_id): ApiPath<u64>,
) -> Result<Json<ApiResponse<()>>> {
    service::delete(&state.db, collection_id, user.id()).await?;

    Ok(Json(ApiResponse::message("Collection deleted")))
}

/// POST /collections/{id}/mantras/{mantra_id}
///
/// Always 200 on success; `alreadyExists` tells a fresh add from a repeat.
pub async fn add_mantra_to_collection(
    user: AuthUser,
    State(state): State<AppState>,
    ApiPath((collection_id, mantra_id)): ApiPath<(u64, u64)>,
) -> Result<Json<AddResponse>> {
    let outcome = service::add_mantra(&state.db, collection_id, mantra_id, user.id()).await?;

    Ok(Json(AddResponse::new(
        outcome.already_exists(),
        "Mantra added to collection",
        "Mantra already in collection",
    )))
}

/// DELETE /collections/{id}/mantras/{mantra_id}
pub async fn remove_mantra_from_collection(
    user: AuthUser,
    State(state): State<AppState>,
    ApiPath((collection_id, mantra_id)): ApiPath<(u64, u64)>,
) -> Result<Json<ApiResponse<()>>> {
    service::remove_mantra(&state.db, collection_id, mantra_id, user.id()).await?;

    Ok(Json(ApiResponse::message("Mantra removed from collection")))
}
