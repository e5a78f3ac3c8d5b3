use axum::{extract::State, Json};
use uuid::Uuid;

use models::size;
use service::services::size_service::{self, SizeInput, SizePatch};

use crate::errors::ApiError;
use crate::extract::{ApiJson, ApiPath, AuthUser};
use crate::state::ServerState;

#[utoipa::path(get, path = "/api/{store_id}/sizes", tag = "sizes", params(("store_id" = Uuid, Path, description = "Store id")), responses((status = 200, description = "Sizes")))]
pub async fn list(State(state): State<ServerState>, ApiPath(store_id): ApiPath<Uuid>) -> Result<Json<Vec<size::Model>>, ApiError> {
    Ok(Json(size_service::list_sizes(&state.db, store_id).await?))
}

#[utoipa::path(get, path = "/api/{store_id}/sizes/{id}", tag = "sizes", params(("store_id" = Uuid, Path, description = "Store id"), ("id" = Uuid, Path, description = "Size id")), responses((status = 200, description = "Size"), (status = 404, description = "Not found")))]
pub async fn get(State(state): State<ServerState>, ApiPath((store_id, id)): ApiPath<(Uuid, Uuid)>) -> Result<Json<size::Model>, ApiError> {
    Ok(Json(size_service::get_size(&state.db, store_id, id).await?))
}

#[utoipa::path(post, path = "/api/{store_id}/sizes", tag = "sizes", params(("store_id" = Uuid, Path, description = "Store id")), request_body = crate::openapi::NameValueDoc, responses((status = 200, description = "Created"), (status = 400, description = "Missing name or value")))]
pub async fn create(
    State(state): State<ServerState>,
    user: AuthUser,
    ApiPath(store_id): ApiPath<Uuid>,
    ApiJson(input): ApiJson<SizeInput>,
) -> Result<Json<size::Model>, ApiError> {
    Ok(Json(size_service::create_size(&state.db, user.id, store_id, input).await?))
}

#[utoipa::path(patch, path = "/api/{store_id}/sizes/{id}", tag = "sizes", params(("store_id" = Uuid, Path, description = "Store id"), ("id" = Uuid, Path, description = "Size id")), request_body = crate::openapi::NameValueDoc, responses((status = 200, description = "Updated")))]
pub async fn update(
    State(state): State<ServerState>,
    user: AuthUser,
    ApiPath((store_id, id)): ApiPath<(Uuid, Uuid)>,
    ApiJson(patch): ApiJson<SizePatch>,
) -> Result<Json<size::Model>, ApiError> {
    Ok(Json(size_service::update_size(&state.db, user.id, store_id, id, patch).await?))
}

#[utoipa::path(delete, path = "/api/{store_id}/sizes/{id}", tag = "sizes", params(("store_id" = Uuid, Path, description = "Store id"), ("id" = Uuid, Path, description = "Size id")), responses((status = 200, description = "Deleted")))]
pub async fn delete(
    State(state): State<ServerState>,
    user: AuthUser,
    ApiPath((store_id, id)): ApiPath<(Uuid, Uuid)>,
) -> Result<Json<size::Model>, ApiError> {
    Ok(Json(size_service::delete_size(&state.db, user.id, store_id, id).await?))
}
