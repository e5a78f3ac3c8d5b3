use axum::{extract::State, Json};
use uuid::Uuid;

use models::store;
use service::services::store_service::{self, StoreInput};

use crate::errors::ApiError;
use crate::extract::{ApiJson, ApiPath, AuthUser};
use crate::state::ServerState;

#[utoipa::path(get, path = "/api/stores", tag = "stores", responses((status = 200, description = "Stores owned by the caller")))]
pub async fn list(State(state): State<ServerState>, user: AuthUser) -> Result<Json<Vec<store::Model>>, ApiError> {
    Ok(Json(store_service::list_stores(&state.db, user.id).await?))
}

#[utoipa::path(post, path = "/api/stores", tag = "stores", request_body = crate::openapi::StoreDoc, responses((status = 200, description = "Created"), (status = 400, description = "Name is required")))]
pub async fn create(State(state): State<ServerState>, user: AuthUser, ApiJson(input): ApiJson<StoreInput>) -> Result<Json<store::Model>, ApiError> {
    Ok(Json(store_service::create_store(&state.db, user.id, input).await?))
}

#[utoipa::path(get, path = "/api/stores/{store_id}", tag = "stores", params(("store_id" = Uuid, Path, description = "Store id")), responses((status = 200, description = "Store"), (status = 403, description = "Not the owner"), (status = 404, description = "Not found")))]
pub async fn get(State(state): State<ServerState>, user: AuthUser, ApiPath(store_id): ApiPath<Uuid>) -> Result<Json<store::Model>, ApiError> {
    Ok(Json(store_service::get_store(&state.db, user.id, store_id).await?))
}

#[utoipa::path(patch, path = "/api/stores/{store_id}", tag = "stores", params(("store_id" = Uuid, Path, description = "Store id")), request_body = crate::openapi::StoreDoc, responses((status = 200, description = "Renamed")))]
pub async fn update(
    State(state): State<ServerState>,
    user: AuthUser,
    ApiPath(store_id): ApiPath<Uuid>,
    ApiJson(input): ApiJson<StoreInput>,
) -> Result<Json<store::Model>, ApiError> {
    Ok(Json(store_service::update_store(&state.db, user.id, store_id, input).await?))
}

#[utoipa::path(delete, path = "/api/stores/{store_id}", tag = "stores", params(("store_id" = Uuid, Path, description = "Store id")), responses((status = 200, description = "Deleted with all its rows")))]
pub async fn delete(State(state): State<ServerState>, user: AuthUser, ApiPath(store_id): ApiPath<Uuid>) -> Result<Json<store::Model>, ApiError> {
    Ok(Json(store_service::delete_store(&state.db, state.objects.as_ref(), user.id, store_id).await?))
}
