use axum::{extract::State, Json};
use uuid::Uuid;

use models::category;
use service::access::Lookup;
use service::services::category_service::{self, CategoryDetail, CategoryInput, CategoryPatch};
use service::tree::CategoryTree;

use crate::errors::ApiError;
use crate::extract::{ApiJson, ApiPath, AuthUser};
use crate::state::ServerState;

#[utoipa::path(get, path = "/api/{store_id}/categories", tag = "categories", params(("store_id" = Uuid, Path, description = "Store id")), responses((status = 200, description = "Flat list ordered by name")))]
pub async fn list(State(state): State<ServerState>, ApiPath(store_id): ApiPath<Uuid>) -> Result<Json<Vec<category::Model>>, ApiError> {
    Ok(Json(category_service::list_categories(&state.db, store_id).await?))
}

#[utoipa::path(get, path = "/api/{store_id}/categories/tree", tag = "categories", params(("store_id" = Uuid, Path, description = "Store id")), responses((status = 200, description = "Category forest with subcategories")))]
pub async fn tree(State(state): State<ServerState>, ApiPath(store_id): ApiPath<Uuid>) -> Result<Json<CategoryTree>, ApiError> {
    Ok(Json(category_service::category_tree(&state.db, store_id).await?))
}

#[utoipa::path(get, path = "/api/{store_id}/categories/{id}", tag = "categories", params(("store_id" = Uuid, Path, description = "Store id"), ("id" = String, Path, description = "Category id or slug")), responses((status = 200, description = "Category with billboard, parent, children and subcategories"), (status = 404, description = "Not found")))]
pub async fn get(State(state): State<ServerState>, ApiPath((store_id, key)): ApiPath<(Uuid, String)>) -> Result<Json<CategoryDetail>, ApiError> {
    Ok(Json(category_service::get_category(&state.db, store_id, &Lookup::parse(&key)).await?))
}

#[utoipa::path(post, path = "/api/{store_id}/categories", tag = "categories", params(("store_id" = Uuid, Path, description = "Store id")), request_body = crate::openapi::CategoryDoc, responses((status = 200, description = "Created"), (status = 400, description = "Invalid name or parent"), (status = 409, description = "Slug taken")))]
pub async fn create(
    State(state): State<ServerState>,
    user: AuthUser,
    ApiPath(store_id): ApiPath<Uuid>,
    ApiJson(input): ApiJson<CategoryInput>,
) -> Result<Json<category::Model>, ApiError> {
    Ok(Json(category_service::create_category(&state.db, user.id, store_id, input).await?))
}

#[utoipa::path(patch, path = "/api/{store_id}/categories/{id}", tag = "categories", params(("store_id" = Uuid, Path, description = "Store id"), ("id" = Uuid, Path, description = "Category id")), request_body = crate::openapi::CategoryDoc, responses((status = 200, description = "Updated"), (status = 400, description = "Parent would form a cycle")))]
pub async fn update(
    State(state): State<ServerState>,
    user: AuthUser,
    ApiPath((store_id, id)): ApiPath<(Uuid, Uuid)>,
    ApiJson(patch): ApiJson<CategoryPatch>,
) -> Result<Json<category::Model>, ApiError> {
    Ok(Json(category_service::update_category(&state.db, user.id, store_id, id, patch).await?))
}

#[utoipa::path(delete, path = "/api/{store_id}/categories/{id}", tag = "categories", params(("store_id" = Uuid, Path, description = "Store id"), ("id" = Uuid, Path, description = "Category id")), responses((status = 200, description = "Deleted"), (status = 409, description = "Category has dependents")))]
pub async fn delete(
    State(state): State<ServerState>,
    user: AuthUser,
    ApiPath((store_id, id)): ApiPath<(Uuid, Uuid)>,
) -> Result<Json<category::Model>, ApiError> {
    Ok(Json(category_service::delete_category(&state.db, user.id, store_id, id).await?))
}
