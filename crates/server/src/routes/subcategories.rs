use axum::{extract::State, Json};
use serde::Deserialize;
use uuid::Uuid;

use models::subcategory;
use service::access::Lookup;
use service::services::subcategory_service::{self, SubcategoryDetail, SubcategoryInput, SubcategoryPatch};

use crate::errors::ApiError;
use crate::extract::{ApiJson, ApiPath, ApiQuery, AuthUser};
use crate::state::ServerState;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubcategoryQuery {
    pub category_id: Option<Uuid>,
}

#[utoipa::path(get, path = "/api/{store_id}/subcategories", tag = "subcategories", params(("store_id" = Uuid, Path, description = "Store id"), ("categoryId" = Option<Uuid>, Query, description = "Only under this category")), responses((status = 200, description = "Subcategories")))]
pub async fn list(
    State(state): State<ServerState>,
    ApiPath(store_id): ApiPath<Uuid>,
    ApiQuery(q): ApiQuery<SubcategoryQuery>,
) -> Result<Json<Vec<subcategory::Model>>, ApiError> {
    Ok(Json(subcategory_service::list_subcategories(&state.db, store_id, q.category_id).await?))
}

#[utoipa::path(get, path = "/api/{store_id}/subcategories/{id}", tag = "subcategories", params(("store_id" = Uuid, Path, description = "Store id"), ("id" = String, Path, description = "Subcategory id or slug")), responses((status = 200, description = "Subcategory"), (status = 404, description = "Not found")))]
pub async fn get(State(state): State<ServerState>, ApiPath((store_id, key)): ApiPath<(Uuid, String)>) -> Result<Json<SubcategoryDetail>, ApiError> {
    Ok(Json(subcategory_service::get_subcategory(&state.db, store_id, &Lookup::parse(&key)).await?))
}

#[utoipa::path(post, path = "/api/{store_id}/subcategories", tag = "subcategories", params(("store_id" = Uuid, Path, description = "Store id")), request_body = crate::openapi::SubcategoryDoc, responses((status = 200, description = "Created"), (status = 400, description = "Missing name or category")))]
pub async fn create(
    State(state): State<ServerState>,
    user: AuthUser,
    ApiPath(store_id): ApiPath<Uuid>,
    ApiJson(input): ApiJson<SubcategoryInput>,
) -> Result<Json<subcategory::Model>, ApiError> {
    Ok(Json(subcategory_service::create_subcategory(&state.db, user.id, store_id, input).await?))
}

#[utoipa::path(patch, path = "/api/{store_id}/subcategories/{id}", tag = "subcategories", params(("store_id" = Uuid, Path, description = "Store id"), ("id" = Uuid, Path, description = "Subcategory id")), request_body = crate::openapi::SubcategoryDoc, responses((status = 200, description = "Updated")))]
pub async fn update(
    State(state): State<ServerState>,
    user: AuthUser,
    ApiPath((store_id, id)): ApiPath<(Uuid, Uuid)>,
    ApiJson(patch): ApiJson<SubcategoryPatch>,
) -> Result<Json<subcategory::Model>, ApiError> {
    Ok(Json(subcategory_service::update_subcategory(&state.db, user.id, store_id, id, patch).await?))
}

#[utoipa::path(delete, path = "/api/{store_id}/subcategories/{id}", tag = "subcategories", params(("store_id" = Uuid, Path, description = "Store id"), ("id" = Uuid, Path, description = "Subcategory id")), responses((status = 200, description = "Deleted"), (status = 409, description = "Still referenced")))]
pub async fn delete(
    State(state): State<ServerState>,
    user: AuthUser,
    ApiPath((store_id, id)): ApiPath<(Uuid, Uuid)>,
) -> Result<Json<subcategory::Model>, ApiError> {
    Ok(Json(subcategory_service::delete_subcategory(&state.db, user.id, store_id, id).await?))
}
