use axum::{extract::State, Json};
use uuid::Uuid;

use models::color;
use service::services::color_service::{self, ColorInput, ColorPatch};

use crate::errors::ApiError;
use crate::extract::{ApiJson, ApiPath, AuthUser};
use crate::state::ServerState;

#[utoipa::path(get, path = "/api/{store_id}/colors", tag = "colors", params(("store_id" = Uuid, Path, description = "Store id")), responses((status = 200, description = "Colors")))]
pub async fn list(State(state): State<ServerState>, ApiPath(store_id): ApiPath<Uuid>) -> Result<Json<Vec<color::Model>>, ApiError> {
    Ok(Json(color_service::list_colors(&state.db, store_id).await?))
}

#[utoipa::path(get, path = "/api/{store_id}/colors/{id}", tag = "colors", params(("store_id" = Uuid, Path, description = "Store id"), ("id" = Uuid, Path, description = "Color id")), responses((status = 200, description = "Color"), (status = 404, description = "Not found")))]
pub async fn get(State(state): State<ServerState>, ApiPath((store_id, id)): ApiPath<(Uuid, Uuid)>) -> Result<Json<color::Model>, ApiError> {
    Ok(Json(color_service::get_color(&state.db, store_id, id).await?))
}

#[utoipa::path(post, path = "/api/{store_id}/colors", tag = "colors", params(("store_id" = Uuid, Path, description = "Store id")), request_body = crate::openapi::NameValueDoc, responses((status = 200, description = "Created"), (status = 400, description = "Value must be a hex color")))]
pub async fn create(
    State(state): State<ServerState>,
    user: AuthUser,
    ApiPath(store_id): ApiPath<Uuid>,
    ApiJson(input): ApiJson<ColorInput>,
) -> Result<Json<color::Model>, ApiError> {
    Ok(Json(color_service::create_color(&state.db, user.id, store_id, input).await?))
}

#[utoipa::path(patch, path = "/api/{store_id}/colors/{id}", tag = "colors", params(("store_id" = Uuid, Path, description = "Store id"), ("id" = Uuid, Path, description = "Color id")), request_body = crate::openapi::NameValueDoc, responses((status = 200, description = "Updated")))]
pub async fn update(
    State(state): State<ServerState>,
    user: AuthUser,
    ApiPath((store_id, id)): ApiPath<(Uuid, Uuid)>,
    ApiJson(patch): ApiJson<ColorPatch>,
) -> Result<Json<color::Model>, ApiError> {
    Ok(Json(color_service::update_color(&state.db, user.id, store_id, id, patch).await?))
}

#[utoipa::path(delete, path = "/api/{store_id}/colors/{id}", tag = "colors", params(("store_id" = Uuid, Path, description = "Store id"), ("id" = Uuid, Path, description = "Color id")), responses((status = 200, description = "Deleted")))]
pub async fn delete(
    State(state): State<ServerState>,
    user: AuthUser,
    ApiPath((store_id, id)): ApiPath<(Uuid, Uuid)>,
) -> Result<Json<color::Model>, ApiError> {
    Ok(Json(color_service::delete_color(&state.db, user.id, store_id, id).await?))
}
