use axum::{extract::State, Json};
use serde::Deserialize;
use uuid::Uuid;

use models::billboard;
use service::services::billboard_service::{self, BillboardInput, BillboardPatch};

use crate::errors::ApiError;
use crate::extract::{ApiJson, ApiPath, ApiQuery, AuthUser};
use crate::state::ServerState;

#[derive(Debug, Default, Deserialize)]
pub struct BillboardQuery {
    #[serde(default)]
    pub banner: bool,
}

#[utoipa::path(get, path = "/api/{store_id}/billboards", tag = "billboards", params(("store_id" = Uuid, Path, description = "Store id"), ("banner" = Option<bool>, Query, description = "Only site-wide banners")), responses((status = 200, description = "Billboards")))]
pub async fn list(
    State(state): State<ServerState>,
    ApiPath(store_id): ApiPath<Uuid>,
    ApiQuery(q): ApiQuery<BillboardQuery>,
) -> Result<Json<Vec<billboard::Model>>, ApiError> {
    Ok(Json(billboard_service::list_billboards(&state.db, store_id, q.banner).await?))
}

#[utoipa::path(get, path = "/api/{store_id}/billboards/{id}", tag = "billboards", params(("store_id" = Uuid, Path, description = "Store id"), ("id" = Uuid, Path, description = "Billboard id")), responses((status = 200, description = "Billboard"), (status = 404, description = "Not found")))]
pub async fn get(State(state): State<ServerState>, ApiPath((store_id, id)): ApiPath<(Uuid, Uuid)>) -> Result<Json<billboard::Model>, ApiError> {
    Ok(Json(billboard_service::get_billboard(&state.db, store_id, id).await?))
}

#[utoipa::path(post, path = "/api/{store_id}/billboards", tag = "billboards", params(("store_id" = Uuid, Path, description = "Store id")), request_body = crate::openapi::BillboardDoc, responses((status = 200, description = "Created"), (status = 400, description = "Missing label or image"), (status = 403, description = "Not the owner")))]
pub async fn create(
    State(state): State<ServerState>,
    user: AuthUser,
    ApiPath(store_id): ApiPath<Uuid>,
    ApiJson(input): ApiJson<BillboardInput>,
) -> Result<Json<billboard::Model>, ApiError> {
    Ok(Json(billboard_service::create_billboard(&state.db, user.id, store_id, input).await?))
}

#[utoipa::path(patch, path = "/api/{store_id}/billboards/{id}", tag = "billboards", params(("store_id" = Uuid, Path, description = "Store id"), ("id" = Uuid, Path, description = "Billboard id")), request_body = crate::openapi::BillboardDoc, responses((status = 200, description = "Updated")))]
pub async fn update(
    State(state): State<ServerState>,
    user: AuthUser,
    ApiPath((store_id, id)): ApiPath<(Uuid, Uuid)>,
    ApiJson(patch): ApiJson<BillboardPatch>,
) -> Result<Json<billboard::Model>, ApiError> {
    Ok(Json(billboard_service::update_billboard(&state.db, state.objects.as_ref(), user.id, store_id, id, patch).await?))
}

#[utoipa::path(delete, path = "/api/{store_id}/billboards/{id}", tag = "billboards", params(("store_id" = Uuid, Path, description = "Store id"), ("id" = Uuid, Path, description = "Billboard id")), responses((status = 200, description = "Deleted")))]
pub async fn delete(
    State(state): State<ServerState>,
    user: AuthUser,
    ApiPath((store_id, id)): ApiPath<(Uuid, Uuid)>,
) -> Result<Json<billboard::Model>, ApiError> {
    Ok(Json(billboard_service::delete_billboard(&state.db, state.objects.as_ref(), user.id, store_id, id).await?))
}
