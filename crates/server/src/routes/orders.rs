use axum::{extract::State, Json};
use uuid::Uuid;

use models::order;
use service::services::order_service::{self, OrderInput, OrderPatch, OrderView};

use crate::errors::ApiError;
use crate::extract::{ApiJson, ApiPath, AuthUser};
use crate::state::ServerState;

#[utoipa::path(get, path = "/api/{store_id}/orders", tag = "orders", params(("store_id" = Uuid, Path, description = "Store id")), responses((status = 200, description = "Orders with items and totals"), (status = 403, description = "Not the owner")))]
pub async fn list(State(state): State<ServerState>, user: AuthUser, ApiPath(store_id): ApiPath<Uuid>) -> Result<Json<Vec<OrderView>>, ApiError> {
    Ok(Json(order_service::list_orders(&state.db, user.id, store_id).await?))
}

#[utoipa::path(get, path = "/api/{store_id}/orders/{id}", tag = "orders", params(("store_id" = Uuid, Path, description = "Store id"), ("id" = Uuid, Path, description = "Order id")), responses((status = 200, description = "Order"), (status = 404, description = "Not found")))]
pub async fn get(
    State(state): State<ServerState>,
    user: AuthUser,
    ApiPath((store_id, id)): ApiPath<(Uuid, Uuid)>,
) -> Result<Json<OrderView>, ApiError> {
    Ok(Json(order_service::get_order(&state.db, user.id, store_id, id).await?))
}

#[utoipa::path(post, path = "/api/{store_id}/orders", tag = "orders", params(("store_id" = Uuid, Path, description = "Store id")), request_body = crate::openapi::OrderDoc, responses((status = 200, description = "Created, stock taken"), (status = 400, description = "Invalid items or insufficient stock")))]
pub async fn create(
    State(state): State<ServerState>,
    user: AuthUser,
    ApiPath(store_id): ApiPath<Uuid>,
    ApiJson(input): ApiJson<OrderInput>,
) -> Result<Json<OrderView>, ApiError> {
    Ok(Json(order_service::create_order(&state.db, user.id, store_id, input).await?))
}

#[utoipa::path(post, path = "/api/{store_id}/checkout", tag = "orders", params(("store_id" = Uuid, Path, description = "Store id")), request_body = crate::openapi::OrderDoc, responses((status = 200, description = "Order placed"), (status = 400, description = "Invalid items or insufficient stock")))]
pub async fn checkout(
    State(state): State<ServerState>,
    ApiPath(store_id): ApiPath<Uuid>,
    ApiJson(input): ApiJson<OrderInput>,
) -> Result<Json<OrderView>, ApiError> {
    Ok(Json(order_service::checkout(&state.db, store_id, input).await?))
}

#[utoipa::path(patch, path = "/api/{store_id}/orders/{id}", tag = "orders", params(("store_id" = Uuid, Path, description = "Store id"), ("id" = Uuid, Path, description = "Order id")), request_body = crate::openapi::OrderPatchDoc, responses((status = 200, description = "Updated"), (status = 409, description = "Order is cancelled")))]
pub async fn update(
    State(state): State<ServerState>,
    user: AuthUser,
    ApiPath((store_id, id)): ApiPath<(Uuid, Uuid)>,
    ApiJson(patch): ApiJson<OrderPatch>,
) -> Result<Json<OrderView>, ApiError> {
    Ok(Json(order_service::update_order(&state.db, user.id, store_id, id, patch).await?))
}

#[utoipa::path(delete, path = "/api/{store_id}/orders/{id}", tag = "orders", params(("store_id" = Uuid, Path, description = "Store id"), ("id" = Uuid, Path, description = "Order id")), responses((status = 200, description = "Deleted, stock returned")))]
pub async fn delete(
    State(state): State<ServerState>,
    user: AuthUser,
    ApiPath((store_id, id)): ApiPath<(Uuid, Uuid)>,
) -> Result<Json<order::Model>, ApiError> {
    Ok(Json(order_service::delete_order(&state.db, user.id, store_id, id).await?))
}
