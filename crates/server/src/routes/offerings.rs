//! `/services` endpoints: bookable services sold by a store.

use axum::{extract::State, Json};
use serde::Deserialize;
use uuid::Uuid;

use models::service_offering;
use service::access::{self, Lookup};
use service::services::offering_service::{self, OfferingFilter, OfferingInput, OfferingPatch, OfferingView};

use crate::errors::ApiError;
use crate::extract::{ApiJson, ApiPath, ApiQuery, AuthUser};
use crate::state::ServerState;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OfferingQuery {
    pub category_id: Option<Uuid>,
    pub subcategory_id: Option<Uuid>,
    pub is_featured: Option<bool>,
    #[serde(default)]
    pub include_archived: bool,
}

async fn is_owner(state: &ServerState, user: Option<&AuthUser>, store_id: Uuid) -> bool {
    match user {
        Some(u) => access::owned_store(&state.db, store_id, u.id).await.is_ok(),
        None => false,
    }
}

#[utoipa::path(get, path = "/api/{store_id}/services", tag = "services", params(("store_id" = Uuid, Path, description = "Store id"), ("categoryId" = Option<Uuid>, Query, description = "Filter by category"), ("subcategoryId" = Option<Uuid>, Query, description = "Filter by subcategory"), ("isFeatured" = Option<bool>, Query, description = "Featured only")), responses((status = 200, description = "Services")))]
pub async fn list(
    State(state): State<ServerState>,
    user: Option<AuthUser>,
    ApiPath(store_id): ApiPath<Uuid>,
    ApiQuery(q): ApiQuery<OfferingQuery>,
) -> Result<Json<Vec<OfferingView>>, ApiError> {
    let include_archived = q.include_archived && is_owner(&state, user.as_ref(), store_id).await;
    let filter = OfferingFilter { category_id: q.category_id, subcategory_id: q.subcategory_id, is_featured: q.is_featured, include_archived };
    Ok(Json(offering_service::list_offerings(&state.db, store_id, filter).await?))
}

#[utoipa::path(get, path = "/api/{store_id}/services/{id}", tag = "services", params(("store_id" = Uuid, Path, description = "Store id"), ("id" = String, Path, description = "Service id or slug")), responses((status = 200, description = "Service"), (status = 404, description = "Not found")))]
pub async fn get(
    State(state): State<ServerState>,
    user: Option<AuthUser>,
    ApiPath((store_id, key)): ApiPath<(Uuid, String)>,
) -> Result<Json<OfferingView>, ApiError> {
    let archived = is_owner(&state, user.as_ref(), store_id).await;
    Ok(Json(offering_service::get_offering(&state.db, store_id, &Lookup::parse(&key), archived).await?))
}

#[utoipa::path(post, path = "/api/{store_id}/services", tag = "services", params(("store_id" = Uuid, Path, description = "Store id")), request_body = crate::openapi::OfferingDoc, responses((status = 200, description = "Created"), (status = 400, description = "Missing field or foreign reference")))]
pub async fn create(
    State(state): State<ServerState>,
    user: AuthUser,
    ApiPath(store_id): ApiPath<Uuid>,
    ApiJson(input): ApiJson<OfferingInput>,
) -> Result<Json<OfferingView>, ApiError> {
    Ok(Json(offering_service::create_offering(&state.db, user.id, store_id, input).await?))
}

#[utoipa::path(patch, path = "/api/{store_id}/services/{id}", tag = "services", params(("store_id" = Uuid, Path, description = "Store id"), ("id" = Uuid, Path, description = "Service id")), request_body = crate::openapi::OfferingDoc, responses((status = 200, description = "Updated")))]
pub async fn update(
    State(state): State<ServerState>,
    user: AuthUser,
    ApiPath((store_id, id)): ApiPath<(Uuid, Uuid)>,
    ApiJson(patch): ApiJson<OfferingPatch>,
) -> Result<Json<OfferingView>, ApiError> {
    Ok(Json(offering_service::update_offering(&state.db, state.objects.as_ref(), user.id, store_id, id, patch).await?))
}

#[utoipa::path(delete, path = "/api/{store_id}/services/{id}", tag = "services", params(("store_id" = Uuid, Path, description = "Store id"), ("id" = Uuid, Path, description = "Service id")), responses((status = 200, description = "Deleted")))]
pub async fn delete(
    State(state): State<ServerState>,
    user: AuthUser,
    ApiPath((store_id, id)): ApiPath<(Uuid, Uuid)>,
) -> Result<Json<service_offering::Model>, ApiError> {
    Ok(Json(offering_service::delete_offering(&state.db, state.objects.as_ref(), user.id, store_id, id).await?))
}
