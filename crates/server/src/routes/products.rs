use axum::{extract::State, Json};
use serde::Deserialize;
use uuid::Uuid;

use common::pagination::Pagination;
use common::types::Page;
use models::product;
use service::access::{self, Lookup};
use service::services::product_service::{self, ProductFilter, ProductInput, ProductPatch, ProductView};

use crate::errors::ApiError;
use crate::extract::{ApiJson, ApiPath, ApiQuery, AuthUser};
use crate::state::ServerState;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductQuery {
    pub category_id: Option<Uuid>,
    pub subcategory_id: Option<Uuid>,
    pub color_id: Option<Uuid>,
    pub size_id: Option<Uuid>,
    pub is_featured: Option<bool>,
    #[serde(default)]
    pub include_archived: bool,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

/// Archived rows are only shown to the store owner, and only on request.
async fn owner_sees_archived(state: &ServerState, user: Option<&AuthUser>, store_id: Uuid, requested: bool) -> bool {
    match user {
        Some(u) if requested => access::owned_store(&state.db, store_id, u.id).await.is_ok(),
        _ => false,
    }
}

#[utoipa::path(
    get,
    path = "/api/{store_id}/products",
    tag = "products",
    params(
        ("store_id" = Uuid, Path, description = "Store id"),
        ("categoryId" = Option<Uuid>, Query, description = "Filter by category"),
        ("subcategoryId" = Option<Uuid>, Query, description = "Filter by subcategory"),
        ("colorId" = Option<Uuid>, Query, description = "Products offered in this color"),
        ("sizeId" = Option<Uuid>, Query, description = "Products offered in this size"),
        ("isFeatured" = Option<bool>, Query, description = "Featured only"),
        ("includeArchived" = Option<bool>, Query, description = "Owner only"),
        ("page" = Option<u32>, Query, description = "1-based page"),
        ("perPage" = Option<u32>, Query, description = "Page size, at most 100")
    ),
    responses((status = 200, description = "One page of products"))
)]
pub async fn list(
    State(state): State<ServerState>,
    user: Option<AuthUser>,
    ApiPath(store_id): ApiPath<Uuid>,
    ApiQuery(q): ApiQuery<ProductQuery>,
) -> Result<Json<Page<ProductView>>, ApiError> {
    let defaults = Pagination::default();
    let filter = ProductFilter {
        category_id: q.category_id,
        subcategory_id: q.subcategory_id,
        color_id: q.color_id,
        size_id: q.size_id,
        is_featured: q.is_featured,
        include_archived: owner_sees_archived(&state, user.as_ref(), store_id, q.include_archived).await,
        pagination: Pagination { page: q.page.unwrap_or(defaults.page), per_page: q.per_page.unwrap_or(defaults.per_page) },
    };
    Ok(Json(product_service::list_products(&state.db, store_id, filter).await?))
}

#[utoipa::path(get, path = "/api/{store_id}/products/{id}", tag = "products", params(("store_id" = Uuid, Path, description = "Store id"), ("id" = String, Path, description = "Product id or slug")), responses((status = 200, description = "Product with images, category and variants"), (status = 404, description = "Not found")))]
pub async fn get(
    State(state): State<ServerState>,
    user: Option<AuthUser>,
    ApiPath((store_id, key)): ApiPath<(Uuid, String)>,
) -> Result<Json<ProductView>, ApiError> {
    let archived = owner_sees_archived(&state, user.as_ref(), store_id, true).await;
    Ok(Json(product_service::get_product(&state.db, store_id, &Lookup::parse(&key), archived).await?))
}

#[utoipa::path(post, path = "/api/{store_id}/products", tag = "products", params(("store_id" = Uuid, Path, description = "Store id")), request_body = crate::openapi::ProductDoc, responses((status = 200, description = "Created"), (status = 400, description = "Missing field or foreign reference"), (status = 409, description = "Slug taken")))]
pub async fn create(
    State(state): State<ServerState>,
    user: AuthUser,
    ApiPath(store_id): ApiPath<Uuid>,
    ApiJson(input): ApiJson<ProductInput>,
) -> Result<Json<ProductView>, ApiError> {
    Ok(Json(product_service::create_product(&state.db, user.id, store_id, input).await?))
}

#[utoipa::path(patch, path = "/api/{store_id}/products/{id}", tag = "products", params(("store_id" = Uuid, Path, description = "Store id"), ("id" = Uuid, Path, description = "Product id")), request_body = crate::openapi::ProductDoc, responses((status = 200, description = "Updated")))]
pub async fn update(
    State(state): State<ServerState>,
    user: AuthUser,
    ApiPath((store_id, id)): ApiPath<(Uuid, Uuid)>,
    ApiJson(patch): ApiJson<ProductPatch>,
) -> Result<Json<ProductView>, ApiError> {
    Ok(Json(product_service::update_product(&state.db, state.objects.as_ref(), user.id, store_id, id, patch).await?))
}

#[utoipa::path(delete, path = "/api/{store_id}/products/{id}", tag = "products", params(("store_id" = Uuid, Path, description = "Store id"), ("id" = Uuid, Path, description = "Product id")), responses((status = 200, description = "Deleted"), (status = 409, description = "Product appears on orders")))]
pub async fn delete(
    State(state): State<ServerState>,
    user: AuthUser,
    ApiPath((store_id, id)): ApiPath<(Uuid, Uuid)>,
) -> Result<Json<product::Model>, ApiError> {
    Ok(Json(product_service::delete_product(&state.db, state.objects.as_ref(), user.id, store_id, id).await?))
}
