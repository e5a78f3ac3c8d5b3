use axum::{extract::State, Json};
use serde::Deserialize;
use uuid::Uuid;

use models::news;
use service::access::{self, Lookup};
use service::services::news_service::{self, NewsInput, NewsPatch};

use crate::errors::ApiError;
use crate::extract::{ApiJson, ApiPath, ApiQuery, AuthUser};
use crate::state::ServerState;

#[derive(Debug, Default, Deserialize)]
pub struct NewsQuery {
    #[serde(default)]
    pub published: bool,
}

/// Drafts are visible to the store owner only.
async fn sees_drafts(state: &ServerState, user: Option<&AuthUser>, store_id: Uuid) -> bool {
    match user {
        Some(u) => access::owned_store(&state.db, store_id, u.id).await.is_ok(),
        None => false,
    }
}

#[utoipa::path(get, path = "/api/{store_id}/news", tag = "news", params(("store_id" = Uuid, Path, description = "Store id"), ("published" = Option<bool>, Query, description = "Hide drafts; always on unless the caller owns the store")), responses((status = 200, description = "Articles, newest first")))]
pub async fn list(
    State(state): State<ServerState>,
    user: Option<AuthUser>,
    ApiPath(store_id): ApiPath<Uuid>,
    ApiQuery(q): ApiQuery<NewsQuery>,
) -> Result<Json<Vec<news::Model>>, ApiError> {
    let published_only = q.published || !sees_drafts(&state, user.as_ref(), store_id).await;
    Ok(Json(news_service::list_news(&state.db, store_id, published_only).await?))
}

#[utoipa::path(get, path = "/api/{store_id}/news/{id}", tag = "news", params(("store_id" = Uuid, Path, description = "Store id"), ("id" = String, Path, description = "Article id or slug")), responses((status = 200, description = "Article"), (status = 404, description = "Not found")))]
pub async fn get(
    State(state): State<ServerState>,
    user: Option<AuthUser>,
    ApiPath((store_id, key)): ApiPath<(Uuid, String)>,
) -> Result<Json<news::Model>, ApiError> {
    let drafts = sees_drafts(&state, user.as_ref(), store_id).await;
    Ok(Json(news_service::get_news(&state.db, store_id, &Lookup::parse(&key), drafts).await?))
}

#[utoipa::path(post, path = "/api/{store_id}/news", tag = "news", params(("store_id" = Uuid, Path, description = "Store id")), request_body = crate::openapi::NewsDoc, responses((status = 200, description = "Created"), (status = 400, description = "Missing title or content")))]
pub async fn create(
    State(state): State<ServerState>,
    user: AuthUser,
    ApiPath(store_id): ApiPath<Uuid>,
    ApiJson(input): ApiJson<NewsInput>,
) -> Result<Json<news::Model>, ApiError> {
    Ok(Json(news_service::create_news(&state.db, user.id, store_id, input).await?))
}

#[utoipa::path(patch, path = "/api/{store_id}/news/{id}", tag = "news", params(("store_id" = Uuid, Path, description = "Store id"), ("id" = Uuid, Path, description = "Article id")), request_body = crate::openapi::NewsDoc, responses((status = 200, description = "Updated")))]
pub async fn update(
    State(state): State<ServerState>,
    user: AuthUser,
    ApiPath((store_id, id)): ApiPath<(Uuid, Uuid)>,
    ApiJson(patch): ApiJson<NewsPatch>,
) -> Result<Json<news::Model>, ApiError> {
    Ok(Json(news_service::update_news(&state.db, state.objects.as_ref(), user.id, store_id, id, patch).await?))
}

#[utoipa::path(delete, path = "/api/{store_id}/news/{id}", tag = "news", params(("store_id" = Uuid, Path, description = "Store id"), ("id" = Uuid, Path, description = "Article id")), responses((status = 200, description = "Deleted")))]
pub async fn delete(
    State(state): State<ServerState>,
    user: AuthUser,
    ApiPath((store_id, id)): ApiPath<(Uuid, Uuid)>,
) -> Result<Json<news::Model>, ApiError> {
    Ok(Json(news_service::delete_news(&state.db, state.objects.as_ref(), user.id, store_id, id).await?))
}
