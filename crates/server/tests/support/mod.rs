#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use migration::MigratorTrait;
use serde_json::{json, Value};
use service::storage::{LocalObjectStore, ObjectStore};
use tower::Service;
use tower_http::cors::CorsLayer;
use uuid::Uuid;

use server::routes;
use server::state::{ServerAuthConfig, ServerState};

pub const PASSWORD: &str = "S3curePass!";

/// Router over a fresh in-memory database with the schema applied.
pub async fn build_app() -> anyhow::Result<Router> {
    let db = models::db::connect_with_config(&models::db::DatabaseConfig::sqlite_memory()).await?;
    migration::Migrator::up(&db, None).await?;
    let root = std::env::temp_dir().join(format!("store_admin_blobs_{}", Uuid::new_v4().simple()));
    let objects: Arc<dyn ObjectStore> = Arc::new(LocalObjectStore::new(root, "/uploads/"));
    let auth = ServerAuthConfig { jwt_secret: "test-secret".into(), token_ttl_hours: 1, cookie_secure: false };
    let state = ServerState::new(db, auth, objects);
    Ok(routes::build_router(state, CorsLayer::very_permissive()))
}

pub async fn send(app: &mut Router, method: &str, uri: &str, token: Option<&str>, body: Option<Value>) -> anyhow::Result<(StatusCode, Value)> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(t) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {t}"));
    }
    let req = match body {
        Some(b) => builder.header(header::CONTENT_TYPE, "application/json").body(Body::from(serde_json::to_vec(&b)?))?,
        None => builder.body(Body::empty())?,
    };
    let resp = app.call(req).await?;
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await?;
    let value = serde_json::from_slice(&bytes).unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()));
    Ok((status, value))
}

/// Register and log in a fresh user, returning the bearer token.
pub async fn login(app: &mut Router, name: &str) -> anyhow::Result<String> {
    let email = format!("{name}_{}@example.com", Uuid::new_v4().simple());
    let (status, _) = send(app, "POST", "/auth/register", None, Some(json!({"email": email, "name": name, "password": PASSWORD}))).await?;
    assert_eq!(status, StatusCode::OK);
    let (status, body) = send(app, "POST", "/auth/login", None, Some(json!({"email": email, "password": PASSWORD}))).await?;
    assert_eq!(status, StatusCode::OK);
    Ok(body["token"].as_str().unwrap_or_default().to_string())
}

pub async fn create_store(app: &mut Router, token: &str, name: &str) -> anyhow::Result<String> {
    let (status, body) = send(app, "POST", "/api/stores", Some(token), Some(json!({"name": name}))).await?;
    assert_eq!(status, StatusCode::OK);
    Ok(body["id"].as_str().unwrap_or_default().to_string())
}
