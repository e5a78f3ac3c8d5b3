use std::time::Instant;

use axum::{
    extract::Request,
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use tower_http::{
    cors::CorsLayer,
    trace::{TraceLayer, DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, DefaultOnFailure},
};
use tracing::Level;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use common::metrics::{encode_metrics, status_class, HTTP_REQUESTS_TOTAL, HTTP_REQUEST_DURATION};
use common::types::Health;

use crate::auth;
use crate::openapi::ApiDoc;
use crate::state::ServerState;

pub mod stores;
pub mod billboards;
pub mod categories;
pub mod subcategories;
pub mod colors;
pub mod sizes;
pub mod products;
pub mod offerings;
pub mod news;
pub mod orders;

#[utoipa::path(get, path = "/health", tag = "health", responses((status = 200, description = "OK", body = crate::openapi::HealthResponse)))]
pub async fn health() -> Json<Health> {
    Json(Health { status: "ok" })
}

pub async fn metrics() -> impl IntoResponse {
    encode_metrics()
}

async fn track_metrics(req: Request, next: Next) -> Response {
    let method = req.method().to_string();
    let start = Instant::now();
    let resp = next.run(req).await;
    HTTP_REQUEST_DURATION.observe(start.elapsed().as_secs_f64());
    HTTP_REQUESTS_TOTAL
        .with_label_values(&[method.as_str(), status_class(resp.status().as_u16())])
        .inc();
    resp
}

/// Build the full application router: auth, stores, the per-store catalog and docs
pub fn build_router(state: ServerState, cors: CorsLayer) -> Router {
    let auth_routes = Router::new()
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/auth/logout", post(auth::logout))
        .route("/auth/me", get(auth::me));

    let store_routes = Router::new()
        .route("/api/stores", get(stores::list).post(stores::create))
        .route("/api/stores/:store_id", get(stores::get).patch(stores::update).delete(stores::delete));

    let catalog = Router::new()
        .route("/api/:store_id/billboards", get(billboards::list).post(billboards::create))
        .route("/api/:store_id/billboards/:id", get(billboards::get).patch(billboards::update).delete(billboards::delete))
        .route("/api/:store_id/categories", get(categories::list).post(categories::create))
        .route("/api/:store_id/categories/tree", get(categories::tree))
        .route("/api/:store_id/categories/:id", get(categories::get).patch(categories::update).delete(categories::delete))
        .route("/api/:store_id/subcategories", get(subcategories::list).post(subcategories::create))
        .route("/api/:store_id/subcategories/:id", get(subcategories::get).patch(subcategories::update).delete(subcategories::delete))
        .route("/api/:store_id/colors", get(colors::list).post(colors::create))
        .route("/api/:store_id/colors/:id", get(colors::get).patch(colors::update).delete(colors::delete))
        .route("/api/:store_id/sizes", get(sizes::list).post(sizes::create))
        .route("/api/:store_id/sizes/:id", get(sizes::get).patch(sizes::update).delete(sizes::delete))
        .route("/api/:store_id/products", get(products::list).post(products::create))
        .route("/api/:store_id/products/:id", get(products::get).patch(products::update).delete(products::delete))
        .route("/api/:store_id/services", get(offerings::list).post(offerings::create))
        .route("/api/:store_id/services/:id", get(offerings::get).patch(offerings::update).delete(offerings::delete))
        .route("/api/:store_id/news", get(news::list).post(news::create))
        .route("/api/:store_id/news/:id", get(news::get).patch(news::update).delete(news::delete))
        .route("/api/:store_id/orders", get(orders::list).post(orders::create))
        .route("/api/:store_id/orders/:id", get(orders::get).patch(orders::update).delete(orders::delete))
        .route("/api/:store_id/checkout", post(orders::checkout));

    Router::new()
        .route("/health", get(health))
        .route("/metrics", get(metrics))
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(auth_routes)
        .merge(store_routes)
        .merge(catalog)
        .layer(middleware::from_fn_with_state(state.clone(), auth::authenticate))
        .with_state(state)
        .layer(middleware::from_fn(track_metrics))
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                // one INFO span per request with method and path
                .make_span_with(
                    DefaultMakeSpan::new()
                        .level(Level::INFO)
                        .include_headers(false),
                )
                .on_request(
                    DefaultOnRequest::new()
                        .level(Level::INFO),
                )
                // status and latency
                .on_response(
                    DefaultOnResponse::new()
                        .level(Level::INFO)
                        .include_headers(false),
                )
                // 5xx at ERROR
                .on_failure(
                    DefaultOnFailure::new()
                        .level(Level::ERROR),
                )
        )
}
