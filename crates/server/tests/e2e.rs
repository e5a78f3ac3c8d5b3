use std::net::SocketAddr;

use reqwest::StatusCode as HttpStatusCode;
use serde_json::{json, Value};
use tokio::net::TcpListener;
use uuid::Uuid;

struct TestApp {
    base_url: String,
}

async fn start_server() -> anyhow::Result<TestApp> {
    let mut cfg = configs::AppConfig::default();
    cfg.database.url = "sqlite::memory:".into();
    cfg.database.normalize_from_env();
    cfg.auth.jwt_secret = "test-secret".into();
    cfg.storage.root_dir = std::env::temp_dir()
        .join(format!("store_admin_e2e_{}", Uuid::new_v4().simple()))
        .to_string_lossy()
        .into_owned();

    let app = server::build_app(&cfg).await?;
    let listener = TcpListener::bind((std::net::Ipv4Addr::LOCALHOST, 0)).await?;
    let addr: SocketAddr = listener.local_addr()?;
    let base_url = format!("http://{}:{}", addr.ip(), addr.port());

    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await { eprintln!("server error: {}", e); }
    });

    Ok(TestApp { base_url })
}

fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .cookie_store(true)
        .build()
        .expect("reqwest client")
}

#[tokio::test]
async fn e2e_public_health_and_docs() -> anyhow::Result<()> {
    let app = start_server().await?;
    let res = client().get(format!("{}/health", app.base_url)).send().await?;
    assert_eq!(res.status(), HttpStatusCode::OK);
    let body: Value = res.json().await?;
    assert_eq!(body["status"], "ok");

    let res = client().get(format!("{}/api-docs/openapi.json", app.base_url)).send().await?;
    assert_eq!(res.status(), HttpStatusCode::OK);
    Ok(())
}

#[tokio::test]
async fn e2e_cookie_session_manages_a_store() -> anyhow::Result<()> {
    let app = start_server().await?;
    let http = client();
    let email = format!("e2e_{}@example.com", Uuid::new_v4().simple());

    let res = http.post(format!("{}/auth/register", app.base_url))
        .json(&json!({"email": email, "name": "E2E", "password": "S3curePass!"}))
        .send().await?;
    assert_eq!(res.status(), HttpStatusCode::OK);

    let res = http.post(format!("{}/auth/login", app.base_url))
        .json(&json!({"email": email, "password": "S3curePass!"}))
        .send().await?;
    assert_eq!(res.status(), HttpStatusCode::OK);

    // cookie jar carries auth_token from here on
    let res = http.post(format!("{}/api/stores", app.base_url)).json(&json!({"name": "Cookie Shop"})).send().await?;
    assert_eq!(res.status(), HttpStatusCode::OK);
    let store: Value = res.json().await?;
    let store_id = store["id"].as_str().unwrap_or_default().to_string();

    let res = http.get(format!("{}/api/stores", app.base_url)).send().await?;
    let stores: Value = res.json().await?;
    assert_eq!(stores.as_array().map(|a| a.len()), Some(1));

    let res = http.post(format!("{}/api/{}/news", app.base_url, store_id))
        .json(&json!({"title": "We are open", "content": "<p>Hello</p>", "isPublished": true}))
        .send().await?;
    assert_eq!(res.status(), HttpStatusCode::OK);

    // logout clears the cookie
    let res = http.post(format!("{}/auth/logout", app.base_url)).send().await?;
    assert_eq!(res.status(), HttpStatusCode::NO_CONTENT);
    let res = http.get(format!("{}/api/stores", app.base_url)).send().await?;
    assert_eq!(res.status(), HttpStatusCode::UNAUTHORIZED);

    // published news stays readable anonymously
    let res = http.get(format!("{}/api/{}/news/we-are-open", app.base_url, store_id)).send().await?;
    assert_eq!(res.status(), HttpStatusCode::OK);
    Ok(())
}
