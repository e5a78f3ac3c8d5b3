use std::sync::Arc;

use sea_orm::DatabaseConnection;
use service::auth::repo::SeaOrmAuthRepository;
use service::auth::{AuthConfig, AuthService};
use service::storage::ObjectStore;

#[derive(Clone)]
pub struct ServerAuthConfig {
    pub jwt_secret: String,
    pub token_ttl_hours: i64,
    pub cookie_secure: bool,
}

impl From<&configs::AuthConfig> for ServerAuthConfig {
    fn from(c: &configs::AuthConfig) -> Self {
        Self { jwt_secret: c.jwt_secret.clone(), token_ttl_hours: c.token_ttl_hours, cookie_secure: c.cookie_secure }
    }
}

/// Shared by every handler. Cloning is cheap.
#[derive(Clone)]
pub struct ServerState {
    pub db: DatabaseConnection,
    pub auth: ServerAuthConfig,
    pub auth_service: Arc<AuthService<SeaOrmAuthRepository>>,
    pub objects: Arc<dyn ObjectStore>,
}

impl ServerState {
    pub fn new(db: DatabaseConnection, auth: ServerAuthConfig, objects: Arc<dyn ObjectStore>) -> Self {
        let repo = Arc::new(SeaOrmAuthRepository::new(db.clone()));
        let cfg = AuthConfig {
            jwt_secret: Some(auth.jwt_secret.clone()),
            password_algorithm: "argon2".into(),
            token_ttl_hours: auth.token_ttl_hours,
        };
        Self { db, auth, auth_service: Arc::new(AuthService::new(repo, cfg)), objects }
    }
}
