use std::sync::Arc;

use argon2::{Argon2, password_hash::{PasswordHasher, PasswordVerifier, SaltString}, PasswordHash};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header as JwtHeader, Validation as JwtValidation};
use rand::rngs::OsRng;
use serde::{Deserialize, Serialize};
use tracing::{info, debug, instrument};
use uuid::Uuid;

use super::domain::{RegisterInput, LoginInput, AuthUser, AuthSession};
use super::errors::AuthError;
use super::repository::AuthRepository;

pub const MIN_PASSWORD_LEN: usize = 8;

/// Auth service configuration
#[derive(Clone)]
pub struct AuthConfig {
    /// Tokens are only issued when a secret is set.
    pub jwt_secret: Option<String>,
    pub password_algorithm: String,
    pub token_ttl_hours: i64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self { jwt_secret: None, password_algorithm: "argon2".into(), token_ttl_hours: 12 }
    }
}

/// Signed token payload. `uid` is the user id, `sub` the email.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub uid: String,
    pub iat: usize,
    pub exp: usize,
}

impl Claims {
    pub fn user_id(&self) -> Result<Uuid, AuthError> {
        Uuid::parse_str(&self.uid).map_err(|e| AuthError::TokenError(e.to_string()))
    }
}

/// Check signature and expiry of an HS256 token.
///
/// # Examples
/// ```
/// use service::auth::{service::{AuthService, AuthConfig}, repository::mock::MockAuthRepository, verify_token};
/// use service::auth::domain::{RegisterInput, LoginInput};
/// use std::sync::Arc;
/// let cfg = AuthConfig { jwt_secret: Some("secret".into()), ..AuthConfig::default() };
/// let svc = AuthService::new(Arc::new(MockAuthRepository::default()), cfg);
/// let _ = tokio_test::block_on(svc.register(RegisterInput { email: "u@e.com".into(), name: "N".into(), password: "Passw0rd".into() }));
/// let session = tokio_test::block_on(svc.login(LoginInput { email: "u@e.com".into(), password: "Passw0rd".into() })).unwrap();
/// let claims = verify_token("secret", session.token.as_deref().unwrap()).unwrap();
/// assert_eq!(claims.user_id().unwrap(), session.user.id);
/// assert!(verify_token("other", session.token.as_deref().unwrap()).is_err());
/// ```
pub fn verify_token(secret: &str, token: &str) -> Result<Claims, AuthError> {
    let data = decode::<Claims>(token, &DecodingKey::from_secret(secret.as_bytes()), &JwtValidation::default())
        .map_err(|e| AuthError::TokenError(e.to_string()))?;
    Ok(data.claims)
}

/// Auth business service independent of web framework
pub struct AuthService<R: AuthRepository> {
    repo: Arc<R>,
    cfg: AuthConfig,
}

impl<R: AuthRepository> AuthService<R> {
    pub fn new(repo: Arc<R>, cfg: AuthConfig) -> Self { Self { repo, cfg } }

    /// Register a new user with a hashed password.
    ///
    /// # Examples
    /// ```
    /// use service::auth::{service::{AuthService, AuthConfig}, repository::mock::MockAuthRepository};
    /// use service::auth::domain::RegisterInput;
    /// use std::sync::Arc;
    /// let repo = Arc::new(MockAuthRepository::default());
    /// let svc = AuthService::new(repo, AuthConfig::default());
    /// let input = RegisterInput { email: " User@Example.com ".into(), name: "Test".into(), password: "Secret123".into() };
    /// let user = tokio_test::block_on(svc.register(input)).unwrap();
    /// assert_eq!(user.email, "user@example.com");
    /// ```
    #[instrument(skip(self, input), fields(email = %input.email))]
    pub async fn register(&self, input: RegisterInput) -> Result<AuthUser, AuthError> {
        let email = models::user::normalize_email(&input.email).map_err(|e| AuthError::Validation(e.to_string()))?;
        if input.name.trim().is_empty() {
            return Err(AuthError::Validation("name is required".into()));
        }
        if input.password.len() < MIN_PASSWORD_LEN {
            return Err(AuthError::Validation(format!("password too short (>={MIN_PASSWORD_LEN})")));
        }
        if let Some(existing) = self.repo.find_user_by_email(&email).await? {
            debug!("user exists: {}", existing.email);
            return Err(AuthError::Conflict);
        }

        let user = self.repo.create_user(&email, input.name.trim()).await?;
        let salt = SaltString::generate(&mut OsRng);
        let hash = Argon2::default()
            .hash_password(input.password.as_bytes(), &salt)
            .map_err(|e| AuthError::HashError(e.to_string()))?
            .to_string();

        self.repo.upsert_password(user.id, hash, self.cfg.password_algorithm.clone()).await?;
        info!(user_id = %user.id, email = %user.email, "user_registered");
        Ok(user)
    }

    /// Authenticate a user and issue a token when a secret is configured.
    ///
    /// # Examples
    /// ```
    /// use service::auth::{service::{AuthService, AuthConfig}, repository::mock::MockAuthRepository};
    /// use service::auth::domain::{RegisterInput, LoginInput};
    /// use std::sync::Arc;
    /// let repo = Arc::new(MockAuthRepository::default());
    /// let svc = AuthService::new(repo.clone(), AuthConfig { jwt_secret: Some("secret".into()), ..AuthConfig::default() });
    /// let _ = tokio_test::block_on(svc.register(RegisterInput { email: "u@e.com".into(), name: "N".into(), password: "Passw0rd".into() }));
    /// let session = tokio_test::block_on(svc.login(LoginInput { email: "U@E.com".into(), password: "Passw0rd".into() })).unwrap();
    /// assert_eq!(session.user.email, "u@e.com");
    /// assert!(session.token.is_some());
    /// let wrong = tokio_test::block_on(svc.login(LoginInput { email: "u@e.com".into(), password: "nope-nope".into() }));
    /// assert!(wrong.is_err());
    /// ```
    #[instrument(skip(self, input), fields(email = %input.email))]
    pub async fn login(&self, input: LoginInput) -> Result<AuthSession, AuthError> {
        let email = models::user::normalize_email(&input.email).map_err(|_| AuthError::Unauthorized)?;
        let user = self.repo
            .find_user_by_email(&email)
            .await?
            .ok_or(AuthError::Unauthorized)?;

        let cred = self.repo
            .get_credentials(user.id)
            .await?
            .ok_or(AuthError::Unauthorized)?;

        let parsed = PasswordHash::new(&cred.password_hash).map_err(|e| AuthError::HashError(e.to_string()))?;
        if Argon2::default().verify_password(input.password.as_bytes(), &parsed).is_err() {
            return Err(AuthError::Unauthorized);
        }

        let token = match &self.cfg.jwt_secret {
            Some(secret) => Some(self.issue_token(secret, &user)?),
            None => None,
        };
        info!(user_id = %user.id, "user_logged_in");
        Ok(AuthSession { user, token })
    }

    /// The user behind a verified token.
    pub async fn current_user(&self, user_id: Uuid) -> Result<AuthUser, AuthError> {
        self.repo.find_user(user_id).await?.ok_or(AuthError::NotFound)
    }

    fn issue_token(&self, secret: &str, user: &AuthUser) -> Result<String, AuthError> {
        let now = chrono::Utc::now();
        let exp = now + chrono::Duration::hours(self.cfg.token_ttl_hours);
        let claims = Claims {
            sub: user.email.clone(),
            uid: user.id.to_string(),
            iat: now.timestamp() as usize,
            exp: exp.timestamp() as usize,
        };
        encode(&JwtHeader::default(), &claims, &EncodingKey::from_secret(secret.as_bytes()))
            .map_err(|e| AuthError::TokenError(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::repository::mock::MockAuthRepository;
    use crate::auth::repo::SeaOrmAuthRepository;
    use crate::test_support::get_db;

    fn cfg() -> AuthConfig {
        AuthConfig { jwt_secret: Some("test-secret".into()), ..AuthConfig::default() }
    }

    #[tokio::test]
    async fn duplicate_email_conflicts_case_insensitively() {
        let svc = AuthService::new(Arc::new(MockAuthRepository::default()), cfg());
        let input = |email: &str| RegisterInput { email: email.into(), name: "A".into(), password: "longenough".into() };
        svc.register(input("a@b.com")).await.unwrap();
        assert!(matches!(svc.register(input("A@B.com")).await, Err(AuthError::Conflict)));
        assert!(matches!(svc.register(input("not-an-email")).await, Err(AuthError::Validation(_))));
    }

    #[tokio::test]
    async fn short_password_rejected() {
        let svc = AuthService::new(Arc::new(MockAuthRepository::default()), cfg());
        let res = svc.register(RegisterInput { email: "a@b.com".into(), name: "A".into(), password: "short".into() }).await;
        assert!(matches!(res, Err(AuthError::Validation(_))));
    }

    #[test]
    fn expired_token_rejected() {
        let claims = Claims { sub: "a@b.com".into(), uid: Uuid::new_v4().to_string(), iat: 1, exp: 2 };
        let token = encode(&JwtHeader::default(), &claims, &EncodingKey::from_secret(b"k")).unwrap();
        assert!(verify_token("k", &token).is_err());
    }

    #[tokio::test]
    async fn seaorm_repository_round_trip() -> Result<(), anyhow::Error> {
        let db = get_db().await?;
        let svc = AuthService::new(Arc::new(SeaOrmAuthRepository::new(db)), cfg());
        let user = svc
            .register(RegisterInput { email: "owner@shop.test".into(), name: "Owner".into(), password: "hunter22!".into() })
            .await?;
        let session = svc.login(LoginInput { email: "owner@shop.test".into(), password: "hunter22!".into() }).await?;
        let token = session.token.unwrap_or_default();
        let claims = verify_token("test-secret", &token)?;
        assert_eq!(claims.user_id()?, user.id);
        assert_eq!(svc.current_user(user.id).await?.email, "owner@shop.test");
        Ok(())
    }
}
