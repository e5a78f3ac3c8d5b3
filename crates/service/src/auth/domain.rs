//! Account types shared by the sign-up and sign-in flows. A store owner and
//! an admin-dashboard user are the same account; ownership lives on `store`.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Sign-up form for a new store owner.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterInput {
    pub email: String,
    /// Shown on the dashboard next to the stores this account owns.
    pub name: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginInput {
    pub email: String,
    pub password: String,
}

/// The signed-in account, as handed to store and catalog handlers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: Uuid,
    pub email: String,
    pub name: String,
}

/// Stored password for an account. `password_algorithm` is kept beside the
/// PHC hash so a later rehash can tell old entries apart.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credentials {
    pub user_id: Uuid,
    pub password_hash: String,
    pub password_algorithm: String,
}

/// Result of a successful sign-in or sign-up. `token` is `None` when the
/// service was built without a signing secret.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthSession {
    pub user: AuthUser,
    pub token: Option<String>,
}
