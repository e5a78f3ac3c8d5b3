use thiserror::Error;

/// Why a store account could not be registered, signed in or resolved.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Rejected sign-up field (email shape, empty name, short password).
    #[error("invalid account details: {0}")]
    Validation(String),
    #[error("an account with this email is already registered")]
    Conflict,
    /// The token names an account that no longer exists.
    #[error("account no longer exists")]
    NotFound,
    #[error("email or password does not match")]
    Unauthorized,
    #[error("password hashing failed: {0}")]
    HashError(String),
    #[error("session token rejected: {0}")]
    TokenError(String),
    #[error("account storage failed: {0}")]
    Repository(String),
}

impl AuthError {
    /// Code written next to the message in server logs. 1xxx are the
    /// caller's fault, 11xx are crypto failures, 12xx are storage failures.
    pub fn code(&self) -> u16 {
        match self {
            Self::Validation(_) => 1001,
            Self::Conflict => 1002,
            Self::NotFound => 1003,
            Self::Unauthorized => 1004,
            Self::HashError(_) => 1101,
            Self::TokenError(_) => 1102,
            Self::Repository(_) => 1200,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_speak_about_accounts() {
        assert_eq!(AuthError::Conflict.to_string(), "an account with this email is already registered");
        assert_eq!(AuthError::Unauthorized.to_string(), "email or password does not match");
        let e = AuthError::Validation("name is required".into());
        assert_eq!(e.to_string(), "invalid account details: name is required");
    }

    #[test]
    fn codes_split_client_and_backend_failures() {
        assert!(AuthError::Unauthorized.code() < 1100);
        assert!(AuthError::NotFound.code() < 1100);
        assert_eq!(AuthError::HashError("x".into()).code(), 1101);
        assert_eq!(AuthError::TokenError("expired".into()).code(), 1102);
        assert_eq!(AuthError::Repository("db down".into()).code(), 1200);
    }
}
