//! Domain service for authentication.
//!
//! Handles login, bearer-token issuance/verification and password changes.

use serde::Serialize;
use thiserror::Error;

use crate::db::User;

/// Errors specific to authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("User not found")]
    UserNotFound,

    #[error("Invalid or expired token")]
    InvalidToken,

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<sea_orm::DbErr> for AuthError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for AuthError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

/// Login result: a signed bearer token plus the user it identifies.
#[derive(Debug, Clone)]
pub struct LoginResult {
    pub token: String,
    pub user: User,
}

/// Identity resolved from a verified token.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct AuthenticatedUser {
    pub id: i32,
}

/// Domain service trait for authentication.
#[async_trait::async_trait]
pub trait AuthService: Send + Sync {
    /// Verifies credentials and issues a signed token.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::InvalidCredentials`] for an unknown username and
    /// for a wrong password alike; callers cannot tell the two apart.
    async fn login(&self, username: &str, password: &str) -> Result<LoginResult, AuthError>;

    /// Registers a new local account.
    async fn register(
        &self,
        username: &str,
        password: &str,
        email: Option<&str>,
    ) -> Result<User, AuthError>;

    /// Verifies a bearer token's signature and expiry and resolves the user
    /// id embedded in it.
    async fn verify_token(&self, token: &str) -> Result<AuthenticatedUser, AuthError>;

    /// Changes a user's password after re-validating the old one.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::InvalidCredentials`] if the old password does not
    /// match.
    async fn change_password(
        &self,
        user_id: i32,
        old_password: &str,
        new_password: &str,
    ) -> Result<(), AuthError>;
}
