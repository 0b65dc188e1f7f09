//! JWT-backed implementation of the `AuthService` trait.

use async_trait::async_trait;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use crate::db::{NewUser, Store, User};
use crate::services::auth_service::{AuthError, AuthService, AuthenticatedUser, LoginResult};

/// Claims carried by the bearer token: the user id, issue time and an
/// absolute expiry.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: i32,
    pub iat: i64,
    pub exp: i64,
}

pub struct JwtAuthService {
    store: Store,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    token_ttl_hours: i64,
}

impl JwtAuthService {
    #[must_use]
    pub fn new(store: Store, secret: &str, token_ttl_hours: i64) -> Self {
        Self {
            store,
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            token_ttl_hours,
        }
    }

    fn issue_token(&self, user_id: i32) -> Result<String, AuthError> {
        let now = chrono::Utc::now();
        let claims = Claims {
            sub: user_id,
            iat: now.timestamp(),
            exp: (now + chrono::Duration::hours(self.token_ttl_hours)).timestamp(),
        };

        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| AuthError::Internal(format!("Failed to sign token: {e}")))
    }
}

#[async_trait]
impl AuthService for JwtAuthService {
    async fn login(&self, username: &str, password: &str) -> Result<LoginResult, AuthError> {
        let is_valid = self.store.verify_user_password(username, password).await?;

        if !is_valid {
            return Err(AuthError::InvalidCredentials);
        }

        let user = self
            .store
            .get_user_by_username(username)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        let token = self.issue_token(user.id)?;

        Ok(LoginResult { token, user })
    }

    async fn register(
        &self,
        username: &str,
        password: &str,
        email: Option<&str>,
    ) -> Result<User, AuthError> {
        if username.trim().is_empty() {
            return Err(AuthError::Validation("Username is required".to_string()));
        }
        if password.is_empty() {
            return Err(AuthError::Validation("Password is required".to_string()));
        }

        if self.store.get_user_by_username(username).await?.is_some() {
            return Err(AuthError::Validation(format!(
                "Username '{username}' is already taken"
            )));
        }

        let user = self
            .store
            .create_user(NewUser {
                username,
                password,
                email,
            })
            .await?;

        Ok(user)
    }

    async fn verify_token(&self, token: &str) -> Result<AuthenticatedUser, AuthError> {
        let validation = Validation::default();

        let token_data = decode::<Claims>(token, &self.decoding_key, &validation)
            .map_err(|_| AuthError::InvalidToken)?;

        Ok(AuthenticatedUser {
            id: token_data.claims.sub,
        })
    }

    async fn change_password(
        &self,
        user_id: i32,
        old_password: &str,
        new_password: &str,
    ) -> Result<(), AuthError> {
        if new_password.is_empty() {
            return Err(AuthError::Validation("New password is required".to_string()));
        }

        let user = self
            .store
            .get_user_by_id(user_id)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        let is_valid = self
            .store
            .verify_user_password(&user.username, old_password)
            .await?;

        if !is_valid {
            return Err(AuthError::InvalidCredentials);
        }

        self.store
            .update_user_password(&user.username, new_password)
            .await?;

        tracing::info!("Password changed for user: {}", user.username);

        Ok(())
    }
}
