//! Domain service for accounts and credentials.
//!
//! Handles registration, login, profile updates, password changes, and API
//! key management.

use serde::Deserialize;
use thiserror::Error;

use crate::api::types::{LoginResultDto, UserInfoDto};
use crate::domain::{Actor, UserId};
use crate::entities::users::UserRole;

/// Errors specific to authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Email '{0}' is already registered")]
    DuplicateName(String),

    #[error("User not found")]
    UserNotFound,

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Unauthorized")]
    Unauthorized,

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

#[derive(Debug, Clone, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

#[async_trait::async_trait]
pub trait AuthService: Send + Sync {
    /// Registers a USER account and returns it with its API key.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::DuplicateName`] if the email is taken.
    async fn register(&self, request: &RegisterRequest) -> Result<LoginResultDto, AuthError>;

    /// Creates an account with an explicit role (used by the CLI).
    async fn create_user(
        &self,
        request: &RegisterRequest,
        role: UserRole,
    ) -> Result<LoginResultDto, AuthError>;

    /// Verifies credentials and returns user info.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::InvalidCredentials`] if login fails.
    async fn login(&self, email: &str, password: &str) -> Result<LoginResultDto, AuthError>;

    /// Resolves an API key to the acting user, if any.
    async fn verify_api_key(&self, api_key: &str) -> Result<Option<Actor>, AuthError>;

    /// Resolves a user id (from a session) to the acting user, if it still exists.
    async fn find_actor(&self, id: UserId) -> Result<Option<Actor>, AuthError>;

    async fn get_user(&self, id: UserId) -> Result<UserInfoDto, AuthError>;

    /// # Errors
    ///
    /// Returns [`AuthError::DuplicateName`] if another account uses `email`.
    async fn update_profile(
        &self,
        id: UserId,
        name: &str,
        email: &str,
    ) -> Result<UserInfoDto, AuthError>;

    /// # Errors
    ///
    /// Returns [`AuthError::Validation`] if current password is incorrect or new password invalid.
    async fn change_password(
        &self,
        id: UserId,
        current_password: &str,
        new_password: &str,
    ) -> Result<(), AuthError>;

    async fn get_api_key(&self, id: UserId) -> Result<String, AuthError>;

    /// Regenerates the API key for a user and returns the new one.
    async fn regenerate_api_key(&self, id: UserId) -> Result<String, AuthError>;
}
