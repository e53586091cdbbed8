//! `SeaORM` implementation of the `AuthService` trait.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::info;

use crate::api::types::{LoginResultDto, UserInfoDto};
use crate::config::Config;
use crate::db::{NewUser, Store, User};
use crate::domain::{Actor, UserId};
use crate::entities::users::UserRole;
use crate::services::auth_service::{AuthError, AuthService, RegisterRequest};

pub struct SeaOrmAuthService {
    store: Store,
    config: Arc<RwLock<Config>>,
}

impl SeaOrmAuthService {
    #[must_use]
    pub const fn new(store: Store, config: Arc<RwLock<Config>>) -> Self {
        Self { store, config }
    }

    async fn check_password_length(&self, password: &str) -> Result<(), AuthError> {
        let min = self.config.read().await.security.min_password_length;
        if password.chars().count() < min {
            return Err(AuthError::Validation(format!(
                "Password must be at least {min} characters"
            )));
        }
        Ok(())
    }
}

fn to_actor(user: User) -> Actor {
    Actor {
        id: UserId::new(user.id),
        email: user.email,
        name: user.name,
        role: user.role,
    }
}

fn login_result(user: User) -> LoginResultDto {
    let api_key = user.api_key.clone();
    LoginResultDto {
        user: UserInfoDto::from(user),
        api_key,
    }
}

#[async_trait]
impl AuthService for SeaOrmAuthService {
    async fn register(&self, request: &RegisterRequest) -> Result<LoginResultDto, AuthError> {
        self.create_user(request, UserRole::User).await
    }

    async fn create_user(
        &self,
        request: &RegisterRequest,
        role: UserRole,
    ) -> Result<LoginResultDto, AuthError> {
        let email = request.email.trim().to_lowercase();
        self.check_password_length(&request.password).await?;

        let repo = self.store.user_repo();
        if repo.email_exists(&email).await? {
            return Err(AuthError::DuplicateName(email));
        }

        let security = self.config.read().await.security.clone();
        let user = repo
            .create(
                NewUser {
                    email,
                    name: request.name.trim().to_string(),
                    password: request.password.clone(),
                    role,
                    email_verified: security.auto_verify_email,
                },
                &security,
            )
            .await?;

        info!(user_id = user.id, role = ?role, "User registered");
        Ok(login_result(user))
    }

    async fn login(&self, email: &str, password: &str) -> Result<LoginResultDto, AuthError> {
        let email = email.trim().to_lowercase();
        let user = self
            .store
            .user_repo()
            .verify_credentials(&email, password)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        info!(user_id = user.id, "User logged in");
        Ok(login_result(user))
    }

    async fn verify_api_key(&self, api_key: &str) -> Result<Option<Actor>, AuthError> {
        let user = self.store.user_repo().verify_api_key(api_key).await?;
        Ok(user.map(to_actor))
    }

    async fn find_actor(&self, id: UserId) -> Result<Option<Actor>, AuthError> {
        let user = self.store.user_repo().get_by_id(id.value()).await?;
        Ok(user.map(to_actor))
    }

    async fn get_user(&self, id: UserId) -> Result<UserInfoDto, AuthError> {
        let user = self
            .store
            .user_repo()
            .get_by_id(id.value())
            .await?
            .ok_or(AuthError::UserNotFound)?;

        Ok(UserInfoDto::from(user))
    }

    async fn update_profile(
        &self,
        id: UserId,
        name: &str,
        email: &str,
    ) -> Result<UserInfoDto, AuthError> {
        let email = email.trim().to_lowercase();
        let repo = self.store.user_repo();

        if let Some(existing) = repo.get_by_email(&email).await?
            && existing.id != id.value()
        {
            return Err(AuthError::DuplicateName(email));
        }

        if repo.get_by_id(id.value()).await?.is_none() {
            return Err(AuthError::UserNotFound);
        }

        let user = repo.update_profile(id.value(), name.trim(), &email).await?;
        info!(user_id = %id, "Profile updated");
        Ok(UserInfoDto::from(user))
    }

    async fn change_password(
        &self,
        id: UserId,
        current_password: &str,
        new_password: &str,
    ) -> Result<(), AuthError> {
        self.check_password_length(new_password).await?;

        if current_password == new_password {
            return Err(AuthError::Validation(
                "New password must be different from current password".to_string(),
            ));
        }

        let repo = self.store.user_repo();
        if !repo.verify_password(id.value(), current_password).await? {
            return Err(AuthError::Validation(
                "Current password is incorrect".to_string(),
            ));
        }

        let security = self.config.read().await.security.clone();
        repo.update_password(id.value(), new_password, &security)
            .await?;

        info!(user_id = %id, "Password changed");
        Ok(())
    }

    async fn get_api_key(&self, id: UserId) -> Result<String, AuthError> {
        self.store
            .user_repo()
            .get_api_key(id.value())
            .await?
            .ok_or(AuthError::UserNotFound)
    }

    async fn regenerate_api_key(&self, id: UserId) -> Result<String, AuthError> {
        if self.store.user_repo().get_by_id(id.value()).await?.is_none() {
            return Err(AuthError::UserNotFound);
        }

        let key = self.store.user_repo().regenerate_api_key(id.value()).await?;
        info!(user_id = %id, "API key regenerated");
        Ok(key)
    }
}
