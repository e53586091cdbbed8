use axum::{
    Extension, Json,
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use std::sync::Arc;
use tower_sessions::Session;

use super::validation::{validate_email, validate_password, validate_required};
use super::{ApiError, ApiResponse, AppState};
use crate::api::types::{ApiKeyResponse, LoginResultDto, MessageResponse, UserInfoDto};
use crate::domain::{Actor, UserId};
use crate::services::{AuthError, RegisterRequest};

const SESSION_USER_KEY: &str = "user_id";

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidCredentials => Self::unauthorized("Invalid email or password"),
            AuthError::Unauthorized => Self::unauthorized("Not authenticated"),
            AuthError::DuplicateName(email) => {
                Self::conflict(format!("Email '{email}' is already registered"))
            }
            AuthError::UserNotFound => Self::NotFound("User not found".to_string()),
            AuthError::Validation(msg) => Self::validation(msg),
            AuthError::Database(msg) => Self::DatabaseError(msg),
            AuthError::Internal(msg) => Self::internal(msg),
        }
    }
}

// ============================================================================
// Request Types
// ============================================================================

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Deserialize)]
pub struct UpdateProfileRequest {
    pub name: String,
    pub email: String,
}

#[derive(Deserialize)]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

// ============================================================================
// Middleware
// ============================================================================

/// Resolves the caller and stores it as an [`Actor`] request extension.
///
/// Checked in order:
/// 1. Session cookie (from login)
/// 2. `X-Api-Key` header
/// 3. `Authorization: Bearer <api_key>` header
pub async fn auth_middleware(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    session: Session,
    mut request: Request,
    next: Next,
) -> Response {
    let mut actor = None;

    if let Ok(Some(user_id)) = session.get::<i32>(SESSION_USER_KEY).await {
        actor = state
            .auth_service()
            .find_actor(UserId::new(user_id))
            .await
            .ok()
            .flatten();
    }

    if actor.is_none()
        && let Some(key) = extract_api_key(&headers)
    {
        actor = state
            .auth_service()
            .verify_api_key(&key)
            .await
            .ok()
            .flatten();
    }

    let Some(actor) = actor else {
        return ApiError::unauthorized("Authentication required").into_response();
    };

    tracing::Span::current().record("user_id", actor.id.value());
    request.extensions_mut().insert(actor);
    next.run(request).await
}

fn extract_api_key(headers: &HeaderMap) -> Option<String> {
    if let Some(api_key) = headers.get("X-Api-Key")
        && let Ok(key_str) = api_key.to_str()
    {
        return Some(key_str.trim().to_string());
    }

    if let Some(auth_header) = headers.get("Authorization")
        && let Ok(auth_str) = auth_header.to_str()
        && let Some(token) = auth_str.strip_prefix("Bearer ")
    {
        return Some(token.trim().to_string());
    }

    None
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /auth/register
pub async fn register(
    State(state): State<Arc<AppState>>,
    session: Session,
    Json(payload): Json<RegisterRequest>,
) -> Result<Json<ApiResponse<LoginResultDto>>, ApiError> {
    let min_length = state.config().read().await.security.min_password_length;
    validate_required("Name", &payload.name, 100)?;
    validate_email(&payload.email)?;
    validate_password(&payload.password, min_length)?;

    let result = state.auth_service().register(&payload).await?;
    open_session(&session, result.user.id).await?;

    Ok(Json(ApiResponse::success(result)))
}

/// POST /auth/login
/// Authenticate with email and password, returns API key on success
pub async fn login(
    State(state): State<Arc<AppState>>,
    session: Session,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<ApiResponse<LoginResultDto>>, ApiError> {
    if payload.email.trim().is_empty() {
        return Err(ApiError::validation("Email is required"));
    }
    if payload.password.is_empty() {
        return Err(ApiError::validation("Password is required"));
    }

    let result = state
        .auth_service()
        .login(&payload.email, &payload.password)
        .await?;
    open_session(&session, result.user.id).await?;

    Ok(Json(ApiResponse::success(result)))
}

/// POST /auth/logout
/// Invalidate the current session
pub async fn logout(session: Session) -> Json<ApiResponse<MessageResponse>> {
    let _ = session.flush().await;
    Json(ApiResponse::success(MessageResponse::new("Logged out")))
}

/// GET /auth/me
pub async fn get_current_user(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<Actor>,
) -> Result<Json<ApiResponse<UserInfoDto>>, ApiError> {
    let user = state.auth_service().get_user(actor.id).await?;
    Ok(Json(ApiResponse::success(user)))
}

/// PUT /auth/profile
pub async fn update_profile(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<Actor>,
    Json(payload): Json<UpdateProfileRequest>,
) -> Result<Json<ApiResponse<UserInfoDto>>, ApiError> {
    let name = validate_required("Name", &payload.name, 100)?;
    let email = validate_email(&payload.email)?;

    let user = state
        .auth_service()
        .update_profile(actor.id, name, email)
        .await?;
    Ok(Json(ApiResponse::success(user)))
}

/// PUT /auth/password
/// Change password (requires current password verification)
pub async fn change_password(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<Actor>,
    Json(payload): Json<ChangePasswordRequest>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    let min_length = state.config().read().await.security.min_password_length;
    validate_password(&payload.new_password, min_length)?;

    state
        .auth_service()
        .change_password(actor.id, &payload.current_password, &payload.new_password)
        .await?;

    Ok(Json(ApiResponse::success(MessageResponse::new(
        "Password updated successfully",
    ))))
}

/// GET /auth/api-key
pub async fn get_api_key(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<Actor>,
) -> Result<Json<ApiResponse<ApiKeyResponse>>, ApiError> {
    let api_key = state.auth_service().get_api_key(actor.id).await?;
    Ok(Json(ApiResponse::success(ApiKeyResponse { api_key })))
}

/// POST /auth/api-key/regenerate
pub async fn regenerate_api_key(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<Actor>,
) -> Result<Json<ApiResponse<ApiKeyResponse>>, ApiError> {
    let api_key = state.auth_service().regenerate_api_key(actor.id).await?;
    Ok(Json(ApiResponse::success(ApiKeyResponse { api_key })))
}

async fn open_session(session: &Session, user_id: i32) -> Result<(), ApiError> {
    session
        .cycle_id()
        .await
        .map_err(|e| ApiError::internal(format!("Session error: {e}")))?;
    session
        .insert(SESSION_USER_KEY, user_id)
        .await
        .map_err(|e| ApiError::internal(format!("Failed to create session: {e}")))
}
