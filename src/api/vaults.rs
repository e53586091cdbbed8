//! Vault and membership endpoints.
//!
//! Handlers validate payloads and map [`VaultError`] onto HTTP statuses; the
//! permission rules live in the service.

use axum::{
    Extension, Json,
    extract::{Path, State},
};
use std::sync::Arc;

use super::validation::{validate_email, validate_id, validate_vault_request};
use crate::api::types::{MemberDto, MessageResponse, VaultDetailDto, VaultSummaryDto};
use crate::api::{ApiError, ApiResponse, AppState};
use crate::domain::{Actor, UserId, VaultId};
use crate::services::{AddMemberRequest, UpdateMemberRequest, VaultError, VaultRequest};

impl From<VaultError> for ApiError {
    fn from(err: VaultError) -> Self {
        match err {
            VaultError::NotFound(id) => Self::not_found("Vault", id),
            VaultError::InsufficientPermission(msg) => Self::forbidden(msg),
            VaultError::DuplicateName(name) => {
                Self::conflict(format!("Vault with name '{name}' already exists"))
            }
            VaultError::AlreadyMember => Self::conflict("User is already a member of this vault"),
            VaultError::UserNotFound(who) => Self::not_found("User", who),
            VaultError::Validation(msg) => Self::validation(msg),
            VaultError::Database(msg) => Self::DatabaseError(msg),
            VaultError::Internal(msg) => Self::internal(msg),
        }
    }
}

/// GET /vaults
pub async fn list_vaults(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<Actor>,
) -> Result<Json<ApiResponse<Vec<VaultSummaryDto>>>, ApiError> {
    let vaults = state.vault_service().list_owned_vaults(&actor).await?;
    Ok(Json(ApiResponse::success(vaults)))
}

/// POST /vaults
pub async fn create_vault(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<Actor>,
    Json(payload): Json<VaultRequest>,
) -> Result<Json<ApiResponse<VaultDetailDto>>, ApiError> {
    validate_vault_request(&payload)?;
    let vault = state.vault_service().create_vault(&payload, &actor).await?;
    Ok(Json(ApiResponse::success(vault)))
}

/// GET /vaults/{id}
pub async fn get_vault(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<VaultDetailDto>>, ApiError> {
    let id = VaultId::new(validate_id("vault", id)?);
    let vault = state.vault_service().get_vault(id, &actor).await?;
    Ok(Json(ApiResponse::success(vault)))
}

/// PUT /vaults/{id}
pub async fn update_vault(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<i32>,
    Json(payload): Json<VaultRequest>,
) -> Result<Json<ApiResponse<VaultDetailDto>>, ApiError> {
    let id = VaultId::new(validate_id("vault", id)?);
    validate_vault_request(&payload)?;
    let vault = state
        .vault_service()
        .update_vault(id, &payload, &actor)
        .await?;
    Ok(Json(ApiResponse::success(vault)))
}

/// DELETE /vaults/{id}
pub async fn delete_vault(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    let id = VaultId::new(validate_id("vault", id)?);
    state.vault_service().delete_vault(id, &actor).await?;
    Ok(Json(ApiResponse::success(MessageResponse::new(
        "Vault deleted",
    ))))
}

/// POST /vaults/{id}/members
pub async fn add_member(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<i32>,
    Json(mut payload): Json<AddMemberRequest>,
) -> Result<Json<ApiResponse<MemberDto>>, ApiError> {
    let id = VaultId::new(validate_id("vault", id)?);
    payload.email = validate_email(&payload.email)?.to_lowercase();
    let member = state
        .vault_service()
        .add_member(id, &payload, &actor)
        .await?;
    Ok(Json(ApiResponse::success(member)))
}

/// PUT /vaults/{id}/members/{user_id}
pub async fn update_member(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<Actor>,
    Path((id, user_id)): Path<(i32, i32)>,
    Json(payload): Json<UpdateMemberRequest>,
) -> Result<Json<ApiResponse<MemberDto>>, ApiError> {
    let id = VaultId::new(validate_id("vault", id)?);
    let user_id = UserId::new(validate_id("user", user_id)?);
    let member = state
        .vault_service()
        .update_member_role(id, user_id, payload.role, &actor)
        .await?;
    Ok(Json(ApiResponse::success(member)))
}

/// DELETE /vaults/{id}/members/{user_id}
pub async fn remove_member(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<Actor>,
    Path((id, user_id)): Path<(i32, i32)>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    let id = VaultId::new(validate_id("vault", id)?);
    let user_id = UserId::new(validate_id("user", user_id)?);
    state
        .vault_service()
        .remove_member(id, user_id, &actor)
        .await?;
    Ok(Json(ApiResponse::success(MessageResponse::new(
        "Member removed",
    ))))
}
