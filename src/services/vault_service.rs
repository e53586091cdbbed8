//! Domain service for vaults and their memberships.
//!
//! Every operation takes the acting user explicitly. Vaults the actor can't
//! see are reported as [`VaultError::NotFound`], the same as missing ones.

use serde::Deserialize;
use thiserror::Error;

use crate::api::types::{MemberDto, VaultDetailDto, VaultSummaryDto};
use crate::domain::{Actor, UserId, VaultId};
use crate::entities::vault_members::VaultRole;

#[derive(Debug, Error)]
pub enum VaultError {
    #[error("Vault not found: {0}")]
    NotFound(VaultId),

    #[error("Insufficient permission: {0}")]
    InsufficientPermission(String),

    #[error("A vault named '{0}' already exists")]
    DuplicateName(String),

    #[error("User is already a member of this vault")]
    AlreadyMember,

    #[error("User not found: {0}")]
    UserNotFound(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<sea_orm::DbErr> for VaultError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for VaultError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct VaultRequest {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AddMemberRequest {
    pub email: String,
    pub role: VaultRole,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateMemberRequest {
    pub role: VaultRole,
}

#[async_trait::async_trait]
pub trait VaultService: Send + Sync {
    /// Vaults owned directly by `actor`, with item and member counts.
    async fn list_owned_vaults(&self, actor: &Actor) -> Result<Vec<VaultSummaryDto>, VaultError>;

    /// # Errors
    ///
    /// Returns [`VaultError::NotFound`] if the vault is missing or not visible to `actor`.
    async fn get_vault(&self, id: VaultId, actor: &Actor) -> Result<VaultDetailDto, VaultError>;

    /// Creates the vault and the owner's OWNER membership atomically.
    ///
    /// # Errors
    ///
    /// Returns [`VaultError::DuplicateName`] if `actor` already owns a vault with that name.
    async fn create_vault(
        &self,
        request: &VaultRequest,
        actor: &Actor,
    ) -> Result<VaultDetailDto, VaultError>;

    async fn update_vault(
        &self,
        id: VaultId,
        request: &VaultRequest,
        actor: &Actor,
    ) -> Result<VaultDetailDto, VaultError>;

    /// Deletes the vault with its members, items, attachments and reminders.
    /// Only the owner may do this.
    async fn delete_vault(&self, id: VaultId, actor: &Actor) -> Result<(), VaultError>;

    async fn add_member(
        &self,
        id: VaultId,
        request: &AddMemberRequest,
        actor: &Actor,
    ) -> Result<MemberDto, VaultError>;

    async fn update_member_role(
        &self,
        id: VaultId,
        member: UserId,
        role: VaultRole,
        actor: &Actor,
    ) -> Result<MemberDto, VaultError>;

    async fn remove_member(
        &self,
        id: VaultId,
        member: UserId,
        actor: &Actor,
    ) -> Result<(), VaultError>;
}
