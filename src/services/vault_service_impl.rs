//! `SeaORM` implementation of the `VaultService` trait.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::api::types::{MemberDto, UserSummaryDto, VaultDetailDto, VaultSummaryDto};
use crate::config::Config;
use crate::db::{Store, User};
use crate::domain::access::VaultAccess;
use crate::domain::expiry::{Clock, is_expiring_soon};
use crate::domain::{Actor, UserId, VaultId};
use crate::entities::vault_members::{self, VaultRole};
use crate::services::vault_service::{
    AddMemberRequest, VaultError, VaultRequest, VaultService,
};

pub struct SeaOrmVaultService {
    store: Store,
    config: Arc<RwLock<Config>>,
    clock: Arc<dyn Clock>,
}

impl SeaOrmVaultService {
    #[must_use]
    pub fn new(store: Store, config: Arc<RwLock<Config>>, clock: Arc<dyn Clock>) -> Self {
        Self {
            store,
            config,
            clock,
        }
    }

    async fn resolve(&self, id: VaultId, actor: &Actor) -> Result<VaultAccess, VaultError> {
        self.store
            .vault_repo()
            .find_accessible(id.value(), actor.id)
            .await?
            .ok_or_else(|| {
                warn!(vault_id = %id, user_id = %actor.id, "Vault not accessible");
                VaultError::NotFound(id)
            })
    }

    async fn users_by_id(&self, ids: &[i32]) -> Result<HashMap<i32, User>, VaultError> {
        let users = self.store.user_repo().get_by_ids(ids).await?;
        Ok(users.into_iter().map(|u| (u.id, u)).collect())
    }

    async fn member_dto(&self, member: vault_members::Model) -> Result<MemberDto, VaultError> {
        let user = self
            .store
            .user_repo()
            .get_by_id(member.user_id)
            .await?
            .ok_or_else(|| VaultError::UserNotFound(member.user_id.to_string()))?;

        Ok(MemberDto {
            id: member.id,
            user: UserSummaryDto::from(&user),
            role: member.role,
            joined_at: member.joined_at,
        })
    }

    async fn detail(&self, access: VaultAccess) -> Result<VaultDetailDto, VaultError> {
        let VaultAccess { vault, members, .. } = access;

        let mut user_ids: Vec<i32> = members.iter().map(|m| m.user_id).collect();
        user_ids.push(vault.owner_user_id);
        user_ids.sort_unstable();
        user_ids.dedup();
        let users = self.users_by_id(&user_ids).await?;

        let owner = users
            .get(&vault.owner_user_id)
            .map(UserSummaryDto::from)
            .ok_or_else(|| VaultError::UserNotFound(vault.owner_user_id.to_string()))?;

        let members = members
            .into_iter()
            .filter_map(|m| {
                let user = users.get(&m.user_id)?;
                Some(MemberDto {
                    id: m.id,
                    user: UserSummaryDto::from(user),
                    role: m.role,
                    joined_at: m.joined_at,
                })
            })
            .collect();

        let items = self.store.item_repo().list_by_vault(vault.id).await?;
        let window = self.config.read().await.reminders.expiring_soon_days;
        let today = self.clock.today();
        let expiring_soon_count = items
            .iter()
            .filter(|i| is_expiring_soon(i.expiry_date, today, window))
            .count() as u64;

        Ok(VaultDetailDto {
            id: vault.id,
            name: vault.name,
            description: vault.description,
            owner,
            members,
            item_count: items.len() as u64,
            expiring_soon_count,
            created_at: vault.created_at,
            updated_at: vault.updated_at,
        })
    }

    /// Resolve the vault and require member-management rights.
    async fn resolve_for_membership(
        &self,
        id: VaultId,
        actor: &Actor,
    ) -> Result<VaultAccess, VaultError> {
        let access = self.resolve(id, actor).await?;
        if !access.can_manage_members() {
            warn!(vault_id = %id, user_id = %actor.id, "Member management denied");
            return Err(VaultError::InsufficientPermission(
                "Only the vault owner can manage members".to_string(),
            ));
        }
        Ok(access)
    }
}

fn ensure_assignable(role: VaultRole) -> Result<(), VaultError> {
    if role == VaultRole::Owner {
        return Err(VaultError::Validation(
            "Role must be EDITOR or VIEWER".to_string(),
        ));
    }
    Ok(())
}

#[async_trait::async_trait]
impl VaultService for SeaOrmVaultService {
    async fn list_owned_vaults(&self, actor: &Actor) -> Result<Vec<VaultSummaryDto>, VaultError> {
        debug!(user_id = %actor.id, "Listing owned vaults");
        let repo = self.store.vault_repo();
        let vaults = repo.list_by_owner(actor.id.value()).await?;

        let ids: Vec<i32> = vaults.iter().map(|v| v.id).collect();
        let item_counts = repo.item_counts(&ids).await?;
        let member_counts = repo.member_counts(&ids).await?;

        Ok(vaults
            .into_iter()
            .map(|v| VaultSummaryDto {
                item_count: item_counts.get(&v.id).copied().unwrap_or(0),
                member_count: member_counts.get(&v.id).copied().unwrap_or(0),
                id: v.id,
                name: v.name,
                description: v.description,
                owner_id: v.owner_user_id,
                created_at: v.created_at,
                updated_at: v.updated_at,
            })
            .collect())
    }

    async fn get_vault(&self, id: VaultId, actor: &Actor) -> Result<VaultDetailDto, VaultError> {
        debug!(vault_id = %id, user_id = %actor.id, "Fetching vault");
        let access = self.resolve(id, actor).await?;
        self.detail(access).await
    }

    async fn create_vault(
        &self,
        request: &VaultRequest,
        actor: &Actor,
    ) -> Result<VaultDetailDto, VaultError> {
        let repo = self.store.vault_repo();
        let owner_id = actor.id.value();
        let name = request.name.trim();

        if repo.exists_by_name_and_owner(name, owner_id, None).await? {
            return Err(VaultError::DuplicateName(name.to_string()));
        }

        let vault = repo
            .create_with_owner(name, request.description.as_deref(), owner_id)
            .await?;

        metrics::counter!("vaults_created_total").increment(1);
        info!(vault_id = vault.id, user_id = %actor.id, "Vault created");

        let access = self.resolve(VaultId::new(vault.id), actor).await?;
        self.detail(access).await
    }

    async fn update_vault(
        &self,
        id: VaultId,
        request: &VaultRequest,
        actor: &Actor,
    ) -> Result<VaultDetailDto, VaultError> {
        let access = self.resolve(id, actor).await?;
        if !access.can_edit() {
            warn!(vault_id = %id, user_id = %actor.id, "Vault edit denied");
            return Err(VaultError::InsufficientPermission(
                "You don't have permission to edit this vault".to_string(),
            ));
        }

        let repo = self.store.vault_repo();
        let name = request.name.trim();
        if repo
            .exists_by_name_and_owner(name, access.vault.owner_user_id, Some(access.vault.id))
            .await?
        {
            return Err(VaultError::DuplicateName(name.to_string()));
        }

        let VaultAccess { vault, members, .. } = access;
        let vault = repo
            .update(vault, name, request.description.as_deref())
            .await?;
        info!(vault_id = %id, user_id = %actor.id, "Vault updated");

        let access =
            VaultAccess::resolve(vault, members, actor.id).ok_or(VaultError::NotFound(id))?;
        self.detail(access).await
    }

    async fn delete_vault(&self, id: VaultId, actor: &Actor) -> Result<(), VaultError> {
        let access = self.resolve(id, actor).await?;
        if !access.is_owner() {
            warn!(vault_id = %id, user_id = %actor.id, "Vault deletion denied");
            return Err(VaultError::InsufficientPermission(
                "Only the vault owner can delete the vault".to_string(),
            ));
        }

        self.store.vault_repo().delete_cascade(id.value()).await?;
        info!(vault_id = %id, user_id = %actor.id, "Vault deleted");
        Ok(())
    }

    async fn add_member(
        &self,
        id: VaultId,
        request: &AddMemberRequest,
        actor: &Actor,
    ) -> Result<MemberDto, VaultError> {
        let access = self.resolve_for_membership(id, actor).await?;
        ensure_assignable(request.role)?;

        let user = self
            .store
            .user_repo()
            .get_by_email(&request.email)
            .await?
            .ok_or_else(|| VaultError::UserNotFound(request.email.clone()))?;

        if user.id == access.vault.owner_user_id
            || access.role_of(UserId::new(user.id)).is_some()
        {
            return Err(VaultError::AlreadyMember);
        }

        let member = self
            .store
            .member_repo()
            .add(access.vault.id, user.id, request.role)
            .await?;
        info!(vault_id = %id, member_id = user.id, role = ?request.role, "Member added");

        Ok(MemberDto {
            id: member.id,
            user: UserSummaryDto::from(&user),
            role: member.role,
            joined_at: member.joined_at,
        })
    }

    async fn update_member_role(
        &self,
        id: VaultId,
        member: UserId,
        role: VaultRole,
        actor: &Actor,
    ) -> Result<MemberDto, VaultError> {
        let access = self.resolve_for_membership(id, actor).await?;
        ensure_assignable(role)?;

        if member.value() == access.vault.owner_user_id {
            return Err(VaultError::Validation(
                "The owner's membership cannot be changed".to_string(),
            ));
        }

        let repo = self.store.member_repo();
        let row = repo
            .find(access.vault.id, member.value())
            .await?
            .ok_or_else(|| VaultError::UserNotFound(member.to_string()))?;

        let row = repo.set_role(row, role).await?;
        info!(vault_id = %id, member_id = %member, role = ?role, "Member role changed");
        self.member_dto(row).await
    }

    async fn remove_member(
        &self,
        id: VaultId,
        member: UserId,
        actor: &Actor,
    ) -> Result<(), VaultError> {
        let access = self.resolve_for_membership(id, actor).await?;

        if member.value() == access.vault.owner_user_id {
            return Err(VaultError::Validation(
                "The owner's membership cannot be removed".to_string(),
            ));
        }

        let repo = self.store.member_repo();
        let row = repo
            .find(access.vault.id, member.value())
            .await?
            .ok_or_else(|| VaultError::UserNotFound(member.to_string()))?;

        repo.remove(row.id).await?;
        info!(vault_id = %id, member_id = %member, "Member removed");
        Ok(())
    }
}
