use anyhow::{Context, Result};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set, TransactionTrait,
};
use std::collections::{BTreeSet, HashMap};

use crate::domain::UserId;
use crate::domain::access::VaultAccess;
use crate::entities::vault_members::VaultRole;
use crate::entities::{attachments, items, prelude::*, reminder_schedules, vault_members, vaults};

pub struct VaultRepository {
    conn: DatabaseConnection,
}

impl VaultRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn get(&self, id: i32) -> Result<Option<vaults::Model>> {
        Vaults::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query vault")
    }

    pub async fn get_by_ids(&self, ids: &[i32]) -> Result<Vec<vaults::Model>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        Vaults::find()
            .filter(vaults::Column::Id.is_in(ids.to_vec()))
            .all(&self.conn)
            .await
            .context("Failed to query vaults by IDs")
    }

    /// Vaults whose owner is `owner_id`. Memberships are not consulted.
    pub async fn list_by_owner(&self, owner_id: i32) -> Result<Vec<vaults::Model>> {
        Vaults::find()
            .filter(vaults::Column::OwnerUserId.eq(owner_id))
            .order_by_asc(vaults::Column::Id)
            .all(&self.conn)
            .await
            .context("Failed to list vaults by owner")
    }

    /// Ids of every vault the user owns or belongs to.
    pub async fn list_accessible_ids(&self, user_id: i32) -> Result<Vec<i32>> {
        let owned: Vec<i32> = Vaults::find()
            .select_only()
            .column(vaults::Column::Id)
            .filter(vaults::Column::OwnerUserId.eq(user_id))
            .into_tuple()
            .all(&self.conn)
            .await
            .context("Failed to list owned vault IDs")?;

        let joined: Vec<i32> = VaultMembers::find()
            .select_only()
            .column(vault_members::Column::VaultId)
            .filter(vault_members::Column::UserId.eq(user_id))
            .into_tuple()
            .all(&self.conn)
            .await
            .context("Failed to list member vault IDs")?;

        let ids: BTreeSet<i32> = owned.into_iter().chain(joined).collect();
        Ok(ids.into_iter().collect())
    }

    pub async fn exists_by_name_and_owner(
        &self,
        name: &str,
        owner_id: i32,
        exclude_id: Option<i32>,
    ) -> Result<bool> {
        let mut query = Vaults::find()
            .filter(vaults::Column::Name.eq(name))
            .filter(vaults::Column::OwnerUserId.eq(owner_id));

        if let Some(id) = exclude_id {
            query = query.filter(vaults::Column::Id.ne(id));
        }

        let count = query
            .count(&self.conn)
            .await
            .context("Failed to check vault name")?;

        Ok(count > 0)
    }

    /// Load the vault with its members and evaluate it for `user`.
    /// Returns `None` both for a missing vault and for one the user cannot see.
    pub async fn find_accessible(&self, vault_id: i32, user: UserId) -> Result<Option<VaultAccess>> {
        let Some(vault) = self.get(vault_id).await? else {
            return Ok(None);
        };

        let members = VaultMembers::find()
            .filter(vault_members::Column::VaultId.eq(vault_id))
            .order_by_asc(vault_members::Column::Id)
            .all(&self.conn)
            .await
            .context("Failed to load vault members")?;

        Ok(VaultAccess::resolve(vault, members, user))
    }

    /// Insert the vault and its OWNER membership in one transaction.
    pub async fn create_with_owner(
        &self,
        name: &str,
        description: Option<&str>,
        owner_id: i32,
    ) -> Result<vaults::Model> {
        let now = chrono::Utc::now().to_rfc3339();
        let txn = self.conn.begin().await?;

        let vault = vaults::ActiveModel {
            name: Set(name.to_string()),
            description: Set(description.map(str::to_string)),
            owner_user_id: Set(owner_id),
            created_at: Set(now.clone()),
            updated_at: Set(now.clone()),
            ..Default::default()
        }
        .insert(&txn)
        .await
        .context("Failed to insert vault")?;

        vault_members::ActiveModel {
            vault_id: Set(vault.id),
            user_id: Set(owner_id),
            role: Set(VaultRole::Owner),
            joined_at: Set(now),
            ..Default::default()
        }
        .insert(&txn)
        .await
        .context("Failed to insert owner membership")?;

        txn.commit().await?;
        Ok(vault)
    }

    pub async fn update(
        &self,
        vault: vaults::Model,
        name: &str,
        description: Option<&str>,
    ) -> Result<vaults::Model> {
        let mut active: vaults::ActiveModel = vault.into();
        active.name = Set(name.to_string());
        active.description = Set(description.map(str::to_string));
        active.updated_at = Set(chrono::Utc::now().to_rfc3339());

        active
            .update(&self.conn)
            .await
            .context("Failed to update vault")
    }

    /// Remove the vault, its members, its items and everything hanging off them.
    pub async fn delete_cascade(&self, vault_id: i32) -> Result<()> {
        let txn = self.conn.begin().await?;

        let item_ids: Vec<i32> = Items::find()
            .select_only()
            .column(items::Column::Id)
            .filter(items::Column::VaultId.eq(vault_id))
            .into_tuple()
            .all(&txn)
            .await?;

        if !item_ids.is_empty() {
            Attachments::delete_many()
                .filter(attachments::Column::ItemId.is_in(item_ids.clone()))
                .exec(&txn)
                .await?;

            ReminderSchedules::delete_many()
                .filter(reminder_schedules::Column::ItemId.is_in(item_ids))
                .exec(&txn)
                .await?;
        }

        Items::delete_many()
            .filter(items::Column::VaultId.eq(vault_id))
            .exec(&txn)
            .await?;

        VaultMembers::delete_many()
            .filter(vault_members::Column::VaultId.eq(vault_id))
            .exec(&txn)
            .await?;

        Vaults::delete_by_id(vault_id).exec(&txn).await?;

        txn.commit().await?;
        Ok(())
    }

    pub async fn item_counts(&self, vault_ids: &[i32]) -> Result<HashMap<i32, u64>> {
        if vault_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows: Vec<(i32, i64)> = Items::find()
            .select_only()
            .column(items::Column::VaultId)
            .column_as(items::Column::Id.count(), "count")
            .filter(items::Column::VaultId.is_in(vault_ids.to_vec()))
            .group_by(items::Column::VaultId)
            .into_tuple()
            .all(&self.conn)
            .await
            .context("Failed to count items per vault")?;

        Ok(rows
            .into_iter()
            .map(|(id, count)| (id, u64::try_from(count).unwrap_or_default()))
            .collect())
    }

    pub async fn member_counts(&self, vault_ids: &[i32]) -> Result<HashMap<i32, u64>> {
        if vault_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows: Vec<(i32, i64)> = VaultMembers::find()
            .select_only()
            .column(vault_members::Column::VaultId)
            .column_as(vault_members::Column::Id.count(), "count")
            .filter(vault_members::Column::VaultId.is_in(vault_ids.to_vec()))
            .group_by(vault_members::Column::VaultId)
            .into_tuple()
            .all(&self.conn)
            .await
            .context("Failed to count members per vault")?;

        Ok(rows
            .into_iter()
            .map(|(id, count)| (id, u64::try_from(count).unwrap_or_default()))
            .collect())
    }
}
