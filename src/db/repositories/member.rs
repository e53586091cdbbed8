use anyhow::{Context, Result};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set,
};

use crate::entities::vault_members::{self, VaultRole};

pub struct MemberRepository {
    conn: DatabaseConnection,
}

impl MemberRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn find(&self, vault_id: i32, user_id: i32) -> Result<Option<vault_members::Model>> {
        vault_members::Entity::find()
            .filter(vault_members::Column::VaultId.eq(vault_id))
            .filter(vault_members::Column::UserId.eq(user_id))
            .one(&self.conn)
            .await
            .context("Failed to query vault membership")
    }

    pub async fn add(
        &self,
        vault_id: i32,
        user_id: i32,
        role: VaultRole,
    ) -> Result<vault_members::Model> {
        vault_members::ActiveModel {
            vault_id: Set(vault_id),
            user_id: Set(user_id),
            role: Set(role),
            joined_at: Set(chrono::Utc::now().to_rfc3339()),
            ..Default::default()
        }
        .insert(&self.conn)
        .await
        .context("Failed to insert vault membership")
    }

    pub async fn set_role(
        &self,
        member: vault_members::Model,
        role: VaultRole,
    ) -> Result<vault_members::Model> {
        let mut active: vault_members::ActiveModel = member.into();
        active.role = Set(role);
        active
            .update(&self.conn)
            .await
            .context("Failed to update membership role")
    }

    pub async fn remove(&self, member_id: i32) -> Result<()> {
        vault_members::Entity::delete_by_id(member_id)
            .exec(&self.conn)
            .await
            .context("Failed to delete vault membership")?;
        Ok(())
    }
}
