use anyhow::{Context, Result};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};

use crate::entities::reminder_schedules::{self, ReminderChannel};

pub struct ReminderRepository {
    conn: DatabaseConnection,
}

impl ReminderRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn list_by_item(&self, item_id: i32) -> Result<Vec<reminder_schedules::Model>> {
        reminder_schedules::Entity::find()
            .filter(reminder_schedules::Column::ItemId.eq(item_id))
            .order_by_asc(reminder_schedules::Column::Id)
            .all(&self.conn)
            .await
            .context("Failed to list reminders")
    }

    pub async fn list_active_by_items(
        &self,
        item_ids: &[i32],
    ) -> Result<Vec<reminder_schedules::Model>> {
        if item_ids.is_empty() {
            return Ok(Vec::new());
        }

        reminder_schedules::Entity::find()
            .filter(reminder_schedules::Column::ItemId.is_in(item_ids.to_vec()))
            .filter(reminder_schedules::Column::IsActive.eq(true))
            .order_by_asc(reminder_schedules::Column::Id)
            .all(&self.conn)
            .await
            .context("Failed to list active reminders")
    }

    /// Reminder `id`, only if it belongs to `item_id`.
    pub async fn get_for_item(
        &self,
        item_id: i32,
        id: i32,
    ) -> Result<Option<reminder_schedules::Model>> {
        reminder_schedules::Entity::find_by_id(id)
            .filter(reminder_schedules::Column::ItemId.eq(item_id))
            .one(&self.conn)
            .await
            .context("Failed to query reminder")
    }

    pub async fn add(
        &self,
        item_id: i32,
        reminder_days: i32,
        channel: ReminderChannel,
        is_active: bool,
    ) -> Result<reminder_schedules::Model> {
        reminder_schedules::ActiveModel {
            item_id: Set(item_id),
            reminder_days: Set(reminder_days),
            channel: Set(channel),
            is_active: Set(is_active),
            ..Default::default()
        }
        .insert(&self.conn)
        .await
        .context("Failed to insert reminder")
    }

    pub async fn remove(&self, id: i32) -> Result<()> {
        reminder_schedules::Entity::delete_by_id(id)
            .exec(&self.conn)
            .await
            .context("Failed to delete reminder")?;
        Ok(())
    }
}
