use anyhow::{Context, Result};
use chrono::NaiveDate;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};

use crate::domain::expiry::derive_expiry;
use crate::entities::items::{self, ItemStatus};
use crate::entities::{attachments, prelude::*, reminder_schedules};

/// User-editable item columns, shared by create and update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemFields {
    pub title: String,
    pub category_id: Option<i32>,
    pub brand: Option<String>,
    pub model: Option<String>,
    pub serial_number: Option<String>,
    pub purchase_date: NaiveDate,
    pub price_cents: Option<i64>,
    pub warranty_months: Option<i32>,
    pub notes: Option<String>,
}

pub struct ItemRepository {
    conn: DatabaseConnection,
}

impl ItemRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn get(&self, id: i32) -> Result<Option<items::Model>> {
        Items::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query item")
    }

    pub async fn list_by_vault(&self, vault_id: i32) -> Result<Vec<items::Model>> {
        Items::find()
            .filter(items::Column::VaultId.eq(vault_id))
            .order_by_asc(items::Column::Id)
            .all(&self.conn)
            .await
            .context("Failed to list items by vault")
    }

    /// Items of the given vaults that carry an expiry date, soonest first.
    pub async fn list_with_expiry(&self, vault_ids: &[i32]) -> Result<Vec<items::Model>> {
        if vault_ids.is_empty() {
            return Ok(Vec::new());
        }

        Items::find()
            .filter(items::Column::VaultId.is_in(vault_ids.to_vec()))
            .filter(items::Column::ExpiryDate.is_not_null())
            .order_by_asc(items::Column::ExpiryDate)
            .order_by_asc(items::Column::Id)
            .all(&self.conn)
            .await
            .context("Failed to list items with expiry")
    }

    pub async fn create(&self, vault_id: i32, fields: ItemFields) -> Result<items::Model> {
        let now = chrono::Utc::now().to_rfc3339();
        let mut active = items::ActiveModel {
            vault_id: Set(vault_id),
            status: Set(ItemStatus::Active),
            created_at: Set(now),
            ..Default::default()
        };
        apply_fields(&mut active, fields);

        active
            .insert(&self.conn)
            .await
            .context("Failed to insert item")
    }

    pub async fn update(&self, item: items::Model, fields: ItemFields) -> Result<items::Model> {
        let mut active: items::ActiveModel = item.into();
        apply_fields(&mut active, fields);

        active
            .update(&self.conn)
            .await
            .context("Failed to update item")
    }

    pub async fn set_status(&self, item: items::Model, status: ItemStatus) -> Result<items::Model> {
        let mut active: items::ActiveModel = item.into();
        active.status = Set(status);
        active.updated_at = Set(chrono::Utc::now().to_rfc3339());

        active
            .update(&self.conn)
            .await
            .context("Failed to update item status")
    }

    /// Delete the item with its attachments and reminders.
    pub async fn delete_cascade(&self, id: i32) -> Result<()> {
        let txn = self.conn.begin().await?;

        Attachments::delete_many()
            .filter(attachments::Column::ItemId.eq(id))
            .exec(&txn)
            .await?;

        ReminderSchedules::delete_many()
            .filter(reminder_schedules::Column::ItemId.eq(id))
            .exec(&txn)
            .await?;

        Items::delete_by_id(id).exec(&txn).await?;

        txn.commit().await?;
        Ok(())
    }
}

/// Copy editable fields and recompute the derived columns. Every insert and
/// update goes through here, so the stored expiry always matches.
fn apply_fields(active: &mut items::ActiveModel, fields: ItemFields) {
    let expiry = derive_expiry(fields.purchase_date, fields.warranty_months);

    active.title = Set(fields.title);
    active.category_id = Set(fields.category_id);
    active.brand = Set(fields.brand);
    active.model = Set(fields.model);
    active.serial_number = Set(fields.serial_number);
    active.purchase_date = Set(fields.purchase_date);
    active.price_cents = Set(fields.price_cents);
    active.warranty_months = Set(fields.warranty_months);
    active.notes = Set(fields.notes);
    active.expiry_date = Set(expiry);
    active.updated_at = Set(chrono::Utc::now().to_rfc3339());
}
