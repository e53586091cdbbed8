//! Domain service for warranty items, their attachments and reminders.
//!
//! Reads and writes resolve the item's vault for the acting user first. An
//! item in a vault the actor can't see is reported exactly like a missing
//! item.

use chrono::NaiveDate;
use serde::Deserialize;
use thiserror::Error;

use crate::api::types::{
    AttachmentDto, DueReminderDto, ItemDetailDto, ItemSummaryDto, ReminderDto,
};
use crate::domain::{Actor, ItemId, VaultId};
use crate::entities::attachments::AttachmentKind;
use crate::entities::items::ItemStatus;
use crate::entities::reminder_schedules::ReminderChannel;

#[derive(Debug, Error)]
pub enum ItemError {
    #[error("Item not found: {0}")]
    NotFound(ItemId),

    #[error("Vault not found: {0}")]
    VaultNotFound(VaultId),

    #[error("Category not found: {0}")]
    CategoryNotFound(i32),

    #[error("Attachment not found: {0}")]
    AttachmentNotFound(i32),

    #[error("Reminder not found: {0}")]
    ReminderNotFound(i32),

    #[error("Insufficient permission: {0}")]
    InsufficientPermission(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<sea_orm::DbErr> for ItemError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for ItemError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

/// Editable item fields. `vault_id` is only read on creation; items never
/// move between vaults.
#[derive(Debug, Clone, Deserialize)]
pub struct ItemRequest {
    pub title: String,
    #[serde(default)]
    pub vault_id: Option<VaultId>,
    #[serde(default)]
    pub category_id: Option<i32>,
    #[serde(default)]
    pub brand: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub serial_number: Option<String>,
    pub purchase_date: NaiveDate,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub warranty_months: Option<i32>,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StatusRequest {
    pub status: ItemStatus,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AttachmentRequest {
    pub file_url: String,
    pub file_name: String,
    #[serde(default)]
    pub file_size: Option<i64>,
    #[serde(default)]
    pub file_type: Option<String>,
    #[serde(default)]
    pub kind: AttachmentKind,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReminderRequest {
    /// Falls back to the item's category default, then the configured default.
    #[serde(default)]
    pub reminder_days: Option<i32>,
    #[serde(default)]
    pub channel: ReminderChannel,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

const fn default_active() -> bool {
    true
}

#[async_trait::async_trait]
pub trait ItemService: Send + Sync {
    /// All items of a vault as summaries. No access check is made; an unknown
    /// vault yields an empty list.
    async fn list_items_by_vault(&self, vault_id: VaultId)
    -> Result<Vec<ItemSummaryDto>, ItemError>;

    /// # Errors
    ///
    /// Returns [`ItemError::NotFound`] if the item is missing or its vault is
    /// not visible to `actor`.
    async fn get_item(&self, id: ItemId, actor: &Actor) -> Result<ItemDetailDto, ItemError>;

    /// Creates an ACTIVE item. Only the target vault's existence is checked.
    async fn create_item(
        &self,
        request: &ItemRequest,
        actor: &Actor,
    ) -> Result<ItemDetailDto, ItemError>;

    async fn update_item(
        &self,
        id: ItemId,
        request: &ItemRequest,
        actor: &Actor,
    ) -> Result<ItemDetailDto, ItemError>;

    async fn delete_item(&self, id: ItemId, actor: &Actor) -> Result<(), ItemError>;

    /// Items in every vault visible to `actor` that expire within `days`,
    /// soonest first.
    async fn list_expiring_soon(
        &self,
        actor: &Actor,
        days: i64,
    ) -> Result<Vec<ItemSummaryDto>, ItemError>;

    async fn set_item_status(
        &self,
        id: ItemId,
        status: ItemStatus,
        actor: &Actor,
    ) -> Result<ItemDetailDto, ItemError>;

    async fn add_attachment(
        &self,
        id: ItemId,
        request: &AttachmentRequest,
        actor: &Actor,
    ) -> Result<AttachmentDto, ItemError>;

    async fn remove_attachment(
        &self,
        id: ItemId,
        attachment_id: i32,
        actor: &Actor,
    ) -> Result<(), ItemError>;

    async fn add_reminder(
        &self,
        id: ItemId,
        request: &ReminderRequest,
        actor: &Actor,
    ) -> Result<ReminderDto, ItemError>;

    async fn remove_reminder(
        &self,
        id: ItemId,
        reminder_id: i32,
        actor: &Actor,
    ) -> Result<(), ItemError>;

    /// Active reminders whose due date has been reached, across every vault
    /// visible to `actor`.
    async fn list_due_reminders(&self, actor: &Actor) -> Result<Vec<DueReminderDto>, ItemError>;
}
