//! `SeaORM` implementation of the `ItemService` trait.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::NaiveDate;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::api::types::{
    AttachmentDto, CategoryDto, DueReminderDto, ItemDetailDto, ItemSummaryDto, ReminderDto,
};
use crate::config::Config;
use crate::db::{ItemFields, NewAttachment, Store};
use crate::domain::access::VaultAccess;
use crate::domain::expiry::{Clock, ExpiryFlags, is_expiring_soon, is_reminder_due, reminder_due_date};
use crate::domain::money::{amount_from_cents, cents_from_amount};
use crate::domain::{Actor, ItemId, VaultId};
use crate::entities::items::{self, ItemStatus};
use crate::services::item_service::{
    AttachmentRequest, ItemError, ItemRequest, ItemService, ReminderRequest,
};

const UNKNOWN_VAULT: &str = "Unknown";

pub struct SeaOrmItemService {
    store: Store,
    config: Arc<RwLock<Config>>,
    clock: Arc<dyn Clock>,
}

impl SeaOrmItemService {
    #[must_use]
    pub fn new(store: Store, config: Arc<RwLock<Config>>, clock: Arc<dyn Clock>) -> Self {
        Self {
            store,
            config,
            clock,
        }
    }

    async fn window(&self) -> i64 {
        self.config.read().await.reminders.expiring_soon_days
    }

    /// Load the item and its vault as seen by `actor`.
    async fn resolve(
        &self,
        id: ItemId,
        actor: &Actor,
    ) -> Result<(items::Model, VaultAccess), ItemError> {
        let item = self
            .store
            .item_repo()
            .get(id.value())
            .await?
            .ok_or(ItemError::NotFound(id))?;

        let access = self
            .store
            .vault_repo()
            .find_accessible(item.vault_id, actor.id)
            .await?
            .ok_or_else(|| {
                warn!(item_id = %id, user_id = %actor.id, "Item vault not accessible");
                ItemError::NotFound(id)
            })?;

        Ok((item, access))
    }

    async fn resolve_editable(
        &self,
        id: ItemId,
        actor: &Actor,
    ) -> Result<(items::Model, VaultAccess), ItemError> {
        let (item, access) = self.resolve(id, actor).await?;
        if !access.can_edit() {
            warn!(item_id = %id, user_id = %actor.id, "Item edit denied");
            return Err(ItemError::InsufficientPermission(
                "You don't have permission to edit items in this vault".to_string(),
            ));
        }
        Ok((item, access))
    }

    async fn ensure_category(&self, category_id: Option<i32>) -> Result<(), ItemError> {
        if let Some(category_id) = category_id
            && self.store.category_repo().get(category_id).await?.is_none()
        {
            return Err(ItemError::CategoryNotFound(category_id));
        }
        Ok(())
    }

    /// Summaries with vault and category names resolved in two batch queries.
    async fn summaries(&self, items: Vec<items::Model>) -> Result<Vec<ItemSummaryDto>, ItemError> {
        let mut vault_ids: Vec<i32> = items.iter().map(|i| i.vault_id).collect();
        vault_ids.sort_unstable();
        vault_ids.dedup();
        let mut category_ids: Vec<i32> = items.iter().filter_map(|i| i.category_id).collect();
        category_ids.sort_unstable();
        category_ids.dedup();

        let vault_names: HashMap<i32, String> = self
            .store
            .vault_repo()
            .get_by_ids(&vault_ids)
            .await?
            .into_iter()
            .map(|v| (v.id, v.name))
            .collect();
        let category_names: HashMap<i32, String> = self
            .store
            .category_repo()
            .get_by_ids(&category_ids)
            .await?
            .into_iter()
            .map(|c| (c.id, c.name))
            .collect();

        Ok(summarize(
            items,
            &vault_names,
            &category_names,
            self.clock.today(),
            self.window().await,
        ))
    }

    async fn attachment_dtos(&self, item_id: i32) -> Result<Vec<AttachmentDto>, ItemError> {
        let attachments = self.store.attachment_repo().list_by_item(item_id).await?;

        let mut uploader_ids: Vec<i32> = attachments.iter().map(|a| a.uploaded_by_user_id).collect();
        uploader_ids.sort_unstable();
        uploader_ids.dedup();
        let names: HashMap<i32, String> = self
            .store
            .user_repo()
            .get_by_ids(&uploader_ids)
            .await?
            .into_iter()
            .map(|u| (u.id, u.name))
            .collect();

        Ok(attachments
            .into_iter()
            .map(|a| AttachmentDto {
                uploaded_by_name: names
                    .get(&a.uploaded_by_user_id)
                    .cloned()
                    .unwrap_or_default(),
                id: a.id,
                file_url: a.file_url,
                file_name: a.file_name,
                file_size: a.file_size,
                file_type: a.file_type,
                kind: a.kind,
                uploaded_at: a.uploaded_at,
            })
            .collect())
    }

    async fn detail(&self, item: items::Model, vault_name: String) -> Result<ItemDetailDto, ItemError> {
        let category = match item.category_id {
            Some(id) => self
                .store
                .category_repo()
                .get(id)
                .await?
                .map(CategoryDto::from),
            None => None,
        };

        let attachments = self.attachment_dtos(item.id).await?;
        let reminders = self
            .store
            .reminder_repo()
            .list_by_item(item.id)
            .await?
            .into_iter()
            .map(|r| ReminderDto::from_model(r, item.expiry_date))
            .collect();

        let flags = ExpiryFlags::evaluate(item.expiry_date, self.clock.today(), self.window().await);

        Ok(ItemDetailDto {
            id: item.id,
            title: item.title,
            vault_id: item.vault_id,
            vault_name,
            category,
            brand: item.brand,
            model: item.model,
            serial_number: item.serial_number,
            purchase_date: item.purchase_date,
            price: item.price_cents.map(amount_from_cents),
            warranty_months: item.warranty_months,
            expiry_date: item.expiry_date,
            status: item.status,
            notes: item.notes,
            attachments,
            reminders,
            is_expired: flags.is_expired,
            is_expiring_soon: flags.is_expiring_soon,
            days_until_expiry: flags.days_until_expiry,
            created_at: item.created_at,
            updated_at: item.updated_at,
        })
    }
}

fn fields_from(request: &ItemRequest) -> ItemFields {
    ItemFields {
        title: request.title.trim().to_string(),
        category_id: request.category_id,
        brand: request.brand.clone(),
        model: request.model.clone(),
        serial_number: request.serial_number.clone(),
        purchase_date: request.purchase_date,
        price_cents: request.price.and_then(cents_from_amount),
        warranty_months: request.warranty_months,
        notes: request.notes.clone(),
    }
}

/// Build list rows from pre-resolved names. A vault missing from
/// `vault_names` shows as "Unknown"; a missing category as no category.
fn summarize(
    items: Vec<items::Model>,
    vault_names: &HashMap<i32, String>,
    category_names: &HashMap<i32, String>,
    today: NaiveDate,
    window: i64,
) -> Vec<ItemSummaryDto> {
    items
        .into_iter()
        .map(|item| {
            let flags = ExpiryFlags::evaluate(item.expiry_date, today, window);
            ItemSummaryDto {
                vault_name: vault_names
                    .get(&item.vault_id)
                    .cloned()
                    .unwrap_or_else(|| UNKNOWN_VAULT.to_string()),
                category_name: item
                    .category_id
                    .and_then(|id| category_names.get(&id).cloned()),
                id: item.id,
                title: item.title,
                vault_id: item.vault_id,
                brand: item.brand,
                model: item.model,
                purchase_date: item.purchase_date,
                expiry_date: item.expiry_date,
                status: item.status,
                is_expired: flags.is_expired,
                is_expiring_soon: flags.is_expiring_soon,
                days_until_expiry: flags.days_until_expiry,
            }
        })
        .collect()
}

#[async_trait::async_trait]
impl ItemService for SeaOrmItemService {
    async fn list_items_by_vault(
        &self,
        vault_id: VaultId,
    ) -> Result<Vec<ItemSummaryDto>, ItemError> {
        debug!(vault_id = %vault_id, "Listing items by vault");
        let items = self.store.item_repo().list_by_vault(vault_id.value()).await?;
        self.summaries(items).await
    }

    async fn get_item(&self, id: ItemId, actor: &Actor) -> Result<ItemDetailDto, ItemError> {
        debug!(item_id = %id, user_id = %actor.id, "Fetching item");
        let (item, access) = self.resolve(id, actor).await?;
        self.detail(item, access.vault.name).await
    }

    async fn create_item(
        &self,
        request: &ItemRequest,
        actor: &Actor,
    ) -> Result<ItemDetailDto, ItemError> {
        let vault_id = request
            .vault_id
            .ok_or_else(|| ItemError::Validation("Vault ID is required".to_string()))?;

        let vault = self
            .store
            .vault_repo()
            .get(vault_id.value())
            .await?
            .ok_or(ItemError::VaultNotFound(vault_id))?;
        self.ensure_category(request.category_id).await?;

        let item = self
            .store
            .item_repo()
            .create(vault.id, fields_from(request))
            .await?;

        metrics::counter!("items_created_total").increment(1);
        info!(item_id = item.id, vault_id = vault.id, user_id = %actor.id, "Item created");

        self.detail(item, vault.name).await
    }

    async fn update_item(
        &self,
        id: ItemId,
        request: &ItemRequest,
        actor: &Actor,
    ) -> Result<ItemDetailDto, ItemError> {
        let (item, access) = self.resolve_editable(id, actor).await?;
        self.ensure_category(request.category_id).await?;

        let item = self
            .store
            .item_repo()
            .update(item, fields_from(request))
            .await?;
        info!(item_id = %id, user_id = %actor.id, "Item updated");

        self.detail(item, access.vault.name).await
    }

    async fn delete_item(&self, id: ItemId, actor: &Actor) -> Result<(), ItemError> {
        self.resolve_editable(id, actor).await?;
        self.store.item_repo().delete_cascade(id.value()).await?;
        info!(item_id = %id, user_id = %actor.id, "Item deleted");
        Ok(())
    }

    async fn list_expiring_soon(
        &self,
        actor: &Actor,
        days: i64,
    ) -> Result<Vec<ItemSummaryDto>, ItemError> {
        debug!(user_id = %actor.id, days, "Listing expiring items");
        let vault_ids = self
            .store
            .vault_repo()
            .list_accessible_ids(actor.id.value())
            .await?;

        let today = self.clock.today();
        let items: Vec<items::Model> = self
            .store
            .item_repo()
            .list_with_expiry(&vault_ids)
            .await?
            .into_iter()
            .filter(|i| is_expiring_soon(i.expiry_date, today, days))
            .collect();

        self.summaries(items).await
    }

    async fn set_item_status(
        &self,
        id: ItemId,
        status: ItemStatus,
        actor: &Actor,
    ) -> Result<ItemDetailDto, ItemError> {
        let (item, access) = self.resolve_editable(id, actor).await?;
        let item = self.store.item_repo().set_status(item, status).await?;
        info!(item_id = %id, status = ?status, "Item status changed");
        self.detail(item, access.vault.name).await
    }

    async fn add_attachment(
        &self,
        id: ItemId,
        request: &AttachmentRequest,
        actor: &Actor,
    ) -> Result<AttachmentDto, ItemError> {
        let (item, _) = self.resolve_editable(id, actor).await?;

        let attachment = self
            .store
            .attachment_repo()
            .add(
                item.id,
                NewAttachment {
                    file_url: request.file_url.clone(),
                    file_name: request.file_name.clone(),
                    file_size: request.file_size,
                    file_type: request.file_type.clone(),
                    kind: request.kind,
                },
                actor.id.value(),
            )
            .await?;
        info!(item_id = %id, attachment_id = attachment.id, "Attachment added");

        Ok(AttachmentDto {
            id: attachment.id,
            file_url: attachment.file_url,
            file_name: attachment.file_name,
            file_size: attachment.file_size,
            file_type: attachment.file_type,
            kind: attachment.kind,
            uploaded_at: attachment.uploaded_at,
            uploaded_by_name: actor.name.clone(),
        })
    }

    async fn remove_attachment(
        &self,
        id: ItemId,
        attachment_id: i32,
        actor: &Actor,
    ) -> Result<(), ItemError> {
        let (item, _) = self.resolve_editable(id, actor).await?;
        let repo = self.store.attachment_repo();

        let attachment = repo
            .get_for_item(item.id, attachment_id)
            .await?
            .ok_or(ItemError::AttachmentNotFound(attachment_id))?;
        repo.remove(attachment.id).await?;

        info!(item_id = %id, attachment_id, "Attachment removed");
        Ok(())
    }

    async fn add_reminder(
        &self,
        id: ItemId,
        request: &ReminderRequest,
        actor: &Actor,
    ) -> Result<ReminderDto, ItemError> {
        let (item, _) = self.resolve_editable(id, actor).await?;

        let reminder_days = match request.reminder_days {
            Some(days) => days,
            None => {
                let category = match item.category_id {
                    Some(category_id) => self.store.category_repo().get(category_id).await?,
                    None => None,
                };
                match category {
                    Some(category) => category.reminder_days_default,
                    None => self.config.read().await.reminders.default_lead_days,
                }
            }
        };

        let reminder = self
            .store
            .reminder_repo()
            .add(item.id, reminder_days, request.channel, request.is_active)
            .await?;
        info!(item_id = %id, reminder_id = reminder.id, reminder_days, "Reminder added");

        Ok(ReminderDto::from_model(reminder, item.expiry_date))
    }

    async fn remove_reminder(
        &self,
        id: ItemId,
        reminder_id: i32,
        actor: &Actor,
    ) -> Result<(), ItemError> {
        let (item, _) = self.resolve_editable(id, actor).await?;
        let repo = self.store.reminder_repo();

        let reminder = repo
            .get_for_item(item.id, reminder_id)
            .await?
            .ok_or(ItemError::ReminderNotFound(reminder_id))?;
        repo.remove(reminder.id).await?;

        info!(item_id = %id, reminder_id, "Reminder removed");
        Ok(())
    }

    async fn list_due_reminders(&self, actor: &Actor) -> Result<Vec<DueReminderDto>, ItemError> {
        debug!(user_id = %actor.id, "Listing due reminders");
        let vault_ids = self
            .store
            .vault_repo()
            .list_accessible_ids(actor.id.value())
            .await?;

        let items = self.store.item_repo().list_with_expiry(&vault_ids).await?;
        let item_ids: Vec<i32> = items.iter().map(|i| i.id).collect();
        let items: HashMap<i32, items::Model> = items.into_iter().map(|i| (i.id, i)).collect();

        let reminders = self
            .store
            .reminder_repo()
            .list_active_by_items(&item_ids)
            .await?;

        let today = self.clock.today();
        let mut due: Vec<DueReminderDto> = reminders
            .into_iter()
            .filter_map(|r| {
                let item = items.get(&r.item_id)?;
                if !is_reminder_due(item.expiry_date, r.reminder_days, r.is_active, today) {
                    return None;
                }
                let expiry_date: NaiveDate = item.expiry_date?;
                let due_date = reminder_due_date(expiry_date, r.reminder_days)?;
                Some(DueReminderDto {
                    reminder_id: r.id,
                    item_id: item.id,
                    item_title: item.title.clone(),
                    vault_id: item.vault_id,
                    expiry_date,
                    due_date,
                    reminder_days: r.reminder_days,
                    channel: r.channel,
                })
            })
            .collect();

        due.sort_by_key(|d| (d.due_date, d.reminder_id));
        Ok(due)
    }
}
