//! Item, attachment and reminder endpoints.

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;
use std::sync::Arc;

use super::validation::{
    validate_attachment_request, validate_id, validate_item_request, validate_lead_days,
    validate_lookahead_days,
};
use crate::api::types::{
    AttachmentDto, DueReminderDto, ItemDetailDto, ItemSummaryDto, MessageResponse, ReminderDto,
};
use crate::api::{ApiError, ApiResponse, AppState};
use crate::domain::{Actor, ItemId, VaultId};
use crate::services::{
    AttachmentRequest, ItemError, ItemRequest, ReminderRequest, StatusRequest,
};

impl From<ItemError> for ApiError {
    fn from(err: ItemError) -> Self {
        match err {
            ItemError::NotFound(id) => Self::not_found("Item", id),
            ItemError::VaultNotFound(id) => Self::not_found("Vault", id),
            ItemError::CategoryNotFound(id) => Self::not_found("Category", id),
            ItemError::AttachmentNotFound(id) => Self::not_found("Attachment", id),
            ItemError::ReminderNotFound(id) => Self::not_found("Reminder", id),
            ItemError::InsufficientPermission(msg) => Self::forbidden(msg),
            ItemError::Validation(msg) => Self::validation(msg),
            ItemError::Database(msg) => Self::DatabaseError(msg),
            ItemError::Internal(msg) => Self::internal(msg),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ListItemsQuery {
    pub vault_id: i32,
}

#[derive(Debug, Deserialize)]
pub struct ExpiringQuery {
    #[serde(default = "default_expiring_days")]
    pub days: i64,
}

const fn default_expiring_days() -> i64 {
    30
}

/// GET /items?vault_id=
pub async fn list_items(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListItemsQuery>,
) -> Result<Json<ApiResponse<Vec<ItemSummaryDto>>>, ApiError> {
    let vault_id = VaultId::new(validate_id("vault", query.vault_id)?);
    let items = state.item_service().list_items_by_vault(vault_id).await?;
    Ok(Json(ApiResponse::success(items)))
}

/// POST /items
pub async fn create_item(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<Actor>,
    Json(payload): Json<ItemRequest>,
) -> Result<Json<ApiResponse<ItemDetailDto>>, ApiError> {
    validate_item_request(&payload)?;
    let Some(vault_id) = payload.vault_id else {
        return Err(ApiError::validation("Vault ID is required"));
    };
    validate_id("vault", vault_id.value())?;

    let item = state.item_service().create_item(&payload, &actor).await?;
    Ok(Json(ApiResponse::success(item)))
}

/// GET /items/expiring?days=30
pub async fn list_expiring(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<Actor>,
    Query(query): Query<ExpiringQuery>,
) -> Result<Json<ApiResponse<Vec<ItemSummaryDto>>>, ApiError> {
    let days = validate_lookahead_days(query.days)?;
    let items = state
        .item_service()
        .list_expiring_soon(&actor, days)
        .await?;
    Ok(Json(ApiResponse::success(items)))
}

/// GET /items/reminders/due
pub async fn list_due_reminders(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<Actor>,
) -> Result<Json<ApiResponse<Vec<DueReminderDto>>>, ApiError> {
    let reminders = state.item_service().list_due_reminders(&actor).await?;
    Ok(Json(ApiResponse::success(reminders)))
}

/// GET /items/{id}
pub async fn get_item(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<ItemDetailDto>>, ApiError> {
    let id = ItemId::new(validate_id("item", id)?);
    let item = state.item_service().get_item(id, &actor).await?;
    Ok(Json(ApiResponse::success(item)))
}

/// PUT /items/{id}
pub async fn update_item(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<i32>,
    Json(payload): Json<ItemRequest>,
) -> Result<Json<ApiResponse<ItemDetailDto>>, ApiError> {
    let id = ItemId::new(validate_id("item", id)?);
    validate_item_request(&payload)?;
    let item = state
        .item_service()
        .update_item(id, &payload, &actor)
        .await?;
    Ok(Json(ApiResponse::success(item)))
}

/// DELETE /items/{id}
pub async fn delete_item(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    let id = ItemId::new(validate_id("item", id)?);
    state.item_service().delete_item(id, &actor).await?;
    Ok(Json(ApiResponse::success(MessageResponse::new("Item deleted"))))
}

/// PUT /items/{id}/status
pub async fn set_status(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<i32>,
    Json(payload): Json<StatusRequest>,
) -> Result<Json<ApiResponse<ItemDetailDto>>, ApiError> {
    let id = ItemId::new(validate_id("item", id)?);
    let item = state
        .item_service()
        .set_item_status(id, payload.status, &actor)
        .await?;
    Ok(Json(ApiResponse::success(item)))
}

/// POST /items/{id}/attachments
pub async fn add_attachment(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<i32>,
    Json(payload): Json<AttachmentRequest>,
) -> Result<Json<ApiResponse<AttachmentDto>>, ApiError> {
    let id = ItemId::new(validate_id("item", id)?);
    validate_attachment_request(&payload)?;
    let attachment = state
        .item_service()
        .add_attachment(id, &payload, &actor)
        .await?;
    Ok(Json(ApiResponse::success(attachment)))
}

/// DELETE /items/{id}/attachments/{attachment_id}
pub async fn remove_attachment(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<Actor>,
    Path((id, attachment_id)): Path<(i32, i32)>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    let id = ItemId::new(validate_id("item", id)?);
    let attachment_id = validate_id("attachment", attachment_id)?;
    state
        .item_service()
        .remove_attachment(id, attachment_id, &actor)
        .await?;
    Ok(Json(ApiResponse::success(MessageResponse::new(
        "Attachment removed",
    ))))
}

/// POST /items/{id}/reminders
pub async fn add_reminder(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<i32>,
    Json(payload): Json<ReminderRequest>,
) -> Result<Json<ApiResponse<ReminderDto>>, ApiError> {
    let id = ItemId::new(validate_id("item", id)?);
    if let Some(days) = payload.reminder_days {
        validate_lead_days(days)?;
    }
    let reminder = state
        .item_service()
        .add_reminder(id, &payload, &actor)
        .await?;
    Ok(Json(ApiResponse::success(reminder)))
}

/// DELETE /items/{id}/reminders/{reminder_id}
pub async fn remove_reminder(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<Actor>,
    Path((id, reminder_id)): Path<(i32, i32)>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    let id = ItemId::new(validate_id("item", id)?);
    let reminder_id = validate_id("reminder", reminder_id)?;
    state
        .item_service()
        .remove_reminder(id, reminder_id, &actor)
        .await?;
    Ok(Json(ApiResponse::success(MessageResponse::new(
        "Reminder removed",
    ))))
}
