use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::db::User;
use crate::entities::attachments::AttachmentKind;
use crate::entities::items::ItemStatus;
use crate::entities::reminder_schedules::ReminderChannel;
use crate::entities::users::UserRole;
use crate::entities::vault_members::VaultRole;
use crate::entities::{categories, reminder_schedules};

#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub const fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

// ============================================================================
// Users
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct UserSummaryDto {
    pub id: i32,
    pub name: String,
    pub email: String,
}

impl From<&User> for UserSummaryDto {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct UserInfoDto {
    pub id: i32,
    pub email: String,
    pub name: String,
    pub role: UserRole,
    pub email_verified: bool,
    pub created_at: String,
    pub updated_at: String,
}

impl From<User> for UserInfoDto {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            name: user.name,
            role: user.role,
            email_verified: user.email_verified,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginResultDto {
    pub user: UserInfoDto,
    pub api_key: String,
}

#[derive(Debug, Serialize)]
pub struct ApiKeyResponse {
    pub api_key: String,
}

// ============================================================================
// Vaults
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct VaultSummaryDto {
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
    pub owner_id: i32,
    pub item_count: u64,
    pub member_count: u64,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct MemberDto {
    pub id: i32,
    pub user: UserSummaryDto,
    pub role: VaultRole,
    pub joined_at: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct VaultDetailDto {
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
    pub owner: UserSummaryDto,
    pub members: Vec<MemberDto>,
    pub item_count: u64,
    pub expiring_soon_count: u64,
    pub created_at: String,
    pub updated_at: String,
}

// ============================================================================
// Categories
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct CategoryDto {
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
    pub icon: Option<String>,
    pub reminder_days_default: i32,
}

impl From<categories::Model> for CategoryDto {
    fn from(model: categories::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            description: model.description,
            icon: model.icon,
            reminder_days_default: model.reminder_days_default,
        }
    }
}

// ============================================================================
// Items
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct ItemSummaryDto {
    pub id: i32,
    pub title: String,
    pub vault_id: i32,
    pub vault_name: String,
    pub category_name: Option<String>,
    pub brand: Option<String>,
    pub model: Option<String>,
    pub purchase_date: NaiveDate,
    pub expiry_date: Option<NaiveDate>,
    pub status: ItemStatus,
    pub is_expired: bool,
    pub is_expiring_soon: bool,
    pub days_until_expiry: Option<i64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AttachmentDto {
    pub id: i32,
    pub file_url: String,
    pub file_name: String,
    pub file_size: Option<i64>,
    pub file_type: Option<String>,
    pub kind: AttachmentKind,
    pub uploaded_at: String,
    pub uploaded_by_name: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReminderDto {
    pub id: i32,
    pub reminder_days: i32,
    pub channel: ReminderChannel,
    pub is_active: bool,
    /// Expiry minus lead time; absent when the item has no expiry.
    pub due_date: Option<NaiveDate>,
}

impl ReminderDto {
    #[must_use]
    pub fn from_model(model: reminder_schedules::Model, expiry: Option<NaiveDate>) -> Self {
        let due_date =
            expiry.and_then(|e| crate::domain::expiry::reminder_due_date(e, model.reminder_days));
        Self {
            id: model.id,
            reminder_days: model.reminder_days,
            channel: model.channel,
            is_active: model.is_active,
            due_date,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ItemDetailDto {
    pub id: i32,
    pub title: String,
    pub vault_id: i32,
    pub vault_name: String,
    pub category: Option<CategoryDto>,
    pub brand: Option<String>,
    pub model: Option<String>,
    pub serial_number: Option<String>,
    pub purchase_date: NaiveDate,
    pub price: Option<f64>,
    pub warranty_months: Option<i32>,
    pub expiry_date: Option<NaiveDate>,
    pub status: ItemStatus,
    pub notes: Option<String>,
    pub attachments: Vec<AttachmentDto>,
    pub reminders: Vec<ReminderDto>,
    pub is_expired: bool,
    pub is_expiring_soon: bool,
    pub days_until_expiry: Option<i64>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct DueReminderDto {
    pub reminder_id: i32,
    pub item_id: i32,
    pub item_title: String,
    pub vault_id: i32,
    pub expiry_date: NaiveDate,
    pub due_date: NaiveDate,
    pub reminder_days: i32,
    pub channel: ReminderChannel,
}

