use anyhow::{Context, Result};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};

use crate::entities::attachments::{self, AttachmentKind};

#[derive(Debug, Clone)]
pub struct NewAttachment {
    pub file_url: String,
    pub file_name: String,
    pub file_size: Option<i64>,
    pub file_type: Option<String>,
    pub kind: AttachmentKind,
}

pub struct AttachmentRepository {
    conn: DatabaseConnection,
}

impl AttachmentRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn list_by_item(&self, item_id: i32) -> Result<Vec<attachments::Model>> {
        attachments::Entity::find()
            .filter(attachments::Column::ItemId.eq(item_id))
            .order_by_asc(attachments::Column::Id)
            .all(&self.conn)
            .await
            .context("Failed to list attachments")
    }

    /// Attachment `id`, only if it belongs to `item_id`.
    pub async fn get_for_item(&self, item_id: i32, id: i32) -> Result<Option<attachments::Model>> {
        attachments::Entity::find_by_id(id)
            .filter(attachments::Column::ItemId.eq(item_id))
            .one(&self.conn)
            .await
            .context("Failed to query attachment")
    }

    pub async fn add(
        &self,
        item_id: i32,
        attachment: NewAttachment,
        uploaded_by: i32,
    ) -> Result<attachments::Model> {
        attachments::ActiveModel {
            item_id: Set(item_id),
            file_url: Set(attachment.file_url),
            file_name: Set(attachment.file_name),
            file_size: Set(attachment.file_size),
            file_type: Set(attachment.file_type),
            kind: Set(attachment.kind),
            uploaded_at: Set(chrono::Utc::now().to_rfc3339()),
            uploaded_by_user_id: Set(uploaded_by),
            ..Default::default()
        }
        .insert(&self.conn)
        .await
        .context("Failed to insert attachment")
    }

    pub async fn remove(&self, id: i32) -> Result<()> {
        attachments::Entity::delete_by_id(id)
            .exec(&self.conn)
            .await
            .context("Failed to delete attachment")?;
        Ok(())
    }
}
