use anyhow::{Context, Result};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set,
};

use crate::entities::{categories, items, prelude::*};

pub struct CategoryRepository {
    conn: DatabaseConnection,
}

impl CategoryRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn list(&self) -> Result<Vec<categories::Model>> {
        Categories::find()
            .order_by_asc(categories::Column::Name)
            .all(&self.conn)
            .await
            .context("Failed to list categories")
    }

    /// Categories referenced by at least one item.
    pub async fn list_in_use(&self) -> Result<Vec<categories::Model>> {
        let ids: Vec<Option<i32>> = Items::find()
            .select_only()
            .column(items::Column::CategoryId)
            .filter(items::Column::CategoryId.is_not_null())
            .distinct()
            .into_tuple()
            .all(&self.conn)
            .await
            .context("Failed to list category IDs in use")?;

        let ids: Vec<i32> = ids.into_iter().flatten().collect();
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        Categories::find()
            .filter(categories::Column::Id.is_in(ids))
            .order_by_asc(categories::Column::Name)
            .all(&self.conn)
            .await
            .context("Failed to load categories in use")
    }

    pub async fn get(&self, id: i32) -> Result<Option<categories::Model>> {
        Categories::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query category")
    }

    pub async fn get_by_ids(&self, ids: &[i32]) -> Result<Vec<categories::Model>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        Categories::find()
            .filter(categories::Column::Id.is_in(ids.to_vec()))
            .all(&self.conn)
            .await
            .context("Failed to query categories by IDs")
    }

    pub async fn exists_by_name(&self, name: &str) -> Result<bool> {
        let count = Categories::find()
            .filter(categories::Column::Name.eq(name))
            .count(&self.conn)
            .await
            .context("Failed to check category name")?;

        Ok(count > 0)
    }

    pub async fn create(
        &self,
        name: &str,
        description: Option<&str>,
        icon: Option<&str>,
        reminder_days_default: i32,
    ) -> Result<categories::Model> {
        categories::ActiveModel {
            name: Set(name.to_string()),
            description: Set(description.map(str::to_string)),
            icon: Set(icon.map(str::to_string)),
            reminder_days_default: Set(reminder_days_default),
            ..Default::default()
        }
        .insert(&self.conn)
        .await
        .context("Failed to insert category")
    }
}
