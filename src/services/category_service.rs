//! Domain service for item categories.

use serde::Deserialize;
use thiserror::Error;

use crate::api::types::CategoryDto;
use crate::domain::Actor;

#[derive(Debug, Error)]
pub enum CategoryError {
    #[error("Insufficient permission: {0}")]
    InsufficientPermission(String),

    #[error("A category named '{0}' already exists")]
    DuplicateName(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<sea_orm::DbErr> for CategoryError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for CategoryError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CategoryRequest {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default)]
    pub reminder_days_default: Option<i32>,
}

#[async_trait::async_trait]
pub trait CategoryService: Send + Sync {
    /// All categories ordered by name.
    async fn list_categories(&self) -> Result<Vec<CategoryDto>, CategoryError>;

    /// Categories used by at least one item.
    async fn list_categories_with_items(&self) -> Result<Vec<CategoryDto>, CategoryError>;

    /// # Errors
    ///
    /// Returns [`CategoryError::InsufficientPermission`] unless `actor` is an ADMIN.
    async fn create_category(
        &self,
        request: &CategoryRequest,
        actor: &Actor,
    ) -> Result<CategoryDto, CategoryError>;
}
