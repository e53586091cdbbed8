//! `SeaORM` implementation of the `CategoryService` trait.

use tracing::{info, warn};

use crate::api::types::CategoryDto;
use crate::db::Store;
use crate::domain::Actor;
use crate::services::category_service::{CategoryError, CategoryRequest, CategoryService};

const DEFAULT_REMINDER_DAYS: i32 = 30;

pub struct SeaOrmCategoryService {
    store: Store,
}

impl SeaOrmCategoryService {
    #[must_use]
    pub const fn new(store: Store) -> Self {
        Self { store }
    }
}

#[async_trait::async_trait]
impl CategoryService for SeaOrmCategoryService {
    async fn list_categories(&self) -> Result<Vec<CategoryDto>, CategoryError> {
        let categories = self.store.category_repo().list().await?;
        Ok(categories.into_iter().map(CategoryDto::from).collect())
    }

    async fn list_categories_with_items(&self) -> Result<Vec<CategoryDto>, CategoryError> {
        let categories = self.store.category_repo().list_in_use().await?;
        Ok(categories.into_iter().map(CategoryDto::from).collect())
    }

    async fn create_category(
        &self,
        request: &CategoryRequest,
        actor: &Actor,
    ) -> Result<CategoryDto, CategoryError> {
        if !actor.is_admin() {
            warn!(user_id = %actor.id, "Category creation denied");
            return Err(CategoryError::InsufficientPermission(
                "Only administrators can create categories".to_string(),
            ));
        }

        let name = request.name.trim();
        let repo = self.store.category_repo();
        if repo.exists_by_name(name).await? {
            return Err(CategoryError::DuplicateName(name.to_string()));
        }

        let category = repo
            .create(
                name,
                request.description.as_deref(),
                request.icon.as_deref(),
                request.reminder_days_default.unwrap_or(DEFAULT_REMINDER_DAYS),
            )
            .await?;

        info!(category_id = category.id, "Category created");
        Ok(CategoryDto::from(category))
    }
}
