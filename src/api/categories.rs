use axum::{Extension, Json, extract::State};
use std::sync::Arc;

use super::validation::validate_category_request;
use crate::api::types::CategoryDto;
use crate::api::{ApiError, ApiResponse, AppState};
use crate::domain::Actor;
use crate::services::{CategoryError, CategoryRequest};

impl From<CategoryError> for ApiError {
    fn from(err: CategoryError) -> Self {
        match err {
            CategoryError::InsufficientPermission(msg) => Self::forbidden(msg),
            CategoryError::DuplicateName(name) => {
                Self::conflict(format!("Category with name '{name}' already exists"))
            }
            CategoryError::Validation(msg) => Self::validation(msg),
            CategoryError::Database(msg) => Self::DatabaseError(msg),
            CategoryError::Internal(msg) => Self::internal(msg),
        }
    }
}

/// GET /categories
pub async fn list_categories(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<Vec<CategoryDto>>>, ApiError> {
    let categories = state.category_service().list_categories().await?;
    Ok(Json(ApiResponse::success(categories)))
}

/// GET /categories/with-items
pub async fn list_categories_with_items(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<Vec<CategoryDto>>>, ApiError> {
    let categories = state.category_service().list_categories_with_items().await?;
    Ok(Json(ApiResponse::success(categories)))
}

/// POST /categories (ADMIN only)
pub async fn create_category(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<Actor>,
    Json(payload): Json<CategoryRequest>,
) -> Result<Json<ApiResponse<CategoryDto>>, ApiError> {
    validate_category_request(&payload)?;
    let category = state
        .category_service()
        .create_category(&payload, &actor)
        .await?;
    Ok(Json(ApiResponse::success(category)))
}
