//! HTTP handlers for product taxonomy endpoints

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::{ProductCategory, ProductType};
use crate::services::taxonomy::TaxonomyService;
use crate::AppState;

/// Request body for creating (or resolving) a product type
#[derive(Debug, Deserialize)]
pub struct CreateTypeRequest {
    pub name: String,
}

/// Request body for creating (or resolving) a category under a type
#[derive(Debug, Deserialize)]
pub struct CreateCategoryRequest {
    pub name: String,
}

/// List all product types
pub async fn list_product_types(
    State(state): State<AppState>,
) -> AppResult<Json<Vec<ProductType>>> {
    let service = TaxonomyService::new(state.db);
    let types = service.list_types().await?;
    Ok(Json(types))
}

/// Create a product type; resolving an existing name is a no-op
pub async fn create_product_type(
    State(state): State<AppState>,
    Json(request): Json<CreateTypeRequest>,
) -> AppResult<Json<ProductType>> {
    let name = request.name.trim();
    if name.is_empty() {
        return Err(AppError::Validation {
            field: "name".to_string(),
            message: "name is required".to_string(),
        });
    }

    let service = TaxonomyService::new(state.db);
    let product_type = service.resolve_or_create_type(name).await?;
    Ok(Json(product_type))
}

/// List categories under a product type
pub async fn list_product_categories(
    State(state): State<AppState>,
    Path(type_id): Path<Uuid>,
) -> AppResult<Json<Vec<ProductCategory>>> {
    let service = TaxonomyService::new(state.db);
    let categories = service.list_categories(type_id).await?;
    Ok(Json(categories))
}

/// Create a category under a product type; resolving an existing name is
/// a no-op
pub async fn create_product_category(
    State(state): State<AppState>,
    Path(type_id): Path<Uuid>,
    Json(request): Json<CreateCategoryRequest>,
) -> AppResult<Json<ProductCategory>> {
    let name = request.name.trim();
    if name.is_empty() {
        return Err(AppError::Validation {
            field: "name".to_string(),
            message: "name is required".to_string(),
        });
    }

    let service = TaxonomyService::new(state.db);
    let category = service.resolve_or_create_category(type_id, name).await?;
    Ok(Json(category))
}
