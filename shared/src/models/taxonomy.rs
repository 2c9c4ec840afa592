//! Product taxonomy models
//!
//! Three-level naming tree: ProductType -> ProductCategory ->
//! ProductSubCategory. Types and categories are stored rows with names
//! unique within their parent scope; sub-categories are carried
//! denormalized on stock records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Top level of the product taxonomy (e.g. "Vegetables")
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductType {
    pub id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

/// Second level, unique by name within its product type (e.g. "Tomatoes")
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductCategory {
    pub id: Uuid,
    pub product_type_id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
}
