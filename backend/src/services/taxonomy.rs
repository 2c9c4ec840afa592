//! Product taxonomy service for resolve-or-create name lookups
//!
//! Names are unique within their parent scope. Creation is idempotent:
//! losing the unique-name race to a concurrent request means the name
//! already exists, so the winner is re-fetched instead of erroring.

use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::error::AppResult;
use crate::models::{ProductCategory, ProductType};

/// Taxonomy service for product type and category rows
#[derive(Clone)]
pub struct TaxonomyService {
    db: PgPool,
}

/// Database row for a product type
#[derive(Debug, FromRow)]
struct ProductTypeRow {
    id: Uuid,
    name: String,
    created_at: DateTime<Utc>,
}

impl From<ProductTypeRow> for ProductType {
    fn from(row: ProductTypeRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            created_at: row.created_at,
        }
    }
}

/// Database row for a product category
#[derive(Debug, FromRow)]
struct ProductCategoryRow {
    id: Uuid,
    product_type_id: Uuid,
    name: String,
    created_at: DateTime<Utc>,
}

impl From<ProductCategoryRow> for ProductCategory {
    fn from(row: ProductCategoryRow) -> Self {
        Self {
            id: row.id,
            product_type_id: row.product_type_id,
            name: row.name,
            created_at: row.created_at,
        }
    }
}

impl TaxonomyService {
    /// Create a new TaxonomyService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Resolve a product type by name, creating it if absent
    pub async fn resolve_or_create_type(&self, name: &str) -> AppResult<ProductType> {
        if let Some(row) = sqlx::query_as::<_, ProductTypeRow>(
            "SELECT id, name, created_at FROM product_types WHERE name = $1",
        )
        .bind(name)
        .fetch_optional(&self.db)
        .await?
        {
            return Ok(row.into());
        }

        match sqlx::query_as::<_, ProductTypeRow>(
            "INSERT INTO product_types (name) VALUES ($1) RETURNING id, name, created_at",
        )
        .bind(name)
        .fetch_one(&self.db)
        .await
        {
            Ok(row) => Ok(row.into()),
            // Lost the create race: the name exists now, re-fetch the winner
            Err(err) if is_unique_violation(&err) => {
                let row = sqlx::query_as::<_, ProductTypeRow>(
                    "SELECT id, name, created_at FROM product_types WHERE name = $1",
                )
                .bind(name)
                .fetch_one(&self.db)
                .await?;
                Ok(row.into())
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Resolve a category by name within a product type, creating it if absent
    pub async fn resolve_or_create_category(
        &self,
        product_type_id: Uuid,
        name: &str,
    ) -> AppResult<ProductCategory> {
        if let Some(row) = sqlx::query_as::<_, ProductCategoryRow>(
            r#"
            SELECT id, product_type_id, name, created_at
            FROM product_categories
            WHERE product_type_id = $1 AND name = $2
            "#,
        )
        .bind(product_type_id)
        .bind(name)
        .fetch_optional(&self.db)
        .await?
        {
            return Ok(row.into());
        }

        match sqlx::query_as::<_, ProductCategoryRow>(
            r#"
            INSERT INTO product_categories (product_type_id, name)
            VALUES ($1, $2)
            RETURNING id, product_type_id, name, created_at
            "#,
        )
        .bind(product_type_id)
        .bind(name)
        .fetch_one(&self.db)
        .await
        {
            Ok(row) => Ok(row.into()),
            Err(err) if is_unique_violation(&err) => {
                let row = sqlx::query_as::<_, ProductCategoryRow>(
                    r#"
                    SELECT id, product_type_id, name, created_at
                    FROM product_categories
                    WHERE product_type_id = $1 AND name = $2
                    "#,
                )
                .bind(product_type_id)
                .bind(name)
                .fetch_one(&self.db)
                .await?;
                Ok(row.into())
            }
            Err(err) => Err(err.into()),
        }
    }

    /// List all product types
    pub async fn list_types(&self) -> AppResult<Vec<ProductType>> {
        let rows = sqlx::query_as::<_, ProductTypeRow>(
            "SELECT id, name, created_at FROM product_types ORDER BY name ASC",
        )
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// List categories under a product type
    pub async fn list_categories(&self, product_type_id: Uuid) -> AppResult<Vec<ProductCategory>> {
        let rows = sqlx::query_as::<_, ProductCategoryRow>(
            r#"
            SELECT id, product_type_id, name, created_at
            FROM product_categories
            WHERE product_type_id = $1
            ORDER BY name ASC
            "#,
        )
        .bind(product_type_id)
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.code().as_deref() == Some("23505"))
}
