//! Stock reconciliation service
//!
//! Owns the two write paths over stock records: the atomic day+location
//! batch replacement and the returns adjustment of already-committed
//! records, plus single-record updates and filtered queries.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::{NormalizedStockItem, ReturnAdjustment, StockItemInput, StockRecord};
use crate::services::taxonomy::TaxonomyService;
use shared::validation::{normalize_stock_item, reconcile_quantities, resolve_temperature_bounds};

/// Stock service for batch commits, adjustments and queries
#[derive(Clone)]
pub struct StockService {
    db: PgPool,
}

/// Database row for a stock record
#[derive(Debug, FromRow)]
struct StockRecordRow {
    id: Uuid,
    entry_date: NaiveDate,
    product_type: String,
    product_category: String,
    product_sub_category: Option<String>,
    total_stock: Decimal,
    sold_qty: Decimal,
    return_qty: Decimal,
    remaining_qty: Decimal,
    unit: String,
    location: String,
    notes: Option<String>,
    weather_condition: Option<String>,
    weather_high_temp: Option<Decimal>,
    weather_low_temp: Option<Decimal>,
    weather_description: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<StockRecordRow> for StockRecord {
    fn from(row: StockRecordRow) -> Self {
        Self {
            id: row.id,
            date: row.entry_date,
            product_type: row.product_type,
            product_category: row.product_category,
            product_sub_category: row.product_sub_category,
            total_stock: row.total_stock,
            sold_qty: row.sold_qty,
            return_qty: row.return_qty,
            remaining_qty: row.remaining_qty,
            unit: row.unit,
            location: row.location,
            notes: row.notes,
            weather_condition: row.weather_condition,
            weather_high_temp: row.weather_high_temp,
            weather_low_temp: row.weather_low_temp,
            weather_description: row.weather_description,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Filter parameters for stock queries
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockFilter {
    pub location: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub product_type: Option<String>,
}

/// Input for updating a single stock record. Omitted fields keep their
/// stored value; `remainingQty` is always re-derived from the merged
/// quantities.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateStockInput {
    pub date: Option<NaiveDate>,
    pub product_type: Option<String>,
    #[serde(alias = "productName")]
    pub product_category: Option<String>,
    pub product_sub_category: Option<String>,
    pub total_stock: Option<Decimal>,
    pub sold_qty: Option<Decimal>,
    pub return_qty: Option<Decimal>,
    pub unit: Option<String>,
    pub location: Option<String>,
    pub notes: Option<String>,
    pub weather_condition: Option<String>,
    pub weather_high_temp: Option<Decimal>,
    pub weather_low_temp: Option<Decimal>,
    pub weather_temperature: Option<Decimal>,
    pub weather_description: Option<String>,
}

const STOCK_COLUMNS: &str = r#"id, entry_date, product_type, product_category, product_sub_category,
           total_stock, sold_qty, return_qty, remaining_qty, unit, location, notes,
           weather_condition, weather_high_temp, weather_low_temp, weather_description,
           created_at, updated_at"#;

impl StockService {
    /// Create a new StockService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Commit an entire day's stock listing for one location as a single
    /// atomic replacement.
    ///
    /// Any prior records for the calendar day and location of the batch's
    /// first item are superseded wholesale, which makes resubmission of
    /// the same day+location idempotent at the record-set level. A
    /// malformed item fails the whole batch with its 1-based index; no
    /// partial commit is observable.
    pub async fn commit_batch(&self, items: Vec<StockItemInput>) -> AppResult<Vec<StockRecord>> {
        if items.is_empty() {
            return Err(AppError::ValidationError(
                "stock batch must contain at least one item".to_string(),
            ));
        }

        let mut normalized: Vec<NormalizedStockItem> = Vec::with_capacity(items.len());
        for (position, item) in items.iter().enumerate() {
            let item = normalize_stock_item(item).map_err(|err| AppError::BatchItem {
                index: position + 1,
                field: err.field().to_string(),
                message: err.to_string(),
            })?;
            normalized.push(item);
        }

        self.resolve_taxonomy(&normalized).await?;

        let batch_date = normalized[0].date;
        let batch_location = normalized[0].location.clone();

        let mut tx = self.db.begin().await?;

        // Serialize concurrent replacements of the same (date, location)
        // key; otherwise one request's insert can be wiped by another's
        // delete. Other keys never contend.
        sqlx::query("SELECT pg_advisory_xact_lock(hashtext($1))")
            .bind(format!("{}|{}", batch_date, batch_location))
            .execute(&mut *tx)
            .await?;

        let deleted = sqlx::query("DELETE FROM stock_records WHERE entry_date = $1 AND location = $2")
            .bind(batch_date)
            .bind(&batch_location)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        let mut builder: QueryBuilder<Postgres> = QueryBuilder::new(
            r#"INSERT INTO stock_records (entry_date, product_type, product_category,
               product_sub_category, total_stock, sold_qty, return_qty, remaining_qty,
               unit, location, notes, weather_condition, weather_high_temp,
               weather_low_temp, weather_description) "#,
        );
        builder.push_values(&normalized, |mut row, item| {
            row.push_bind(item.date)
                .push_bind(&item.product_type)
                .push_bind(&item.product_category)
                .push_bind(&item.product_sub_category)
                .push_bind(item.total_stock)
                .push_bind(item.sold_qty)
                .push_bind(item.return_qty)
                .push_bind(item.remaining_qty)
                .push_bind(&item.unit)
                .push_bind(&item.location)
                .push_bind(&item.notes)
                .push_bind(&item.weather_condition)
                .push_bind(item.weather_high_temp)
                .push_bind(item.weather_low_temp)
                .push_bind(&item.weather_description);
        });
        builder.push(" RETURNING ");
        builder.push(STOCK_COLUMNS);

        let rows: Vec<StockRecordRow> = builder.build_query_as().fetch_all(&mut *tx).await?;

        tx.commit().await?;

        tracing::info!(
            date = %batch_date,
            location = %batch_location,
            replaced = deleted,
            inserted = rows.len(),
            "stock batch committed"
        );

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Resolve or auto-create the taxonomy rows referenced by a batch.
    /// Repeated names within the batch resolve once.
    async fn resolve_taxonomy(&self, items: &[NormalizedStockItem]) -> AppResult<()> {
        let taxonomy = TaxonomyService::new(self.db.clone());
        let mut type_ids: HashMap<String, Uuid> = HashMap::new();
        let mut seen_categories: HashSet<(Uuid, String)> = HashSet::new();

        for item in items {
            let type_id = match type_ids.get(&item.product_type) {
                Some(id) => *id,
                None => {
                    let product_type =
                        taxonomy.resolve_or_create_type(&item.product_type).await?;
                    type_ids.insert(item.product_type.clone(), product_type.id);
                    product_type.id
                }
            };

            let key = (type_id, item.product_category.clone());
            if !seen_categories.contains(&key) {
                taxonomy
                    .resolve_or_create_category(type_id, &item.product_category)
                    .await?;
                seen_categories.insert(key);
            }
        }

        Ok(())
    }

    /// Apply return quantities to already-committed records.
    ///
    /// Best-effort per item: a missing id is skipped and surfaced in the
    /// returned list rather than failing the batch. `finalRemaining` is
    /// stored verbatim, not re-derived from the stored total.
    pub async fn apply_returns(&self, adjustments: Vec<ReturnAdjustment>) -> AppResult<Vec<Uuid>> {
        let mut skipped = Vec::new();

        for adjustment in &adjustments {
            if adjustment.return_qty < Decimal::ZERO {
                return Err(AppError::Validation {
                    field: "returnQty".to_string(),
                    message: "returnQty cannot be negative".to_string(),
                });
            }
            if adjustment.final_remaining < Decimal::ZERO {
                return Err(AppError::Validation {
                    field: "finalRemaining".to_string(),
                    message: "finalRemaining cannot be negative".to_string(),
                });
            }

            let updated = sqlx::query(
                r#"
                UPDATE stock_records
                SET return_qty = $2, remaining_qty = $3, updated_at = NOW()
                WHERE id = $1
                "#,
            )
            .bind(adjustment.id)
            .bind(adjustment.return_qty)
            .bind(adjustment.final_remaining)
            .execute(&self.db)
            .await?
            .rows_affected();

            if updated == 0 {
                tracing::warn!(id = %adjustment.id, "returns adjustment skipped: record not found");
                skipped.push(adjustment.id);
            }
        }

        tracing::info!(
            adjusted = adjustments.len() - skipped.len(),
            skipped = skipped.len(),
            "returns applied"
        );

        Ok(skipped)
    }

    /// Update a single stock record. Quantities are re-reconciled and
    /// `remaining_qty` re-derived from the merged values.
    pub async fn update_stock(
        &self,
        stock_id: Uuid,
        input: UpdateStockInput,
    ) -> AppResult<StockRecord> {
        let existing = self.fetch_row(stock_id).await?;

        let product_type = input.product_type.unwrap_or(existing.product_type);
        let product_category = input.product_category.unwrap_or(existing.product_category);

        let quantities = reconcile_quantities(
            Some(input.total_stock.unwrap_or(existing.total_stock)),
            Some(input.sold_qty.unwrap_or(existing.sold_qty)),
            Some(input.return_qty.unwrap_or(existing.return_qty)),
            None,
        )
        .map_err(|err| AppError::Validation {
            field: err.field().to_string(),
            message: err.to_string(),
        })?;

        let (weather_high_temp, weather_low_temp) = resolve_temperature_bounds(
            input.weather_high_temp.or(existing.weather_high_temp),
            input.weather_low_temp.or(existing.weather_low_temp),
            input.weather_temperature,
        );

        // Keep the taxonomy in step when the product naming changes
        let taxonomy = TaxonomyService::new(self.db.clone());
        let product_type_row = taxonomy.resolve_or_create_type(&product_type).await?;
        taxonomy
            .resolve_or_create_category(product_type_row.id, &product_category)
            .await?;

        let row = sqlx::query_as::<_, StockRecordRow>(&format!(
            r#"
            UPDATE stock_records
            SET entry_date = $2, product_type = $3, product_category = $4,
                product_sub_category = $5, total_stock = $6, sold_qty = $7,
                return_qty = $8, remaining_qty = $9, unit = $10, location = $11,
                notes = $12, weather_condition = $13, weather_high_temp = $14,
                weather_low_temp = $15, weather_description = $16, updated_at = NOW()
            WHERE id = $1
            RETURNING {STOCK_COLUMNS}
            "#
        ))
        .bind(stock_id)
        .bind(input.date.unwrap_or(existing.entry_date))
        .bind(&product_type)
        .bind(&product_category)
        .bind(input.product_sub_category.or(existing.product_sub_category))
        .bind(quantities.total_stock)
        .bind(quantities.sold_qty)
        .bind(quantities.return_qty)
        .bind(quantities.remaining_qty)
        .bind(input.unit.unwrap_or(existing.unit))
        .bind(input.location.unwrap_or(existing.location))
        .bind(input.notes.or(existing.notes))
        .bind(input.weather_condition.or(existing.weather_condition))
        .bind(weather_high_temp)
        .bind(weather_low_temp)
        .bind(input.weather_description.or(existing.weather_description))
        .fetch_one(&self.db)
        .await?;

        Ok(row.into())
    }

    /// Get a stock record by id
    pub async fn get_stock(&self, stock_id: Uuid) -> AppResult<StockRecord> {
        Ok(self.fetch_row(stock_id).await?.into())
    }

    /// List stock records matching a filter, in chronological submission
    /// order
    pub async fn list_stocks(&self, filter: &StockFilter) -> AppResult<Vec<StockRecord>> {
        let rows = sqlx::query_as::<_, StockRecordRow>(&format!(
            r#"
            SELECT {STOCK_COLUMNS}
            FROM stock_records
            WHERE ($1::text IS NULL OR location = $1)
              AND ($2::date IS NULL OR entry_date >= $2)
              AND ($3::date IS NULL OR entry_date <= $3)
              AND ($4::text IS NULL OR product_type = $4)
            ORDER BY entry_date ASC, created_at ASC
            "#
        ))
        .bind(&filter.location)
        .bind(filter.start_date)
        .bind(filter.end_date)
        .bind(&filter.product_type)
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn fetch_row(&self, stock_id: Uuid) -> AppResult<StockRecordRow> {
        sqlx::query_as::<_, StockRecordRow>(&format!(
            "SELECT {STOCK_COLUMNS} FROM stock_records WHERE id = $1"
        ))
        .bind(stock_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Stock record".to_string()))
    }
}
