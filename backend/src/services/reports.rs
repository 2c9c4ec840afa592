//! Report service for stock analytics and data export
//!
//! Fetches a filtered set of stock records and delegates the grouping to
//! the shared rollup engines; nothing computed here is persisted.

use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::PgPool;

use crate::error::{AppError, AppResult};
use crate::models::{DayRollup, LocationRollup, ProductRollup, StockRecord, WeatherImpactReport};
use crate::services::stock::{StockFilter, StockService};
use shared::reports::{
    analyze_weather_impact, rollup_by_day, rollup_by_location, rollup_by_product,
    top_returned_products,
};
use shared::types::GroupBy;

/// Report service
#[derive(Clone)]
pub struct ReportService {
    db: PgPool,
}

/// Grouped stock report, one variant per grouping dimension
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum GroupedReport {
    Day(Vec<DayRollup>),
    Product(Vec<ProductRollup>),
    Location(Vec<LocationRollup>),
}

impl ReportService {
    /// Create a new ReportService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Produce a grouped rollup over the filtered records
    pub async fn grouped(
        &self,
        filter: &StockFilter,
        group_by: GroupBy,
    ) -> AppResult<GroupedReport> {
        let records = self.fetch_records(filter).await?;
        Ok(match group_by {
            GroupBy::Day => GroupedReport::Day(rollup_by_day(&records)),
            GroupBy::Product => GroupedReport::Product(rollup_by_product(&records)),
            GroupBy::Location => GroupedReport::Location(rollup_by_location(&records)),
        })
    }

    /// The highest-returns product report (top 20)
    pub async fn top_returns(&self, filter: &StockFilter) -> AppResult<Vec<ProductRollup>> {
        let records = self.fetch_records(filter).await?;
        Ok(top_returned_products(&records))
    }

    /// Correlate daily sales with the recorded weather over the filter
    /// window. `threshold` is the low-sales fraction of the period
    /// average; defaults to 0.5.
    pub async fn weather_impact(
        &self,
        filter: &StockFilter,
        threshold: Option<Decimal>,
    ) -> AppResult<WeatherImpactReport> {
        let threshold = threshold.unwrap_or_else(|| Decimal::new(5, 1));
        if threshold <= Decimal::ZERO || threshold > Decimal::ONE {
            return Err(AppError::Validation {
                field: "threshold".to_string(),
                message: "threshold must be a fraction in (0, 1]".to_string(),
            });
        }

        let records = self.fetch_records(filter).await?;
        let days = rollup_by_day(&records);
        let report = analyze_weather_impact(&days, threshold);

        if report.days_missing_temperature > 0 {
            tracing::debug!(
                excluded = report.days_missing_temperature,
                "days without temperature bounds excluded from temperature averages"
            );
        }

        Ok(report)
    }

    /// Export the filtered stock register as CSV
    pub async fn export_stocks_csv(&self, filter: &StockFilter) -> AppResult<String> {
        let records = self.fetch_records(filter).await?;
        export_to_csv(&records)
    }

    async fn fetch_records(&self, filter: &StockFilter) -> AppResult<Vec<StockRecord>> {
        StockService::new(self.db.clone()).list_stocks(filter).await
    }
}

/// Serialize report data as CSV
pub fn export_to_csv<T: Serialize>(data: &[T]) -> AppResult<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    for record in data {
        wtr.serialize(record)
            .map_err(|e| AppError::Internal(format!("CSV serialization error: {}", e)))?;
    }
    let csv_data = String::from_utf8(
        wtr.into_inner()
            .map_err(|e| AppError::Internal(format!("CSV writer error: {}", e)))?,
    )
    .map_err(|e| AppError::Internal(format!("UTF-8 conversion error: {}", e)))?;
    Ok(csv_data)
}
