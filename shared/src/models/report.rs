//! Report rollup models
//!
//! Rollups are ephemeral: computed from a filtered set of stock records,
//! returned to the caller, never persisted.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Accumulated quantities for one report group. Ratios are computed over
/// the final totals, never incrementally per record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RollupTotals {
    pub count: i64,
    pub total_stock: Decimal,
    pub total_sold: Decimal,
    pub total_returned: Decimal,
    pub total_remaining: Decimal,
    pub sales_percentage: Decimal,
    pub return_rate: Decimal,
}

/// Weather snapshot carried by a day group, taken from that day's records
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DayWeather {
    pub condition: Option<String>,
    pub high_temp: Option<Decimal>,
    pub low_temp: Option<Decimal>,
}

/// Rollup of all records sharing one calendar day
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DayRollup {
    pub date: NaiveDate,
    #[serde(flatten)]
    pub totals: RollupTotals,
    pub locations: Vec<String>,
    pub product_types: Vec<String>,
    pub weather: Option<DayWeather>,
}

/// Rollup of all records sharing one (productType, productCategory) key
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductRollup {
    pub product_type: String,
    pub product_category: String,
    #[serde(flatten)]
    pub totals: RollupTotals,
}

/// Rollup of all records sharing one market location
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationRollup {
    pub location: String,
    #[serde(flatten)]
    pub totals: RollupTotals,
    pub product_types: Vec<String>,
}

/// Severity of a low-sales day relative to the period average
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum LowSalesSeverity {
    Low,
    Critical,
}

/// A day whose sales fell below the caller-chosen fraction of the average
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LowSalesDay {
    pub date: NaiveDate,
    pub total_sold: Decimal,
    pub percent_of_average: Decimal,
    pub severity: LowSalesSeverity,
    pub weather_condition: Option<String>,
}

/// Per-weather-condition sales summary
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConditionSummary {
    pub condition: String,
    pub day_count: i64,
    pub avg_sales: Decimal,
    /// Mean of (high + low) / 2 over the days that recorded both bounds
    pub avg_temp: Option<Decimal>,
    pub days_missing_temperature: i64,
    pub impact_percent: Decimal,
}

/// Weather-impact analysis over a date range and location filter
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeatherImpactReport {
    pub qualifying_days: i64,
    pub overall_avg_sales: Decimal,
    pub threshold: Decimal,
    pub low_sales_days: Vec<LowSalesDay>,
    pub conditions: Vec<ConditionSummary>,
    pub days_missing_temperature: i64,
}
