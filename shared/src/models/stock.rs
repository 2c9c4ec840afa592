//! Stock record models

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One product's inventory for one date at one market location
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockRecord {
    pub id: Uuid,
    pub date: NaiveDate,
    pub product_type: String,
    pub product_category: String,
    pub product_sub_category: Option<String>,
    pub total_stock: Decimal,
    pub sold_qty: Decimal,
    pub return_qty: Decimal,
    pub remaining_qty: Decimal,
    pub unit: String,
    pub location: String,
    pub notes: Option<String>,
    pub weather_condition: Option<String>,
    pub weather_high_temp: Option<Decimal>,
    pub weather_low_temp: Option<Decimal>,
    pub weather_description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One line item of a stock batch as submitted by the client.
///
/// All fields are optional at the wire level so that a missing required
/// field can be reported with the 1-based item index instead of failing
/// the whole request body deserialization. Historical field-name variants
/// (`productName`, the combined `weatherTemperature`) are mapped onto
/// canonical names here, once, and nowhere else.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockItemInput {
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

/// A batch line item after normalization: required fields present, quantity
/// quadruple validated and derived, weather bounds resolved
#[derive(Debug, Clone)]
pub struct NormalizedStockItem {
    pub date: NaiveDate,
    pub product_type: String,
    pub product_category: String,
    pub product_sub_category: Option<String>,
    pub total_stock: Decimal,
    pub sold_qty: Decimal,
    pub return_qty: Decimal,
    pub remaining_qty: Decimal,
    pub unit: String,
    pub location: String,
    pub notes: Option<String>,
    pub weather_condition: Option<String>,
    pub weather_high_temp: Option<Decimal>,
    pub weather_low_temp: Option<Decimal>,
    pub weather_description: Option<String>,
}

/// One entry of a returns adjustment request. `finalRemaining` is
/// caller-computed and stored verbatim.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReturnAdjustment {
    pub id: Uuid,
    pub return_qty: Decimal,
    pub final_remaining: Decimal,
}
