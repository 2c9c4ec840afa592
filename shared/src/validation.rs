//! Stock quantity reconciliation rules
//!
//! Pure validation and derivation for the total/sold/returned/remaining
//! quadruple carried by every stock record, plus the one-time boundary
//! normalization of batch line items.

use rust_decimal::Decimal;
use thiserror::Error;

use crate::models::{NormalizedStockItem, StockItemInput};

/// A validated, fully-derived stock quantity quadruple
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quantities {
    pub total_stock: Decimal,
    pub sold_qty: Decimal,
    pub return_qty: Decimal,
    pub remaining_qty: Decimal,
}

/// Violations of the quantity invariants
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QuantityError {
    #[error("totalStock is required")]
    MissingTotalStock,
    #[error("{0} cannot be negative")]
    Negative(&'static str),
    #[error("soldQty + returnQty exceeds totalStock")]
    Oversold,
}

impl QuantityError {
    /// Wire-level name of the offending field
    pub fn field(&self) -> &'static str {
        match self {
            QuantityError::MissingTotalStock => "totalStock",
            QuantityError::Negative(field) => field,
            QuantityError::Oversold => "soldQty",
        }
    }
}

/// Validate and derive the quantity quadruple for one stock record.
///
/// Invariant: `sold_qty + return_qty <= total_stock`; a violation is an
/// error, never clamped. `return_qty` defaults to zero. An explicitly
/// supplied `sold_qty` is authoritative; when absent it derives as
/// `max(0, total_stock - return_qty)` (the returns-only call shape).
/// An omitted `remaining_qty` derives as
/// `total_stock - sold_qty - return_qty`.
pub fn reconcile_quantities(
    total_stock: Option<Decimal>,
    sold_qty: Option<Decimal>,
    return_qty: Option<Decimal>,
    remaining_qty: Option<Decimal>,
) -> Result<Quantities, QuantityError> {
    let total_stock = total_stock.ok_or(QuantityError::MissingTotalStock)?;
    if total_stock < Decimal::ZERO {
        return Err(QuantityError::Negative("totalStock"));
    }

    let return_qty = return_qty.unwrap_or(Decimal::ZERO);
    if return_qty < Decimal::ZERO {
        return Err(QuantityError::Negative("returnQty"));
    }

    if let Some(sold) = sold_qty {
        if sold < Decimal::ZERO {
            return Err(QuantityError::Negative("soldQty"));
        }
    }
    let sold_qty = sold_qty.unwrap_or_else(|| (total_stock - return_qty).max(Decimal::ZERO));

    if sold_qty + return_qty > total_stock {
        return Err(QuantityError::Oversold);
    }

    let remaining_qty = match remaining_qty {
        Some(remaining) => {
            if remaining < Decimal::ZERO {
                return Err(QuantityError::Negative("remainingQty"));
            }
            remaining
        }
        None => total_stock - sold_qty - return_qty,
    };

    Ok(Quantities {
        total_stock,
        sold_qty,
        return_qty,
        remaining_qty,
    })
}

/// Resolve the high/low temperature bounds of a weather snapshot.
///
/// A missing bound falls back to the legacy combined temperature field,
/// so a lone `weatherTemperature` populates both bounds.
pub fn resolve_temperature_bounds(
    high: Option<Decimal>,
    low: Option<Decimal>,
    combined: Option<Decimal>,
) -> (Option<Decimal>, Option<Decimal>) {
    (high.or(combined), low.or(combined))
}

/// Failures when normalizing one batch line item
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StockItemError {
    #[error("{0} is required")]
    MissingField(&'static str),
    #[error(transparent)]
    Quantity(#[from] QuantityError),
}

impl StockItemError {
    /// Wire-level name of the offending field
    pub fn field(&self) -> &'static str {
        match self {
            StockItemError::MissingField(field) => field,
            StockItemError::Quantity(err) => err.field(),
        }
    }
}

/// Normalize one batch line item: check required fields, reconcile the
/// quantity quadruple, resolve the weather temperature bounds.
pub fn normalize_stock_item(
    item: &StockItemInput,
) -> Result<NormalizedStockItem, StockItemError> {
    let date = item.date.ok_or(StockItemError::MissingField("date"))?;
    let product_type = required_text(&item.product_type, "productType")?;
    let product_category = required_text(&item.product_category, "productCategory")?;
    let unit = required_text(&item.unit, "unit")?;
    let location = required_text(&item.location, "location")?;

    let quantities =
        reconcile_quantities(item.total_stock, item.sold_qty, item.return_qty, None)?;
    let (weather_high_temp, weather_low_temp) = resolve_temperature_bounds(
        item.weather_high_temp,
        item.weather_low_temp,
        item.weather_temperature,
    );

    Ok(NormalizedStockItem {
        date,
        product_type,
        product_category,
        product_sub_category: item.product_sub_category.clone(),
        total_stock: quantities.total_stock,
        sold_qty: quantities.sold_qty,
        return_qty: quantities.return_qty,
        remaining_qty: quantities.remaining_qty,
        unit,
        location,
        notes: item.notes.clone(),
        weather_condition: item.weather_condition.clone(),
        weather_high_temp,
        weather_low_temp,
        weather_description: item.weather_description.clone(),
    })
}

fn required_text(
    value: &Option<String>,
    field: &'static str,
) -> Result<String, StockItemError> {
    match value {
        Some(text) if !text.trim().is_empty() => Ok(text.trim().to_string()),
        _ => Err(StockItemError::MissingField(field)),
    }
}
