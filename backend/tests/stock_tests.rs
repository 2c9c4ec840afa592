//! Stock reconciliation tests
//!
//! Covers the quantity quadruple rules, batch line-item normalization,
//! and the legacy field-name aliases.

use proptest::prelude::*;
use rust_decimal::Decimal;
use std::str::FromStr;

use shared::models::StockItemInput;
use shared::validation::{
    normalize_stock_item, reconcile_quantities, resolve_temperature_bounds, QuantityError,
};

// Helper to create Decimal from string
fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

fn valid_item() -> StockItemInput {
    serde_json::from_str(
        r#"{
            "date": "2024-03-10",
            "productType": "Vegetables",
            "productCategory": "Tomatoes",
            "totalStock": "50",
            "soldQty": "40",
            "returnQty": "5",
            "unit": "kg",
            "location": "Union Square"
        }"#,
    )
    .unwrap()
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod unit_tests {
    use super::*;

    /// Omitted remaining derives from the other three quantities
    #[test]
    fn test_remaining_derivation() {
        let q = reconcile_quantities(
            Some(dec("100")),
            Some(dec("60")),
            Some(dec("10")),
            None,
        )
        .unwrap();
        assert_eq!(q.remaining_qty, dec("30"));
    }

    /// Omitted sold derives from returns, clamped at zero
    #[test]
    fn test_sold_derivation_fallback() {
        let q = reconcile_quantities(Some(dec("50")), None, Some(dec("5")), None).unwrap();
        assert_eq!(q.sold_qty, dec("45"));

        let q = reconcile_quantities(Some(dec("50")), None, None, None).unwrap();
        assert_eq!(q.sold_qty, dec("50"));
        assert_eq!(q.remaining_qty, Decimal::ZERO);
    }

    /// Selling and returning more than was stocked is rejected, not clamped
    #[test]
    fn test_oversold_batch_rejected() {
        let err = reconcile_quantities(
            Some(dec("100")),
            Some(dec("95")),
            Some(dec("10")),
            None,
        )
        .unwrap_err();
        assert_eq!(err, QuantityError::Oversold);

        let err = reconcile_quantities(Some(dec("10")), None, Some(dec("15")), None).unwrap_err();
        assert_eq!(err, QuantityError::Oversold);
    }

    /// Half-unit quantities are regular decimals
    #[test]
    fn test_fractional_quantities() {
        let q = reconcile_quantities(
            Some(dec("12.5")),
            Some(dec("10")),
            Some(dec("0.5")),
            None,
        )
        .unwrap();
        assert_eq!(q.remaining_qty, dec("2"));
    }

    /// A lone combined temperature populates both bounds
    #[test]
    fn test_weather_temperature_fallback() {
        let (high, low) = resolve_temperature_bounds(None, None, Some(dec("20")));
        assert_eq!(high, Some(dec("20")));
        assert_eq!(low, Some(dec("20")));
    }

    /// The batch scenario: two Union Square items derive remainings 5 and 0
    #[test]
    fn test_union_square_batch_derivation() {
        let first = reconcile_quantities(
            Some(dec("50")),
            Some(dec("40")),
            Some(dec("5")),
            None,
        )
        .unwrap();
        assert_eq!(first.remaining_qty, dec("5"));

        let second =
            reconcile_quantities(Some(dec("20")), Some(dec("20")), Some(dec("0")), None).unwrap();
        assert_eq!(second.remaining_qty, dec("0"));
    }

    /// `productName` is accepted as an alias of `productCategory`
    #[test]
    fn test_product_name_alias() {
        let item: StockItemInput = serde_json::from_str(
            r#"{
                "date": "2024-03-10",
                "productType": "Vegetables",
                "productName": "Tomatoes",
                "totalStock": "50",
                "unit": "kg",
                "location": "Union Square"
            }"#,
        )
        .unwrap();
        let normalized = normalize_stock_item(&item).unwrap();
        assert_eq!(normalized.product_category, "Tomatoes");
    }

    /// Normalization reports the offending field by wire name
    #[test]
    fn test_missing_field_reports_field_name() {
        let mut item = valid_item();
        item.unit = None;
        let err = normalize_stock_item(&item).unwrap_err();
        assert_eq!(err.field(), "unit");

        let mut item = valid_item();
        item.total_stock = None;
        let err = normalize_stock_item(&item).unwrap_err();
        assert_eq!(err.field(), "totalStock");
    }

    /// A batch fails on the first offending item, reported 1-based
    #[test]
    fn test_batch_fails_with_first_offending_index() {
        let mut bad = valid_item();
        bad.location = None;
        let items = vec![valid_item(), bad, valid_item()];

        let first_error = items
            .iter()
            .enumerate()
            .find_map(|(position, item)| {
                normalize_stock_item(item)
                    .err()
                    .map(|err| (position + 1, err))
            });

        let (index, err) = first_error.unwrap();
        assert_eq!(index, 2);
        assert_eq!(err.field(), "location");
    }

    /// Weather snapshot fields pass through normalization untouched when
    /// both bounds are explicit
    #[test]
    fn test_explicit_bounds_win_over_combined() {
        let item: StockItemInput = serde_json::from_str(
            r#"{
                "date": "2024-03-10",
                "productType": "Vegetables",
                "productCategory": "Tomatoes",
                "totalStock": "50",
                "unit": "kg",
                "location": "Union Square",
                "weatherHighTemp": "28",
                "weatherLowTemp": "17",
                "weatherTemperature": "22"
            }"#,
        )
        .unwrap();
        let normalized = normalize_stock_item(&item).unwrap();
        assert_eq!(normalized.weather_high_temp, Some(dec("28")));
        assert_eq!(normalized.weather_low_temp, Some(dec("17")));
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod property_tests {
    use super::*;

    /// Strategy for generating non-negative quantities with one decimal place
    fn quantity_strategy() -> impl Strategy<Value = Decimal> {
        (0i64..=10000i64).prop_map(|n| Decimal::new(n, 1)) // 0.0 to 1000.0
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// Committed quantities always satisfy sold + returned <= total
        #[test]
        fn prop_invariant_holds_for_accepted_inputs(
            total in quantity_strategy(),
            sold in quantity_strategy(),
            returned in quantity_strategy()
        ) {
            match reconcile_quantities(Some(total), Some(sold), Some(returned), None) {
                Ok(q) => {
                    prop_assert!(q.sold_qty + q.return_qty <= q.total_stock);
                    prop_assert!(q.remaining_qty >= Decimal::ZERO);
                    prop_assert_eq!(
                        q.remaining_qty,
                        q.total_stock - q.sold_qty - q.return_qty
                    );
                }
                Err(err) => {
                    // The only rejection for non-negative inputs is the invariant
                    prop_assert_eq!(err, QuantityError::Oversold);
                    prop_assert!(sold + returned > total);
                }
            }
        }

        /// Oversold inputs are always rejected
        #[test]
        fn prop_oversold_always_rejected(
            total in quantity_strategy(),
            extra in (1i64..=1000i64).prop_map(|n| Decimal::new(n, 1))
        ) {
            let sold = total + extra;
            let result = reconcile_quantities(Some(total), Some(sold), None, None);
            prop_assert_eq!(result.unwrap_err(), QuantityError::Oversold);
        }

        /// Derived sold equals total minus returns whenever returns fit
        #[test]
        fn prop_sold_fallback_complements_returns(
            total in quantity_strategy(),
            returned in quantity_strategy()
        ) {
            if returned <= total {
                let q = reconcile_quantities(Some(total), None, Some(returned), None).unwrap();
                prop_assert_eq!(q.sold_qty, total - returned);
                prop_assert_eq!(q.remaining_qty, Decimal::ZERO);
            }
        }

        /// Reconciliation is deterministic
        #[test]
        fn prop_reconciliation_idempotent(
            total in quantity_strategy(),
            returned in quantity_strategy()
        ) {
            let first = reconcile_quantities(Some(total), None, Some(returned), None);
            let second = reconcile_quantities(Some(total), None, Some(returned), None);
            prop_assert_eq!(first, second);
        }

        /// Temperature fallback never invents a bound
        #[test]
        fn prop_temperature_fallback_bounds(
            high in proptest::option::of(quantity_strategy()),
            low in proptest::option::of(quantity_strategy()),
            combined in proptest::option::of(quantity_strategy())
        ) {
            let (resolved_high, resolved_low) = resolve_temperature_bounds(high, low, combined);
            prop_assert_eq!(resolved_high, high.or(combined));
            prop_assert_eq!(resolved_low, low.or(combined));
        }
    }
}
