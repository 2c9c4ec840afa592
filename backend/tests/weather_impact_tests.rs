//! Weather-impact analysis tests
//!
//! Covers the low-sales day flagging, the severity split, and the
//! per-condition summaries.

use chrono::{NaiveDate, Utc};
use proptest::prelude::*;
use rust_decimal::Decimal;
use std::str::FromStr;
use uuid::Uuid;

use shared::models::{LowSalesSeverity, StockRecord};
use shared::reports::{analyze_weather_impact, rollup_by_day};

// Helper to create Decimal from string
fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

fn date(day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 3, day).unwrap()
}

fn day_record(day: u32, sold: &str, condition: Option<&str>) -> StockRecord {
    let now = Utc::now();
    StockRecord {
        id: Uuid::new_v4(),
        date: date(day),
        product_type: "Vegetables".to_string(),
        product_category: "Tomatoes".to_string(),
        product_sub_category: None,
        total_stock: dec(sold) + dec("10"),
        sold_qty: dec(sold),
        return_qty: Decimal::ZERO,
        remaining_qty: dec("10"),
        unit: "kg".to_string(),
        location: "Union Square".to_string(),
        notes: None,
        weather_condition: condition.map(|c| c.to_string()),
        weather_high_temp: None,
        weather_low_temp: None,
        weather_description: None,
        created_at: now,
        updated_at: now,
    }
}

fn with_temps(mut record: StockRecord, high: &str, low: &str) -> StockRecord {
    record.weather_high_temp = Some(dec(high));
    record.weather_low_temp = Some(dec(low));
    record
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod unit_tests {
    use super::*;

    /// Daily sales 100, 100, 10 average to 70; at a 50% threshold only the
    /// 10-sales day is flagged
    #[test]
    fn test_only_outlier_day_flagged() {
        let records = vec![
            day_record(1, "100", Some("Sunny")),
            day_record(2, "100", Some("Sunny")),
            day_record(3, "10", Some("Rainy")),
        ];
        let report = analyze_weather_impact(&rollup_by_day(&records), dec("0.5"));

        assert_eq!(report.overall_avg_sales, dec("70"));
        assert_eq!(report.low_sales_days.len(), 1);
        assert_eq!(report.low_sales_days[0].date, date(3));
        assert_eq!(
            report.low_sales_days[0].weather_condition,
            Some("Rainy".to_string())
        );
    }

    /// Ratio below 30% of the average is critical, between 30% and the
    /// threshold is low
    #[test]
    fn test_severity_classification() {
        // Average of 125, 20, 5 is 50
        let records = vec![
            day_record(1, "125", None),
            day_record(2, "20", None),
            day_record(3, "5", None),
        ];
        let report = analyze_weather_impact(&rollup_by_day(&records), dec("0.5"));

        assert_eq!(report.low_sales_days.len(), 2);
        assert_eq!(report.low_sales_days[0].severity, LowSalesSeverity::Low);
        assert_eq!(report.low_sales_days[1].severity, LowSalesSeverity::Critical);
    }

    /// Days without sales are excluded from every average
    #[test]
    fn test_zero_sales_days_excluded() {
        let records = vec![day_record(1, "60", None), day_record(2, "0", None)];
        let report = analyze_weather_impact(&rollup_by_day(&records), dec("0.5"));

        assert_eq!(report.qualifying_days, 1);
        assert_eq!(report.overall_avg_sales, dec("60"));
    }

    /// Missing conditions group under "Unknown", case preserved otherwise
    #[test]
    fn test_condition_grouping() {
        let records = vec![
            day_record(1, "50", Some("Sunny")),
            day_record(2, "50", Some("sunny")),
            day_record(3, "50", None),
        ];
        let report = analyze_weather_impact(&rollup_by_day(&records), dec("0.5"));

        let names: Vec<&str> = report
            .conditions
            .iter()
            .map(|c| c.condition.as_str())
            .collect();
        assert_eq!(names, vec!["Sunny", "sunny", "Unknown"]);
    }

    /// Condition impact is the deviation of its average from the overall
    /// average
    #[test]
    fn test_condition_impact_percent() {
        // Overall average 80; Sunny 100 (+25%), Rainy 40 (-50%)
        let records = vec![
            day_record(1, "120", Some("Sunny")),
            day_record(2, "80", Some("Sunny")),
            day_record(3, "40", Some("Rainy")),
        ];
        let report = analyze_weather_impact(&rollup_by_day(&records), dec("0.5"));

        assert_eq!(report.conditions[0].condition, "Sunny");
        assert_eq!(report.conditions[0].impact_percent, dec("25"));
        assert_eq!(report.conditions[1].impact_percent, dec("-50"));
    }

    /// Average temperature covers only days with both bounds; the rest
    /// are counted, not silently skipped
    #[test]
    fn test_missing_temperatures_counted() {
        let records = vec![
            with_temps(day_record(1, "60", Some("Cloudy")), "25", "15"),
            day_record(2, "40", Some("Cloudy")),
        ];
        let report = analyze_weather_impact(&rollup_by_day(&records), dec("0.5"));

        let cloudy = &report.conditions[0];
        assert_eq!(cloudy.day_count, 2);
        assert_eq!(cloudy.avg_temp, Some(dec("20")));
        assert_eq!(cloudy.days_missing_temperature, 1);
        assert_eq!(report.days_missing_temperature, 1);
    }

    /// An empty window produces an empty report, not an error
    #[test]
    fn test_empty_window() {
        let report = analyze_weather_impact(&[], dec("0.5"));
        assert_eq!(report.qualifying_days, 0);
        assert!(report.low_sales_days.is_empty());
        assert!(report.conditions.is_empty());
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod property_tests {
    use super::*;

    fn sales_strategy() -> impl Strategy<Value = Vec<Decimal>> {
        prop::collection::vec((0i64..=5000i64).prop_map(|n| Decimal::new(n, 1)), 1..20)
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// Flagged days are exactly those below threshold * average
        #[test]
        fn prop_flagging_matches_threshold(sales in sales_strategy()) {
            let records: Vec<StockRecord> = sales
                .iter()
                .enumerate()
                .map(|(i, sold)| {
                    let mut r = day_record(i as u32 % 28 + 1, "0", None);
                    r.total_stock = *sold;
                    r.sold_qty = *sold;
                    r.remaining_qty = Decimal::ZERO;
                    r
                })
                .collect();

            let days = rollup_by_day(&records);
            let threshold = dec("0.5");
            let report = analyze_weather_impact(&days, threshold);

            let qualifying: Vec<&Decimal> =
                sales.iter().filter(|s| **s > Decimal::ZERO).collect();
            prop_assert_eq!(report.qualifying_days as usize, qualifying.len());

            if !qualifying.is_empty() {
                let avg: Decimal = qualifying.iter().copied().sum::<Decimal>()
                    / Decimal::from(qualifying.len());
                let expected_flagged = days
                    .iter()
                    .filter(|d| {
                        d.totals.total_sold > Decimal::ZERO
                            && d.totals.total_sold / avg < threshold
                    })
                    .count();
                prop_assert_eq!(report.low_sales_days.len(), expected_flagged);
            }
        }

        /// Condition day counts sum to the qualifying day count
        #[test]
        fn prop_condition_days_partition_qualifying(sales in sales_strategy()) {
            let conditions = ["Sunny", "Rainy", "Cloudy"];
            let records: Vec<StockRecord> = sales
                .iter()
                .enumerate()
                .map(|(i, sold)| {
                    let mut r = day_record(
                        i as u32 % 28 + 1,
                        "0",
                        Some(conditions[i % conditions.len()]),
                    );
                    r.total_stock = *sold;
                    r.sold_qty = *sold;
                    r.remaining_qty = Decimal::ZERO;
                    r
                })
                .collect();

            let report = analyze_weather_impact(&rollup_by_day(&records), dec("0.5"));
            let condition_days: i64 = report.conditions.iter().map(|c| c.day_count).sum();
            prop_assert_eq!(condition_days, report.qualifying_days);
        }
    }
}
