//! Report aggregation engines
//!
//! Grouping/rollup logic turning a filtered set of stock records into
//! time-series, per-product, per-location, and weather-correlated
//! summaries. Everything here is pure: records in, rollups out, nothing
//! persisted.

use std::collections::HashMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::models::{
    ConditionSummary, DayRollup, DayWeather, LocationRollup, LowSalesDay, LowSalesSeverity,
    ProductRollup, RollupTotals, StockRecord, WeatherImpactReport,
};

/// The "highest returns" product report is truncated to this many entries
pub const TOP_RETURNS_LIMIT: usize = 20;

/// Ratio-to-average below which a low-sales day is classified critical
const CRITICAL_RATIO: Decimal = Decimal::from_parts(3, 0, 0, false, 1);

const HUNDRED: Decimal = Decimal::from_parts(100, 0, 0, false, 0);

/// Running accumulation for one group. Ratios are derived in `finalize`
/// over the final sums, never per record.
#[derive(Debug, Default)]
struct Accumulator {
    count: i64,
    total_stock: Decimal,
    total_sold: Decimal,
    total_returned: Decimal,
    total_remaining: Decimal,
}

impl Accumulator {
    fn add(&mut self, record: &StockRecord) {
        self.count += 1;
        self.total_stock += record.total_stock;
        self.total_sold += record.sold_qty;
        self.total_returned += record.return_qty;
        self.total_remaining += record.remaining_qty;
    }

    fn finalize(self) -> RollupTotals {
        let (sales_percentage, return_rate) = if self.total_stock > Decimal::ZERO {
            (
                (self.total_sold / self.total_stock * HUNDRED).round_dp(2),
                (self.total_returned / self.total_stock * HUNDRED).round_dp(2),
            )
        } else {
            (Decimal::ZERO, Decimal::ZERO)
        };

        RollupTotals {
            count: self.count,
            total_stock: self.total_stock,
            total_sold: self.total_sold,
            total_returned: self.total_returned,
            total_remaining: self.total_remaining,
            sales_percentage,
            return_rate,
        }
    }
}

fn push_distinct(values: &mut Vec<String>, value: &str) {
    if !values.iter().any(|v| v == value) {
        values.push(value.to_string());
    }
}

struct DayGroup {
    date: NaiveDate,
    acc: Accumulator,
    locations: Vec<String>,
    product_types: Vec<String>,
    condition: Option<String>,
    temps: Option<(Decimal, Decimal)>,
}

/// Group records by calendar day, in first-seen order.
///
/// Each day group carries the weather snapshot of its records: the first
/// non-empty condition and the first record holding both temperature
/// bounds.
pub fn rollup_by_day(records: &[StockRecord]) -> Vec<DayRollup> {
    let mut order: Vec<NaiveDate> = Vec::new();
    let mut groups: HashMap<NaiveDate, DayGroup> = HashMap::new();

    for record in records {
        let group = groups.entry(record.date).or_insert_with(|| {
            order.push(record.date);
            DayGroup {
                date: record.date,
                acc: Accumulator::default(),
                locations: Vec::new(),
                product_types: Vec::new(),
                condition: None,
                temps: None,
            }
        });

        group.acc.add(record);
        push_distinct(&mut group.locations, &record.location);
        push_distinct(&mut group.product_types, &record.product_type);
        if group.condition.is_none() {
            group.condition = record.weather_condition.clone();
        }
        if group.temps.is_none() {
            if let (Some(high), Some(low)) =
                (record.weather_high_temp, record.weather_low_temp)
            {
                group.temps = Some((high, low));
            }
        }
    }

    order
        .into_iter()
        .map(|date| {
            let group = groups.remove(&date).expect("grouped date");
            let has_weather = group.condition.is_some() || group.temps.is_some();
            DayRollup {
                date: group.date,
                totals: group.acc.finalize(),
                locations: group.locations,
                product_types: group.product_types,
                weather: has_weather.then(|| DayWeather {
                    condition: group.condition,
                    high_temp: group.temps.map(|(high, _)| high),
                    low_temp: group.temps.map(|(_, low)| low),
                }),
            }
        })
        .collect()
}

/// Group records by (productType, productCategory), ordered by total sold
/// descending; ties keep first-seen order.
pub fn rollup_by_product(records: &[StockRecord]) -> Vec<ProductRollup> {
    let mut rollups = accumulate_by_product(records);
    rollups.sort_by(|a, b| b.totals.total_sold.cmp(&a.totals.total_sold));
    rollups
}

/// Group records by market location, in first-seen order
pub fn rollup_by_location(records: &[StockRecord]) -> Vec<LocationRollup> {
    let mut order: Vec<String> = Vec::new();
    let mut groups: HashMap<String, (Accumulator, Vec<String>)> = HashMap::new();

    for record in records {
        let group = groups.entry(record.location.clone()).or_insert_with(|| {
            order.push(record.location.clone());
            (Accumulator::default(), Vec::new())
        });
        group.0.add(record);
        push_distinct(&mut group.1, &record.product_type);
    }

    order
        .into_iter()
        .map(|location| {
            let (acc, product_types) = groups.remove(&location).expect("grouped location");
            LocationRollup {
                location,
                totals: acc.finalize(),
                product_types,
            }
        })
        .collect()
}

/// Products with returns, ordered by total returned descending, truncated
/// to the top 20; ties keep first-seen order.
pub fn top_returned_products(records: &[StockRecord]) -> Vec<ProductRollup> {
    let mut rollups: Vec<ProductRollup> = accumulate_by_product(records)
        .into_iter()
        .filter(|rollup| rollup.totals.total_returned > Decimal::ZERO)
        .collect();
    rollups.sort_by(|a, b| b.totals.total_returned.cmp(&a.totals.total_returned));
    rollups.truncate(TOP_RETURNS_LIMIT);
    rollups
}

fn accumulate_by_product(records: &[StockRecord]) -> Vec<ProductRollup> {
    let mut order: Vec<(String, String)> = Vec::new();
    let mut groups: HashMap<(String, String), Accumulator> = HashMap::new();

    for record in records {
        let key = (record.product_type.clone(), record.product_category.clone());
        let acc = groups.entry(key.clone()).or_insert_with(|| {
            order.push(key);
            Accumulator::default()
        });
        acc.add(record);
    }

    order
        .into_iter()
        .map(|key| {
            let acc = groups.remove(&key).expect("grouped product");
            ProductRollup {
                product_type: key.0,
                product_category: key.1,
                totals: acc.finalize(),
            }
        })
        .collect()
}

struct ConditionGroup {
    condition: String,
    day_count: i64,
    total_sold: Decimal,
    temp_sum: Decimal,
    days_with_temp: i64,
}

/// Correlate daily sales against the weather snapshot carried by each day.
///
/// Operates on day rollups; days without sales are excluded from every
/// average. `threshold` is the low-sales fraction of the period average
/// (0.5 flags days below 50%). Days lacking both temperature bounds are
/// excluded from `avg_temp` and counted, per condition and overall.
pub fn analyze_weather_impact(days: &[DayRollup], threshold: Decimal) -> WeatherImpactReport {
    let qualifying: Vec<&DayRollup> = days
        .iter()
        .filter(|day| day.totals.total_sold > Decimal::ZERO)
        .collect();

    if qualifying.is_empty() {
        return WeatherImpactReport {
            qualifying_days: 0,
            overall_avg_sales: Decimal::ZERO,
            threshold,
            low_sales_days: Vec::new(),
            conditions: Vec::new(),
            days_missing_temperature: 0,
        };
    }

    let total_sold: Decimal = qualifying.iter().map(|day| day.totals.total_sold).sum();
    let day_count = Decimal::from(qualifying.len());
    let overall_avg = total_sold / day_count;

    let mut low_sales_days = Vec::new();
    let mut order: Vec<String> = Vec::new();
    let mut groups: HashMap<String, ConditionGroup> = HashMap::new();
    let mut days_missing_temperature = 0i64;

    for day in &qualifying {
        let condition = day
            .weather
            .as_ref()
            .and_then(|weather| weather.condition.clone())
            .unwrap_or_else(|| "Unknown".to_string());

        let ratio = day.totals.total_sold / overall_avg;
        if ratio < threshold {
            low_sales_days.push(LowSalesDay {
                date: day.date,
                total_sold: day.totals.total_sold,
                percent_of_average: (ratio * HUNDRED).round_dp(2),
                severity: if ratio < CRITICAL_RATIO {
                    LowSalesSeverity::Critical
                } else {
                    LowSalesSeverity::Low
                },
                weather_condition: Some(condition.clone()),
            });
        }

        let temps = day.weather.as_ref().and_then(|weather| {
            match (weather.high_temp, weather.low_temp) {
                (Some(high), Some(low)) => Some((high, low)),
                _ => None,
            }
        });

        let group = groups.entry(condition.clone()).or_insert_with(|| {
            order.push(condition.clone());
            ConditionGroup {
                condition,
                day_count: 0,
                total_sold: Decimal::ZERO,
                temp_sum: Decimal::ZERO,
                days_with_temp: 0,
            }
        });
        group.day_count += 1;
        group.total_sold += day.totals.total_sold;
        match temps {
            Some((high, low)) => {
                group.temp_sum += (high + low) / Decimal::from(2);
                group.days_with_temp += 1;
            }
            None => days_missing_temperature += 1,
        }
    }

    let conditions = order
        .into_iter()
        .map(|condition| {
            let group = groups.remove(&condition).expect("grouped condition");
            let avg_sales = group.total_sold / Decimal::from(group.day_count);
            let avg_temp = (group.days_with_temp > 0)
                .then(|| (group.temp_sum / Decimal::from(group.days_with_temp)).round_dp(2));
            let impact_percent =
                ((avg_sales - overall_avg) / overall_avg * HUNDRED).round_dp(2);
            ConditionSummary {
                condition: group.condition,
                day_count: group.day_count,
                avg_sales: avg_sales.round_dp(2),
                avg_temp,
                days_missing_temperature: group.day_count - group.days_with_temp,
                impact_percent,
            }
        })
        .collect();

    WeatherImpactReport {
        qualifying_days: qualifying.len() as i64,
        overall_avg_sales: overall_avg.round_dp(2),
        threshold,
        low_sales_days,
        conditions,
        days_missing_temperature,
    }
}
