//! HTTP handlers for report endpoints

use axum::{
    extract::{Query, State},
    http::header,
    response::IntoResponse,
    Json,
};
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::error::AppResult;
use crate::models::{ProductRollup, WeatherImpactReport};
use crate::services::reports::{GroupedReport, ReportService};
use crate::services::stock::StockFilter;
use crate::AppState;
use shared::types::GroupBy;

/// Query parameters for the grouped stock report
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockReportQuery {
    pub group_by: GroupBy,
    pub location: Option<String>,
    pub start_date: Option<chrono::NaiveDate>,
    pub end_date: Option<chrono::NaiveDate>,
    pub product_type: Option<String>,
}

impl StockReportQuery {
    fn filter(&self) -> StockFilter {
        StockFilter {
            location: self.location.clone(),
            start_date: self.start_date,
            end_date: self.end_date,
            product_type: self.product_type.clone(),
        }
    }
}

/// Query parameters for the weather-impact report
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeatherImpactQuery {
    pub location: Option<String>,
    pub start_date: Option<chrono::NaiveDate>,
    pub end_date: Option<chrono::NaiveDate>,
    /// Low-sales fraction of the period average (default 0.5)
    pub threshold: Option<Decimal>,
}

/// Grouped stock report (by day, product, or location)
pub async fn get_stock_report(
    State(state): State<AppState>,
    Query(query): Query<StockReportQuery>,
) -> AppResult<Json<GroupedReport>> {
    let service = ReportService::new(state.db);
    let report = service.grouped(&query.filter(), query.group_by).await?;
    Ok(Json(report))
}

/// Highest-returns product report (top 20)
pub async fn get_top_returns_report(
    State(state): State<AppState>,
    Query(filter): Query<StockFilter>,
) -> AppResult<Json<Vec<ProductRollup>>> {
    let service = ReportService::new(state.db);
    let report = service.top_returns(&filter).await?;
    Ok(Json(report))
}

/// Weather-impact report over the filter window
pub async fn get_weather_impact_report(
    State(state): State<AppState>,
    Query(query): Query<WeatherImpactQuery>,
) -> AppResult<Json<WeatherImpactReport>> {
    let service = ReportService::new(state.db);
    let filter = StockFilter {
        location: query.location.clone(),
        start_date: query.start_date,
        end_date: query.end_date,
        product_type: None,
    };
    let report = service.weather_impact(&filter, query.threshold).await?;
    Ok(Json(report))
}

/// Export the filtered stock register as CSV
pub async fn export_stocks_csv(
    State(state): State<AppState>,
    Query(filter): Query<StockFilter>,
) -> AppResult<impl IntoResponse> {
    let service = ReportService::new(state.db);
    let csv_data = service.export_stocks_csv(&filter).await?;
    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"stocks.csv\"",
            ),
        ],
        csv_data,
    ))
}
