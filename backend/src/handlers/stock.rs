//! HTTP handlers for stock management endpoints

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppResult;
use crate::models::{ReturnAdjustment, StockItemInput, StockRecord};
use crate::services::stock::{StockFilter, StockService, UpdateStockInput};
use crate::AppState;

/// Response for a committed stock batch
#[derive(Debug, Serialize)]
pub struct StockBatchResponse {
    pub message: String,
    pub stocks: Vec<StockRecord>,
}

/// Request body for a returns adjustment
#[derive(Debug, Deserialize)]
pub struct ReturnsRequest {
    pub returns: Vec<ReturnAdjustment>,
}

/// Response for a returns adjustment; `skipped` lists ids that matched no
/// stored record
#[derive(Debug, Serialize)]
pub struct ReturnsResponse {
    pub success: bool,
    pub skipped: Vec<Uuid>,
}

/// Commit a day+location stock batch, replacing any prior batch for the
/// same key
pub async fn commit_stock_batch(
    State(state): State<AppState>,
    Json(items): Json<Vec<StockItemInput>>,
) -> AppResult<Json<StockBatchResponse>> {
    let service = StockService::new(state.db);
    let stocks = service.commit_batch(items).await?;
    Ok(Json(StockBatchResponse {
        message: format!("{} stock records saved", stocks.len()),
        stocks,
    }))
}

/// Apply return quantities to committed stock records
pub async fn apply_returns(
    State(state): State<AppState>,
    Json(request): Json<ReturnsRequest>,
) -> AppResult<Json<ReturnsResponse>> {
    let service = StockService::new(state.db);
    let skipped = service.apply_returns(request.returns).await?;
    Ok(Json(ReturnsResponse {
        success: true,
        skipped,
    }))
}

/// Update a single stock record
pub async fn update_stock(
    State(state): State<AppState>,
    Path(stock_id): Path<Uuid>,
    Json(input): Json<UpdateStockInput>,
) -> AppResult<Json<StockRecord>> {
    let service = StockService::new(state.db);
    let stock = service.update_stock(stock_id, input).await?;
    Ok(Json(stock))
}

/// Get a stock record by id
pub async fn get_stock(
    State(state): State<AppState>,
    Path(stock_id): Path<Uuid>,
) -> AppResult<Json<StockRecord>> {
    let service = StockService::new(state.db);
    let stock = service.get_stock(stock_id).await?;
    Ok(Json(stock))
}

/// List stock records matching the filter
pub async fn list_stocks(
    State(state): State<AppState>,
    Query(filter): Query<StockFilter>,
) -> AppResult<Json<Vec<StockRecord>>> {
    let service = StockService::new(state.db);
    let stocks = service.list_stocks(&filter).await?;
    Ok(Json(stocks))
}
