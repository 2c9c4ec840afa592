//! Route definitions for the Fresh Market Stock Tracker

use axum::{
    routing::{get, put},
    Router,
};

use crate::{handlers, AppState};

/// Create API routes
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        // Stock management
        .nest("/stocks", stock_routes())
        // Product taxonomy
        .nest("/products", taxonomy_routes())
        // Reports
        .nest("/reports", report_routes())
        // Weather lookup
        .nest("/weather", weather_routes())
}

/// Stock batch, returns and record routes
fn stock_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::list_stocks).post(handlers::commit_stock_batch),
        )
        .route("/returns", put(handlers::apply_returns))
        .route(
            "/:stock_id",
            get(handlers::get_stock).put(handlers::update_stock),
        )
}

/// Product taxonomy routes
fn taxonomy_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/types",
            get(handlers::list_product_types).post(handlers::create_product_type),
        )
        .route(
            "/types/:type_id/categories",
            get(handlers::list_product_categories).post(handlers::create_product_category),
        )
}

/// Report routes
fn report_routes() -> Router<AppState> {
    Router::new()
        .route("/stocks", get(handlers::get_stock_report))
        .route("/returns/top", get(handlers::get_top_returns_report))
        .route("/weather-impact", get(handlers::get_weather_impact_report))
        .route("/export", get(handlers::export_stocks_csv))
}

/// Weather lookup routes
fn weather_routes() -> Router<AppState> {
    Router::new().route("/current", get(handlers::fetch_current_weather))
}
