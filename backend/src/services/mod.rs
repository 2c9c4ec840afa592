//! Business logic services for the Fresh Market Stock Tracker

pub mod reports;
pub mod stock;
pub mod taxonomy;

pub use reports::ReportService;
pub use stock::StockService;
pub use taxonomy::TaxonomyService;
