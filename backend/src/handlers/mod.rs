//! HTTP handlers for the Fresh Market Stock Tracker

pub mod health;
pub mod reports;
pub mod stock;
pub mod taxonomy;
pub mod weather;

pub use health::*;
pub use reports::*;
pub use stock::*;
pub use taxonomy::*;
pub use weather::*;
