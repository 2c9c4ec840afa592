//! Shared types and domain logic for the Fresh Market Stock Tracker
//!
//! This crate contains the models, the stock-quantity reconciliation rules,
//! and the report aggregation engines shared between the backend and other
//! components of the system.

pub mod models;
pub mod reports;
pub mod types;
pub mod validation;

pub use models::*;
pub use types::*;
pub use validation::*;
