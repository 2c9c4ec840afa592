//! Domain models for the Fresh Market Stock Tracker
//!
//! Re-exports models from the shared crate

pub use shared::models::*;
