//! Shared types and calculation logic for the Purchase Request Service
//!
//! This crate has no I/O: the backend parses uploads into an
//! [`InventoryTable`], hands it to the [`PurchaseRequestCalculator`] and renders
//! whatever comes back.

pub mod calculator;
pub mod models;
pub mod table;
pub mod validation;

pub use calculator::*;
pub use models::*;
pub use table::*;
pub use validation::*;
