//! HTTP request handlers

pub mod health;
pub mod purchase_request;

pub use health::*;
pub use purchase_request::*;
