//! Business logic services for the Purchase Request Service

pub mod purchase_request;
pub mod spreadsheet;

pub use purchase_request::PurchaseRequestService;
