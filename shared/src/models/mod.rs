//! Domain models for purchase request generation

mod purchase;

pub use purchase::*;
