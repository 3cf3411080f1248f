//! Checkout

pub mod data;
pub mod errors;
pub mod records;
pub mod service;

pub use errors::CheckoutServiceError;
pub use service::*;
