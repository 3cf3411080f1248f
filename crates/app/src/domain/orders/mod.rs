//! Orders

pub mod data;
pub mod errors;
pub mod records;
mod receipt;
pub(crate) mod repositories;
pub mod service;

pub use errors::OrdersServiceError;
pub use service::*;
