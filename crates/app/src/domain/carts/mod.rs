//! Carts

pub mod data;
pub mod errors;
pub(crate) mod reader;
pub mod records;
pub(crate) mod repositories;
pub mod service;

pub use errors::CartsServiceError;
pub use service::*;
