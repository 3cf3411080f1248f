//! Checkout service errors.

use sqlx::{
    Error,
    error::{DatabaseError, ErrorKind},
};
use thiserror::Error;

use crate::{domain::orders::data::MissingAddressField, pricing::StorePricingError};

#[derive(Debug, Error)]
pub enum CheckoutServiceError {
    #[error("cart is empty")]
    EmptyCart,

    #[error("cart has changed since it was last fetched")]
    StaleCart,

    #[error(transparent)]
    InvalidAddress(#[from] MissingAddressField),

    #[error("not found")]
    NotFound,

    #[error("order already exists")]
    AlreadyExists,

    #[error("related resource not found")]
    InvalidReference,

    #[error("missing required data")]
    MissingRequiredData,

    #[error("invalid data")]
    InvalidData,

    #[error("pricing error")]
    Pricing(#[from] StorePricingError),

    #[error("storage error")]
    Sql(#[source] Error),
}

impl From<Error> for CheckoutServiceError {
    fn from(error: Error) -> Self {
        if matches!(error, Error::RowNotFound) {
            return Self::NotFound;
        }

        match error.as_database_error().map(DatabaseError::kind) {
            Some(ErrorKind::UniqueViolation) => Self::AlreadyExists,
            Some(ErrorKind::ForeignKeyViolation) => Self::InvalidReference,
            Some(ErrorKind::NotNullViolation) => Self::MissingRequiredData,
            Some(ErrorKind::CheckViolation) => Self::InvalidData,
            Some(ErrorKind::Other | _) | None => Self::Sql(error),
        }
    }
}
