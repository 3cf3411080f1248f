//! Coupons service errors.

use scrubline::prelude::{CouponCodeError, CouponRejection};
use sqlx::{
    Error,
    error::{DatabaseError, ErrorKind},
};
use thiserror::Error;

use crate::pricing::StorePricingError;

#[derive(Debug, Error)]
pub enum CouponsServiceError {
    #[error("invalid coupon code")]
    InvalidCode(#[from] CouponCodeError),

    #[error("discount must be 1-10000 basis points or a positive amount")]
    InvalidDiscount,

    #[error("coupon or cart not found")]
    NotFound,

    #[error("coupon is already applied")]
    AlreadyApplied,

    #[error("coupon cannot be applied")]
    Ineligible(#[from] CouponRejection),

    #[error("coupon already exists")]
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

impl From<Error> for CouponsServiceError {
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
