//! Coupon Errors

use salvo::http::StatusError;
use tracing::error;

use scrubline::prelude::CouponRejection;
use scrubline_app::domain::coupons::CouponsServiceError;

/// Metric label for a failed apply attempt.
pub(crate) fn attempt_outcome(error: &CouponsServiceError) -> &'static str {
    match error {
        CouponsServiceError::InvalidCode(_) => "invalid_code",
        CouponsServiceError::NotFound => "not_found",
        CouponsServiceError::AlreadyApplied => "already_applied",
        CouponsServiceError::Ineligible(CouponRejection::Expired) => "expired",
        CouponsServiceError::Ineligible(CouponRejection::BelowMinimum { .. }) => "below_minimum",
        _ => "error",
    }
}

pub(crate) fn into_status_error(error: CouponsServiceError) -> StatusError {
    match error {
        CouponsServiceError::InvalidCode(reason) => {
            StatusError::bad_request().brief(reason.to_string())
        }
        CouponsServiceError::InvalidDiscount => StatusError::bad_request()
            .brief("Discount must be 1-10000 basis points or a positive amount"),
        CouponsServiceError::NotFound => StatusError::not_found().brief("Coupon not found"),
        CouponsServiceError::AlreadyApplied => {
            StatusError::conflict().brief("Coupon is already applied")
        }
        CouponsServiceError::Ineligible(rejection) => {
            StatusError::unprocessable_entity().brief(rejection.to_string())
        }
        CouponsServiceError::AlreadyExists => {
            StatusError::conflict().brief("Coupon already exists")
        }
        CouponsServiceError::InvalidReference
        | CouponsServiceError::MissingRequiredData
        | CouponsServiceError::InvalidData => {
            StatusError::bad_request().brief("Invalid coupon payload")
        }
        CouponsServiceError::Pricing(source) => {
            error!("failed to price cart: {source}");

            StatusError::internal_server_error()
        }
        CouponsServiceError::Sql(source) => {
            error!("coupon storage error: {source}");

            StatusError::internal_server_error()
        }
    }
}
