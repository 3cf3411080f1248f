//! Errors

use salvo::http::StatusError;
use tracing::error;

use scrubline_app::domain::carts::{CartsServiceError, data::MAX_LINE_QUANTITY};

pub(crate) fn into_status_error(error: CartsServiceError) -> StatusError {
    match error {
        CartsServiceError::InvalidQuantity(quantity) => StatusError::bad_request().brief(format!(
            "quantity must be between 1 and {MAX_LINE_QUANTITY}, got {quantity}"
        )),
        CartsServiceError::NotFound => StatusError::not_found().brief("Cart item not found"),
        CartsServiceError::ProductNotFound => StatusError::not_found().brief("Product not found"),
        CartsServiceError::AlreadyExists => StatusError::conflict().brief("Cart already exists"),
        CartsServiceError::InvalidReference
        | CartsServiceError::MissingRequiredData
        | CartsServiceError::InvalidData => {
            StatusError::bad_request().brief("Invalid cart payload")
        }
        CartsServiceError::Pricing(source) => {
            error!("failed to price cart: {source}");

            StatusError::internal_server_error()
        }
        CartsServiceError::Sql(source) => {
            error!("cart storage error: {source}");

            StatusError::internal_server_error()
        }
    }
}
