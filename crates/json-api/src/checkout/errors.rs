//! Checkout Errors

use salvo::http::StatusError;
use tracing::error;

use scrubline_app::domain::checkout::CheckoutServiceError;

pub(crate) fn into_status_error(error: CheckoutServiceError) -> StatusError {
    match error {
        CheckoutServiceError::EmptyCart => StatusError::bad_request().brief("Cart is empty"),
        CheckoutServiceError::StaleCart => StatusError::conflict()
            .brief("Cart has changed since it was last fetched; reload it and try again"),
        CheckoutServiceError::InvalidAddress(field) => {
            StatusError::bad_request().brief(field.to_string())
        }
        CheckoutServiceError::NotFound => StatusError::not_found().brief("Cart not found"),
        CheckoutServiceError::AlreadyExists => {
            StatusError::conflict().brief("Order already exists")
        }
        CheckoutServiceError::InvalidReference
        | CheckoutServiceError::MissingRequiredData
        | CheckoutServiceError::InvalidData => {
            StatusError::bad_request().brief("Invalid checkout payload")
        }
        CheckoutServiceError::Pricing(source) => {
            error!("failed to price cart at checkout: {source}");

            StatusError::internal_server_error()
        }
        CheckoutServiceError::Sql(source) => {
            error!("checkout storage error: {source}");

            StatusError::internal_server_error()
        }
    }
}
