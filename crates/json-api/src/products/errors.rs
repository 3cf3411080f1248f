//! Product Errors

use salvo::http::StatusError;
use tracing::error;

use scrubline_app::domain::products::ProductsServiceError;

pub(crate) fn into_status_error(error: ProductsServiceError) -> StatusError {
    match error {
        ProductsServiceError::AlreadyExists => {
            StatusError::conflict().brief("Product already exists")
        }
        ProductsServiceError::MissingDetails => {
            StatusError::bad_request().brief("SKU, name and category are required")
        }
        ProductsServiceError::InvalidPrice(_) => {
            StatusError::bad_request().brief("Price is out of range")
        }
        ProductsServiceError::InvalidReference
        | ProductsServiceError::MissingRequiredData
        | ProductsServiceError::InvalidData => {
            StatusError::bad_request().brief("Invalid product payload")
        }
        ProductsServiceError::NotFound => StatusError::not_found().brief("Product not found"),
        ProductsServiceError::Sql(source) => {
            error!("product storage error: {source}");

            StatusError::internal_server_error()
        }
    }
}
