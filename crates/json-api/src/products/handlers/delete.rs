//! Delete Product Handler

use std::sync::Arc;

use salvo::{oapi::extract::PathParam, prelude::*};
use uuid::Uuid;

use crate::{extensions::*, products::errors::into_status_error, state::State};

/// Delete Product Handler
///
/// Soft-deletes the product; it disappears from the catalog and can no longer be added to
/// carts.
#[endpoint(
    tags("admin"),
    summary = "Delete Product",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::NO_CONTENT, description = "Product deleted"),
        (status_code = StatusCode::NOT_FOUND, description = "Product not found"),
        (status_code = StatusCode::BAD_REQUEST, description = "Bad Request"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
#[tracing::instrument(
    name = "products.delete",
    skip(product, depot),
    fields(product_uuid = tracing::field::Empty),
    err
)]
pub(crate) async fn handler(
    product: PathParam<Uuid>,
    depot: &mut Depot,
) -> Result<StatusCode, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let product = product.into_inner();

    tracing::Span::current().record("product_uuid", tracing::field::display(product));

    state
        .app
        .products
        .delete_product(product.into())
        .await
        .map_err(into_status_error)?;

    tracing::info!(product_uuid = %product, "deleted product");

    Ok(StatusCode::NO_CONTENT)
}
