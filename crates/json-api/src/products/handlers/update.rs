//! Update Product Handler

use std::sync::Arc;

use salvo::{
    oapi::{
        ToSchema,
        extract::{JsonBody, PathParam},
    },
    prelude::*,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use scrubline_app::domain::products::data::ProductUpdate;

use crate::{
    extensions::*,
    products::{errors::into_status_error, get::ProductResponse},
    state::State,
};

/// Update Product Request
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct UpdateProductRequest {
    pub name: String,
    pub category: String,

    /// Price in cents
    pub price: u64,
}

impl From<UpdateProductRequest> for ProductUpdate {
    fn from(request: UpdateProductRequest) -> Self {
        ProductUpdate {
            name: request.name,
            category: request.category,
            price: request.price,
        }
    }
}

/// Product Update Handler
///
/// Existing cart lines keep the price they were added at.
#[endpoint(
    tags("admin"),
    summary = "Update Product",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::OK, description = "Product updated"),
        (status_code = StatusCode::NOT_FOUND, description = "Product not found"),
        (status_code = StatusCode::BAD_REQUEST, description = "Bad Request"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
#[tracing::instrument(
    name = "products.update",
    skip(product, json, depot),
    fields(
        product_uuid = tracing::field::Empty,
        price = tracing::field::Empty
    ),
    err
)]
pub(crate) async fn handler(
    product: PathParam<Uuid>,
    json: JsonBody<UpdateProductRequest>,
    depot: &mut Depot,
) -> Result<Json<ProductResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let request = json.into_inner();
    let product = product.into_inner();

    let span = tracing::Span::current();

    span.record("product_uuid", tracing::field::display(product));
    span.record("price", tracing::field::display(request.price));

    let updated = state
        .app
        .products
        .update_product(product.into(), request.into())
        .await
        .map_err(into_status_error)?;

    tracing::info!(product_uuid = %product, price = updated.price, "updated product");

    Ok(Json(updated.into()))
}
