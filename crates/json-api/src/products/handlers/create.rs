//! Create Product Handler

use std::sync::Arc;

use salvo::{
    http::header::LOCATION,
    oapi::{ToSchema, extract::JsonBody},
    prelude::*,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use scrubline_app::domain::products::data::NewProduct;

use crate::{
    extensions::*,
    products::{errors::into_status_error, get::ProductResponse},
    state::State,
};

/// Create Product Request
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct CreateProductRequest {
    pub uuid: Uuid,
    pub sku: String,
    pub name: String,
    pub category: String,

    /// Price in cents
    pub price: u64,
}

impl From<CreateProductRequest> for NewProduct {
    fn from(request: CreateProductRequest) -> Self {
        NewProduct {
            uuid: request.uuid.into(),
            sku: request.sku,
            name: request.name,
            category: request.category,
            price: request.price,
        }
    }
}

/// Create Product Handler
#[endpoint(
    tags("admin"),
    summary = "Create Product",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::CREATED, description = "Product created"),
        (status_code = StatusCode::CONFLICT, description = "Product already exists"),
        (status_code = StatusCode::BAD_REQUEST, description = "Bad Request"),
        (status_code = StatusCode::UNAUTHORIZED, description = "Unauthorized"),
        (status_code = StatusCode::FORBIDDEN, description = "Admin role required"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
#[tracing::instrument(
    name = "products.create",
    skip(json, depot, res),
    fields(product_uuid = tracing::field::Empty, sku = tracing::field::Empty),
    err
)]
pub(crate) async fn handler(
    json: JsonBody<CreateProductRequest>,
    depot: &mut Depot,
    res: &mut Response,
) -> Result<Json<ProductResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let request = json.into_inner();

    let span = tracing::Span::current();

    span.record("product_uuid", tracing::field::display(request.uuid));
    span.record("sku", tracing::field::display(&request.sku));

    let product = state
        .app
        .products
        .create_product(request.into())
        .await
        .map_err(into_status_error)?;

    res.add_header(LOCATION, format!("/api/products/{}", product.uuid), true)
        .or_500("failed to set location header")?
        .status_code(StatusCode::CREATED);

    tracing::info!(product_uuid = %product.uuid, "created product");

    Ok(Json(product.into()))
}
