//! Product Index Handler

use std::sync::Arc;

use salvo::{
    oapi::{ToSchema, extract::QueryParam},
    prelude::*,
};
use serde::{Deserialize, Serialize};

use scrubline_app::domain::products::data::{ProductFilter, ProductSort};

use crate::{
    extensions::*,
    products::{errors::into_status_error, get::ProductResponse},
    state::State,
};

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct ProductsResponse {
    /// The list of products
    pub products: Vec<ProductResponse>,
}

/// Product Index Handler
///
/// Lists catalog products, optionally filtered by category, search term and price range.
#[endpoint(
    tags("products"),
    summary = "List Products",
    responses(
        (status_code = StatusCode::OK, description = "Matching products"),
        (status_code = StatusCode::BAD_REQUEST, description = "Bad Request"),
    ),
)]
pub(crate) async fn handler(
    category: QueryParam<String, false>,
    q: QueryParam<String, false>,
    min_price: QueryParam<u64, false>,
    max_price: QueryParam<u64, false>,
    sort: QueryParam<String, false>,
    depot: &mut Depot,
) -> Result<Json<ProductsResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;

    let sort = sort
        .into_inner()
        .map(|value| value.parse::<ProductSort>())
        .transpose()
        .or_400("could not parse \"sort\" query parameter")?
        .unwrap_or_default();

    let filter = ProductFilter {
        category: category.into_inner().filter(|value| !value.is_empty()),
        q: q.into_inner().filter(|value| !value.trim().is_empty()),
        min_price: min_price.into_inner(),
        max_price: max_price.into_inner(),
        sort,
    };

    let products = state
        .app
        .products
        .list_products(filter)
        .await
        .map_err(into_status_error)?;

    Ok(Json(ProductsResponse {
        products: products.into_iter().map(Into::into).collect(),
    }))
}
