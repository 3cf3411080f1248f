//! Get Cart Handler

use std::sync::Arc;

use jiff::Timestamp;
use salvo::prelude::*;

use crate::{
    carts::{errors::into_status_error, models::CartResponse},
    extensions::*,
    state::State,
};

/// Get Cart Handler
///
/// Returns the caller's cart, repriced now. The first read creates an empty cart.
#[endpoint(
    tags("cart"),
    summary = "Get Cart",
    security(("bearer_auth" = []), ("session_id" = [])),
    responses(
        (status_code = StatusCode::OK, description = "Priced cart"),
        (status_code = StatusCode::UNAUTHORIZED, description = "Unauthorized"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
pub(crate) async fn handler(depot: &mut Depot) -> Result<Json<CartResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let owner = depot.owner_or_401()?;

    let cart = state
        .app
        .carts
        .get_cart(owner, Timestamp::now())
        .await
        .map_err(into_status_error)?;

    Ok(Json(cart.into()))
}
