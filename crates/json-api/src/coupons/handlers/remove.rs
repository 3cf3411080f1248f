//! Remove Coupon Handler

use std::sync::Arc;

use jiff::Timestamp;
use salvo::prelude::*;

use crate::{
    carts::models::CartResponse, coupons::errors::into_status_error, extensions::*,
    state::State,
};

/// Remove Coupon Handler
///
/// Detaches the coupon from the caller's cart. Succeeds when no coupon is attached.
#[endpoint(
    tags("coupons"),
    summary = "Remove Coupon",
    security(("bearer_auth" = []), ("session_id" = [])),
    responses(
        (status_code = StatusCode::OK, description = "Repriced cart without a coupon"),
        (status_code = StatusCode::UNAUTHORIZED, description = "Unauthorized"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
#[tracing::instrument(name = "coupons.remove", skip(depot), err)]
pub(crate) async fn handler(depot: &mut Depot) -> Result<Json<CartResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let owner = depot.owner_or_401()?;

    let cart = state
        .app
        .coupons
        .remove_coupon(owner, Timestamp::now())
        .await
        .map_err(into_status_error)?;

    Ok(Json(cart.into()))
}
