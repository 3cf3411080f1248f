//! Apply Coupon Handler

use std::sync::Arc;

use jiff::Timestamp;
use salvo::{
    oapi::{ToSchema, extract::JsonBody},
    prelude::*,
};
use serde::{Deserialize, Serialize};

use crate::{
    carts::models::CartResponse,
    coupons::errors::{attempt_outcome, into_status_error},
    extensions::*,
    observability::record_coupon_attempt,
    state::State,
};

/// Apply Coupon Request
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct ApplyCouponRequest {
    /// Case-insensitive; surrounding whitespace is ignored
    pub code: String,
}

/// Apply Coupon Handler
///
/// Attaches a coupon to the caller's cart, replacing any other. A rejected code leaves the
/// cart as it was.
#[endpoint(
    tags("coupons"),
    summary = "Apply Coupon",
    security(("bearer_auth" = []), ("session_id" = [])),
    responses(
        (status_code = StatusCode::OK, description = "Repriced cart with the coupon"),
        (status_code = StatusCode::BAD_REQUEST, description = "Malformed coupon code"),
        (status_code = StatusCode::NOT_FOUND, description = "Coupon or cart not found"),
        (status_code = StatusCode::CONFLICT, description = "Coupon is already applied"),
        (status_code = StatusCode::UNPROCESSABLE_ENTITY, description = "Coupon expired or order below minimum"),
        (status_code = StatusCode::UNAUTHORIZED, description = "Unauthorized"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
#[tracing::instrument(
    name = "coupons.apply",
    skip(json, depot),
    fields(code = tracing::field::Empty),
    err
)]
pub(crate) async fn handler(
    json: JsonBody<ApplyCouponRequest>,
    depot: &mut Depot,
) -> Result<Json<CartResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let owner = depot.owner_or_401()?;
    let code = json.into_inner().code;

    tracing::Span::current().record("code", code.trim());

    let applied = state
        .app
        .coupons
        .apply_coupon(owner, &code, Timestamp::now())
        .await;

    record_coupon_attempt(applied.as_ref().map_or_else(attempt_outcome, |_cart| "applied"));

    let cart = applied.map_err(into_status_error)?;

    Ok(Json(cart.into()))
}
