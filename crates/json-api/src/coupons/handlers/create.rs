//! Create Coupon Handler

use std::sync::Arc;

use jiff::Timestamp;
use salvo::{
    oapi::{ToSchema, extract::JsonBody},
    prelude::*,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use scrubline_app::domain::coupons::{data::NewCoupon, records::DiscountKind};

use crate::{
    coupons::{errors::into_status_error, index::CouponResponse},
    extensions::*,
    state::State,
};

/// What the coupon takes off the subtotal.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ToSchema)]
#[serde(tag = "type", rename_all = "snake_case")]
pub(crate) enum DiscountRequest {
    /// `basis_points` of 2000 is 20% off
    Percentage { basis_points: u32 },

    /// `amount` in cents, capped at the subtotal
    FixedAmount { amount: u64 },
}

impl From<DiscountRequest> for DiscountKind {
    fn from(request: DiscountRequest) -> Self {
        match request {
            DiscountRequest::Percentage { basis_points } => Self::Percentage { basis_points },
            DiscountRequest::FixedAmount { amount } => Self::FixedAmount { amount },
        }
    }
}

/// Create Coupon Request
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct CreateCouponRequest {
    pub uuid: Uuid,
    pub code: String,
    pub discount: DiscountRequest,

    /// Minimum pre-discount subtotal in cents
    pub minimum_order: Option<u64>,

    /// RFC 3339 timestamp after which the coupon no longer applies
    pub expires_at: Option<String>,
}

/// Create Coupon Handler
#[endpoint(
    tags("admin"),
    summary = "Create Coupon",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::CREATED, description = "Coupon created"),
        (status_code = StatusCode::CONFLICT, description = "Coupon already exists"),
        (status_code = StatusCode::BAD_REQUEST, description = "Bad Request"),
        (status_code = StatusCode::UNAUTHORIZED, description = "Unauthorized"),
        (status_code = StatusCode::FORBIDDEN, description = "Admin role required"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
#[tracing::instrument(
    name = "coupons.create",
    skip(json, depot, res),
    fields(coupon_uuid = tracing::field::Empty, code = tracing::field::Empty),
    err
)]
pub(crate) async fn handler(
    json: JsonBody<CreateCouponRequest>,
    depot: &mut Depot,
    res: &mut Response,
) -> Result<Json<CouponResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let request = json.into_inner();

    let span = tracing::Span::current();

    span.record("coupon_uuid", tracing::field::display(request.uuid));
    span.record("code", request.code.as_str());

    let expires_at = request
        .expires_at
        .as_deref()
        .map(str::parse::<Timestamp>)
        .transpose()
        .or_400("could not parse \"expires_at\"")?;

    let coupon = state
        .app
        .coupons
        .create_coupon(NewCoupon {
            uuid: request.uuid.into(),
            code: request.code,
            discount: request.discount.into(),
            minimum_order: request.minimum_order,
            expires_at,
        })
        .await
        .map_err(into_status_error)?;

    res.status_code(StatusCode::CREATED);

    tracing::info!(coupon_uuid = %coupon.uuid, code = %coupon.code, "created coupon");

    Ok(Json(coupon.into()))
}
