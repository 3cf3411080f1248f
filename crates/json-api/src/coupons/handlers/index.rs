//! Coupon Index Handler

use std::{string::ToString, sync::Arc};

use salvo::{oapi::ToSchema, prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use scrubline_app::domain::coupons::records::CouponRecord;

use crate::{coupons::errors::into_status_error, extensions::*, state::State};

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct CouponResponse {
    pub uuid: Uuid,
    pub code: String,

    /// `percentage` or `fixed_amount`
    pub discount_type: String,

    /// Basis points for percentages, cents for fixed amounts
    pub discount_value: u64,

    pub minimum_order: Option<u64>,
    pub expires_at: Option<String>,
    pub created_at: String,
}

impl From<CouponRecord> for CouponResponse {
    fn from(coupon: CouponRecord) -> Self {
        Self {
            uuid: coupon.uuid.into_uuid(),
            code: coupon.code,
            discount_type: coupon.discount.type_str().to_string(),
            discount_value: coupon.discount.value(),
            minimum_order: coupon.minimum_order,
            expires_at: coupon.expires_at.as_ref().map(ToString::to_string),
            created_at: coupon.created_at.to_string(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct CouponsResponse {
    pub coupons: Vec<CouponResponse>,
}

/// Coupon Index Handler
///
/// Lists every coupon, newest first.
#[endpoint(
    tags("admin"),
    summary = "List Coupons",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::OK, description = "All coupons"),
        (status_code = StatusCode::UNAUTHORIZED, description = "Unauthorized"),
        (status_code = StatusCode::FORBIDDEN, description = "Admin role required"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
pub(crate) async fn handler(depot: &mut Depot) -> Result<Json<CouponsResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;

    let coupons = state
        .app
        .coupons
        .list_coupons()
        .await
        .map_err(into_status_error)?;

    Ok(Json(CouponsResponse {
        coupons: coupons.into_iter().map(Into::into).collect(),
    }))
}
