//! Cart response bodies, shared by the cart and coupon routes.

use salvo::oapi::ToSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use scrubline::prelude::CouponRejection;
use scrubline_app::{
    domain::carts::records::{AppliedCoupon, CartItemRecord, PricedCart},
    pricing::CartTotals,
};

/// A cart line with the price it was added at.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct CartItemResponse {
    pub uuid: Uuid,
    pub product_uuid: Uuid,
    pub sku: String,
    pub name: String,
    pub quantity: u32,

    /// Price snapshot in cents
    pub unit_price: u64,

    /// Unit price times quantity, in cents
    pub line_total: u64,
}

impl From<CartItemRecord> for CartItemResponse {
    fn from(item: CartItemRecord) -> Self {
        Self {
            // Pricing fails the whole cart before a line total could overflow.
            line_total: item.line_total().unwrap_or(u64::MAX),
            uuid: item.uuid.into_uuid(),
            product_uuid: item.product_uuid.into_uuid(),
            sku: item.sku,
            name: item.name,
            quantity: item.quantity,
            unit_price: item.unit_price,
        }
    }
}

/// The attached coupon. Inactive coupons stay attached but discount nothing.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct CartCouponResponse {
    pub code: String,
    pub active: bool,

    /// `expired` or `below_minimum` when inactive
    pub reason: Option<String>,

    /// Human readable explanation when inactive
    pub message: Option<String>,
}

pub(crate) fn rejection_reason(rejection: CouponRejection) -> &'static str {
    match rejection {
        CouponRejection::Expired => "expired",
        CouponRejection::BelowMinimum { .. } => "below_minimum",
    }
}

impl From<AppliedCoupon> for CartCouponResponse {
    fn from(coupon: AppliedCoupon) -> Self {
        Self {
            code: coupon.code,
            active: coupon.active,
            reason: coupon
                .rejection
                .map(|rejection| rejection_reason(rejection).to_string()),
            message: coupon.rejection.map(|rejection| rejection.to_string()),
        }
    }
}

/// Totals in cents.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct CartTotalsResponse {
    pub currency: String,
    pub subtotal: u64,
    pub discount: u64,
    pub shipping: u64,
    pub tax: u64,
    pub total: u64,
    pub units: u64,
}

impl From<CartTotals> for CartTotalsResponse {
    fn from(totals: CartTotals) -> Self {
        Self {
            currency: totals.currency.to_string(),
            subtotal: totals.subtotal,
            discount: totals.discount,
            shipping: totals.shipping,
            tax: totals.tax,
            total: totals.total,
            units: totals.units,
        }
    }
}

/// A cart priced at read time.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct CartResponse {
    pub uuid: Uuid,
    pub items: Vec<CartItemResponse>,
    pub coupon: Option<CartCouponResponse>,
    pub totals: CartTotalsResponse,

    /// False for an empty cart
    pub can_checkout: bool,
    pub updated_at: String,
}

impl From<PricedCart> for CartResponse {
    fn from(priced: PricedCart) -> Self {
        Self {
            uuid: priced.cart.uuid.into_uuid(),
            items: priced.items.into_iter().map(Into::into).collect(),
            coupon: priced.coupon.map(Into::into),
            can_checkout: priced.totals.can_checkout(),
            totals: priced.totals.into(),
            updated_at: priced.cart.updated_at.to_string(),
        }
    }
}
