//! Coupon Data

use jiff::Timestamp;

use crate::domain::coupons::records::{CouponUuid, DiscountKind};

/// Largest percentage discount, in basis points (100%).
pub const MAX_PERCENTAGE_BASIS_POINTS: u32 = 10_000;

/// New Coupon Data
#[derive(Debug, Clone, PartialEq)]
pub struct NewCoupon {
    pub uuid: CouponUuid,

    /// Code as entered; normalised before storage.
    pub code: String,
    pub discount: DiscountKind,
    pub minimum_order: Option<u64>,
    pub expires_at: Option<Timestamp>,
}

/// Whether a discount is within the allowed range.
#[must_use]
pub const fn is_valid_discount(discount: DiscountKind) -> bool {
    match discount {
        DiscountKind::Percentage { basis_points } => {
            basis_points >= 1 && basis_points <= MAX_PERCENTAGE_BASIS_POINTS
        }
        DiscountKind::FixedAmount { amount } => amount > 0,
    }
}
