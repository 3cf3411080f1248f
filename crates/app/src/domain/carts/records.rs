//! Cart Records

use jiff::Timestamp;
use scrubline::prelude::{CouponOutcome, CouponRejection};

use crate::{
    domain::{owners::Owner, products::records::ProductUuid},
    pricing::CartTotals,
    uuids::TypedUuid,
};

/// Cart UUID
pub type CartUuid = TypedUuid<CartRecord>;

/// Cart Record
#[derive(Debug, Clone)]
pub struct CartRecord {
    pub uuid: CartUuid,
    pub owner: Owner,
    pub coupon_code: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Cart Item UUID
pub type CartItemUuid = TypedUuid<CartItemRecord>;

/// Cart Item Record, joined with the product's current SKU and name.
#[derive(Debug, Clone)]
pub struct CartItemRecord {
    pub uuid: CartItemUuid,
    pub product_uuid: ProductUuid,
    pub sku: String,
    pub name: String,
    pub quantity: u32,

    /// Price snapshot taken when the product was last added.
    pub unit_price: u64,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl CartItemRecord {
    /// Unit price times quantity, `None` on overflow.
    pub fn line_total(&self) -> Option<u64> {
        self.unit_price.checked_mul(u64::from(self.quantity))
    }
}

/// The coupon attached to a cart and whether it currently discounts it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppliedCoupon {
    pub code: String,
    pub active: bool,

    /// Why an attached coupon is inactive.
    pub rejection: Option<CouponRejection>,
}

impl AppliedCoupon {
    pub(crate) fn from_outcome(code: String, outcome: CouponOutcome) -> Self {
        match outcome {
            CouponOutcome::Applied => Self {
                code,
                active: true,
                rejection: None,
            },
            CouponOutcome::Inactive(rejection) => Self {
                code,
                active: false,
                rejection: Some(rejection),
            },
            CouponOutcome::NoCoupon => Self {
                code,
                active: false,
                rejection: None,
            },
        }
    }
}

/// A cart with its lines and freshly computed totals.
#[derive(Debug, Clone)]
pub struct PricedCart {
    pub cart: CartRecord,
    pub items: Vec<CartItemRecord>,
    pub coupon: Option<AppliedCoupon>,
    pub totals: CartTotals,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(unit_price: u64, quantity: u32) -> CartItemRecord {
        CartItemRecord {
            uuid: CartItemUuid::new(),
            product_uuid: ProductUuid::new(),
            sku: "TOP-NVY-M".to_string(),
            name: "Scrub Top".to_string(),
            quantity,
            unit_price,
            created_at: Timestamp::now(),
            updated_at: Timestamp::now(),
        }
    }

    #[test]
    fn line_total_multiplies_snapshot_price() {
        assert_eq!(item(40_00, 2).line_total(), Some(80_00));
        assert_eq!(item(u64::MAX, 2).line_total(), None);
    }

    #[test]
    fn applied_coupon_reflects_outcome() {
        let active = AppliedCoupon::from_outcome("SAVE20".to_string(), CouponOutcome::Applied);
        let expired = AppliedCoupon::from_outcome(
            "SAVE20".to_string(),
            CouponOutcome::Inactive(CouponRejection::Expired),
        );

        assert!(active.active, "applied coupon is active");
        assert!(!expired.active, "expired coupon is inactive");
        assert_eq!(expired.rejection, Some(CouponRejection::Expired));
    }
}
