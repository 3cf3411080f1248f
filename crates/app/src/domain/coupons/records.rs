//! Coupon Records

use jiff::Timestamp;

use crate::uuids::TypedUuid;

/// Coupon UUID
pub type CouponUuid = TypedUuid<CouponRecord>;

/// What a coupon takes off the subtotal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiscountKind {
    /// Percentage in basis points (`2000` is 20%).
    Percentage { basis_points: u32 },

    /// Fixed amount in minor units.
    FixedAmount { amount: u64 },
}

impl DiscountKind {
    /// Stored `discount_type` column value.
    #[must_use]
    pub const fn type_str(self) -> &'static str {
        match self {
            Self::Percentage { .. } => "percentage",
            Self::FixedAmount { .. } => "fixed_amount",
        }
    }

    /// Stored `discount_value` column value.
    #[must_use]
    pub fn value(self) -> u64 {
        match self {
            Self::Percentage { basis_points } => u64::from(basis_points),
            Self::FixedAmount { amount } => amount,
        }
    }
}

/// Coupon Record
#[derive(Debug, Clone, PartialEq)]
pub struct CouponRecord {
    pub uuid: CouponUuid,

    /// Normalised (upper case) code.
    pub code: String,
    pub discount: DiscountKind,

    /// Minimum pre-discount subtotal in minor units.
    pub minimum_order: Option<u64>,
    pub expires_at: Option<Timestamp>,
    pub created_at: Timestamp,
}
