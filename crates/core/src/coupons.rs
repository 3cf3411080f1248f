//! Coupons
//!
//! Coupon codes are normalised to upper case before lookup, so `summer20` and `SUMMER20`
//! refer to the same coupon. Eligibility is evaluated against a subtotal at a point in time:
//! a coupon attached to a cart may become inactive later (it expires, or items are removed
//! and the subtotal drops below its minimum) without being detached.

use std::fmt;

use jiff::Timestamp;
use rusty_money::{Money, iso::Currency};
use thiserror::Error;

use crate::discounts::Discount;

/// Shortest accepted coupon code.
pub const MIN_CODE_LEN: usize = 3;

/// Longest accepted coupon code.
pub const MAX_CODE_LEN: usize = 32;

/// Malformed coupon code.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CouponCodeError {
    /// Blank after trimming.
    #[error("coupon code is required")]
    Empty,

    /// Too short or too long (length after trimming).
    #[error("coupon code must be between {MIN_CODE_LEN} and {MAX_CODE_LEN} characters, got {0}")]
    Length(usize),

    /// Contains a character outside `A-Z`, `0-9`, `-` and `_`.
    #[error("coupon code contains invalid character {0:?}")]
    InvalidCharacter(char),
}

/// Normalised coupon code.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CouponCode(String);

impl CouponCode {
    /// Trim, upper-case and validate a customer supplied code.
    ///
    /// # Errors
    ///
    /// Returns a [`CouponCodeError`] when the code is blank, has the wrong length or contains
    /// characters other than letters, digits, `-` and `_`.
    pub fn parse(raw: &str) -> Result<Self, CouponCodeError> {
        let code = raw.trim().to_ascii_uppercase();

        if code.is_empty() {
            return Err(CouponCodeError::Empty);
        }

        let len = code.chars().count();

        if !(MIN_CODE_LEN..=MAX_CODE_LEN).contains(&len) {
            return Err(CouponCodeError::Length(len));
        }

        if let Some(invalid) = code
            .chars()
            .find(|c| !(c.is_ascii_uppercase() || c.is_ascii_digit() || *c == '-' || *c == '_'))
        {
            return Err(CouponCodeError::InvalidCharacter(invalid));
        }

        Ok(Self(code))
    }

    /// Normalised code.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume into the normalised string.
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for CouponCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Why a coupon does not currently apply.
#[derive(Debug, Copy, Clone, Error, PartialEq, Eq)]
pub enum CouponRejection {
    /// The coupon's expiry is at or before now.
    #[error("coupon has expired")]
    Expired,

    /// The cart subtotal is below the coupon's minimum order amount.
    #[error("order subtotal is below the coupon minimum of {minimum_minor} (minor units)")]
    BelowMinimum {
        /// Required subtotal in minor units.
        minimum_minor: i64,
    },
}

/// Result of evaluating the coupon attached to a cart.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum CouponOutcome {
    /// No coupon attached.
    NoCoupon,

    /// Coupon attached and discounting the cart.
    Applied,

    /// Coupon attached but contributing no discount.
    Inactive(CouponRejection),
}

impl CouponOutcome {
    /// Whether the attached coupon is currently discounting the cart.
    pub fn is_active(&self) -> bool {
        matches!(self, CouponOutcome::Applied)
    }
}

/// Discount and eligibility terms of a coupon.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct CouponTerms<'a> {
    discount: Discount<'a>,
    minimum_order: Option<Money<'a, Currency>>,
    expires_at: Option<Timestamp>,
}

impl<'a> CouponTerms<'a> {
    /// Create coupon terms.
    pub fn new(
        discount: Discount<'a>,
        minimum_order: Option<Money<'a, Currency>>,
        expires_at: Option<Timestamp>,
    ) -> Self {
        Self {
            discount,
            minimum_order,
            expires_at,
        }
    }

    /// Discount granted when eligible.
    pub fn discount(&self) -> &Discount<'a> {
        &self.discount
    }

    /// Minimum subtotal required, if any.
    pub fn minimum_order(&self) -> Option<&Money<'a, Currency>> {
        self.minimum_order.as_ref()
    }

    /// Expiry instant, if any.
    pub fn expires_at(&self) -> Option<Timestamp> {
        self.expires_at
    }

    /// Check eligibility against a pre-discount subtotal at `now`.
    ///
    /// # Errors
    ///
    /// - [`CouponRejection::Expired`]: `expires_at <= now`.
    /// - [`CouponRejection::BelowMinimum`]: `subtotal < minimum_order`.
    pub fn check(
        &self,
        subtotal: &Money<'_, Currency>,
        now: Timestamp,
    ) -> Result<(), CouponRejection> {
        if self.expires_at.is_some_and(|expires_at| expires_at <= now) {
            return Err(CouponRejection::Expired);
        }

        if let Some(minimum) = self.minimum_order {
            let minimum_minor = minimum.to_minor_units();

            if subtotal.to_minor_units() < minimum_minor {
                return Err(CouponRejection::BelowMinimum { minimum_minor });
            }
        }

        Ok(())
    }
}
