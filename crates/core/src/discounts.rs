//! Discount utilities
//!
//! Coupon discounts and the percentage arithmetic shared with tax calculation.

use decimal_percentage::Percentage;
use rust_decimal::{
    Decimal, RoundingStrategy,
    prelude::{FromPrimitive, ToPrimitive},
};
use rusty_money::{Money, iso::Currency};
use thiserror::Error;

/// Errors specific to discount calculations.
#[derive(Debug, Error, PartialEq)]
pub enum DiscountError {
    /// Percentage calculation could not be safely converted.
    #[error("percentage conversion overflowed or was not finite")]
    PercentConversion,
}

/// Discount granted by a coupon.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum Discount<'a> {
    /// Take a percentage off the subtotal (e.g. "20% off")
    PercentageOff(Percentage),

    /// Subtract a fixed amount from the subtotal (e.g. "$10 off")
    AmountOff(Money<'a, Currency>),
}

impl Discount<'_> {
    /// Discount to subtract from a subtotal, in minor units.
    ///
    /// The result is clamped to `0..=subtotal`, so a discount never exceeds the subtotal it is
    /// taken from.
    ///
    /// # Errors
    ///
    /// Returns [`DiscountError::PercentConversion`] if the percentage calculation overflows.
    pub fn amount_minor(&self, subtotal_minor: i64) -> Result<i64, DiscountError> {
        let computed = match self {
            Discount::PercentageOff(percent) => percent_of_minor(percent, subtotal_minor)?,
            Discount::AmountOff(amount) => amount.to_minor_units(),
        };

        Ok(computed.clamp(0, subtotal_minor.max(0)))
    }
}

/// Build a percentage from basis points (`875` is 8.75%).
pub fn percentage_from_basis_points(basis_points: u32) -> Percentage {
    Percentage::from(Decimal::new(i64::from(basis_points), 4))
}

/// Calculate a percentage of a minor unit amount, rounded half away from zero.
///
/// # Errors
///
/// Returns an error if the percentage calculation overflows or cannot be safely represented
/// (`DiscountError::PercentConversion`).
pub fn percent_of_minor(percent: &Percentage, minor: i64) -> Result<i64, DiscountError> {
    let minor = Decimal::from_i64(minor).ok_or(DiscountError::PercentConversion)?;

    ((*percent) * Decimal::ONE) // decimal_percentage doesn't expose the underlying Decimal
        .checked_mul(minor)
        .ok_or(DiscountError::PercentConversion)?
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i64()
        .ok_or(DiscountError::PercentConversion)
}
