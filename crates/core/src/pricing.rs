//! Pricing
//!
//! Reduces cart lines, an optional discount, a shipping rule and a tax rate to a set of
//! [`Totals`]:
//!
//! ```text
//! subtotal   = Σ(unit_price × quantity)
//! discount   = min(discount(subtotal), subtotal)
//! shipping   = 0 if empty or (subtotal - discount) > threshold, else flat fee
//! tax        = round((subtotal - discount) × rate)
//! total      = subtotal - discount + shipping + tax
//! ```

use decimal_percentage::Percentage;
use jiff::Timestamp;
use rust_decimal::Decimal;
use rusty_money::{Money, iso::Currency};
use thiserror::Error;

use crate::{
    coupons::{CouponOutcome, CouponTerms},
    discounts::{Discount, DiscountError, percent_of_minor},
    items::LineItem,
    shipping::ShippingRule,
};

/// Errors that can occur while pricing a cart.
#[derive(Debug, Error, PartialEq)]
pub enum PricingError {
    /// A line's currency differs from the pricing currency (index, line currency, pricing currency).
    #[error("Line {0} has currency {1}, but pricing uses currency {2}")]
    CurrencyMismatch(usize, &'static str, &'static str),

    /// An amount (discount or shipping) is not in the pricing currency.
    #[error("amount has currency {0}, but pricing uses currency {1}")]
    AmountCurrencyMismatch(&'static str, &'static str),

    /// Tax rate outside of 0% to 100%.
    #[error("tax rate must be between 0% and 100%")]
    InvalidTaxRate,

    /// Recorded amounts cannot be totals: the discount exceeds the subtotal.
    #[error("discount {0} exceeds subtotal {1}")]
    DiscountExceedsSubtotal(i64, i64),

    /// Intermediate arithmetic overflowed.
    #[error("amount overflowed while pricing")]
    Overflow,

    /// Wrapped discount calculation error.
    #[error(transparent)]
    Discount(#[from] DiscountError),
}

/// Store-wide pricing rules: currency, shipping and tax.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct PricingRules<'a> {
    currency: &'static Currency,
    shipping: ShippingRule<'a>,
    tax_rate: Percentage,
}

impl<'a> PricingRules<'a> {
    /// Create pricing rules.
    ///
    /// # Errors
    ///
    /// - [`PricingError::AmountCurrencyMismatch`]: shipping amounts use another currency.
    /// - [`PricingError::InvalidTaxRate`]: the tax rate is negative or above 100%.
    pub fn new(
        currency: &'static Currency,
        shipping: ShippingRule<'a>,
        tax_rate: Percentage,
    ) -> Result<Self, PricingError> {
        for amount in [shipping.free_threshold(), shipping.flat_fee()] {
            ensure_currency(amount, currency)?;
        }

        let rate = tax_rate * Decimal::ONE;

        if rate < Decimal::ZERO || rate > Decimal::ONE {
            return Err(PricingError::InvalidTaxRate);
        }

        Ok(Self {
            currency,
            shipping,
            tax_rate,
        })
    }

    /// Currency every amount is priced in.
    pub fn currency(&self) -> &'static Currency {
        self.currency
    }

    /// Shipping rule.
    pub fn shipping(&self) -> &ShippingRule<'a> {
        &self.shipping
    }

    /// Flat tax rate applied to the discounted subtotal.
    pub fn tax_rate(&self) -> &Percentage {
        &self.tax_rate
    }
}

/// Cart totals, derived from the lines or rebuilt from a placed order.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Totals<'a> {
    subtotal: Money<'a, Currency>,
    discount: Money<'a, Currency>,
    shipping: Money<'a, Currency>,
    tax: Money<'a, Currency>,
    total: Money<'a, Currency>,
    units: u64,
}

impl<'a> Totals<'a> {
    /// All-zero totals for an empty cart.
    pub fn zero(currency: &'a Currency) -> Self {
        let zero = Money::from_minor(0, currency);

        Self {
            subtotal: zero,
            discount: zero,
            shipping: zero,
            tax: zero,
            total: zero,
            units: 0,
        }
    }

    /// Rebuild totals from previously priced amounts, e.g. a placed order.
    ///
    /// # Errors
    ///
    /// - [`PricingError::DiscountExceedsSubtotal`]: the discount is larger than the subtotal.
    /// - [`PricingError::Overflow`]: the amounts do not add up within 64 bits.
    pub fn from_recorded(
        currency: &'a Currency,
        subtotal: i64,
        discount: i64,
        shipping: i64,
        tax: i64,
        units: u64,
    ) -> Result<Self, PricingError> {
        if discount > subtotal {
            return Err(PricingError::DiscountExceedsSubtotal(discount, subtotal));
        }

        let total = (subtotal - discount)
            .checked_add(shipping)
            .and_then(|amount| amount.checked_add(tax))
            .ok_or(PricingError::Overflow)?;

        Ok(Self {
            subtotal: Money::from_minor(subtotal, currency),
            discount: Money::from_minor(discount, currency),
            shipping: Money::from_minor(shipping, currency),
            tax: Money::from_minor(tax, currency),
            total: Money::from_minor(total, currency),
            units,
        })
    }

    /// Sum of line totals before any discount.
    pub fn subtotal(&self) -> Money<'a, Currency> {
        self.subtotal
    }

    /// Discount taken off the subtotal.
    pub fn discount(&self) -> Money<'a, Currency> {
        self.discount
    }

    /// Shipping charge.
    pub fn shipping(&self) -> Money<'a, Currency> {
        self.shipping
    }

    /// Tax on the discounted subtotal.
    pub fn tax(&self) -> Money<'a, Currency> {
        self.tax
    }

    /// Amount payable.
    pub fn total(&self) -> Money<'a, Currency> {
        self.total
    }

    /// Number of units across all lines.
    pub fn units(&self) -> u64 {
        self.units
    }

    /// Whether there is nothing to pay for.
    pub fn is_empty(&self) -> bool {
        self.units == 0
    }

    /// Checkout is disabled for an empty cart.
    pub fn can_checkout(&self) -> bool {
        !self.is_empty()
    }
}

/// Totals together with what happened to the attached coupon.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Quote<'a> {
    /// Cart totals.
    pub totals: Totals<'a>,

    /// Outcome of evaluating the attached coupon.
    pub coupon: CouponOutcome,
}

/// Price cart lines with an optional discount.
///
/// # Errors
///
/// - [`PricingError::CurrencyMismatch`]: a line is not in the pricing currency.
/// - [`PricingError::AmountCurrencyMismatch`]: a fixed discount is not in the pricing currency.
/// - [`PricingError::Overflow`]: an amount does not fit in 64 bits.
/// - [`PricingError::Discount`]: the percentage calculation failed.
pub fn price_lines<'a>(
    lines: &[LineItem<'a>],
    discount: Option<&Discount<'a>>,
    rules: &PricingRules<'a>,
) -> Result<Totals<'a>, PricingError> {
    let currency = rules.currency();

    let (subtotal, units) = lines.iter().enumerate().try_fold(
        (0_i64, 0_u64),
        |(subtotal, units), (idx, line)| {
            let line_currency = line.unit_price().currency();

            if line_currency != currency {
                return Err(PricingError::CurrencyMismatch(
                    idx,
                    line_currency.iso_alpha_code,
                    currency.iso_alpha_code,
                ));
            }

            let line_total = line.line_total_minor().ok_or(PricingError::Overflow)?;

            Ok((
                subtotal
                    .checked_add(line_total)
                    .ok_or(PricingError::Overflow)?,
                units + u64::from(line.quantity()),
            ))
        },
    )?;

    if let Some(Discount::AmountOff(amount)) = discount {
        ensure_currency(amount, currency)?;
    }

    let discount = discount
        .map(|discount| discount.amount_minor(subtotal))
        .transpose()?
        .unwrap_or(0);

    let discounted = subtotal - discount;
    let shipping = rules.shipping().cost_minor(discounted, units == 0);
    let tax = percent_of_minor(rules.tax_rate(), discounted)?.max(0);

    let total = discounted
        .checked_add(shipping)
        .and_then(|amount| amount.checked_add(tax))
        .ok_or(PricingError::Overflow)?;

    Ok(Totals {
        subtotal: Money::from_minor(subtotal, currency),
        discount: Money::from_minor(discount, currency),
        shipping: Money::from_minor(shipping, currency),
        tax: Money::from_minor(tax, currency),
        total: Money::from_minor(total, currency),
        units,
    })
}

/// Price cart lines, applying the attached coupon only if it is currently eligible.
///
/// An ineligible coupon (expired, or the subtotal is below its minimum) contributes no
/// discount and is reported as [`CouponOutcome::Inactive`].
///
/// # Errors
///
/// See [`price_lines`].
pub fn quote<'a>(
    lines: &[LineItem<'a>],
    coupon: Option<&CouponTerms<'a>>,
    rules: &PricingRules<'a>,
    now: Timestamp,
) -> Result<Quote<'a>, PricingError> {
    let undiscounted = price_lines(lines, None, rules)?;

    let Some(terms) = coupon else {
        return Ok(Quote {
            totals: undiscounted,
            coupon: CouponOutcome::NoCoupon,
        });
    };

    match terms.check(&undiscounted.subtotal(), now) {
        Ok(()) => Ok(Quote {
            totals: price_lines(lines, Some(terms.discount()), rules)?,
            coupon: CouponOutcome::Applied,
        }),
        Err(rejection) => Ok(Quote {
            totals: undiscounted,
            coupon: CouponOutcome::Inactive(rejection),
        }),
    }
}

fn ensure_currency(
    amount: &Money<'_, Currency>,
    currency: &'static Currency,
) -> Result<(), PricingError> {
    let amount_currency = amount.currency();

    if amount_currency == currency {
        Ok(())
    } else {
        Err(PricingError::AmountCurrencyMismatch(
            amount_currency.iso_alpha_code,
            currency.iso_alpha_code,
        ))
    }
}
