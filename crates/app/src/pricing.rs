//! Store pricing settings
//!
//! Bridges persisted minor-unit amounts to the `scrubline` pricing engine.

use jiff::Timestamp;
use rusty_money::{
    Money,
    iso::{self, Currency},
};
use scrubline::prelude::*;
use thiserror::Error;

use crate::domain::coupons::records::{CouponRecord, DiscountKind};

#[derive(Debug, Error)]
pub enum StorePricingError {
    #[error("unknown currency code {0:?}")]
    UnknownCurrency(String),

    #[error("amount {0} does not fit in minor units")]
    AmountOutOfRange(u64),

    #[error("priced amount {0} is negative")]
    NegativeAmount(i64),

    #[error(transparent)]
    Pricing(#[from] PricingError),
}

/// Currency, shipping and tax configuration for the store.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StorePricing {
    currency: &'static Currency,
    free_shipping_threshold: u64,
    flat_shipping_fee: u64,
    tax_rate_bps: u32,
}

impl StorePricing {
    /// Validate and build store pricing.
    ///
    /// # Errors
    ///
    /// Returns an error for an unknown ISO currency code, amounts that do not fit in 64-bit
    /// minor units, or a tax rate above 100%.
    pub fn new(
        currency_code: &str,
        free_shipping_threshold: u64,
        flat_shipping_fee: u64,
        tax_rate_bps: u32,
    ) -> Result<Self, StorePricingError> {
        let currency = iso::find(currency_code)
            .ok_or_else(|| StorePricingError::UnknownCurrency(currency_code.to_string()))?;

        let pricing = Self {
            currency,
            free_shipping_threshold,
            flat_shipping_fee,
            tax_rate_bps,
        };

        pricing.rules()?;

        Ok(pricing)
    }

    /// ISO 4217 code of the store currency.
    pub fn currency_code(&self) -> &'static str {
        self.currency.iso_alpha_code
    }

    /// Pricing rules for the engine.
    ///
    /// # Errors
    ///
    /// See [`StorePricing::new`].
    pub fn rules(&self) -> Result<PricingRules<'static>, StorePricingError> {
        let shipping = ShippingRule::new(
            self.money(self.free_shipping_threshold)?,
            self.money(self.flat_shipping_fee)?,
        );

        Ok(PricingRules::new(
            self.currency,
            shipping,
            percentage_from_basis_points(self.tax_rate_bps),
        )?)
    }

    /// Convert a stored amount to money in the store currency.
    ///
    /// # Errors
    ///
    /// Returns [`StorePricingError::AmountOutOfRange`] above `i64::MAX`.
    pub fn money(&self, minor: u64) -> Result<Money<'static, Currency>, StorePricingError> {
        let signed =
            i64::try_from(minor).map_err(|_err| StorePricingError::AmountOutOfRange(minor))?;

        Ok(Money::from_minor(signed, self.currency))
    }

    /// Engine terms for a stored coupon.
    ///
    /// # Errors
    ///
    /// Returns [`StorePricingError::AmountOutOfRange`] for amounts above `i64::MAX`.
    pub fn coupon_terms(
        &self,
        coupon: &CouponRecord,
    ) -> Result<CouponTerms<'static>, StorePricingError> {
        let discount = match coupon.discount {
            DiscountKind::Percentage { basis_points } => {
                Discount::PercentageOff(percentage_from_basis_points(basis_points))
            }
            DiscountKind::FixedAmount { amount } => Discount::AmountOff(self.money(amount)?),
        };

        let minimum_order = coupon
            .minimum_order
            .map(|minimum| self.money(minimum))
            .transpose()?;

        Ok(CouponTerms::new(discount, minimum_order, coupon.expires_at))
    }

    /// Price `(unit_price, quantity)` lines with an optional attached coupon.
    ///
    /// # Errors
    ///
    /// Returns an error if an amount is out of range or the engine rejects the input.
    pub fn quote<I>(
        &self,
        lines: I,
        coupon: Option<&CouponRecord>,
        now: Timestamp,
    ) -> Result<PricedTotals, StorePricingError>
    where
        I: IntoIterator<Item = (u64, u32)>,
    {
        let lines = lines
            .into_iter()
            .map(|(unit_price, quantity)| Ok(LineItem::new(self.money(unit_price)?, quantity)))
            .collect::<Result<Vec<_>, StorePricingError>>()?;

        let terms = coupon.map(|coupon| self.coupon_terms(coupon)).transpose()?;
        let quote = quote(&lines, terms.as_ref(), &self.rules()?, now)?;

        Ok(PricedTotals {
            totals: CartTotals::try_from_totals(self.currency_code(), &quote.totals)?,
            coupon: quote.coupon,
        })
    }
}

/// Totals in minor units of the store currency.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CartTotals {
    pub currency: &'static str,
    pub subtotal: u64,
    pub discount: u64,
    pub shipping: u64,
    pub tax: u64,
    pub total: u64,
    pub units: u64,
}

impl CartTotals {
    fn try_from_totals(
        currency: &'static str,
        totals: &Totals<'_>,
    ) -> Result<Self, StorePricingError> {
        Ok(Self {
            currency,
            subtotal: unsigned(&totals.subtotal())?,
            discount: unsigned(&totals.discount())?,
            shipping: unsigned(&totals.shipping())?,
            tax: unsigned(&totals.tax())?,
            total: unsigned(&totals.total())?,
            units: totals.units(),
        })
    }

    /// Whether an order can be placed for these totals.
    pub fn can_checkout(&self) -> bool {
        self.units > 0
    }
}

/// Totals plus what happened to the attached coupon.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PricedTotals {
    pub totals: CartTotals,
    pub coupon: CouponOutcome,
}

fn unsigned(amount: &Money<'_, Currency>) -> Result<u64, StorePricingError> {
    let minor = amount.to_minor_units();

    u64::try_from(minor).map_err(|_err| StorePricingError::NegativeAmount(minor))
}
