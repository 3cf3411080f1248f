//! Shipping

use rusty_money::{Money, iso::Currency};

/// Flat-rate shipping that becomes free once the discounted subtotal clears a threshold.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ShippingRule<'a> {
    free_threshold: Money<'a, Currency>,
    flat_fee: Money<'a, Currency>,
}

impl<'a> ShippingRule<'a> {
    /// Create a shipping rule charging `flat_fee` unless the order is above `free_threshold`.
    pub fn new(free_threshold: Money<'a, Currency>, flat_fee: Money<'a, Currency>) -> Self {
        Self {
            free_threshold,
            flat_fee,
        }
    }

    /// Orders strictly above this amount ship free.
    pub fn free_threshold(&self) -> &Money<'a, Currency> {
        &self.free_threshold
    }

    /// Fee charged at or below the threshold.
    pub fn flat_fee(&self) -> &Money<'a, Currency> {
        &self.flat_fee
    }

    /// Shipping cost in minor units for a discounted subtotal.
    ///
    /// An empty cart never pays shipping.
    pub fn cost_minor(&self, discounted_subtotal_minor: i64, is_empty: bool) -> i64 {
        if is_empty || discounted_subtotal_minor > self.free_threshold.to_minor_units() {
            return 0;
        }

        self.flat_fee.to_minor_units().max(0)
    }
}
