//! Line Items

use rusty_money::{Money, iso::Currency};

/// A cart line: a unit price snapshot and how many units were ordered.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct LineItem<'a> {
    unit_price: Money<'a, Currency>,
    quantity: u32,
}

impl<'a> LineItem<'a> {
    /// Creates a new line item with the given unit price and quantity
    pub fn new(unit_price: Money<'a, Currency>, quantity: u32) -> Self {
        Self {
            unit_price,
            quantity,
        }
    }

    /// Returns the unit price of the line
    pub fn unit_price(&self) -> &Money<'a, Currency> {
        &self.unit_price
    }

    /// Returns the ordered quantity
    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    /// Unit price multiplied by quantity, in minor units.
    ///
    /// Returns `None` if the multiplication overflows.
    pub fn line_total_minor(&self) -> Option<i64> {
        self.unit_price
            .to_minor_units()
            .checked_mul(i64::from(self.quantity))
    }
}
