//! Order Receipts

use rusty_money::{Money, iso};
use scrubline::prelude::*;

use crate::{domain::orders::records::OrderDetails, pricing::StorePricingError};

impl OrderDetails {
    /// Printable receipt built from the amounts recorded when the order was placed.
    ///
    /// # Errors
    ///
    /// Returns an error if the recorded currency is unknown or an amount does not fit in
    /// signed minor units.
    pub fn receipt(&self) -> Result<Receipt<'static>, StorePricingError> {
        let order = &self.order;

        let currency = iso::find(&order.currency)
            .ok_or_else(|| StorePricingError::UnknownCurrency(order.currency.clone()))?;

        let lines = self
            .items
            .iter()
            .map(|item| {
                Ok(ReceiptLine {
                    sku: item.sku.clone(),
                    name: item.name.clone(),
                    item: LineItem::new(
                        Money::from_minor(signed(item.unit_price)?, currency),
                        item.quantity,
                    ),
                })
            })
            .collect::<Result<Vec<_>, StorePricingError>>()?;

        let units = self.items.iter().map(|item| u64::from(item.quantity)).sum();

        let totals = Totals::from_recorded(
            currency,
            signed(order.subtotal)?,
            signed(order.discount)?,
            signed(order.shipping)?,
            signed(order.tax)?,
            units,
        )?;

        Ok(Receipt::new(
            order.order_number.clone(),
            lines,
            order.coupon_code.clone(),
            totals,
        ))
    }
}

fn signed(minor: u64) -> Result<i64, StorePricingError> {
    i64::try_from(minor).map_err(|_err| StorePricingError::AmountOutOfRange(minor))
}
