//! Receipt

use std::io;

use rusty_money::{Money, iso::Currency};
use tabled::{
    builder::Builder,
    settings::{
        Alignment, Style,
        object::{Columns, Rows},
    },
};
use thiserror::Error;

use crate::{items::LineItem, pricing::Totals};

/// Errors that can occur when rendering a receipt.
#[derive(Debug, Error, PartialEq)]
pub enum ReceiptError {
    /// A line total did not fit in 64 bits.
    #[error("line {0} total overflowed")]
    Overflow(usize),

    /// Error writing to the output.
    #[error("IO error")]
    IO,
}

/// A purchased line as it appears on a receipt.
#[derive(Debug, Clone, PartialEq)]
pub struct ReceiptLine<'a> {
    /// Product SKU at time of purchase.
    pub sku: String,

    /// Product name at time of purchase.
    pub name: String,

    /// Unit price and quantity.
    pub item: LineItem<'a>,
}

/// Printable summary of a placed order.
#[derive(Debug, Clone, PartialEq)]
pub struct Receipt<'a> {
    reference: String,
    lines: Vec<ReceiptLine<'a>>,
    coupon_code: Option<String>,
    totals: Totals<'a>,
}

impl<'a> Receipt<'a> {
    /// Create a receipt for an order reference (e.g. `SL-00000042`).
    pub fn new(
        reference: impl Into<String>,
        lines: Vec<ReceiptLine<'a>>,
        coupon_code: Option<String>,
        totals: Totals<'a>,
    ) -> Self {
        Self {
            reference: reference.into(),
            lines,
            coupon_code,
            totals,
        }
    }

    /// Order reference.
    pub fn reference(&self) -> &str {
        &self.reference
    }

    /// Purchased lines.
    pub fn lines(&self) -> &[ReceiptLine<'a>] {
        &self.lines
    }

    /// Order totals.
    pub fn totals(&self) -> &Totals<'a> {
        &self.totals
    }

    /// Writes the receipt as a table followed by a totals summary.
    ///
    /// # Errors
    ///
    /// Returns [`ReceiptError::Overflow`] if a line total overflows, or
    /// [`ReceiptError::IO`] if writing fails.
    pub fn write_to(&self, mut out: impl io::Write) -> Result<(), ReceiptError> {
        let mut builder = Builder::default();

        builder.push_record(["", "SKU", "Item", "Unit Price", "Qty", "Line Total"]);

        for (idx, line) in self.lines.iter().enumerate() {
            let line_total = line
                .item
                .line_total_minor()
                .ok_or(ReceiptError::Overflow(idx))?;

            builder.push_record([
                format!("#{:<3}", idx + 1),
                line.sku.clone(),
                line.name.clone(),
                format!("{}", line.item.unit_price()),
                line.item.quantity().to_string(),
                format!(
                    "{}",
                    Money::from_minor(line_total, line.item.unit_price().currency())
                ),
            ]);
        }

        let mut table = builder.build();

        table.with(Style::modern_rounded());
        table.modify(Columns::new(3..6), Alignment::right());
        table.modify(Rows::first(), Alignment::center());

        writeln!(out, "\nOrder {}\n{table}", self.reference).map_err(|_err| ReceiptError::IO)?;

        write_summary(&mut out, self)
    }
}

fn write_summary(out: &mut impl io::Write, receipt: &Receipt<'_>) -> Result<(), ReceiptError> {
    let totals = receipt.totals();

    let discount_label = match &receipt.coupon_code {
        Some(code) => format!("Discount ({code}):"),
        None => "Discount:".to_string(),
    };

    let rows: [(String, Money<'_, Currency>); 5] = [
        ("Subtotal:".to_string(), totals.subtotal()),
        (discount_label, totals.discount()),
        ("Shipping:".to_string(), totals.shipping()),
        ("Tax:".to_string(), totals.tax()),
        ("Total:".to_string(), totals.total()),
    ];

    let label_width = rows.iter().map(|(label, _)| label.len()).max().unwrap_or(0);

    let values: Vec<String> = rows.iter().map(|(_, value)| value.to_string()).collect();
    let value_width = values.iter().map(String::len).max().unwrap_or(0);

    for ((label, _), value) in rows.iter().zip(&values) {
        writeln!(out, " {label:<label_width$}  {value:>value_width$}")
            .map_err(|_err| ReceiptError::IO)?;
    }

    writeln!(out).map_err(|_err| ReceiptError::IO)
}
