//! Scrubline prelude.
//!
//! Convenience exports for common library consumers.

pub use crate::{
    coupons::{CouponCode, CouponCodeError, CouponOutcome, CouponRejection, CouponTerms},
    discounts::{Discount, DiscountError, percentage_from_basis_points},
    items::LineItem,
    pricing::{PricingError, PricingRules, Quote, Totals, price_lines, quote},
    receipt::{Receipt, ReceiptError, ReceiptLine},
    shipping::ShippingRule,
};
