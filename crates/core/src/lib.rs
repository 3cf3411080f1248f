//! Scrubline
//!
//! Storefront pricing: cart line items, coupon discounts, shipping and tax, reduced to a
//! single set of totals. No I/O lives here.

pub mod coupons;
pub mod discounts;
pub mod items;
pub mod prelude;
pub mod pricing;
pub mod receipt;
pub mod shipping;
