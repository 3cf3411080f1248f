//! Scrubline Domain Concerns

pub mod carts;
pub mod checkout;
pub mod coupons;
pub mod customers;
pub mod orders;
pub mod owners;
pub mod products;
