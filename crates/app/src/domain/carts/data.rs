//! Cart Data

use crate::domain::products::records::ProductUuid;

/// Largest quantity a single cart line may hold.
pub const MAX_LINE_QUANTITY: u32 = 999;

/// New Cart Item Data
#[derive(Debug, Clone, PartialEq)]
pub struct NewCartItem {
    pub product_uuid: ProductUuid,
    pub quantity: u32,
}

/// Whether a requested line quantity is allowed.
#[must_use]
pub const fn is_valid_quantity(quantity: u32) -> bool {
    quantity >= 1 && quantity <= MAX_LINE_QUANTITY
}
