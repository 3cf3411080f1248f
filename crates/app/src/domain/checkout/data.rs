//! Checkout Data

use crate::domain::{
    carts::records::CartItemRecord,
    orders::data::{PaymentMethod, ShippingAddress},
    products::records::ProductUuid,
};

/// A cart line as the client last saw it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CheckoutItemSnapshot {
    pub product_uuid: ProductUuid,
    pub quantity: u32,
    pub unit_price: u64,
}

impl From<&CartItemRecord> for CheckoutItemSnapshot {
    fn from(item: &CartItemRecord) -> Self {
        Self {
            product_uuid: item.product_uuid,
            quantity: item.quantity,
            unit_price: item.unit_price,
        }
    }
}

/// Everything the client submits to place an order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutRequest {
    pub items: Vec<CheckoutItemSnapshot>,

    /// Total the client displayed, in minor units.
    pub expected_total: u64,
    pub shipping_address: ShippingAddress,
    pub payment_method: PaymentMethod,
}

/// Whether the client's snapshot describes exactly the server's cart lines, in any order.
pub(crate) fn snapshot_matches(client: &[CheckoutItemSnapshot], server: &[CartItemRecord]) -> bool {
    if client.len() != server.len() {
        return false;
    }

    let mut client = client.to_vec();
    let mut server: Vec<CheckoutItemSnapshot> = server.iter().map(Into::into).collect();

    client.sort_by_key(|item| item.product_uuid);
    server.sort_by_key(|item| item.product_uuid);

    client == server
}
