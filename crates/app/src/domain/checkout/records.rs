//! Checkout Records

use crate::domain::orders::records::OrderUuid;

/// What the client gets back after a successful checkout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderConfirmation {
    pub uuid: OrderUuid,
    pub order_number: String,
    pub total: u64,
    pub currency: String,
}
