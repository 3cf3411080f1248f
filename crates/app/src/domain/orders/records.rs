//! Order Records

use std::{fmt, str::FromStr};

use jiff::Timestamp;
use thiserror::Error;

use crate::{
    domain::{
        orders::data::{PaymentMethod, ShippingAddress},
        owners::Owner,
        products::records::ProductUuid,
    },
    uuids::TypedUuid,
};

/// Order UUID
pub type OrderUuid = TypedUuid<OrderRecord>;

/// Fulfilment state of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OrderStatus {
    Pending,
    Processing,
    Shipped,
    Delivered,
    Cancelled,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown order status {0:?}")]
pub struct UnknownStatus(pub String);

impl OrderStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Processing => "processing",
            Self::Shipped => "shipped",
            Self::Delivered => "delivered",
            Self::Cancelled => "cancelled",
        }
    }

    /// Delivered and cancelled orders never change again.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Delivered | Self::Cancelled)
    }

    /// Whether an order may move from `self` to `next`.
    #[must_use]
    pub const fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Processing | Self::Cancelled)
                | (Self::Processing, Self::Shipped | Self::Cancelled)
                | (Self::Shipped, Self::Delivered)
        )
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "processing" => Ok(Self::Processing),
            "shipped" => Ok(Self::Shipped),
            "delivered" => Ok(Self::Delivered),
            "cancelled" => Ok(Self::Cancelled),
            other => Err(UnknownStatus(other.to_string())),
        }
    }
}

/// Order Record
///
/// Amounts are the totals computed at checkout and never change afterwards.
#[derive(Debug, Clone)]
pub struct OrderRecord {
    pub uuid: OrderUuid,
    pub order_number: String,
    pub owner: Owner,
    pub status: OrderStatus,
    pub currency: String,
    pub subtotal: u64,
    pub discount: u64,
    pub shipping: u64,
    pub tax: u64,
    pub total: u64,
    pub coupon_code: Option<String>,
    pub shipping_address: ShippingAddress,
    pub payment_method: PaymentMethod,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Order Item UUID
pub type OrderItemUuid = TypedUuid<OrderItemRecord>;

/// Product snapshot taken at checkout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderItemRecord {
    pub uuid: OrderItemUuid,
    pub product_uuid: ProductUuid,
    pub sku: String,
    pub name: String,
    pub quantity: u32,
    pub unit_price: u64,
    pub line_total: u64,
}

/// An order with its items.
#[derive(Debug, Clone)]
pub struct OrderDetails {
    pub order: OrderRecord,
    pub items: Vec<OrderItemRecord>,
}
