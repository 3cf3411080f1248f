//! Order response bodies.

use salvo::oapi::ToSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use scrubline_app::domain::orders::{
    data::ShippingAddress,
    records::{OrderDetails, OrderItemRecord, OrderRecord},
};

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct ShippingAddressResponse {
    pub name: String,
    pub line1: String,
    pub line2: Option<String>,
    pub city: String,
    pub region: Option<String>,
    pub postal_code: String,
    pub country: String,
}

impl From<ShippingAddress> for ShippingAddressResponse {
    fn from(address: ShippingAddress) -> Self {
        Self {
            name: address.name,
            line1: address.line1,
            line2: address.line2,
            city: address.city,
            region: address.region,
            postal_code: address.postal_code,
            country: address.country,
        }
    }
}

/// An order as placed. Amounts are in cents and never change after checkout.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct OrderResponse {
    pub uuid: Uuid,
    pub order_number: String,

    /// `pending`, `processing`, `shipped`, `delivered` or `cancelled`
    pub status: String,

    pub currency: String,
    pub subtotal: u64,
    pub discount: u64,
    pub shipping: u64,
    pub tax: u64,
    pub total: u64,
    pub coupon_code: Option<String>,
    pub shipping_address: ShippingAddressResponse,
    pub payment_method: String,
    pub created_at: String,
    pub updated_at: String,
}

impl From<OrderRecord> for OrderResponse {
    fn from(order: OrderRecord) -> Self {
        Self {
            uuid: order.uuid.into_uuid(),
            order_number: order.order_number,
            status: order.status.to_string(),
            currency: order.currency,
            subtotal: order.subtotal,
            discount: order.discount,
            shipping: order.shipping,
            tax: order.tax,
            total: order.total,
            coupon_code: order.coupon_code,
            shipping_address: order.shipping_address.into(),
            payment_method: order.payment_method.to_string(),
            created_at: order.created_at.to_string(),
            updated_at: order.updated_at.to_string(),
        }
    }
}

/// A product snapshot taken at checkout.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct OrderItemResponse {
    pub uuid: Uuid,
    pub product_uuid: Uuid,
    pub sku: String,
    pub name: String,
    pub quantity: u32,
    pub unit_price: u64,
    pub line_total: u64,
}

impl From<OrderItemRecord> for OrderItemResponse {
    fn from(item: OrderItemRecord) -> Self {
        Self {
            uuid: item.uuid.into_uuid(),
            product_uuid: item.product_uuid.into_uuid(),
            sku: item.sku,
            name: item.name,
            quantity: item.quantity,
            unit_price: item.unit_price,
            line_total: item.line_total,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct OrderDetailsResponse {
    #[serde(flatten)]
    pub order: OrderResponse,
    pub items: Vec<OrderItemResponse>,
}

impl From<OrderDetails> for OrderDetailsResponse {
    fn from(details: OrderDetails) -> Self {
        Self {
            order: details.order.into(),
            items: details.items.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct OrdersResponse {
    pub orders: Vec<OrderResponse>,
}

impl From<Vec<OrderRecord>> for OrdersResponse {
    fn from(orders: Vec<OrderRecord>) -> Self {
        Self {
            orders: orders.into_iter().map(Into::into).collect(),
        }
    }
}
