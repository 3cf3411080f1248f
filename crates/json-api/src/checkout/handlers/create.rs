//! Checkout Handler

use std::sync::Arc;

use jiff::Timestamp;
use salvo::{
    http::header::LOCATION,
    oapi::{ToSchema, extract::JsonBody},
    prelude::*,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use scrubline_app::domain::{
    checkout::data::{CheckoutItemSnapshot, CheckoutRequest},
    orders::data::{PaymentMethod, ShippingAddress},
};

use crate::{
    checkout::errors::into_status_error, extensions::*, observability::record_order_placed,
    state::State,
};

/// A cart line exactly as the client last displayed it.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct CheckoutItemRequest {
    pub product_uuid: Uuid,
    pub quantity: u32,

    /// Unit price in cents
    pub unit_price: u64,
}

impl From<CheckoutItemRequest> for CheckoutItemSnapshot {
    fn from(item: CheckoutItemRequest) -> Self {
        Self {
            product_uuid: item.product_uuid.into(),
            quantity: item.quantity,
            unit_price: item.unit_price,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct ShippingAddressRequest {
    pub name: String,
    pub line1: String,
    pub line2: Option<String>,
    pub city: String,
    pub region: Option<String>,
    pub postal_code: String,
    pub country: String,
}

impl From<ShippingAddressRequest> for ShippingAddress {
    fn from(address: ShippingAddressRequest) -> Self {
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

/// Checkout Request
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct CheckoutRequestBody {
    pub items: Vec<CheckoutItemRequest>,

    /// The total the client displayed, in cents
    pub expected_total: u64,

    pub shipping_address: ShippingAddressRequest,

    /// `card`, `bank_transfer` or `cash_on_delivery`; no payment is taken
    pub payment_method: String,
}

/// Order Placed Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct OrderPlacedResponse {
    pub uuid: Uuid,

    /// Human readable `SL-` number
    pub order_number: String,

    /// Total charged, in cents
    pub total: u64,

    pub currency: String,
}

/// Checkout Handler
///
/// Reprices the caller's cart, checks it against what the client displayed and turns it into
/// a pending order. The cart is emptied only when the order is placed.
#[endpoint(
    tags("checkout"),
    summary = "Place Order",
    security(("bearer_auth" = []), ("session_id" = [])),
    responses(
        (status_code = StatusCode::CREATED, description = "Order placed"),
        (status_code = StatusCode::BAD_REQUEST, description = "Empty cart or invalid address"),
        (status_code = StatusCode::CONFLICT, description = "Cart changed since it was fetched"),
        (status_code = StatusCode::UNAUTHORIZED, description = "Unauthorized"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
#[tracing::instrument(
    name = "checkout.create",
    skip(json, depot, res),
    fields(
        items = tracing::field::Empty,
        expected_total = tracing::field::Empty,
        order_number = tracing::field::Empty
    ),
    err
)]
pub(crate) async fn handler(
    json: JsonBody<CheckoutRequestBody>,
    depot: &mut Depot,
    res: &mut Response,
) -> Result<Json<OrderPlacedResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let owner = depot.owner_or_401()?;
    let body = json.into_inner();

    let span = tracing::Span::current();

    span.record("items", body.items.len());
    span.record("expected_total", body.expected_total);

    let payment_method = body
        .payment_method
        .parse::<PaymentMethod>()
        .or_400("invalid payment method")?;

    let request = CheckoutRequest {
        items: body.items.into_iter().map(Into::into).collect(),
        expected_total: body.expected_total,
        shipping_address: body.shipping_address.into(),
        payment_method,
    };

    let confirmation = state
        .app
        .checkout
        .checkout(owner, request, Timestamp::now())
        .await
        .map_err(into_status_error)?;

    span.record("order_number", confirmation.order_number.as_str());

    record_order_placed(payment_method.as_str(), confirmation.total);

    res.add_header(LOCATION, format!("/api/orders/{}", confirmation.uuid), true)
        .or_500("failed to set location header")?
        .status_code(StatusCode::CREATED);

    tracing::info!(
        order_uuid = %confirmation.uuid,
        order_number = %confirmation.order_number,
        total = confirmation.total,
        "placed order"
    );

    Ok(Json(OrderPlacedResponse {
        uuid: confirmation.uuid.into_uuid(),
        order_number: confirmation.order_number,
        total: confirmation.total,
        currency: confirmation.currency,
    }))
}
