//! Update Cart Item Handler

use std::sync::Arc;

use jiff::Timestamp;
use salvo::{
    oapi::{
        ToSchema,
        extract::{JsonBody, PathParam},
    },
    prelude::*,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    carts::{errors::into_status_error, models::CartResponse},
    extensions::*,
    state::State,
};

/// Update Cart Item Request
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct UpdateCartItemRequest {
    /// Between 1 and 999
    pub quantity: u32,
}

/// Update Cart Item Handler
#[endpoint(
    tags("cart"),
    summary = "Update Cart Item Quantity",
    security(("bearer_auth" = []), ("session_id" = [])),
    responses(
        (status_code = StatusCode::OK, description = "Repriced cart"),
        (status_code = StatusCode::NOT_FOUND, description = "Cart item not found"),
        (status_code = StatusCode::BAD_REQUEST, description = "Bad Request"),
        (status_code = StatusCode::UNAUTHORIZED, description = "Unauthorized"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
#[tracing::instrument(
    name = "carts.items.update",
    skip(item, json, depot),
    fields(
        item_uuid = tracing::field::Empty,
        quantity = tracing::field::Empty
    ),
    err
)]
pub(crate) async fn handler(
    item: PathParam<Uuid>,
    json: JsonBody<UpdateCartItemRequest>,
    depot: &mut Depot,
) -> Result<Json<CartResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let owner = depot.owner_or_401()?;
    let item = item.into_inner();
    let quantity = json.into_inner().quantity;

    let span = tracing::Span::current();

    span.record("item_uuid", tracing::field::display(item));
    span.record("quantity", quantity);

    let cart = state
        .app
        .carts
        .update_item(owner, item.into(), quantity, Timestamp::now())
        .await
        .map_err(into_status_error)?;

    Ok(Json(cart.into()))
}
