//! Remove Cart Item Handler

use std::sync::Arc;

use jiff::Timestamp;
use salvo::{oapi::extract::PathParam, prelude::*};
use uuid::Uuid;

use crate::{
    carts::{errors::into_status_error, models::CartResponse},
    extensions::*,
    state::State,
};

/// Remove Cart Item Handler
#[endpoint(
    tags("cart"),
    summary = "Remove Cart Item",
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
    name = "carts.items.delete",
    skip(item, depot),
    fields(item_uuid = tracing::field::Empty),
    err
)]
pub(crate) async fn handler(
    item: PathParam<Uuid>,
    depot: &mut Depot,
) -> Result<Json<CartResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let owner = depot.owner_or_401()?;
    let item = item.into_inner();

    tracing::Span::current().record("item_uuid", tracing::field::display(item));

    let cart = state
        .app
        .carts
        .remove_item(owner, item.into(), Timestamp::now())
        .await
        .map_err(into_status_error)?;

    tracing::info!(item_uuid = %item, "removed cart item");

    Ok(Json(cart.into()))
}
