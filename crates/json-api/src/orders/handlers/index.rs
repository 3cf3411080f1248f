//! Order Index Handler

use std::sync::Arc;

use salvo::prelude::*;

use crate::{
    extensions::*,
    orders::{errors::into_status_error, models::OrdersResponse},
    state::State,
};

/// Order Index Handler
///
/// Lists the caller's orders, newest first.
#[endpoint(
    tags("orders"),
    summary = "List Orders",
    security(("bearer_auth" = []), ("session_id" = [])),
    responses(
        (status_code = StatusCode::OK, description = "The caller's orders"),
        (status_code = StatusCode::UNAUTHORIZED, description = "Unauthorized"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
pub(crate) async fn handler(depot: &mut Depot) -> Result<Json<OrdersResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let owner = depot.owner_or_401()?;

    let orders = state
        .app
        .orders
        .list_orders(owner)
        .await
        .map_err(into_status_error)?;

    Ok(Json(orders.into()))
}
