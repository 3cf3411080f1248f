//! Admin Order Index Handler

use std::sync::Arc;

use salvo::prelude::*;

use crate::{
    extensions::*,
    orders::{errors::into_status_error, models::OrdersResponse},
    state::State,
};

/// Admin Order Index Handler
///
/// Lists every order, newest first.
#[endpoint(
    tags("admin"),
    summary = "List All Orders",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::OK, description = "All orders"),
        (status_code = StatusCode::UNAUTHORIZED, description = "Unauthorized"),
        (status_code = StatusCode::FORBIDDEN, description = "Admin role required"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
pub(crate) async fn handler(depot: &mut Depot) -> Result<Json<OrdersResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;

    let orders = state
        .app
        .orders
        .list_all_orders()
        .await
        .map_err(into_status_error)?;

    Ok(Json(orders.into()))
}
