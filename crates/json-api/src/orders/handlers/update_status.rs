//! Update Order Status Handler

use std::sync::Arc;

use salvo::{
    oapi::{
        ToSchema,
        extract::{JsonBody, PathParam},
    },
    prelude::*,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use scrubline_app::domain::orders::records::OrderStatus;

use crate::{
    extensions::*,
    orders::{errors::into_status_error, models::OrderResponse},
    state::State,
};

/// Update Order Status Request
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct UpdateOrderStatusRequest {
    /// `processing`, `shipped`, `delivered` or `cancelled`
    pub status: String,
}

/// Update Order Status Handler
///
/// Moves an order along `pending → processing → shipped → delivered`. Pending and
/// processing orders may be cancelled.
#[endpoint(
    tags("admin"),
    summary = "Update Order Status",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::OK, description = "Order updated"),
        (status_code = StatusCode::NOT_FOUND, description = "Order not found"),
        (status_code = StatusCode::CONFLICT, description = "Transition not allowed"),
        (status_code = StatusCode::BAD_REQUEST, description = "Bad Request"),
        (status_code = StatusCode::UNAUTHORIZED, description = "Unauthorized"),
        (status_code = StatusCode::FORBIDDEN, description = "Admin role required"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
#[tracing::instrument(
    name = "orders.update_status",
    skip(order, json, depot),
    fields(
        order_uuid = tracing::field::Empty,
        status = tracing::field::Empty
    ),
    err
)]
pub(crate) async fn handler(
    order: PathParam<Uuid>,
    json: JsonBody<UpdateOrderStatusRequest>,
    depot: &mut Depot,
) -> Result<Json<OrderResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let order = order.into_inner();

    let status = json
        .into_inner()
        .status
        .parse::<OrderStatus>()
        .or_400("invalid order status")?;

    let span = tracing::Span::current();

    span.record("order_uuid", tracing::field::display(order));
    span.record("status", status.as_str());

    let updated = state
        .app
        .orders
        .update_status(order.into(), status)
        .await
        .map_err(into_status_error)?;

    tracing::info!(order_uuid = %order, status = %updated.status, "updated order status");

    Ok(Json(updated.into()))
}

#[cfg(test)]
mod tests {
    use salvo::test::{ResponseExt, TestClient};
    use serde_json::json;
    use testresult::TestResult;

    use scrubline_app::domain::orders::{MockOrdersService, OrdersServiceError, records::OrderUuid};

    use crate::test_helpers::{Mocks, as_admin, make_order, service};

    use super::*;

    fn make_service(orders: MockOrdersService) -> Service {
        service(
            Mocks {
                orders,
                ..Mocks::default()
            },
            as_admin,
            Router::with_path("admin/orders/{order}/status").put(handler),
        )
    }

    #[tokio::test]
    async fn test_update_status_moves_order_forward() -> TestResult {
        let uuid = OrderUuid::new();
        let mut orders = MockOrdersService::new();

        orders
            .expect_update_status()
            .once()
            .withf(move |u, status| *u == uuid && *status == OrderStatus::Processing)
            .return_once(move |_, status| Ok(make_order(uuid, status)));

        let mut res = TestClient::put(format!("http://example.com/admin/orders/{uuid}/status"))
            .json(&json!({ "status": "processing" }))
            .send(&make_service(orders))
            .await;

        let order: OrderResponse = res.take_json().await?;

        assert_eq!(res.status_code, Some(StatusCode::OK));
        assert_eq!(order.status, "processing");

        Ok(())
    }

    #[tokio::test]
    async fn test_illegal_transition_returns_409() -> TestResult {
        let uuid = OrderUuid::new();
        let mut orders = MockOrdersService::new();

        orders.expect_update_status().once().return_once(|_, _| {
            Err(OrdersServiceError::InvalidTransition {
                from: OrderStatus::Delivered,
                to: OrderStatus::Pending,
            })
        });

        let res = TestClient::put(format!("http://example.com/admin/orders/{uuid}/status"))
            .json(&json!({ "status": "pending" }))
            .send(&make_service(orders))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::CONFLICT));

        Ok(())
    }

    #[tokio::test]
    async fn test_unknown_status_returns_400() -> TestResult {
        let mut orders = MockOrdersService::new();

        orders.expect_update_status().never();

        let res = TestClient::put(format!(
            "http://example.com/admin/orders/{}/status",
            OrderUuid::new()
        ))
        .json(&json!({ "status": "lost" }))
        .send(&make_service(orders))
        .await;

        assert_eq!(res.status_code, Some(StatusCode::BAD_REQUEST));

        Ok(())
    }

    #[tokio::test]
    async fn test_unknown_order_returns_404() -> TestResult {
        let mut orders = MockOrdersService::new();

        orders
            .expect_update_status()
            .once()
            .return_once(|_, _| Err(OrdersServiceError::NotFound));

        let res = TestClient::put(format!(
            "http://example.com/admin/orders/{}/status",
            OrderUuid::new()
        ))
        .json(&json!({ "status": "shipped" }))
        .send(&make_service(orders))
        .await;

        assert_eq!(res.status_code, Some(StatusCode::NOT_FOUND));

        Ok(())
    }
}
