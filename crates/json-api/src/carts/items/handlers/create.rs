//! Add Cart Item Handler

use std::sync::Arc;

use jiff::Timestamp;
use salvo::{
    oapi::{ToSchema, extract::JsonBody},
    prelude::*,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use scrubline_app::domain::carts::data::NewCartItem;

use crate::{
    carts::{errors::into_status_error, models::CartResponse},
    extensions::*,
    state::State,
};

/// Add Cart Item Request
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct AddCartItemRequest {
    pub product_uuid: Uuid,

    /// Between 1 and 999; merged into an existing line for the same product
    pub quantity: u32,
}

impl From<AddCartItemRequest> for NewCartItem {
    fn from(request: AddCartItemRequest) -> Self {
        NewCartItem {
            product_uuid: request.product_uuid.into(),
            quantity: request.quantity,
        }
    }
}

/// Add Cart Item Handler
///
/// Snapshots the product's current price into the cart.
#[endpoint(
    tags("cart"),
    summary = "Add Cart Item",
    security(("bearer_auth" = []), ("session_id" = [])),
    responses(
        (status_code = StatusCode::OK, description = "Repriced cart"),
        (status_code = StatusCode::NOT_FOUND, description = "Product not found"),
        (status_code = StatusCode::BAD_REQUEST, description = "Bad Request"),
        (status_code = StatusCode::UNAUTHORIZED, description = "Unauthorized"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
#[tracing::instrument(
    name = "carts.items.create",
    skip(json, depot),
    fields(
        product_uuid = tracing::field::Empty,
        quantity = tracing::field::Empty
    ),
    err
)]
pub(crate) async fn handler(
    json: JsonBody<AddCartItemRequest>,
    depot: &mut Depot,
) -> Result<Json<CartResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let owner = depot.owner_or_401()?;
    let request = json.into_inner();

    let span = tracing::Span::current();

    span.record("product_uuid", tracing::field::display(request.product_uuid));
    span.record("quantity", request.quantity);

    let cart = state
        .app
        .carts
        .add_item(owner, request.into(), Timestamp::now())
        .await
        .map_err(into_status_error)?;

    Ok(Json(cart.into()))
}

#[cfg(test)]
mod tests {
    use salvo::test::{ResponseExt, TestClient};
    use serde_json::json;
    use testresult::TestResult;

    use scrubline_app::domain::{
        carts::{CartsServiceError, MockCartsService},
        products::records::ProductUuid,
    };

    use crate::test_helpers::{Mocks, as_customer, customer_owner, make_priced_cart, service};

    use super::*;

    fn make_service(carts: MockCartsService) -> Service {
        service(
            Mocks {
                carts,
                ..Mocks::default()
            },
            as_customer,
            Router::with_path("cart/items").post(handler),
        )
    }

    #[tokio::test]
    async fn test_add_item_returns_repriced_cart() -> TestResult {
        let product = ProductUuid::new();
        let mut carts = MockCartsService::new();

        carts
            .expect_add_item()
            .once()
            .withf(move |owner, item, _| {
                *owner == customer_owner()
                    && *item
                        == NewCartItem {
                            product_uuid: product,
                            quantity: 2,
                        }
            })
            .return_once(|owner, _, _| Ok(make_priced_cart(owner, 2)));

        let mut res = TestClient::post("http://example.com/cart/items")
            .json(&json!({ "product_uuid": product.into_uuid(), "quantity": 2 }))
            .send(&make_service(carts))
            .await;

        let cart: CartResponse = res.take_json().await?;

        assert_eq!(res.status_code, Some(StatusCode::OK));
        assert_eq!(cart.totals.units, 2);
        assert_eq!(cart.totals.total, 87_00);

        Ok(())
    }

    #[tokio::test]
    async fn test_add_unknown_product_returns_404() -> TestResult {
        let mut carts = MockCartsService::new();

        carts
            .expect_add_item()
            .once()
            .return_once(|_, _, _| Err(CartsServiceError::ProductNotFound));

        let res = TestClient::post("http://example.com/cart/items")
            .json(&json!({ "product_uuid": ProductUuid::new().into_uuid(), "quantity": 1 }))
            .send(&make_service(carts))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::NOT_FOUND));

        Ok(())
    }

    #[tokio::test]
    async fn test_add_quantity_above_limit_returns_400() -> TestResult {
        let mut carts = MockCartsService::new();

        carts
            .expect_add_item()
            .once()
            .withf(|_, item, _| item.quantity == 1000)
            .return_once(|_, item, _| Err(CartsServiceError::InvalidQuantity(item.quantity)));

        let res = TestClient::post("http://example.com/cart/items")
            .json(&json!({ "product_uuid": ProductUuid::new().into_uuid(), "quantity": 1000 }))
            .send(&make_service(carts))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::BAD_REQUEST));

        Ok(())
    }

    #[tokio::test]
    async fn test_add_negative_quantity_returns_400() -> TestResult {
        let mut carts = MockCartsService::new();

        carts.expect_add_item().never();

        let res = TestClient::post("http://example.com/cart/items")
            .json(&json!({ "product_uuid": ProductUuid::new().into_uuid(), "quantity": -1 }))
            .send(&make_service(carts))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::BAD_REQUEST));

        Ok(())
    }
}
