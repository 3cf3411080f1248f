//! Clear Cart Handler

use std::sync::Arc;

use jiff::Timestamp;
use salvo::prelude::*;

use crate::{
    carts::{errors::into_status_error, models::CartResponse},
    extensions::*,
    state::State,
};

/// Clear Cart Handler
///
/// Removes every line and the attached coupon.
#[endpoint(
    tags("cart"),
    summary = "Clear Cart",
    security(("bearer_auth" = []), ("session_id" = [])),
    responses(
        (status_code = StatusCode::OK, description = "Emptied cart"),
        (status_code = StatusCode::UNAUTHORIZED, description = "Unauthorized"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
#[tracing::instrument(name = "carts.clear", skip(depot), err)]
pub(crate) async fn handler(depot: &mut Depot) -> Result<Json<CartResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let owner = depot.owner_or_401()?;

    let cart = state
        .app
        .carts
        .clear_cart(owner, Timestamp::now())
        .await
        .map_err(into_status_error)?;

    tracing::info!(cart_uuid = %cart.cart.uuid, "cleared cart");

    Ok(Json(cart.into()))
}

#[cfg(test)]
mod tests {
    use salvo::test::{ResponseExt, TestClient};
    use testresult::TestResult;

    use scrubline_app::domain::carts::{CartsServiceError, MockCartsService};

    use crate::test_helpers::{
        Mocks, as_customer, customer_owner, make_priced_cart, service, storage_error,
    };

    use super::*;

    fn make_service(carts: MockCartsService) -> Service {
        service(
            Mocks {
                carts,
                ..Mocks::default()
            },
            as_customer,
            Router::with_path("cart").delete(handler),
        )
    }

    #[tokio::test]
    async fn test_clear_cart_returns_empty_cart() -> TestResult {
        let mut carts = MockCartsService::new();

        carts
            .expect_clear_cart()
            .once()
            .withf(|owner, _| *owner == customer_owner())
            .return_once(|owner, _| Ok(make_priced_cart(owner, 0)));

        let mut res = TestClient::delete("http://example.com/cart")
            .send(&make_service(carts))
            .await;

        let cart: CartResponse = res.take_json().await?;

        assert_eq!(res.status_code, Some(StatusCode::OK));
        assert!(cart.items.is_empty(), "cart is empty");
        assert!(cart.coupon.is_none(), "coupon is cleared");
        assert_eq!(cart.totals.total, 0);

        Ok(())
    }

    #[tokio::test]
    async fn test_clear_cart_storage_error_returns_500() -> TestResult {
        let mut carts = MockCartsService::new();

        carts
            .expect_clear_cart()
            .once()
            .return_once(|_, _| Err(CartsServiceError::Sql(storage_error())));

        let res = TestClient::delete("http://example.com/cart")
            .send(&make_service(carts))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::INTERNAL_SERVER_ERROR));

        Ok(())
    }
}
