//! Checkout service.

use async_trait::async_trait;
use jiff::Timestamp;
use mockall::automock;
use tracing::{info, warn};

use crate::{
    database::Db,
    domain::{
        carts::{
            reader::CartReader,
            repositories::{PgCartItemsRepository, PgCartsRepository},
        },
        checkout::{
            data::{CheckoutRequest, snapshot_matches},
            errors::CheckoutServiceError,
            records::OrderConfirmation,
        },
        orders::{
            data::{NewOrder, NewOrderItem},
            records::{OrderItemUuid, OrderUuid},
            repositories::{PgOrderItemsRepository, PgOrdersRepository},
        },
        owners::Owner,
    },
    pricing::StorePricing,
};

#[derive(Debug, Clone)]
pub struct PgCheckoutService {
    db: Db,
    pricing: StorePricing,
    carts_repository: PgCartsRepository,
    cart_items_repository: PgCartItemsRepository,
    orders_repository: PgOrdersRepository,
    order_items_repository: PgOrderItemsRepository,
    reader: CartReader,
}

impl PgCheckoutService {
    #[must_use]
    pub fn new(db: Db, pricing: StorePricing) -> Self {
        Self {
            db,
            pricing,
            carts_repository: PgCartsRepository::new(),
            cart_items_repository: PgCartItemsRepository::new(),
            orders_repository: PgOrdersRepository::new(),
            order_items_repository: PgOrderItemsRepository::new(),
            reader: CartReader::new(),
        }
    }
}

#[async_trait]
impl CheckoutService for PgCheckoutService {
    async fn checkout(
        &self,
        owner: Owner,
        request: CheckoutRequest,
        now: Timestamp,
    ) -> Result<OrderConfirmation, CheckoutServiceError> {
        request.shipping_address.validate()?;

        if request.items.is_empty() {
            return Err(CheckoutServiceError::EmptyCart);
        }

        let mut tx = self.db.begin().await?;

        let cart = self
            .carts_repository
            .lock_cart(&mut tx, &owner)
            .await
            .map_err(|error| match error {
                sqlx::Error::RowNotFound => CheckoutServiceError::EmptyCart,
                other => other.into(),
            })?;

        let priced = self
            .reader
            .price::<CheckoutServiceError>(&mut tx, cart, &self.pricing, now)
            .await?;

        if !priced.totals.can_checkout() {
            return Err(CheckoutServiceError::EmptyCart);
        }

        if !snapshot_matches(&request.items, &priced.items)
            || request.expected_total != priced.totals.total
        {
            warn!(
                cart = %priced.cart.uuid,
                expected_total = request.expected_total,
                total = priced.totals.total,
                "stale checkout rejected"
            );

            return Err(CheckoutServiceError::StaleCart);
        }

        let coupon_code = priced
            .coupon
            .as_ref()
            .filter(|coupon| coupon.active)
            .map(|coupon| coupon.code.clone());

        let order = self
            .orders_repository
            .create_order(
                &mut tx,
                NewOrder {
                    uuid: OrderUuid::new(),
                    owner,
                    totals: priced.totals,
                    coupon_code,
                    shipping_address: request.shipping_address,
                    payment_method: request.payment_method,
                },
            )
            .await?;

        let items = priced
            .items
            .iter()
            .map(|item| {
                let line_total = item.line_total().ok_or(CheckoutServiceError::InvalidData)?;

                Ok(NewOrderItem {
                    uuid: OrderItemUuid::new(),
                    product_uuid: item.product_uuid,
                    sku: item.sku.clone(),
                    name: item.name.clone(),
                    quantity: item.quantity,
                    unit_price: item.unit_price,
                    line_total,
                })
            })
            .collect::<Result<Vec<_>, CheckoutServiceError>>()?;

        self.order_items_repository
            .create_order_items(&mut tx, order.uuid, items)
            .await?;

        self.cart_items_repository
            .delete_cart_items(&mut tx, priced.cart.uuid)
            .await?;

        self.carts_repository
            .set_coupon(&mut tx, priced.cart.uuid, None)
            .await?;

        tx.commit().await?;

        info!(order = %order.order_number, total = order.total, "order placed");

        Ok(OrderConfirmation {
            uuid: order.uuid,
            order_number: order.order_number,
            total: order.total,
            currency: order.currency,
        })
    }
}

#[automock]
#[async_trait]
pub trait CheckoutService: Send + Sync {
    /// Turn the owner's cart into a pending order and empty the cart.
    ///
    /// The cart is repriced first; the request must match it exactly.
    async fn checkout(
        &self,
        owner: Owner,
        request: CheckoutRequest,
        now: Timestamp,
    ) -> Result<OrderConfirmation, CheckoutServiceError>;
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use crate::{
        domain::{
            carts::{CartsService, data::NewCartItem},
            checkout::data::CheckoutItemSnapshot,
            coupons::CouponsService,
            orders::{
                OrdersService,
                data::{MissingAddressField, PaymentMethod, ShippingAddress},
                records::OrderStatus,
            },
            owners::SessionId,
            products::records::ProductUuid,
        },
        test::{TestContext, helpers::shipping_address},
    };

    use super::*;

    fn session(raw: &str) -> Result<Owner, crate::domain::owners::SessionIdError> {
        SessionId::parse(raw).map(Owner::from)
    }

    async fn request_for(ctx: &TestContext, owner: &Owner) -> TestResult<CheckoutRequest> {
        let cart = ctx.carts.get_cart(owner.clone(), Timestamp::now()).await?;

        Ok(CheckoutRequest {
            items: cart.items.iter().map(CheckoutItemSnapshot::from).collect(),
            expected_total: cart.totals.total,
            shipping_address: shipping_address(),
            payment_method: PaymentMethod::Card,
        })
    }

    async fn add(ctx: &TestContext, owner: &Owner, price: u64, quantity: u32) -> TestResult {
        let product = ctx.create_product(price).await?;

        ctx.carts
            .add_item(
                owner.clone(),
                NewCartItem {
                    product_uuid: product.uuid,
                    quantity,
                },
                Timestamp::now(),
            )
            .await?;

        Ok(())
    }

    #[tokio::test]
    async fn checkout_creates_order_and_clears_cart() -> TestResult {
        let ctx = TestContext::new().await;
        let owner = session("anon-session-1")?;

        add(&ctx, &owner, 40_00, 2).await?;
        ctx.create_percentage_coupon("SAVE20", 2_000).await?;
        ctx.coupons
            .apply_coupon(owner.clone(), "SAVE20", Timestamp::now())
            .await?;

        let request = request_for(&ctx, &owner).await?;
        let confirmation = ctx
            .checkout
            .checkout(owner.clone(), request, Timestamp::now())
            .await?;

        assert!(confirmation.order_number.starts_with("SL-"));
        assert_eq!(confirmation.order_number.len(), 11);
        assert_eq!(confirmation.total, 69_60);
        assert_eq!(confirmation.currency, "USD");

        let details = ctx.orders.get_order(owner.clone(), confirmation.uuid).await?;

        assert_eq!(details.order.status, OrderStatus::Pending);
        assert_eq!(details.order.coupon_code.as_deref(), Some("SAVE20"));
        assert_eq!(details.order.discount, 16_00);
        assert_eq!(details.items.len(), 1);

        let cart = ctx.carts.get_cart(owner, Timestamp::now()).await?;

        assert!(cart.items.is_empty(), "cart should be emptied");
        assert!(cart.coupon.is_none(), "coupon should be cleared");

        Ok(())
    }

    #[tokio::test]
    async fn stale_total_is_rejected_and_cart_kept() -> TestResult {
        let ctx = TestContext::new().await;
        let owner = session("anon-session-1")?;

        add(&ctx, &owner, 40_00, 2).await?;

        let mut request = request_for(&ctx, &owner).await?;
        request.expected_total -= 1;

        let result = ctx
            .checkout
            .checkout(owner.clone(), request, Timestamp::now())
            .await;

        assert!(
            matches!(result, Err(CheckoutServiceError::StaleCart)),
            "expected StaleCart, got {result:?}"
        );

        let cart = ctx.carts.get_cart(owner.clone(), Timestamp::now()).await?;

        assert_eq!(cart.items.len(), 1, "cart retained");
        assert!(ctx.orders.list_orders(owner).await?.is_empty(), "no order");

        Ok(())
    }

    #[tokio::test]
    async fn stale_items_are_rejected() -> TestResult {
        let ctx = TestContext::new().await;
        let owner = session("anon-session-1")?;

        add(&ctx, &owner, 40_00, 2).await?;

        let mut request = request_for(&ctx, &owner).await?;

        request.items.push(CheckoutItemSnapshot {
            product_uuid: ProductUuid::new(),
            quantity: 1,
            unit_price: 1_00,
        });

        let result = ctx
            .checkout
            .checkout(owner, request, Timestamp::now())
            .await;

        assert!(
            matches!(result, Err(CheckoutServiceError::StaleCart)),
            "expected StaleCart, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn empty_cart_cannot_checkout() -> TestResult {
        let ctx = TestContext::new().await;
        let owner = session("anon-session-1")?;

        ctx.carts.get_cart(owner.clone(), Timestamp::now()).await?;

        let result = ctx
            .checkout
            .checkout(
                owner,
                CheckoutRequest {
                    items: vec![CheckoutItemSnapshot {
                        product_uuid: ProductUuid::new(),
                        quantity: 1,
                        unit_price: 1_00,
                    }],
                    expected_total: 1_00,
                    shipping_address: shipping_address(),
                    payment_method: PaymentMethod::Card,
                },
                Timestamp::now(),
            )
            .await;

        assert!(
            matches!(result, Err(CheckoutServiceError::EmptyCart)),
            "expected EmptyCart, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn inactive_coupon_is_not_recorded_on_order() -> TestResult {
        let ctx = TestContext::new().await;
        let owner = session("anon-session-1")?;

        add(&ctx, &owner, 40_00, 2).await?;
        ctx.create_percentage_coupon("SAVE20", 2_000).await?;
        ctx.coupons
            .apply_coupon(owner.clone(), "SAVE20", Timestamp::now())
            .await?;

        sqlx::query("UPDATE coupons SET expires_at = now() - interval '1 hour'")
            .execute(ctx.db.pool())
            .await?;

        let request = request_for(&ctx, &owner).await?;
        let confirmation = ctx
            .checkout
            .checkout(owner.clone(), request, Timestamp::now())
            .await?;

        let details = ctx.orders.get_order(owner, confirmation.uuid).await?;

        assert_eq!(details.order.coupon_code, None);
        assert_eq!(details.order.discount, 0);
        assert_eq!(details.order.total, 87_00);

        Ok(())
    }

    #[tokio::test]
    async fn blank_address_is_rejected_before_storage() -> TestResult {
        let ctx = TestContext::offline();

        let result = ctx
            .checkout
            .checkout(
                session("anon-session-1")?,
                CheckoutRequest {
                    items: Vec::new(),
                    expected_total: 0,
                    shipping_address: ShippingAddress {
                        postal_code: String::new(),
                        ..shipping_address()
                    },
                    payment_method: PaymentMethod::Card,
                },
                Timestamp::now(),
            )
            .await;

        assert!(
            matches!(
                result,
                Err(CheckoutServiceError::InvalidAddress(MissingAddressField(
                    "postal_code"
                )))
            ),
            "expected InvalidAddress, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn empty_request_is_rejected_before_storage() -> TestResult {
        let ctx = TestContext::offline();

        let result = ctx
            .checkout
            .checkout(
                session("anon-session-1")?,
                CheckoutRequest {
                    items: Vec::new(),
                    expected_total: 0,
                    shipping_address: shipping_address(),
                    payment_method: PaymentMethod::Card,
                },
                Timestamp::now(),
            )
            .await;

        assert!(
            matches!(result, Err(CheckoutServiceError::EmptyCart)),
            "expected EmptyCart, got {result:?}"
        );

        Ok(())
    }
}
