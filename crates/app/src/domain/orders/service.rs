//! Orders service.

use async_trait::async_trait;
use mockall::automock;
use tracing::info;

use crate::{
    database::Db,
    domain::{
        orders::{
            errors::OrdersServiceError,
            records::{OrderDetails, OrderRecord, OrderStatus, OrderUuid},
            repositories::{PgOrderItemsRepository, PgOrdersRepository},
        },
        owners::Owner,
    },
};

#[derive(Debug, Clone)]
pub struct PgOrdersService {
    db: Db,
    repository: PgOrdersRepository,
    items_repository: PgOrderItemsRepository,
}

impl PgOrdersService {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self {
            db,
            repository: PgOrdersRepository::new(),
            items_repository: PgOrderItemsRepository::new(),
        }
    }
}

#[async_trait]
impl OrdersService for PgOrdersService {
    async fn list_orders(&self, owner: Owner) -> Result<Vec<OrderRecord>, OrdersServiceError> {
        let mut tx = self.db.begin().await?;

        let orders = self.repository.list_owner_orders(&mut tx, &owner).await?;

        tx.commit().await?;

        Ok(orders)
    }

    async fn get_order(
        &self,
        owner: Owner,
        order: OrderUuid,
    ) -> Result<OrderDetails, OrdersServiceError> {
        let mut tx = self.db.begin().await?;

        let order = self
            .repository
            .get_owner_order(&mut tx, &owner, order)
            .await?;

        let items = self.items_repository.get_order_items(&mut tx, order.uuid).await?;

        tx.commit().await?;

        Ok(OrderDetails { order, items })
    }

    async fn list_all_orders(&self) -> Result<Vec<OrderRecord>, OrdersServiceError> {
        let mut tx = self.db.begin().await?;

        let orders = self.repository.list_orders(&mut tx).await?;

        tx.commit().await?;

        Ok(orders)
    }

    async fn find_order_by_number(
        &self,
        order_number: &str,
    ) -> Result<OrderDetails, OrdersServiceError> {
        let mut tx = self.db.begin().await?;

        let order = self
            .repository
            .find_order_by_number(&mut tx, order_number)
            .await?;

        let items = self.items_repository.get_order_items(&mut tx, order.uuid).await?;

        tx.commit().await?;

        Ok(OrderDetails { order, items })
    }

    async fn update_status(
        &self,
        order: OrderUuid,
        status: OrderStatus,
    ) -> Result<OrderRecord, OrdersServiceError> {
        let mut tx = self.db.begin().await?;

        let current = self.repository.lock_order(&mut tx, order).await?;

        if !current.status.can_transition_to(status) {
            return Err(OrdersServiceError::InvalidTransition {
                from: current.status,
                to: status,
            });
        }

        let updated = self.repository.update_status(&mut tx, order, status).await?;

        tx.commit().await?;

        info!(order = %updated.order_number, from = %current.status, to = %status, "order status changed");

        Ok(updated)
    }
}

#[automock]
#[async_trait]
pub trait OrdersService: Send + Sync {
    /// The owner's orders, newest first.
    async fn list_orders(&self, owner: Owner) -> Result<Vec<OrderRecord>, OrdersServiceError>;

    /// One of the owner's orders with its items. Other owners' orders are not found.
    async fn get_order(
        &self,
        owner: Owner,
        order: OrderUuid,
    ) -> Result<OrderDetails, OrdersServiceError>;

    /// Every order, newest first.
    async fn list_all_orders(&self) -> Result<Vec<OrderRecord>, OrdersServiceError>;

    /// Look an order up by its `SL-` number.
    async fn find_order_by_number(
        &self,
        order_number: &str,
    ) -> Result<OrderDetails, OrdersServiceError>;

    /// Move an order along its fulfilment lifecycle.
    async fn update_status(
        &self,
        order: OrderUuid,
        status: OrderStatus,
    ) -> Result<OrderRecord, OrdersServiceError>;
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use crate::{domain::owners::SessionId, test::TestContext};

    use super::*;

    fn session(raw: &str) -> Result<Owner, crate::domain::owners::SessionIdError> {
        SessionId::parse(raw).map(Owner::from)
    }

    #[tokio::test]
    async fn owner_sees_only_their_orders() -> TestResult {
        let ctx = TestContext::new().await;
        let mine = session("anon-session-1")?;
        let theirs = session("anon-session-2")?;

        let first = ctx.place_order(&mine, 40_00, 2).await?;
        let second = ctx.place_order(&mine, 12_00, 1).await?;
        let other = ctx.place_order(&theirs, 9_00, 1).await?;

        let orders = ctx.orders.list_orders(mine.clone()).await?;
        let uuids: Vec<OrderUuid> = orders.iter().map(|order| order.uuid).collect();

        assert_eq!(uuids, vec![second.uuid, first.uuid]);

        let result = ctx.orders.get_order(mine, other.uuid).await;

        assert!(
            matches!(result, Err(OrdersServiceError::NotFound)),
            "expected NotFound, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn order_details_include_item_snapshots() -> TestResult {
        let ctx = TestContext::new().await;
        let owner = session("anon-session-1")?;

        let placed = ctx.place_order(&owner, 40_00, 2).await?;

        let details = ctx.orders.get_order(owner, placed.uuid).await?;

        assert_eq!(details.order.order_number, placed.order_number);
        assert_eq!(details.order.status, OrderStatus::Pending);
        assert_eq!(details.order.total, 87_00);
        assert_eq!(details.items.len(), 1);
        assert_eq!(details.items.first().map(|item| item.line_total), Some(80_00));

        let by_number = ctx.orders.find_order_by_number(&placed.order_number).await?;

        assert_eq!(by_number.order.uuid, placed.uuid);

        Ok(())
    }

    #[tokio::test]
    async fn status_follows_fulfilment_lifecycle() -> TestResult {
        let ctx = TestContext::new().await;
        let owner = session("anon-session-1")?;
        let placed = ctx.place_order(&owner, 40_00, 2).await?;

        for status in [
            OrderStatus::Processing,
            OrderStatus::Shipped,
            OrderStatus::Delivered,
        ] {
            let updated = ctx.orders.update_status(placed.uuid, status).await?;

            assert_eq!(updated.status, status);
        }

        let result = ctx
            .orders
            .update_status(placed.uuid, OrderStatus::Cancelled)
            .await;

        assert!(
            matches!(
                result,
                Err(OrdersServiceError::InvalidTransition {
                    from: OrderStatus::Delivered,
                    to: OrderStatus::Cancelled,
                })
            ),
            "expected InvalidTransition, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn updating_unknown_order_returns_not_found() {
        let ctx = TestContext::new().await;

        let result = ctx
            .orders
            .update_status(OrderUuid::new(), OrderStatus::Processing)
            .await;

        assert!(
            matches!(result, Err(OrdersServiceError::NotFound)),
            "expected NotFound, got {result:?}"
        );
    }
}
