//! Order Items Repository

use sqlx::{FromRow, Postgres, Row, Transaction, postgres::PgRow, query, query_as};

use crate::{
    database::{try_get_amount, try_get_quantity, try_into_amount, try_into_quantity},
    domain::{
        orders::{
            data::NewOrderItem,
            records::{OrderItemRecord, OrderItemUuid, OrderUuid},
        },
        products::records::ProductUuid,
    },
};

const CREATE_ORDER_ITEM_SQL: &str = include_str!("../sql/create_order_item.sql");
const GET_ORDER_ITEMS_SQL: &str = include_str!("../sql/get_order_items.sql");

#[derive(Debug, Clone, Default)]
pub(crate) struct PgOrderItemsRepository;

impl PgOrderItemsRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    pub(crate) async fn create_order_items(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        order: OrderUuid,
        items: Vec<NewOrderItem>,
    ) -> Result<(), sqlx::Error> {
        for item in items {
            query(CREATE_ORDER_ITEM_SQL)
                .bind(item.uuid.into_uuid())
                .bind(order.into_uuid())
                .bind(item.product_uuid.into_uuid())
                .bind(item.sku)
                .bind(item.name)
                .bind(try_into_quantity(item.quantity)?)
                .bind(try_into_amount(item.unit_price, "unit_price")?)
                .bind(try_into_amount(item.line_total, "line_total")?)
                .execute(&mut **tx)
                .await?;
        }

        Ok(())
    }

    pub(crate) async fn get_order_items(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        order: OrderUuid,
    ) -> Result<Vec<OrderItemRecord>, sqlx::Error> {
        query_as::<Postgres, OrderItemRecord>(GET_ORDER_ITEMS_SQL)
            .bind(order.into_uuid())
            .fetch_all(&mut **tx)
            .await
    }
}

impl<'r> FromRow<'r, PgRow> for OrderItemRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            uuid: OrderItemUuid::from_uuid(row.try_get("uuid")?),
            product_uuid: ProductUuid::from_uuid(row.try_get("product_uuid")?),
            sku: row.try_get("sku")?,
            name: row.try_get("name")?,
            quantity: try_get_quantity(row, "quantity")?,
            unit_price: try_get_amount(row, "unit_price")?,
            line_total: try_get_amount(row, "line_total")?,
        })
    }
}
