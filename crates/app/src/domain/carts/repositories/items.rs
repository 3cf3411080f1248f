//! Cart Items Repository

use jiff_sqlx::Timestamp as SqlxTimestamp;
use sqlx::{FromRow, Postgres, Row, Transaction, postgres::PgRow, query, query_as};

use crate::{
    database::{try_get_amount, try_get_quantity, try_into_amount, try_into_quantity},
    domain::{
        carts::records::{CartItemRecord, CartItemUuid, CartUuid},
        products::records::{ProductRecord, ProductUuid},
    },
};

const GET_CART_ITEMS_SQL: &str = include_str!("../sql/get_cart_items.sql");
const GET_LINE_QUANTITY_SQL: &str = include_str!("../sql/get_line_quantity.sql");
const UPSERT_CART_ITEM_SQL: &str = include_str!("../sql/upsert_cart_item.sql");
const UPDATE_CART_ITEM_SQL: &str = include_str!("../sql/update_cart_item.sql");
const DELETE_CART_ITEM_SQL: &str = include_str!("../sql/delete_cart_item.sql");
const DELETE_CART_ITEMS_SQL: &str = include_str!("../sql/delete_cart_items.sql");

#[derive(Debug, Clone, Default)]
pub(crate) struct PgCartItemsRepository;

impl PgCartItemsRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    pub(crate) async fn get_cart_items(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        cart: CartUuid,
    ) -> Result<Vec<CartItemRecord>, sqlx::Error> {
        query_as::<Postgres, CartItemRecord>(GET_CART_ITEMS_SQL)
            .bind(cart.into_uuid())
            .fetch_all(&mut **tx)
            .await
    }

    /// Quantity already in the cart for a product, or 0 when it has no line.
    pub(crate) async fn line_quantity(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        cart: CartUuid,
        product: ProductUuid,
    ) -> Result<u32, sqlx::Error> {
        let row = query(GET_LINE_QUANTITY_SQL)
            .bind(cart.into_uuid())
            .bind(product.into_uuid())
            .fetch_optional(&mut **tx)
            .await?;

        row.map_or(Ok(0), |row| try_get_quantity(&row, "quantity"))
    }

    /// Add a product line, merging quantities with an existing line for the same product and
    /// refreshing its price snapshot.
    pub(crate) async fn upsert_cart_item(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        cart: CartUuid,
        product: &ProductRecord,
        quantity: u32,
    ) -> Result<(), sqlx::Error> {
        query(UPSERT_CART_ITEM_SQL)
            .bind(CartItemUuid::new().into_uuid())
            .bind(cart.into_uuid())
            .bind(product.uuid.into_uuid())
            .bind(try_into_quantity(quantity)?)
            .bind(try_into_amount(product.price, "unit_price")?)
            .execute(&mut **tx)
            .await?;

        Ok(())
    }

    pub(crate) async fn update_cart_item(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        cart: CartUuid,
        item: CartItemUuid,
        quantity: u32,
    ) -> Result<u64, sqlx::Error> {
        let rows_affected = query(UPDATE_CART_ITEM_SQL)
            .bind(item.into_uuid())
            .bind(cart.into_uuid())
            .bind(try_into_quantity(quantity)?)
            .execute(&mut **tx)
            .await?
            .rows_affected();

        Ok(rows_affected)
    }

    pub(crate) async fn delete_cart_item(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        cart: CartUuid,
        item: CartItemUuid,
    ) -> Result<u64, sqlx::Error> {
        let rows_affected = query(DELETE_CART_ITEM_SQL)
            .bind(item.into_uuid())
            .bind(cart.into_uuid())
            .execute(&mut **tx)
            .await?
            .rows_affected();

        Ok(rows_affected)
    }

    pub(crate) async fn delete_cart_items(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        cart: CartUuid,
    ) -> Result<u64, sqlx::Error> {
        let rows_affected = query(DELETE_CART_ITEMS_SQL)
            .bind(cart.into_uuid())
            .execute(&mut **tx)
            .await?
            .rows_affected();

        Ok(rows_affected)
    }
}

impl<'r> FromRow<'r, PgRow> for CartItemRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            uuid: CartItemUuid::from_uuid(row.try_get("uuid")?),
            product_uuid: ProductUuid::from_uuid(row.try_get("product_uuid")?),
            sku: row.try_get("sku")?,
            name: row.try_get("name")?,
            quantity: try_get_quantity(row, "quantity")?,
            unit_price: try_get_amount(row, "unit_price")?,
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
            updated_at: row.try_get::<SqlxTimestamp, _>("updated_at")?.to_jiff(),
        })
    }
}
