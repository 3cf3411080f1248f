//! Orders Repository

use jiff_sqlx::Timestamp as SqlxTimestamp;
use sqlx::{FromRow, Postgres, Row, Transaction, postgres::PgRow, query_as};

use crate::{
    database::{try_get_amount, try_into_amount},
    domain::{
        orders::{
            data::{NewOrder, PaymentMethod, ShippingAddress},
            records::{OrderRecord, OrderStatus, OrderUuid},
        },
        owners::Owner,
    },
};

const CREATE_ORDER_SQL: &str = include_str!("../sql/create_order.sql");
const GET_ORDER_SQL: &str = include_str!("../sql/get_order.sql");
const GET_OWNER_ORDER_SQL: &str = include_str!("../sql/get_owner_order.sql");
const FIND_ORDER_BY_NUMBER_SQL: &str = include_str!("../sql/find_order_by_number.sql");
const LIST_ORDERS_SQL: &str = include_str!("../sql/list_orders.sql");
const LIST_OWNER_ORDERS_SQL: &str = include_str!("../sql/list_owner_orders.sql");
const LOCK_ORDER_SQL: &str = include_str!("../sql/lock_order.sql");
const UPDATE_ORDER_STATUS_SQL: &str = include_str!("../sql/update_order_status.sql");

#[derive(Debug, Clone, Default)]
pub(crate) struct PgOrdersRepository;

impl PgOrdersRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    pub(crate) async fn create_order(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        order: NewOrder,
    ) -> Result<OrderRecord, sqlx::Error> {
        let NewOrder {
            uuid,
            owner,
            totals,
            coupon_code,
            shipping_address: address,
            payment_method,
        } = order;

        query_as::<Postgres, OrderRecord>(CREATE_ORDER_SQL)
            .bind(uuid.into_uuid())
            .bind(owner.customer_uuid())
            .bind(owner.session_id())
            .bind(totals.currency)
            .bind(try_into_amount(totals.subtotal, "subtotal")?)
            .bind(try_into_amount(totals.discount, "discount")?)
            .bind(try_into_amount(totals.shipping, "shipping")?)
            .bind(try_into_amount(totals.tax, "tax")?)
            .bind(try_into_amount(totals.total, "total")?)
            .bind(coupon_code)
            .bind(address.name)
            .bind(address.line1)
            .bind(address.line2)
            .bind(address.city)
            .bind(address.region)
            .bind(address.postal_code)
            .bind(address.country)
            .bind(payment_method.as_str())
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn get_order(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        order: OrderUuid,
    ) -> Result<OrderRecord, sqlx::Error> {
        query_as::<Postgres, OrderRecord>(GET_ORDER_SQL)
            .bind(order.into_uuid())
            .fetch_one(&mut **tx)
            .await
    }

    /// Fetch an order only if it belongs to `owner`.
    pub(crate) async fn get_owner_order(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        owner: &Owner,
        order: OrderUuid,
    ) -> Result<OrderRecord, sqlx::Error> {
        query_as::<Postgres, OrderRecord>(GET_OWNER_ORDER_SQL)
            .bind(order.into_uuid())
            .bind(owner.customer_uuid())
            .bind(owner.session_id())
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn find_order_by_number(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        order_number: &str,
    ) -> Result<OrderRecord, sqlx::Error> {
        query_as::<Postgres, OrderRecord>(FIND_ORDER_BY_NUMBER_SQL)
            .bind(order_number)
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn list_orders(
        &self,
        tx: &mut Transaction<'_, Postgres>,
    ) -> Result<Vec<OrderRecord>, sqlx::Error> {
        query_as::<Postgres, OrderRecord>(LIST_ORDERS_SQL)
            .fetch_all(&mut **tx)
            .await
    }

    pub(crate) async fn list_owner_orders(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        owner: &Owner,
    ) -> Result<Vec<OrderRecord>, sqlx::Error> {
        query_as::<Postgres, OrderRecord>(LIST_OWNER_ORDERS_SQL)
            .bind(owner.customer_uuid())
            .bind(owner.session_id())
            .fetch_all(&mut **tx)
            .await
    }

    pub(crate) async fn lock_order(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        order: OrderUuid,
    ) -> Result<OrderRecord, sqlx::Error> {
        query_as::<Postgres, OrderRecord>(LOCK_ORDER_SQL)
            .bind(order.into_uuid())
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn update_status(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        order: OrderUuid,
        status: OrderStatus,
    ) -> Result<OrderRecord, sqlx::Error> {
        query_as::<Postgres, OrderRecord>(UPDATE_ORDER_STATUS_SQL)
            .bind(order.into_uuid())
            .bind(status.as_str())
            .fetch_one(&mut **tx)
            .await
    }
}

fn decode_error<E>(column: &str, source: E) -> sqlx::Error
where
    E: std::error::Error + Send + Sync + 'static,
{
    sqlx::Error::ColumnDecode {
        index: column.to_string(),
        source: Box::new(source),
    }
}

impl<'r> FromRow<'r, PgRow> for OrderRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        let owner = Owner::from_columns(row.try_get("customer_uuid")?, row.try_get("session_id")?)
            .ok_or_else(|| sqlx::Error::Decode("order must have exactly one owner".into()))?;

        let status = row
            .try_get::<String, _>("status")?
            .parse::<OrderStatus>()
            .map_err(|e| decode_error("status", e))?;

        let payment_method = row
            .try_get::<String, _>("payment_method")?
            .parse::<PaymentMethod>()
            .map_err(|e| decode_error("payment_method", e))?;

        Ok(Self {
            uuid: OrderUuid::from_uuid(row.try_get("uuid")?),
            order_number: row.try_get("order_number")?,
            owner,
            status,
            currency: row.try_get("currency")?,
            subtotal: try_get_amount(row, "subtotal")?,
            discount: try_get_amount(row, "discount")?,
            shipping: try_get_amount(row, "shipping")?,
            tax: try_get_amount(row, "tax")?,
            total: try_get_amount(row, "total")?,
            coupon_code: row.try_get("coupon_code")?,
            shipping_address: ShippingAddress {
                name: row.try_get("ship_name")?,
                line1: row.try_get("ship_line1")?,
                line2: row.try_get("ship_line2")?,
                city: row.try_get("ship_city")?,
                region: row.try_get("ship_region")?,
                postal_code: row.try_get("ship_postal_code")?,
                country: row.try_get("ship_country")?,
            },
            payment_method,
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
            updated_at: row.try_get::<SqlxTimestamp, _>("updated_at")?.to_jiff(),
        })
    }
}
