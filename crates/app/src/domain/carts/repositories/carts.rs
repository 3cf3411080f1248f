//! Carts Repository

use jiff_sqlx::Timestamp as SqlxTimestamp;
use sqlx::{FromRow, Postgres, Row, Transaction, postgres::PgRow, query, query_as};

use crate::domain::{
    carts::records::{CartRecord, CartUuid},
    owners::Owner,
};

const ENSURE_CART_SQL: &str = include_str!("../sql/ensure_cart.sql");
const LOCK_CART_SQL: &str = include_str!("../sql/lock_cart.sql");
const SET_CART_COUPON_SQL: &str = include_str!("../sql/set_cart_coupon.sql");

#[derive(Debug, Clone, Default)]
pub(crate) struct PgCartsRepository;

impl PgCartsRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    /// Lock the owner's cart, creating an empty one first if needed.
    pub(crate) async fn ensure_cart(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        owner: &Owner,
    ) -> Result<CartRecord, sqlx::Error> {
        query(ENSURE_CART_SQL)
            .bind(CartUuid::new().into_uuid())
            .bind(owner.customer_uuid())
            .bind(owner.session_id())
            .execute(&mut **tx)
            .await?;

        self.lock_cart(tx, owner).await
    }

    /// Lock the owner's existing cart.
    pub(crate) async fn lock_cart(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        owner: &Owner,
    ) -> Result<CartRecord, sqlx::Error> {
        query_as::<Postgres, CartRecord>(LOCK_CART_SQL)
            .bind(owner.customer_uuid())
            .bind(owner.session_id())
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn set_coupon(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        cart: CartUuid,
        coupon_code: Option<&str>,
    ) -> Result<CartRecord, sqlx::Error> {
        query_as::<Postgres, CartRecord>(SET_CART_COUPON_SQL)
            .bind(cart.into_uuid())
            .bind(coupon_code)
            .fetch_one(&mut **tx)
            .await
    }
}

impl<'r> FromRow<'r, PgRow> for CartRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        let owner = Owner::from_columns(row.try_get("customer_uuid")?, row.try_get("session_id")?)
            .ok_or_else(|| sqlx::Error::Decode("cart must have exactly one owner".into()))?;

        Ok(Self {
            uuid: CartUuid::from_uuid(row.try_get("uuid")?),
            owner,
            coupon_code: row.try_get("coupon_code")?,
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
            updated_at: row.try_get::<SqlxTimestamp, _>("updated_at")?.to_jiff(),
        })
    }
}
