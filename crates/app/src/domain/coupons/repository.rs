//! Coupons Repository

use jiff_sqlx::Timestamp as SqlxTimestamp;
use sqlx::{FromRow, Postgres, Row, Transaction, postgres::PgRow, query_as};

use crate::{
    database::{try_get_amount, try_into_amount},
    domain::coupons::{
        data::NewCoupon,
        records::{CouponRecord, CouponUuid, DiscountKind},
    },
};

const FIND_COUPON_BY_CODE_SQL: &str = include_str!("sql/find_coupon_by_code.sql");
const CREATE_COUPON_SQL: &str = include_str!("sql/create_coupon.sql");
const LIST_COUPONS_SQL: &str = include_str!("sql/list_coupons.sql");

#[derive(Debug, Clone, Default)]
pub(crate) struct PgCouponsRepository;

impl PgCouponsRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    pub(crate) async fn find_coupon_by_code(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        code: &str,
    ) -> Result<Option<CouponRecord>, sqlx::Error> {
        query_as::<Postgres, CouponRecord>(FIND_COUPON_BY_CODE_SQL)
            .bind(code)
            .fetch_optional(&mut **tx)
            .await
    }

    /// Insert a coupon; `coupon.code` must already be normalised.
    pub(crate) async fn create_coupon(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        coupon: NewCoupon,
    ) -> Result<CouponRecord, sqlx::Error> {
        let minimum_order = coupon
            .minimum_order
            .map(|minimum| try_into_amount(minimum, "minimum_order"))
            .transpose()?;

        query_as::<Postgres, CouponRecord>(CREATE_COUPON_SQL)
            .bind(coupon.uuid.into_uuid())
            .bind(coupon.code)
            .bind(coupon.discount.type_str())
            .bind(try_into_amount(coupon.discount.value(), "discount_value")?)
            .bind(minimum_order)
            .bind(coupon.expires_at.map(SqlxTimestamp::from))
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn list_coupons(
        &self,
        tx: &mut Transaction<'_, Postgres>,
    ) -> Result<Vec<CouponRecord>, sqlx::Error> {
        query_as::<Postgres, CouponRecord>(LIST_COUPONS_SQL)
            .fetch_all(&mut **tx)
            .await
    }
}

impl<'r> FromRow<'r, PgRow> for CouponRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        let discount_type: String = row.try_get("discount_type")?;
        let discount_value = try_get_amount(row, "discount_value")?;

        let discount = match discount_type.as_str() {
            "percentage" => DiscountKind::Percentage {
                basis_points: u32::try_from(discount_value).map_err(|e| {
                    sqlx::Error::ColumnDecode {
                        index: "discount_value".to_string(),
                        source: Box::new(e),
                    }
                })?,
            },
            "fixed_amount" => DiscountKind::FixedAmount {
                amount: discount_value,
            },
            other => {
                return Err(sqlx::Error::Decode(
                    format!("unknown discount type {other:?}").into(),
                ));
            }
        };

        let minimum_order = row
            .try_get::<Option<i64>, _>("minimum_order")?
            .map(|minimum| {
                u64::try_from(minimum).map_err(|e| sqlx::Error::ColumnDecode {
                    index: "minimum_order".to_string(),
                    source: Box::new(e),
                })
            })
            .transpose()?;

        Ok(Self {
            uuid: CouponUuid::from_uuid(row.try_get("uuid")?),
            code: row.try_get("code")?,
            discount,
            minimum_order,
            expires_at: row
                .try_get::<Option<SqlxTimestamp>, _>("expires_at")?
                .map(SqlxTimestamp::to_jiff),
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
        })
    }
}
