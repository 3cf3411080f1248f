//! Customers Repository

use jiff_sqlx::Timestamp as SqlxTimestamp;
use sqlx::{FromRow, Postgres, Row, Transaction, postgres::PgRow, query_as};

use crate::domain::customers::{
    data::NewCustomer,
    records::{CustomerRecord, CustomerRole, CustomerUuid},
};

const CREATE_CUSTOMER_SQL: &str = include_str!("sql/create_customer.sql");
const GET_CUSTOMER_SQL: &str = include_str!("sql/get_customer.sql");

#[derive(Debug, Clone, Default)]
pub(crate) struct PgCustomersRepository;

impl PgCustomersRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    pub(crate) async fn create_customer(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        customer: NewCustomer,
    ) -> Result<CustomerRecord, sqlx::Error> {
        query_as::<Postgres, CustomerRecord>(CREATE_CUSTOMER_SQL)
            .bind(customer.uuid.into_uuid())
            .bind(customer.email)
            .bind(customer.name)
            .bind(customer.role.as_str())
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn get_customer(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        customer: CustomerUuid,
    ) -> Result<CustomerRecord, sqlx::Error> {
        query_as::<Postgres, CustomerRecord>(GET_CUSTOMER_SQL)
            .bind(customer.into_uuid())
            .fetch_one(&mut **tx)
            .await
    }
}

impl<'r> FromRow<'r, PgRow> for CustomerRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        let role: String = row.try_get("role")?;

        Ok(Self {
            uuid: CustomerUuid::from_uuid(row.try_get("uuid")?),
            email: row.try_get("email")?,
            name: row.try_get("name")?,
            role: role
                .parse::<CustomerRole>()
                .map_err(|e| sqlx::Error::ColumnDecode {
                    index: "role".to_string(),
                    source: Box::new(e),
                })?,
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
            updated_at: row.try_get::<SqlxTimestamp, _>("updated_at")?.to_jiff(),
        })
    }
}
