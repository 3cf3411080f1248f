//! Auth repository.

use jiff_sqlx::Timestamp as SqlxTimestamp;
use sqlx::{FromRow, Postgres, Row, Transaction, postgres::PgRow, query, query_as};
use uuid::Uuid;

use crate::{
    auth::{
        ApiTokenVersion,
        models::{ActiveApiToken, ApiTokenMetadata, NewApiToken, Principal},
    },
    domain::customers::records::{CustomerRole, CustomerUuid},
};

const CREATE_API_TOKEN_SQL: &str = include_str!("sql/create_api_token.sql");
const FIND_ACTIVE_API_TOKEN_SQL: &str = include_str!("sql/find_active_api_token.sql");
const TOUCH_API_TOKEN_SQL: &str = include_str!("sql/touch_api_token.sql");
const REVOKE_API_TOKEN_SQL: &str = include_str!("sql/revoke_api_token.sql");

#[derive(Debug, Clone, Default)]
pub(crate) struct PgAuthRepository;

impl PgAuthRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    pub(crate) async fn create_api_token(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        token: &NewApiToken,
    ) -> Result<ApiTokenMetadata, sqlx::Error> {
        query_as::<Postgres, ApiTokenMetadata>(CREATE_API_TOKEN_SQL)
            .bind(token.uuid)
            .bind(token.customer_uuid.into_uuid())
            .bind(token.version.as_i16())
            .bind(&token.token_hash)
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn find_active_api_token(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        token_uuid: Uuid,
    ) -> Result<Option<ActiveApiToken>, sqlx::Error> {
        query_as::<Postgres, ActiveApiToken>(FIND_ACTIVE_API_TOKEN_SQL)
            .bind(token_uuid)
            .fetch_optional(&mut **tx)
            .await
    }

    pub(crate) async fn touch_api_token(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        token_uuid: Uuid,
    ) -> Result<(), sqlx::Error> {
        query(TOUCH_API_TOKEN_SQL)
            .bind(token_uuid)
            .execute(&mut **tx)
            .await?;

        Ok(())
    }

    pub(crate) async fn revoke_api_token(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        token_uuid: Uuid,
    ) -> Result<Option<ApiTokenMetadata>, sqlx::Error> {
        query_as::<Postgres, ApiTokenMetadata>(REVOKE_API_TOKEN_SQL)
            .bind(token_uuid)
            .fetch_optional(&mut **tx)
            .await
    }
}

impl<'r> FromRow<'r, PgRow> for ApiTokenMetadata {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        let version = ApiTokenVersion::try_from(row.try_get::<i16, _>("version")?).map_err(|e| {
            sqlx::Error::ColumnDecode {
                index: "version".to_string(),
                source: Box::new(e),
            }
        })?;

        Ok(Self {
            uuid: row.try_get("uuid")?,
            customer_uuid: CustomerUuid::from_uuid(row.try_get("customer_uuid")?),
            version,
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
            last_used_at: row
                .try_get::<Option<SqlxTimestamp>, _>("last_used_at")?
                .map(SqlxTimestamp::to_jiff),
            revoked_at: row
                .try_get::<Option<SqlxTimestamp>, _>("revoked_at")?
                .map(SqlxTimestamp::to_jiff),
        })
    }
}

impl<'r> FromRow<'r, PgRow> for ActiveApiToken {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        let version = ApiTokenVersion::try_from(row.try_get::<i16, _>("version")?).map_err(|e| {
            sqlx::Error::ColumnDecode {
                index: "version".to_string(),
                source: Box::new(e),
            }
        })?;

        let role = row
            .try_get::<String, _>("role")?
            .parse::<CustomerRole>()
            .map_err(|e| sqlx::Error::ColumnDecode {
                index: "role".to_string(),
                source: Box::new(e),
            })?;

        Ok(Self {
            principal: Principal {
                customer_uuid: CustomerUuid::from_uuid(row.try_get("customer_uuid")?),
                role,
            },
            version,
            token_hash: row.try_get("token_hash")?,
        })
    }
}
