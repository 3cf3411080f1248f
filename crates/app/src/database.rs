//! Database connection management

use sqlx::{PgPool, Postgres, Row, Transaction, migrate::MigrateError, postgres::PgRow};

/// Migrations embedded from the workspace `migrations/` directory.
pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("../../migrations");

/// Shared connection pool handle.
#[derive(Debug, Clone)]
pub struct Db {
    pool: PgPool,
}

impl Db {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Begin a transaction.
    ///
    /// # Errors
    ///
    /// Returns an error when a connection cannot be acquired or the transaction fails to start.
    pub async fn begin(&self) -> Result<Transaction<'static, Postgres>, sqlx::Error> {
        self.pool.begin().await
    }

    /// Underlying pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

/// Connect to `PostgreSQL`.
///
/// # Errors
///
/// Returns an error if the connection cannot be established.
pub async fn connect(database_url: &str) -> Result<PgPool, sqlx::Error> {
    PgPool::connect(database_url).await
}

/// Apply pending migrations.
///
/// # Errors
///
/// Returns an error if a migration fails or the applied history diverges from the embedded set.
pub async fn migrate(pool: &PgPool) -> Result<(), MigrateError> {
    MIGRATOR.run(pool).await
}

/// Read a non-negative `BIGINT` amount column.
pub(crate) fn try_get_amount(row: &PgRow, col: &str) -> Result<u64, sqlx::Error> {
    let amount_i64: i64 = row.try_get(col)?;

    u64::try_from(amount_i64).map_err(|e| sqlx::Error::ColumnDecode {
        index: col.to_string(),
        source: Box::new(e),
    })
}

/// Convert an amount for binding to a `BIGINT` column.
pub(crate) fn try_into_amount(amount: u64, col: &str) -> Result<i64, sqlx::Error> {
    i64::try_from(amount).map_err(|e| sqlx::Error::ColumnDecode {
        index: col.to_string(),
        source: Box::new(e),
    })
}

/// Read a positive `INTEGER` quantity column.
pub(crate) fn try_get_quantity(row: &PgRow, col: &str) -> Result<u32, sqlx::Error> {
    let quantity_i32: i32 = row.try_get(col)?;

    u32::try_from(quantity_i32).map_err(|e| sqlx::Error::ColumnDecode {
        index: col.to_string(),
        source: Box::new(e),
    })
}

/// Convert a quantity for binding to an `INTEGER` column.
pub(crate) fn try_into_quantity(quantity: u32) -> Result<i32, sqlx::Error> {
    i32::try_from(quantity).map_err(|e| sqlx::Error::ColumnDecode {
        index: "quantity".to_string(),
        source: Box::new(e),
    })
}
