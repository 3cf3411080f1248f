//! Customers service.

use async_trait::async_trait;
use mockall::automock;

use crate::{
    database::Db,
    domain::customers::{
        data::NewCustomer,
        errors::CustomersServiceError,
        records::{CustomerRecord, CustomerUuid},
        repository::PgCustomersRepository,
    },
};

#[derive(Debug, Clone)]
pub struct PgCustomersService {
    db: Db,
    repository: PgCustomersRepository,
}

impl PgCustomersService {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self {
            db,
            repository: PgCustomersRepository::new(),
        }
    }
}

#[async_trait]
impl CustomersService for PgCustomersService {
    async fn create_customer(
        &self,
        customer: NewCustomer,
    ) -> Result<CustomerRecord, CustomersServiceError> {
        if customer.email.trim().is_empty() || customer.name.trim().is_empty() {
            return Err(CustomersServiceError::MissingRequiredData);
        }

        let mut tx = self.db.begin().await?;

        let created = self.repository.create_customer(&mut tx, customer).await?;

        tx.commit().await?;

        Ok(created)
    }

    async fn get_customer(
        &self,
        customer: CustomerUuid,
    ) -> Result<CustomerRecord, CustomersServiceError> {
        let mut tx = self.db.begin().await?;

        let customer = self.repository.get_customer(&mut tx, customer).await?;

        tx.commit().await?;

        Ok(customer)
    }
}

#[automock]
#[async_trait]
/// Customer account operations.
pub trait CustomersService: Send + Sync {
    /// Creates a new customer.
    async fn create_customer(
        &self,
        customer: NewCustomer,
    ) -> Result<CustomerRecord, CustomersServiceError>;

    /// Retrieve a single customer.
    async fn get_customer(
        &self,
        customer: CustomerUuid,
    ) -> Result<CustomerRecord, CustomersServiceError>;
}
