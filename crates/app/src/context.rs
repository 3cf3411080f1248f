//! App Context

use std::sync::Arc;

use thiserror::Error;

use crate::{
    auth::{AuthService, PgAuthService},
    database::{self, Db},
    domain::{
        carts::{CartsService, PgCartsService},
        checkout::{CheckoutService, PgCheckoutService},
        coupons::{CouponsService, PgCouponsService},
        orders::{OrdersService, PgOrdersService},
        products::{PgProductsService, ProductsService},
    },
    pricing::StorePricing,
};

#[derive(Debug, Error)]
pub enum AppInitError {
    #[error("failed to connect to database")]
    Database(#[source] sqlx::Error),
}

/// Every service the HTTP layer needs, behind trait objects so handlers can be tested with
/// mocks.
#[derive(Clone)]
pub struct AppContext {
    pub products: Arc<dyn ProductsService>,
    pub carts: Arc<dyn CartsService>,
    pub coupons: Arc<dyn CouponsService>,
    pub checkout: Arc<dyn CheckoutService>,
    pub orders: Arc<dyn OrdersService>,
    pub auth: Arc<dyn AuthService>,
}

impl AppContext {
    /// Build application context from a database URL.
    ///
    /// # Errors
    ///
    /// Returns an error when establishing a database connection fails.
    pub async fn from_database_url(url: &str, pricing: StorePricing) -> Result<Self, AppInitError> {
        let pool = database::connect(url)
            .await
            .map_err(AppInitError::Database)?;

        Ok(Self::from_db(&Db::new(pool), pricing))
    }

    /// Build application context over an existing pool handle.
    #[must_use]
    pub fn from_db(db: &Db, pricing: StorePricing) -> Self {
        Self {
            products: Arc::new(PgProductsService::new(db.clone())),
            carts: Arc::new(PgCartsService::new(db.clone(), pricing)),
            coupons: Arc::new(PgCouponsService::new(db.clone(), pricing)),
            checkout: Arc::new(PgCheckoutService::new(db.clone(), pricing)),
            orders: Arc::new(PgOrdersService::new(db.clone())),
            auth: Arc::new(PgAuthService::new(db.clone())),
        }
    }
}

impl std::fmt::Debug for AppContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppContext").finish_non_exhaustive()
    }
}
