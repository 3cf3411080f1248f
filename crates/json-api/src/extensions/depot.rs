//! Depot helper extensions.

use std::any::Any;

use salvo::prelude::{Depot, StatusError};
use scrubline_app::{auth::Principal, domain::owners::Owner};

/// Helpers for storing the caller's identity and mapping depot extraction failures to HTTP
/// errors.
pub(crate) trait DepotExt {
    fn obtain_or_500<T: Any + Send + Sync>(&self) -> Result<&T, StatusError>;

    fn insert_owner(&mut self, owner: Owner);

    fn insert_principal(&mut self, principal: Principal);

    /// Cart and order owner resolved by the identity middleware.
    fn owner_or_401(&self) -> Result<Owner, StatusError>;

    /// Signed-in customer, absent for anonymous sessions.
    fn principal(&self) -> Option<&Principal>;
}

impl DepotExt for Depot {
    fn obtain_or_500<T: Any + Send + Sync>(&self) -> Result<&T, StatusError> {
        self.obtain::<T>()
            .map_err(|_ignored| StatusError::internal_server_error())
    }

    fn insert_owner(&mut self, owner: Owner) {
        self.inject(owner);
    }

    fn insert_principal(&mut self, principal: Principal) {
        self.inject(principal);
    }

    fn owner_or_401(&self) -> Result<Owner, StatusError> {
        self.obtain::<Owner>()
            .cloned()
            .map_err(|_ignored| StatusError::unauthorized().brief("Missing caller identity"))
    }

    fn principal(&self) -> Option<&Principal> {
        self.obtain::<Principal>().ok()
    }
}
