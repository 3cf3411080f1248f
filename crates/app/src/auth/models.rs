//! Auth data models.

use jiff::Timestamp;
use uuid::Uuid;

use crate::{
    auth::ApiTokenVersion,
    domain::{
        customers::records::{CustomerRole, CustomerUuid},
        owners::Owner,
    },
};

/// The authenticated caller behind a bearer token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Principal {
    pub customer_uuid: CustomerUuid,
    pub role: CustomerRole,
}

impl Principal {
    #[must_use]
    pub const fn is_admin(&self) -> bool {
        self.role.is_admin()
    }

    /// Carts and orders of this principal.
    #[must_use]
    pub fn owner(&self) -> Owner {
        Owner::Customer(self.customer_uuid)
    }
}

/// An unrevoked token as stored, with its owner's role.
#[derive(Debug, Clone)]
pub(crate) struct ActiveApiToken {
    pub principal: Principal,
    pub version: ApiTokenVersion,

    /// SHA-256 verifier for the token secret material.
    pub token_hash: String,
}

/// API token metadata persisted in storage.
#[derive(Debug, Clone)]
pub struct ApiTokenMetadata {
    pub uuid: Uuid,
    pub customer_uuid: CustomerUuid,
    pub version: ApiTokenVersion,
    pub created_at: Timestamp,
    pub last_used_at: Option<Timestamp>,
    pub revoked_at: Option<Timestamp>,
}

/// New API token persistence payload.
#[derive(Debug, Clone)]
pub(crate) struct NewApiToken {
    pub uuid: Uuid,
    pub customer_uuid: CustomerUuid,
    pub version: ApiTokenVersion,
    pub token_hash: String,
}

/// API token issuance result with one-time raw token.
#[derive(Debug, Clone)]
pub struct IssuedApiToken {
    pub token: String,
    pub metadata: ApiTokenMetadata,
}
