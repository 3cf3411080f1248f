//! Customer Records

use std::{fmt, str::FromStr};

use jiff::Timestamp;
use thiserror::Error;

use crate::uuids::TypedUuid;

/// Customer UUID
pub type CustomerUuid = TypedUuid<CustomerRecord>;

/// Customer Record
#[derive(Debug, Clone)]
pub struct CustomerRecord {
    pub uuid: CustomerUuid,
    pub email: String,
    pub name: String,
    pub role: CustomerRole,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// What a customer is allowed to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CustomerRole {
    /// Shops and manages their own cart and orders.
    Customer,

    /// Manages the catalog, coupons and every order.
    Admin,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown customer role {0:?}")]
pub struct UnknownRole(pub String);

impl CustomerRole {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Customer => "customer",
            Self::Admin => "admin",
        }
    }

    #[must_use]
    pub const fn is_admin(self) -> bool {
        matches!(self, Self::Admin)
    }
}

impl fmt::Display for CustomerRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CustomerRole {
    type Err = UnknownRole;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "customer" => Ok(Self::Customer),
            "admin" => Ok(Self::Admin),
            other => Err(UnknownRole(other.to_string())),
        }
    }
}
