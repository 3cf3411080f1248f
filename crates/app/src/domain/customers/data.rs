//! Customer Data

use crate::domain::customers::records::{CustomerRole, CustomerUuid};

/// New Customer Data
#[derive(Debug, Clone, PartialEq)]
pub struct NewCustomer {
    /// UUID to assign to the customer row.
    pub uuid: CustomerUuid,

    /// Login email, unique case-insensitively.
    pub email: String,

    /// Display name.
    pub name: String,

    /// Access role.
    pub role: CustomerRole,
}
