//! Owners
//!
//! Carts and orders belong either to a signed-in customer or to an anonymous browser session.

use std::fmt;

use thiserror::Error;
use uuid::Uuid;

use crate::domain::customers::records::CustomerUuid;

/// Shortest accepted session id.
pub const MIN_SESSION_ID_LEN: usize = 8;

/// Longest accepted session id.
pub const MAX_SESSION_ID_LEN: usize = 128;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionIdError {
    #[error("session id must be between {MIN_SESSION_ID_LEN} and {MAX_SESSION_ID_LEN} characters")]
    Length,

    #[error("session id may only contain letters, digits, '-' and '_'")]
    InvalidCharacter,
}

/// Opaque anonymous session identifier supplied by the client.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionId(String);

impl SessionId {
    /// Validate a client supplied session id.
    ///
    /// # Errors
    ///
    /// Returns a [`SessionIdError`] when the id has the wrong length or contains characters
    /// other than ASCII letters, digits, `-` and `_`.
    pub fn parse(raw: &str) -> Result<Self, SessionIdError> {
        if !(MIN_SESSION_ID_LEN..=MAX_SESSION_ID_LEN).contains(&raw.len()) {
            return Err(SessionIdError::Length);
        }

        if !raw
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
        {
            return Err(SessionIdError::InvalidCharacter);
        }

        Ok(Self(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Whoever a cart or order belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Owner {
    Customer(CustomerUuid),
    Session(SessionId),
}

impl Owner {
    /// Customer column value, `None` for sessions.
    pub fn customer_uuid(&self) -> Option<Uuid> {
        match self {
            Self::Customer(uuid) => Some(uuid.into_uuid()),
            Self::Session(_) => None,
        }
    }

    /// Session column value, `None` for customers.
    pub fn session_id(&self) -> Option<&str> {
        match self {
            Self::Customer(_) => None,
            Self::Session(session) => Some(session.as_str()),
        }
    }

    /// Rebuild an owner from its two nullable columns.
    ///
    /// Returns `None` unless exactly one of them is set.
    pub fn from_columns(customer_uuid: Option<Uuid>, session_id: Option<String>) -> Option<Self> {
        match (customer_uuid, session_id) {
            (Some(uuid), None) => Some(Self::Customer(CustomerUuid::from_uuid(uuid))),
            (None, Some(session)) => Some(Self::Session(SessionId(session))),
            _ => None,
        }
    }
}

impl From<CustomerUuid> for Owner {
    fn from(value: CustomerUuid) -> Self {
        Self::Customer(value)
    }
}

impl From<SessionId> for Owner {
    fn from(value: SessionId) -> Self {
        Self::Session(value)
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    #[test]
    fn session_id_accepts_url_safe_characters() -> TestResult {
        let session = SessionId::parse("b3f1-9a_c2d4")?;

        assert_eq!(session.as_str(), "b3f1-9a_c2d4");

        Ok(())
    }

    #[test]
    fn session_id_rejects_short_and_long_values() {
        assert_eq!(SessionId::parse("abc"), Err(SessionIdError::Length));
        assert_eq!(
            SessionId::parse(&"a".repeat(129)),
            Err(SessionIdError::Length)
        );
    }

    #[test]
    fn session_id_rejects_other_characters() {
        assert_eq!(
            SessionId::parse("session id with spaces"),
            Err(SessionIdError::InvalidCharacter)
        );
    }

    #[test]
    fn owner_exposes_exactly_one_column() -> TestResult {
        let customer = Owner::from(CustomerUuid::new());
        let session = Owner::from(SessionId::parse("anon-session-1")?);

        assert!(customer.customer_uuid().is_some(), "customer column set");
        assert!(customer.session_id().is_none(), "session column unset");
        assert!(session.customer_uuid().is_none(), "customer column unset");
        assert_eq!(session.session_id(), Some("anon-session-1"));

        Ok(())
    }

    #[test]
    fn from_columns_requires_exactly_one_owner() {
        assert!(Owner::from_columns(None, None).is_none(), "no owner");
        assert!(
            Owner::from_columns(Some(Uuid::now_v7()), Some("anon-session-1".to_string())).is_none(),
            "both owners"
        );
        assert!(
            matches!(
                Owner::from_columns(None, Some("anon-session-1".to_string())),
                Some(Owner::Session(_))
            ),
            "session owner"
        );
    }
}
