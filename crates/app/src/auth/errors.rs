//! Auth service errors.

use sqlx::Error;
use thiserror::Error;

use crate::auth::ApiTokenError;

#[derive(Debug, Error)]
pub enum AuthServiceError {
    #[error("token not found")]
    NotFound,

    #[error("customer not found")]
    UnknownCustomer,

    #[error("storage error")]
    Sql(#[source] Error),

    #[error("token processing error")]
    Token(#[from] ApiTokenError),
}

impl From<Error> for AuthServiceError {
    fn from(error: Error) -> Self {
        match error {
            Error::RowNotFound => Self::NotFound,
            error => Self::Sql(error),
        }
    }
}
