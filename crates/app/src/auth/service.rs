//! Auth service.

use async_trait::async_trait;
use mockall::automock;
use sqlx::error::ErrorKind;
use tracing::warn;
use uuid::Uuid;

use crate::{
    auth::{
        ApiTokenSecret, ApiTokenVersion, AuthServiceError, IssuedApiToken,
        models::{NewApiToken, Principal},
        format_api_token, parse_api_token,
        repository::PgAuthRepository,
        token_hash,
    },
    database::Db,
    domain::customers::records::CustomerUuid,
};

#[derive(Debug, Clone)]
pub struct PgAuthService {
    db: Db,
    repository: PgAuthRepository,
}

impl PgAuthService {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self {
            db,
            repository: PgAuthRepository::new(),
        }
    }

    /// Issue a new API token for a customer. The raw token is only ever returned here.
    ///
    /// # Errors
    ///
    /// Returns [`AuthServiceError::UnknownCustomer`] if the customer does not exist, or a
    /// storage error.
    pub async fn issue_api_token(
        &self,
        customer_uuid: CustomerUuid,
    ) -> Result<IssuedApiToken, AuthServiceError> {
        let token_uuid = Uuid::now_v7();
        let version = ApiTokenVersion::V1;
        let secret = ApiTokenSecret::generate();
        let token = format_api_token(token_uuid, version, &secret);

        let mut tx = self.db.begin().await?;

        let metadata = self
            .repository
            .create_api_token(
                &mut tx,
                &NewApiToken {
                    uuid: token_uuid,
                    customer_uuid,
                    version,
                    token_hash: token_hash(&token_uuid, version, &customer_uuid, &secret),
                },
            )
            .await
            .map_err(|error| {
                if error
                    .as_database_error()
                    .is_some_and(|db| matches!(db.kind(), ErrorKind::ForeignKeyViolation))
                {
                    AuthServiceError::UnknownCustomer
                } else {
                    error.into()
                }
            })?;

        tx.commit().await?;

        Ok(IssuedApiToken { token, metadata })
    }

    /// Revoke a token by UUID. Returns `true` if the token was active.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn revoke_api_token(&self, token_uuid: Uuid) -> Result<bool, AuthServiceError> {
        let mut tx = self.db.begin().await?;

        let revoked = self
            .repository
            .revoke_api_token(&mut tx, token_uuid)
            .await?
            .is_some();

        tx.commit().await?;

        Ok(revoked)
    }

    async fn touch_api_token(&self, token_uuid: Uuid) -> Result<(), sqlx::Error> {
        let mut tx = self.db.begin().await?;

        self.repository.touch_api_token(&mut tx, token_uuid).await?;

        tx.commit().await
    }
}

#[async_trait]
impl AuthService for PgAuthService {
    async fn authenticate_bearer(&self, bearer_token: &str) -> Result<Principal, AuthServiceError> {
        let parsed = parse_api_token(bearer_token).map_err(|_err| AuthServiceError::NotFound)?;

        let mut tx = self.db.begin().await?;

        let token = self
            .repository
            .find_active_api_token(&mut tx, parsed.token_uuid)
            .await?
            .ok_or(AuthServiceError::NotFound)?;

        tx.commit().await?;

        if token.version != parsed.version {
            return Err(AuthServiceError::NotFound);
        }

        let expected = token_hash(
            &parsed.token_uuid,
            parsed.version,
            &token.principal.customer_uuid,
            &parsed.secret,
        );

        if expected != token.token_hash {
            return Err(AuthServiceError::NotFound);
        }

        if let Err(error) = self.touch_api_token(parsed.token_uuid).await {
            warn!(error = %error, token = %parsed.token_uuid, "failed to record token use");
        }

        Ok(token.principal)
    }
}

#[automock]
#[async_trait]
pub trait AuthService: Send + Sync {
    /// Resolve a bearer token to its principal. Unknown, revoked and malformed tokens are
    /// all [`AuthServiceError::NotFound`].
    async fn authenticate_bearer(&self, bearer_token: &str) -> Result<Principal, AuthServiceError>;
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use crate::{domain::customers::records::CustomerRole, test::TestContext};

    use super::*;

    #[tokio::test]
    async fn issued_token_authenticates_until_revoked() -> TestResult {
        let ctx = TestContext::new().await;
        let admin = ctx.create_customer("ops@example.com", CustomerRole::Admin).await?;

        let issued = ctx.auth.issue_api_token(admin.uuid).await?;

        let principal = ctx.auth.authenticate_bearer(&issued.token).await?;

        assert_eq!(principal.customer_uuid, admin.uuid);
        assert!(principal.is_admin(), "admin role should be resolved");

        assert!(ctx.auth.revoke_api_token(issued.metadata.uuid).await?);
        assert!(!ctx.auth.revoke_api_token(issued.metadata.uuid).await?);

        let result = ctx.auth.authenticate_bearer(&issued.token).await;

        assert!(
            matches!(result, Err(AuthServiceError::NotFound)),
            "expected NotFound after revocation, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn tampered_secret_is_rejected() -> TestResult {
        let ctx = TestContext::new().await;
        let customer = ctx.create_customer("jo@example.com", CustomerRole::Customer).await?;

        let issued = ctx.auth.issue_api_token(customer.uuid).await?;
        let (id, _) = issued.token.split_once('.').ok_or("token has no secret")?;
        let forged = format!("{id}.{}", "0".repeat(64));

        let result = ctx.auth.authenticate_bearer(&forged).await;

        assert!(
            matches!(result, Err(AuthServiceError::NotFound)),
            "expected NotFound, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn issuing_for_unknown_customer_fails() {
        let ctx = TestContext::new().await;

        let result = ctx.auth.issue_api_token(CustomerUuid::new()).await;

        assert!(
            matches!(result, Err(AuthServiceError::UnknownCustomer)),
            "expected UnknownCustomer, got {result:?}"
        );
    }

    #[tokio::test]
    async fn malformed_token_is_rejected_before_storage() {
        let ctx = TestContext::offline();

        let result = ctx.auth.authenticate_bearer("not-a-token").await;

        assert!(
            matches!(result, Err(AuthServiceError::NotFound)),
            "expected NotFound, got {result:?}"
        );
    }
}
