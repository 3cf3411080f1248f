//! Identity middleware.
//!
//! Resolves the caller to an [`Owner`]: a bearer token identifies a customer, otherwise
//! `X-Session-Id` identifies an anonymous shopper.

use std::sync::Arc;

use salvo::{http::header::AUTHORIZATION, prelude::*};
use scrubline_app::{
    auth::AuthServiceError,
    domain::owners::{Owner, SessionId},
};
use tracing::error;

use crate::{auth::SESSION_ID_HEADER, extensions::*, state::State};

#[salvo::handler]
pub(crate) async fn handler(
    req: &mut Request,
    depot: &mut Depot,
    res: &mut Response,
    ctrl: &mut FlowCtrl,
) {
    if req.headers().contains_key(AUTHORIZATION) {
        let Some(token) = extract_bearer_token(req) else {
            res.render(StatusError::unauthorized().brief("Missing or invalid Authorization header"));

            return;
        };

        let state = match depot.obtain::<Arc<State>>() {
            Ok(state) => state,
            Err(_error) => {
                res.render(StatusError::internal_server_error());

                return;
            }
        };

        let principal = match state.app.auth.authenticate_bearer(token).await {
            Ok(principal) => principal,
            Err(AuthServiceError::NotFound | AuthServiceError::Token(_)) => {
                res.render(StatusError::unauthorized().brief("Invalid API token"));

                return;
            }
            Err(AuthServiceError::UnknownCustomer) => {
                res.render(StatusError::unauthorized().brief("Unknown customer"));

                return;
            }
            Err(AuthServiceError::Sql(source)) => {
                error!("failed to validate api token: {source}");

                res.render(StatusError::internal_server_error());

                return;
            }
        };

        depot.insert_owner(principal.owner());
        depot.insert_principal(principal);
    } else {
        let Some(raw) = req.header::<String>(SESSION_ID_HEADER) else {
            res.render(
                StatusError::unauthorized().brief("Provide a bearer token or an X-Session-Id header"),
            );

            return;
        };

        match SessionId::parse(&raw) {
            Ok(session) => depot.insert_owner(Owner::Session(session)),
            Err(reason) => {
                res.render(StatusError::unauthorized().brief(reason.to_string()));

                return;
            }
        }
    }

    ctrl.call_next(req, depot, res).await;
}

fn extract_bearer_token(req: &Request) -> Option<&str> {
    let value = req.headers().get(AUTHORIZATION)?.to_str().ok()?;
    let mut parts = value.splitn(2, ' ');

    let scheme = parts.next()?;
    let token = parts.next()?.trim();

    if !scheme.eq_ignore_ascii_case("bearer") || token.is_empty() {
        return None;
    }

    Some(token)
}
