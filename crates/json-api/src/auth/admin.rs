//! Admin guard.

use salvo::prelude::*;

use crate::extensions::*;

/// Let only admin principals through. Runs after the identity middleware.
#[salvo::handler]
pub(crate) async fn handler(
    req: &mut Request,
    depot: &mut Depot,
    res: &mut Response,
    ctrl: &mut FlowCtrl,
) {
    match depot.principal() {
        Some(principal) if principal.is_admin() => {
            ctrl.call_next(req, depot, res).await;
        }
        Some(_) => res.render(StatusError::forbidden().brief("Admin role required")),
        None => res.render(StatusError::unauthorized().brief("Admin routes require a bearer token")),
    }
}
