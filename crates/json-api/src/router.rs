//! App Router

use salvo::Router;

use crate::{auth, carts, checkout, coupons, orders, products};

/// Everything under `/api`.
///
/// The catalog is public. Cart, coupon, checkout and order routes need a bearer token or an
/// `X-Session-Id`; `/api/admin` additionally needs an admin token.
pub(crate) fn app_router() -> Router {
    Router::with_path("api")
        .push(
            Router::with_path("products")
                .get(products::index::handler)
                .push(Router::with_path("{product}").get(products::get::handler)),
        )
        .push(
            Router::new()
                .hoop(auth::middleware::handler)
                .push(
                    Router::with_path("cart")
                        .get(carts::get::handler)
                        .delete(carts::clear::handler)
                        .push(
                            Router::with_path("items")
                                .post(carts::items::create::handler)
                                .push(
                                    Router::with_path("{item}")
                                        .put(carts::items::update::handler)
                                        .delete(carts::items::delete::handler),
                                ),
                        ),
                )
                .push(
                    Router::with_path("coupons/apply")
                        .post(coupons::apply::handler)
                        .delete(coupons::remove::handler),
                )
                .push(Router::with_path("checkout").post(checkout::create::handler))
                .push(
                    Router::with_path("orders")
                        .get(orders::index::handler)
                        .push(Router::with_path("{order}").get(orders::get::handler)),
                )
                .push(admin_router()),
        )
}

fn admin_router() -> Router {
    Router::with_path("admin")
        .hoop(auth::admin::handler)
        .push(
            Router::with_path("products")
                .post(products::create::handler)
                .push(
                    Router::with_path("{product}")
                        .put(products::update::handler)
                        .delete(products::delete::handler),
                ),
        )
        .push(
            Router::with_path("coupons")
                .get(coupons::index::handler)
                .post(coupons::create::handler),
        )
        .push(
            Router::with_path("orders")
                .get(orders::admin_index::handler)
                .push(Router::with_path("{order}/status").put(orders::update_status::handler)),
        )
}
