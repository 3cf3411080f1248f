//! Test helpers.

use std::sync::Arc;

use jiff::Timestamp;
use salvo::{affix_state::inject, prelude::*};
use scrubline_app::{
    auth::{MockAuthService, Principal},
    context::AppContext,
    domain::{
        carts::{
            MockCartsService,
            records::{CartItemRecord, CartItemUuid, CartRecord, CartUuid, PricedCart},
        },
        checkout::MockCheckoutService,
        coupons::MockCouponsService,
        customers::records::{CustomerRole, CustomerUuid},
        orders::{
            MockOrdersService,
            data::{PaymentMethod, ShippingAddress},
            records::{OrderRecord, OrderStatus, OrderUuid},
        },
        owners::{Owner, SessionId},
        products::{
            MockProductsService,
            records::{ProductRecord, ProductUuid},
        },
    },
    pricing::CartTotals,
};
use uuid::Uuid;

use crate::{auth::SESSION_ID_HEADER, extensions::*, state::State};

pub(crate) const TEST_CUSTOMER_UUID: CustomerUuid = CustomerUuid::from_uuid(Uuid::nil());

pub(crate) const TEST_SESSION_ID: &str = "test-session-0001";

/// One mock per service. Any call without a matching expectation fails the request.
#[derive(Default)]
pub(crate) struct Mocks {
    pub products: MockProductsService,
    pub carts: MockCartsService,
    pub coupons: MockCouponsService,
    pub checkout: MockCheckoutService,
    pub orders: MockOrdersService,
    pub auth: MockAuthService,
}

impl Mocks {
    pub(crate) fn into_state(self) -> Arc<State> {
        State::from_app_context(AppContext {
            products: Arc::new(self.products),
            carts: Arc::new(self.carts),
            coupons: Arc::new(self.coupons),
            checkout: Arc::new(self.checkout),
            orders: Arc::new(self.orders),
            auth: Arc::new(self.auth),
        })
    }
}

fn inject_principal(depot: &mut Depot, role: CustomerRole) {
    let principal = Principal {
        customer_uuid: TEST_CUSTOMER_UUID,
        role,
    };

    depot.insert_owner(principal.owner());
    depot.insert_principal(principal);
}

#[salvo::handler]
pub(crate) async fn as_customer(
    req: &mut Request,
    depot: &mut Depot,
    res: &mut Response,
    ctrl: &mut FlowCtrl,
) {
    inject_principal(depot, CustomerRole::Customer);
    ctrl.call_next(req, depot, res).await;
}

#[salvo::handler]
pub(crate) async fn as_admin(
    req: &mut Request,
    depot: &mut Depot,
    res: &mut Response,
    ctrl: &mut FlowCtrl,
) {
    inject_principal(depot, CustomerRole::Admin);
    ctrl.call_next(req, depot, res).await;
}

/// Resolve the owner from `X-Session-Id` without a principal.
#[salvo::handler]
pub(crate) async fn as_session(
    req: &mut Request,
    depot: &mut Depot,
    res: &mut Response,
    ctrl: &mut FlowCtrl,
) {
    if let Some(session) = req
        .header::<String>(SESSION_ID_HEADER)
        .and_then(|raw| SessionId::parse(&raw).ok())
    {
        depot.insert_owner(Owner::Session(session));
    }

    ctrl.call_next(req, depot, res).await;
}

/// Serve `route` over mocked services, with `identity` resolving the caller.
pub(crate) fn service<H: Handler>(mocks: Mocks, identity: H, route: Router) -> Service {
    Service::new(
        Router::new()
            .hoop(inject(mocks.into_state()))
            .hoop(identity)
            .push(route),
    )
}

pub(crate) fn customer_owner() -> Owner {
    Owner::Customer(TEST_CUSTOMER_UUID)
}

pub(crate) fn make_product(uuid: ProductUuid, price: u64) -> ProductRecord {
    ProductRecord {
        uuid,
        sku: "TOP-NAVY-M".to_string(),
        name: "Classic Scrub Top".to_string(),
        category: "tops".to_string(),
        price,
        created_at: Timestamp::UNIX_EPOCH,
        updated_at: Timestamp::UNIX_EPOCH,
        deleted_at: None,
    }
}

/// A cart holding `quantity` of one $40.00 top, totalled with the default store pricing.
pub(crate) fn make_priced_cart(owner: Owner, quantity: u32) -> PricedCart {
    let items: Vec<CartItemRecord> = (quantity > 0)
        .then(|| CartItemRecord {
            uuid: CartItemUuid::from_uuid(Uuid::nil()),
            product_uuid: ProductUuid::from_uuid(Uuid::nil()),
            sku: "TOP-NAVY-M".to_string(),
            name: "Classic Scrub Top".to_string(),
            quantity,
            unit_price: 40_00,
            created_at: Timestamp::UNIX_EPOCH,
            updated_at: Timestamp::UNIX_EPOCH,
        })
        .into_iter()
        .collect();

    let subtotal = 40_00 * u64::from(quantity);
    let shipping = if quantity == 0 || subtotal > 50_00 { 0 } else { 7_95 };
    let tax = subtotal * 875 / 10_000;

    PricedCart {
        cart: CartRecord {
            uuid: CartUuid::from_uuid(Uuid::nil()),
            owner,
            coupon_code: None,
            created_at: Timestamp::UNIX_EPOCH,
            updated_at: Timestamp::UNIX_EPOCH,
        },
        items,
        coupon: None,
        totals: CartTotals {
            currency: "USD",
            subtotal,
            discount: 0,
            shipping,
            tax,
            total: subtotal + shipping + tax,
            units: u64::from(quantity),
        },
    }
}

pub(crate) fn shipping_address() -> ShippingAddress {
    ShippingAddress {
        name: "Dana Reyes".to_string(),
        line1: "12 Harbor Rd".to_string(),
        line2: None,
        city: "Portland".to_string(),
        region: Some("OR".to_string()),
        postal_code: "97201".to_string(),
        country: "US".to_string(),
    }
}

pub(crate) fn make_order(uuid: OrderUuid, status: OrderStatus) -> OrderRecord {
    OrderRecord {
        uuid,
        order_number: "SL-00000042".to_string(),
        owner: customer_owner(),
        status,
        currency: "USD".to_string(),
        subtotal: 80_00,
        discount: 0,
        shipping: 0,
        tax: 7_00,
        total: 87_00,
        coupon_code: None,
        shipping_address: shipping_address(),
        payment_method: PaymentMethod::Card,
        created_at: Timestamp::UNIX_EPOCH,
        updated_at: Timestamp::UNIX_EPOCH,
    }
}

/// A storage failure as the services report it.
pub(crate) fn storage_error() -> sqlx::Error {
    sqlx::Error::PoolTimedOut
}
