//! Cart pricing on read.

use jiff::Timestamp;
use sqlx::{Postgres, Transaction};

use crate::{
    domain::{
        carts::{
            records::{AppliedCoupon, CartRecord, PricedCart},
            repositories::PgCartItemsRepository,
        },
        coupons::repository::PgCouponsRepository,
    },
    pricing::{StorePricing, StorePricingError},
};

/// Loads a cart's lines and attached coupon and prices them. Totals are never stored.
#[derive(Debug, Clone, Default)]
pub(crate) struct CartReader {
    items: PgCartItemsRepository,
    coupons: PgCouponsRepository,
}

impl CartReader {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self {
            items: PgCartItemsRepository::new(),
            coupons: PgCouponsRepository::new(),
        }
    }

    pub(crate) async fn price<E>(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        cart: CartRecord,
        pricing: &StorePricing,
        now: Timestamp,
    ) -> Result<PricedCart, E>
    where
        E: From<sqlx::Error> + From<StorePricingError>,
    {
        let items = self.items.get_cart_items(tx, cart.uuid).await?;

        let coupon = match cart.coupon_code.as_deref() {
            Some(code) => self.coupons.find_coupon_by_code(tx, code).await?,
            None => None,
        };

        let priced = pricing.quote(
            items.iter().map(|item| (item.unit_price, item.quantity)),
            coupon.as_ref(),
            now,
        )?;

        let coupon = cart
            .coupon_code
            .clone()
            .map(|code| AppliedCoupon::from_outcome(code, priced.coupon));

        Ok(PricedCart {
            cart,
            items,
            coupon,
            totals: priced.totals,
        })
    }
}
