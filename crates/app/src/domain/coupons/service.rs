//! Coupons service.

use async_trait::async_trait;
use jiff::Timestamp;
use mockall::automock;
use scrubline::prelude::{CouponCode, CouponOutcome};
use tracing::info;

use crate::{
    database::Db,
    domain::{
        carts::{reader::CartReader, records::PricedCart, repositories::PgCartsRepository},
        coupons::{
            data::{NewCoupon, is_valid_discount},
            errors::CouponsServiceError,
            records::CouponRecord,
            repository::PgCouponsRepository,
        },
        owners::Owner,
    },
    pricing::StorePricing,
};

#[derive(Debug, Clone)]
pub struct PgCouponsService {
    db: Db,
    pricing: StorePricing,
    repository: PgCouponsRepository,
    carts_repository: PgCartsRepository,
    reader: CartReader,
}

impl PgCouponsService {
    #[must_use]
    pub fn new(db: Db, pricing: StorePricing) -> Self {
        Self {
            db,
            pricing,
            repository: PgCouponsRepository::new(),
            carts_repository: PgCartsRepository::new(),
            reader: CartReader::new(),
        }
    }
}

#[async_trait]
impl CouponsService for PgCouponsService {
    async fn apply_coupon(
        &self,
        owner: Owner,
        code: &str,
        now: Timestamp,
    ) -> Result<PricedCart, CouponsServiceError> {
        let code = CouponCode::parse(code)?;

        let mut tx = self.db.begin().await?;

        let cart = self.carts_repository.lock_cart(&mut tx, &owner).await?;

        if cart.coupon_code.as_deref() == Some(code.as_str()) {
            return Err(CouponsServiceError::AlreadyApplied);
        }

        let coupon = self
            .repository
            .find_coupon_by_code(&mut tx, code.as_str())
            .await?
            .ok_or(CouponsServiceError::NotFound)?;

        let current = self
            .reader
            .price::<CouponsServiceError>(&mut tx, cart, &self.pricing, now)
            .await?;

        let candidate = self.pricing.quote(
            current
                .items
                .iter()
                .map(|item| (item.unit_price, item.quantity)),
            Some(&coupon),
            now,
        )?;

        if let CouponOutcome::Inactive(rejection) = candidate.coupon {
            return Err(rejection.into());
        }

        let cart = self
            .carts_repository
            .set_coupon(&mut tx, current.cart.uuid, Some(code.as_str()))
            .await?;

        let priced = self.reader.price::<CouponsServiceError>(&mut tx, cart, &self.pricing, now).await?;

        tx.commit().await?;

        info!(cart = %priced.cart.uuid, coupon = %code, "coupon applied");

        Ok(priced)
    }

    async fn remove_coupon(
        &self,
        owner: Owner,
        now: Timestamp,
    ) -> Result<PricedCart, CouponsServiceError> {
        let mut tx = self.db.begin().await?;

        let cart = self.carts_repository.ensure_cart(&mut tx, &owner).await?;

        let cart = if cart.coupon_code.is_some() {
            self.carts_repository
                .set_coupon(&mut tx, cart.uuid, None)
                .await?
        } else {
            cart
        };

        let priced = self.reader.price::<CouponsServiceError>(&mut tx, cart, &self.pricing, now).await?;

        tx.commit().await?;

        Ok(priced)
    }

    async fn create_coupon(
        &self,
        coupon: NewCoupon,
    ) -> Result<CouponRecord, CouponsServiceError> {
        let code = CouponCode::parse(&coupon.code)?;

        if !is_valid_discount(coupon.discount) {
            return Err(CouponsServiceError::InvalidDiscount);
        }

        let mut tx = self.db.begin().await?;

        let created = self
            .repository
            .create_coupon(
                &mut tx,
                NewCoupon {
                    code: code.into_inner(),
                    ..coupon
                },
            )
            .await?;

        tx.commit().await?;

        Ok(created)
    }

    async fn list_coupons(&self) -> Result<Vec<CouponRecord>, CouponsServiceError> {
        let mut tx = self.db.begin().await?;

        let coupons = self.repository.list_coupons(&mut tx).await?;

        tx.commit().await?;

        Ok(coupons)
    }
}

#[automock]
#[async_trait]
pub trait CouponsService: Send + Sync {
    /// Attach a coupon to the owner's cart, replacing any other coupon.
    ///
    /// Rejected codes leave the cart untouched.
    async fn apply_coupon(
        &self,
        owner: Owner,
        code: &str,
        now: Timestamp,
    ) -> Result<PricedCart, CouponsServiceError>;

    /// Detach the coupon from the owner's cart. Succeeds when none is attached.
    async fn remove_coupon(
        &self,
        owner: Owner,
        now: Timestamp,
    ) -> Result<PricedCart, CouponsServiceError>;

    /// Creates a new coupon.
    async fn create_coupon(&self, coupon: NewCoupon)
    -> Result<CouponRecord, CouponsServiceError>;

    /// Retrieves all coupons, newest first.
    async fn list_coupons(&self) -> Result<Vec<CouponRecord>, CouponsServiceError>;
}

#[cfg(test)]
mod tests {
    use jiff::ToSpan;
    use scrubline::prelude::{CouponCodeError, CouponRejection};
    use testresult::TestResult;

    use crate::{
        domain::{
            carts::{CartsService, data::NewCartItem},
            coupons::records::{CouponUuid, DiscountKind},
            owners::SessionId,
        },
        test::TestContext,
    };

    use super::*;

    async fn cart_with(ctx: &TestContext, owner: &Owner, price: u64, quantity: u32) -> TestResult {
        let product = ctx.create_product(price).await?;

        ctx.carts
            .add_item(
                owner.clone(),
                NewCartItem {
                    product_uuid: product.uuid,
                    quantity,
                },
                Timestamp::now(),
            )
            .await?;

        Ok(())
    }

    fn owner() -> Result<Owner, crate::domain::owners::SessionIdError> {
        SessionId::parse("anon-session-1").map(Owner::from)
    }

    #[tokio::test]
    async fn apply_coupon_discounts_cart() -> TestResult {
        let ctx = TestContext::new().await;
        let owner = owner()?;

        cart_with(&ctx, &owner, 40_00, 2).await?;
        ctx.create_percentage_coupon("SAVE20", 2_000).await?;

        let cart = ctx
            .coupons
            .apply_coupon(owner, " save20 ", Timestamp::now())
            .await?;

        let coupon = cart.coupon.ok_or("coupon should be attached")?;

        assert_eq!(coupon.code, "SAVE20");
        assert!(coupon.active, "coupon should be active");
        assert_eq!(cart.totals.discount, 16_00);
        assert_eq!(cart.totals.tax, 5_60);
        assert_eq!(cart.totals.total, 69_60);

        Ok(())
    }

    #[tokio::test]
    async fn applying_same_code_twice_conflicts() -> TestResult {
        let ctx = TestContext::new().await;
        let owner = owner()?;

        cart_with(&ctx, &owner, 40_00, 2).await?;
        ctx.create_percentage_coupon("SAVE20", 2_000).await?;

        ctx.coupons
            .apply_coupon(owner.clone(), "SAVE20", Timestamp::now())
            .await?;

        let result = ctx
            .coupons
            .apply_coupon(owner, "save20", Timestamp::now())
            .await;

        assert!(
            matches!(result, Err(CouponsServiceError::AlreadyApplied)),
            "expected AlreadyApplied, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn applying_different_code_replaces_coupon() -> TestResult {
        let ctx = TestContext::new().await;
        let owner = owner()?;

        cart_with(&ctx, &owner, 40_00, 2).await?;
        ctx.create_percentage_coupon("SAVE20", 2_000).await?;
        ctx.create_percentage_coupon("SAVE10", 1_000).await?;

        ctx.coupons
            .apply_coupon(owner.clone(), "SAVE20", Timestamp::now())
            .await?;

        let cart = ctx
            .coupons
            .apply_coupon(owner, "SAVE10", Timestamp::now())
            .await?;

        assert_eq!(cart.coupon.map(|c| c.code), Some("SAVE10".to_string()));
        assert_eq!(cart.totals.discount, 8_00);

        Ok(())
    }

    #[tokio::test]
    async fn unknown_code_leaves_cart_unchanged() -> TestResult {
        let ctx = TestContext::new().await;
        let owner = owner()?;

        cart_with(&ctx, &owner, 40_00, 2).await?;
        ctx.create_percentage_coupon("SAVE20", 2_000).await?;

        let before = ctx
            .coupons
            .apply_coupon(owner.clone(), "SAVE20", Timestamp::now())
            .await?;

        let result = ctx
            .coupons
            .apply_coupon(owner.clone(), "NOPE99", Timestamp::now())
            .await;

        assert!(
            matches!(result, Err(CouponsServiceError::NotFound)),
            "expected NotFound, got {result:?}"
        );

        let after = ctx.carts.get_cart(owner, Timestamp::now()).await?;

        assert_eq!(after.coupon, before.coupon);
        assert_eq!(after.totals, before.totals);

        Ok(())
    }

    #[tokio::test]
    async fn expired_coupon_is_rejected() -> TestResult {
        let ctx = TestContext::new().await;
        let owner = owner()?;
        let now = Timestamp::now();

        cart_with(&ctx, &owner, 40_00, 2).await?;

        ctx.coupons
            .create_coupon(NewCoupon {
                uuid: CouponUuid::new(),
                code: "OLDNEWS".to_string(),
                discount: DiscountKind::Percentage { basis_points: 1_000 },
                minimum_order: None,
                expires_at: Some(now.checked_sub(1.hour())?),
            })
            .await?;

        let result = ctx.coupons.apply_coupon(owner, "OLDNEWS", now).await;

        assert!(
            matches!(
                result,
                Err(CouponsServiceError::Ineligible(CouponRejection::Expired))
            ),
            "expected Expired, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn coupon_below_minimum_is_rejected() -> TestResult {
        let ctx = TestContext::new().await;
        let owner = owner()?;

        cart_with(&ctx, &owner, 20_00, 1).await?;

        ctx.coupons
            .create_coupon(NewCoupon {
                uuid: CouponUuid::new(),
                code: "BIGSPEND".to_string(),
                discount: DiscountKind::FixedAmount { amount: 10_00 },
                minimum_order: Some(100_00),
                expires_at: None,
            })
            .await?;

        let result = ctx
            .coupons
            .apply_coupon(owner, "BIGSPEND", Timestamp::now())
            .await;

        assert!(
            matches!(
                result,
                Err(CouponsServiceError::Ineligible(
                    CouponRejection::BelowMinimum {
                        minimum_minor: 100_00
                    }
                ))
            ),
            "expected BelowMinimum, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn apply_without_cart_returns_not_found() -> TestResult {
        let ctx = TestContext::new().await;

        ctx.create_percentage_coupon("SAVE20", 2_000).await?;

        let result = ctx
            .coupons
            .apply_coupon(owner()?, "SAVE20", Timestamp::now())
            .await;

        assert!(
            matches!(result, Err(CouponsServiceError::NotFound)),
            "expected NotFound, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn remove_coupon_is_idempotent_and_reprices() -> TestResult {
        let ctx = TestContext::new().await;
        let owner = owner()?;

        cart_with(&ctx, &owner, 40_00, 2).await?;
        ctx.create_percentage_coupon("SAVE20", 2_000).await?;

        ctx.coupons
            .apply_coupon(owner.clone(), "SAVE20", Timestamp::now())
            .await?;

        let removed = ctx
            .coupons
            .remove_coupon(owner.clone(), Timestamp::now())
            .await?;

        assert!(removed.coupon.is_none());
        assert_eq!(removed.totals.discount, 0);
        assert_eq!(removed.totals.total, 87_00);

        let again = ctx.coupons.remove_coupon(owner, Timestamp::now()).await?;

        assert_eq!(again.totals, removed.totals);

        Ok(())
    }

    #[tokio::test]
    async fn attached_coupon_goes_inactive_when_subtotal_drops() -> TestResult {
        let ctx = TestContext::new().await;
        let owner = owner()?;
        let product = ctx.create_product(40_00).await?;

        ctx.coupons
            .create_coupon(NewCoupon {
                uuid: CouponUuid::new(),
                code: "SPEND60".to_string(),
                discount: DiscountKind::FixedAmount { amount: 10_00 },
                minimum_order: Some(60_00),
                expires_at: None,
            })
            .await?;

        let cart = ctx
            .carts
            .add_item(
                owner.clone(),
                NewCartItem {
                    product_uuid: product.uuid,
                    quantity: 2,
                },
                Timestamp::now(),
            )
            .await?;

        ctx.coupons
            .apply_coupon(owner.clone(), "SPEND60", Timestamp::now())
            .await?;

        let item = cart.items.first().map(|item| item.uuid).ok_or("missing item")?;

        let reduced = ctx
            .carts
            .update_item(owner, item, 1, Timestamp::now())
            .await?;

        let coupon = reduced.coupon.ok_or("coupon should stay attached")?;

        assert!(!coupon.active, "coupon should be inactive below minimum");
        assert_eq!(reduced.totals.discount, 0);

        Ok(())
    }

    #[tokio::test]
    async fn duplicate_coupon_code_returns_already_exists() -> TestResult {
        let ctx = TestContext::new().await;

        ctx.create_percentage_coupon("SAVE20", 2_000).await?;

        let result = ctx.create_percentage_coupon("save20", 1_500).await;

        assert!(
            matches!(result, Err(CouponsServiceError::AlreadyExists)),
            "expected AlreadyExists, got {result:?}"
        );

        let coupons = ctx.coupons.list_coupons().await?;

        assert_eq!(coupons.len(), 1);

        Ok(())
    }

    #[tokio::test]
    async fn malformed_code_is_rejected_before_storage() -> TestResult {
        let ctx = TestContext::offline();

        let result = ctx
            .coupons
            .apply_coupon(owner()?, "no spaces", Timestamp::now())
            .await;

        assert!(
            matches!(
                result,
                Err(CouponsServiceError::InvalidCode(
                    CouponCodeError::InvalidCharacter(' ')
                ))
            ),
            "expected InvalidCode, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn out_of_range_discount_is_rejected_before_storage() {
        let ctx = TestContext::offline();

        let result = ctx
            .coupons
            .create_coupon(NewCoupon {
                uuid: CouponUuid::new(),
                code: "TOOMUCH".to_string(),
                discount: DiscountKind::Percentage {
                    basis_points: 10_001,
                },
                minimum_order: None,
                expires_at: None,
            })
            .await;

        assert!(
            matches!(result, Err(CouponsServiceError::InvalidDiscount)),
            "expected InvalidDiscount, got {result:?}"
        );
    }
}
