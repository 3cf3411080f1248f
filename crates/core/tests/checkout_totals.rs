//! Checkout totals for typical storefront carts.

use jiff::Timestamp;
use rusty_money::{Money, iso};
use scrubline::prelude::*;
use testresult::TestResult;

fn usd(minor: i64) -> Money<'static, iso::Currency> {
    Money::from_minor(minor, iso::USD)
}

fn store_rules() -> Result<PricingRules<'static>, PricingError> {
    PricingRules::new(
        iso::USD,
        ShippingRule::new(usd(50_00), usd(7_95)),
        percentage_from_basis_points(875),
    )
}

#[test]
fn two_scrub_tops_ship_free_with_tax() -> TestResult {
    let lines = [LineItem::new(usd(40_00), 2)];
    let quote = quote(&lines, None, &store_rules()?, Timestamp::now())?;

    assert_eq!(quote.totals.subtotal(), usd(80_00));
    assert_eq!(quote.totals.shipping(), usd(0));
    assert_eq!(quote.totals.tax(), usd(7_00));
    assert_eq!(quote.totals.total(), usd(87_00));
    assert!(quote.totals.can_checkout(), "non-empty cart can checkout");

    Ok(())
}

#[test]
fn twenty_percent_coupon_discounts_before_tax() -> TestResult {
    let code = CouponCode::parse("save20")?;
    let terms = CouponTerms::new(
        Discount::PercentageOff(percentage_from_basis_points(2_000)),
        None,
        None,
    );

    let lines = [LineItem::new(usd(40_00), 2)];
    let quote = quote(&lines, Some(&terms), &store_rules()?, Timestamp::now())?;

    assert_eq!(code.as_str(), "SAVE20");
    assert_eq!(quote.coupon, CouponOutcome::Applied);
    assert_eq!(quote.totals.discount(), usd(16_00));
    assert_eq!(quote.totals.tax(), usd(5_60));
    assert_eq!(quote.totals.total(), usd(69_60));

    Ok(())
}

#[test]
fn small_order_pays_flat_shipping() -> TestResult {
    let lines = [LineItem::new(usd(12_50), 1), LineItem::new(usd(3_00), 3)];
    let totals = price_lines(&lines, None, &store_rules()?)?;

    assert_eq!(totals.subtotal(), usd(21_50));
    assert_eq!(totals.shipping(), usd(7_95));
    // 21.50 × 8.75% = 1.88125
    assert_eq!(totals.tax(), usd(1_88));
    assert_eq!(totals.total(), usd(31_33));
    assert_eq!(totals.units(), 4);

    Ok(())
}

#[test]
fn empty_cart_totals_are_zero() -> TestResult {
    let quote = quote(&[], None, &store_rules()?, Timestamp::now())?;

    assert_eq!(quote.totals.subtotal(), usd(0));
    assert_eq!(quote.totals.shipping(), usd(0));
    assert_eq!(quote.totals.tax(), usd(0));
    assert_eq!(quote.totals.total(), usd(0));
    assert!(quote.totals.is_empty(), "no lines means empty");
    assert!(!quote.totals.can_checkout(), "empty cart cannot checkout");

    Ok(())
}

#[test]
fn coupon_goes_inactive_when_items_are_removed() -> TestResult {
    let rules = store_rules()?;
    let terms = CouponTerms::new(Discount::AmountOff(usd(10_00)), Some(usd(60_00)), None);

    let full = [LineItem::new(usd(40_00), 2)];
    let reduced = [LineItem::new(usd(40_00), 1)];

    let before = quote(&full, Some(&terms), &rules, Timestamp::now())?;
    let after = quote(&reduced, Some(&terms), &rules, Timestamp::now())?;

    assert!(before.coupon.is_active(), "coupon applies above minimum");
    assert_eq!(before.totals.discount(), usd(10_00));

    assert_eq!(
        after.coupon,
        CouponOutcome::Inactive(CouponRejection::BelowMinimum {
            minimum_minor: 60_00
        })
    );
    assert_eq!(after.totals.discount(), usd(0));

    Ok(())
}
