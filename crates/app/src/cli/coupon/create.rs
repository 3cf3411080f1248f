use clap::{ArgGroup, Args};
use jiff::Timestamp;
use scrubline_app::{
    database::{self, Db},
    domain::coupons::{
        CouponsService, PgCouponsService,
        data::NewCoupon,
        records::{CouponUuid, DiscountKind},
    },
};

use crate::cli::pricing::PricingArgs;

#[derive(Debug, Args)]
#[command(group(ArgGroup::new("discount").required(true).args(["percent_bps", "amount"])))]
pub(crate) struct CreateCouponArgs {
    /// Code customers enter at checkout
    #[arg(long)]
    code: String,

    /// Percentage off in basis points (2000 is 20%)
    #[arg(long)]
    percent_bps: Option<u32>,

    /// Fixed amount off in minor units
    #[arg(long)]
    amount: Option<u64>,

    /// Minimum subtotal in minor units
    #[arg(long)]
    minimum_order: Option<u64>,

    /// Expiry timestamp (RFC 3339)
    #[arg(long)]
    expires_at: Option<String>,

    /// PostgreSQL connection string
    #[arg(long, env = "DATABASE_URL", hide_env_values = true)]
    database_url: String,

    #[command(flatten)]
    pricing: PricingArgs,
}

pub(crate) async fn run(args: CreateCouponArgs) -> Result<(), String> {
    let discount = match (args.percent_bps, args.amount) {
        (Some(basis_points), None) => DiscountKind::Percentage { basis_points },
        (None, Some(amount)) => DiscountKind::FixedAmount { amount },
        _ => return Err("pass exactly one of --percent-bps or --amount".to_string()),
    };

    let expires_at = args
        .expires_at
        .as_deref()
        .map(|value| {
            value
                .parse::<Timestamp>()
                .map_err(|error| format!("invalid expires-at timestamp: {error}"))
        })
        .transpose()?;

    let pool = database::connect(&args.database_url)
        .await
        .map_err(|error| format!("failed to connect to database: {error}"))?;

    let pricing = args.pricing.store_pricing()?;

    let coupon = PgCouponsService::new(Db::new(pool), pricing)
        .create_coupon(NewCoupon {
            uuid: CouponUuid::new(),
            code: args.code,
            discount,
            minimum_order: args.minimum_order,
            expires_at,
        })
        .await
        .map_err(|error| format!("failed to create coupon: {error}"))?;

    println!("coupon_uuid: {}", coupon.uuid);
    println!("coupon_code: {}", coupon.code);
    println!("discount_type: {}", coupon.discount.type_str());
    println!("discount_value: {}", coupon.discount.value());

    Ok(())
}
