use clap::Args;
use scrubline_app::{
    database::{self, Db},
    domain::coupons::{CouponsService, PgCouponsService},
};

use crate::cli::pricing::PricingArgs;

#[derive(Debug, Args)]
pub(crate) struct ListCouponsArgs {
    /// PostgreSQL connection string
    #[arg(long, env = "DATABASE_URL", hide_env_values = true)]
    database_url: String,

    #[command(flatten)]
    pricing: PricingArgs,
}

pub(crate) async fn run(args: ListCouponsArgs) -> Result<(), String> {
    let pool = database::connect(&args.database_url)
        .await
        .map_err(|error| format!("failed to connect to database: {error}"))?;

    let pricing = args.pricing.store_pricing()?;

    let coupons = PgCouponsService::new(Db::new(pool), pricing)
        .list_coupons()
        .await
        .map_err(|error| format!("failed to list coupons: {error}"))?;

    for coupon in coupons {
        let minimum = coupon
            .minimum_order
            .map_or_else(|| "-".to_string(), |minimum| minimum.to_string());
        let expires = coupon
            .expires_at
            .map_or_else(|| "-".to_string(), |expires_at| expires_at.to_string());

        println!(
            "{}\t{}\t{}\t{}\tmin={minimum}\texpires={expires}",
            coupon.uuid,
            coupon.code,
            coupon.discount.type_str(),
            coupon.discount.value(),
        );
    }

    Ok(())
}
