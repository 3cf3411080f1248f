use std::io;

use clap::Args;
use scrubline_app::{
    database::{self, Db},
    domain::orders::{OrdersService, PgOrdersService},
};

#[derive(Debug, Args)]
pub(crate) struct ReceiptArgs {
    /// Human-readable order number, e.g. SL-00000042
    #[arg(long)]
    order_number: String,

    /// PostgreSQL connection string
    #[arg(long, env = "DATABASE_URL", hide_env_values = true)]
    database_url: String,
}

pub(crate) async fn run(args: ReceiptArgs) -> Result<(), String> {
    let pool = database::connect(&args.database_url)
        .await
        .map_err(|error| format!("failed to connect to database: {error}"))?;

    let details = PgOrdersService::new(Db::new(pool))
        .find_order_by_number(&args.order_number)
        .await
        .map_err(|error| format!("failed to load order {}: {error}", args.order_number))?;

    let receipt = details
        .receipt()
        .map_err(|error| format!("failed to build receipt: {error}"))?;

    receipt
        .write_to(io::stdout().lock())
        .map_err(|error| format!("failed to write receipt: {error}"))?;

    println!("status: {}", details.order.status);
    println!("payment: {}", details.order.payment_method);

    Ok(())
}
