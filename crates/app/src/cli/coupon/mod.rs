use clap::{Args, Subcommand};

mod create;
mod list;

#[derive(Debug, Args)]
pub(crate) struct CouponCommand {
    #[command(subcommand)]
    command: CouponSubcommand,
}

#[derive(Debug, Subcommand)]
enum CouponSubcommand {
    Create(create::CreateCouponArgs),
    List(list::ListCouponsArgs),
}

pub(crate) async fn run(command: CouponCommand) -> Result<(), String> {
    match command.command {
        CouponSubcommand::Create(args) => create::run(args).await,
        CouponSubcommand::List(args) => list::run(args).await,
    }
}
