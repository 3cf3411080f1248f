use clap::{Parser, Subcommand};

mod coupon;
mod customer;
mod db;
mod order;
mod pricing;
mod token;

#[derive(Debug, Parser)]
#[command(name = "scrubline-app", about = "Scrubline CLI", long_about = None)]
pub(crate) struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    Customer(customer::CustomerCommand),
    Token(token::TokenCommand),
    Coupon(coupon::CouponCommand),
    Order(order::OrderCommand),
    Db(db::DbCommand),
}

impl Cli {
    pub(crate) async fn run(self) -> Result<(), String> {
        match self.command {
            Commands::Customer(command) => customer::run(command).await,
            Commands::Token(command) => token::run(command).await,
            Commands::Coupon(command) => coupon::run(command).await,
            Commands::Order(command) => order::run(command).await,
            Commands::Db(command) => db::run(command).await,
        }
    }
}
