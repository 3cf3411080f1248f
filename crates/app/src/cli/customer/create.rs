use clap::Args;
use scrubline_app::{
    auth::PgAuthService,
    database::{self, Db},
    domain::customers::{
        CustomersService, PgCustomersService,
        data::NewCustomer,
        records::{CustomerRole, CustomerUuid},
    },
};

#[derive(Debug, Args)]
pub(crate) struct CreateCustomerArgs {
    /// Customer email address
    #[arg(long)]
    email: String,

    /// Customer display name
    #[arg(long)]
    name: String,

    /// `customer` or `admin`
    #[arg(long, default_value = "customer")]
    role: CustomerRole,

    /// PostgreSQL connection string
    #[arg(long, env = "DATABASE_URL", hide_env_values = true)]
    database_url: String,
}

pub(crate) async fn run(args: CreateCustomerArgs) -> Result<(), String> {
    let pool = database::connect(&args.database_url)
        .await
        .map_err(|error| format!("failed to connect to database: {error}"))?;

    let db = Db::new(pool);

    let customer = PgCustomersService::new(db.clone())
        .create_customer(NewCustomer {
            uuid: CustomerUuid::new(),
            email: args.email,
            name: args.name,
            role: args.role,
        })
        .await
        .map_err(|error| format!("failed to create customer: {error}"))?;

    let issued = PgAuthService::new(db)
        .issue_api_token(customer.uuid)
        .await
        .map_err(|error| format!("failed to create token: {error}"))?;

    println!("customer_uuid: {}", customer.uuid);
    println!("customer_email: {}", customer.email);
    println!("customer_role: {}", customer.role.as_str());
    println!("token_uuid: {}", issued.metadata.uuid);
    println!("api_token: {}", issued.token);
    println!("store this token now; it is only shown once");

    Ok(())
}
