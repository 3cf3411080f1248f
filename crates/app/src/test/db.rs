//! Per-test Postgres databases on a shared testcontainers server.

use std::thread;

use once_cell::sync::Lazy;
use sqlx::{Connection, PgConnection, PgPool};
use testcontainers::{ContainerAsync, ImageExt, runners::AsyncRunner};
use testcontainers_modules::postgres::Postgres as PostgresImage;
use tokio::{runtime, sync::OnceCell, sync::mpsc};
use uuid::Uuid;

const USER: &str = "scrubline_test";
const PASSWORD: &str = "scrubline_test_password";

/// The shared container and where to reach it.
struct Server {
    _container: ContainerAsync<PostgresImage>,
    host: String,
    port: u16,
}

impl Server {
    fn url(&self, database: &str) -> String {
        format!(
            "postgresql://{USER}:{PASSWORD}@{}:{}/{database}",
            self.host, self.port
        )
    }
}

static SERVER: OnceCell<Server> = OnceCell::const_new();

/// Drops finished databases from a thread that outlives each test's runtime.
static DROPPER: Lazy<mpsc::UnboundedSender<(String, String)>> = Lazy::new(|| {
    let (sender, mut receiver) = mpsc::unbounded_channel::<(String, String)>();

    thread::spawn(move || {
        let rt = runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .expect("dropper runtime should build");

        rt.block_on(async move {
            while let Some((admin_url, name)) = receiver.recv().await {
                if let Err(error) = drop_database(&admin_url, &name).await {
                    eprintln!("failed to drop test database {name}: {error}");
                }
            }
        });
    });

    sender
});

async fn start_server() -> Server {
    let container = PostgresImage::default()
        .with_user(USER)
        .with_password(PASSWORD)
        .with_db_name(USER)
        .start()
        .await
        .expect("postgres container should start");

    let port = container
        .get_host_port_ipv4(5432)
        .await
        .expect("postgres port should be mapped");

    let host =
        std::env::var("TESTCONTAINERS_HOST_OVERRIDE").unwrap_or_else(|_err| "localhost".into());

    Server {
        _container: container,
        host,
        port,
    }
}

/// Generated names are interpolated into DDL, so only lower-case ASCII, digits and `_`.
fn is_safe_name(name: &str) -> bool {
    (1..=63).contains(&name.len())
        && name.starts_with(|c: char| c.is_ascii_lowercase())
        && name
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
}

async fn drop_database(admin_url: &str, name: &str) -> Result<(), sqlx::Error> {
    if !is_safe_name(name) {
        return Ok(());
    }

    let mut conn = PgConnection::connect(admin_url).await?;

    sqlx::query(&format!("DROP DATABASE IF EXISTS {name}"))
        .execute(&mut conn)
        .await?;

    conn.close().await
}

/// A freshly migrated database private to one test.
///
/// Services commit normally; isolation comes from every test owning its database. The
/// database is dropped in the background once the handle goes away.
#[derive(Debug)]
pub(crate) struct TestDb {
    pool: PgPool,
    name: String,
    admin_url: String,
}

impl TestDb {
    pub async fn new() -> Self {
        let server = SERVER.get_or_init(start_server).await;
        let name = format!("scrubline_test_{}", Uuid::now_v7().simple());
        let admin_url = server.url("postgres");

        assert!(is_safe_name(&name), "generated unsafe database name {name}");

        let mut conn = PgConnection::connect(&admin_url)
            .await
            .expect("maintenance database should accept connections");

        sqlx::query(&format!("CREATE DATABASE {name}"))
            .execute(&mut conn)
            .await
            .expect("test database should be created");

        conn.close().await.expect("maintenance connection should close");

        let pool = PgPool::connect(&server.url(&name))
            .await
            .expect("test database should accept connections");

        crate::database::migrate(&pool)
            .await
            .expect("migrations should apply to a fresh database");

        Self {
            pool,
            name,
            admin_url,
        }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

impl Drop for TestDb {
    fn drop(&mut self) {
        let _queued = DROPPER.send((self.admin_url.clone(), self.name.clone()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_names_are_safe() {
        let name = format!("scrubline_test_{}", Uuid::now_v7().simple());

        assert!(is_safe_name(&name), "{name} should be accepted");
    }

    #[test]
    fn unsafe_names_are_rejected() {
        for name in ["", "1db", "Upper", "has-hyphen", "drop\"; --", "a".repeat(64).as_str()] {
            assert!(!is_safe_name(name), "{name:?} should be rejected");
        }
    }

    #[tokio::test]
    async fn migrations_create_store_tables() {
        let test_db = TestDb::new().await;

        let tables: Vec<String> = sqlx::query_scalar(
            "SELECT table_name::text FROM information_schema.tables \
             WHERE table_schema = 'public' AND table_name <> '_sqlx_migrations' \
             ORDER BY table_name",
        )
        .fetch_all(test_db.pool())
        .await
        .expect("tables should be listed");

        assert_eq!(
            tables,
            [
                "api_tokens",
                "cart_items",
                "carts",
                "coupons",
                "customers",
                "order_items",
                "orders",
                "products",
            ],
            "unexpected schema"
        );
    }
}
