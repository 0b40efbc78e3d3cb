pub mod schema;

use sqlx::AnyPool;
use sqlx::any::AnyPoolOptions;

/// Bounds concurrent store access from the ingest job and the API handlers.
const MAX_CONNECTIONS: u32 = 16;

/// Connection pool for the price history database.
#[derive(Clone)]
pub struct Db {
    pub pool: AnyPool,
}

impl Db {
    /// Connects to `database_url` (any sqlx URL; SQLite by default).
    pub async fn connect(database_url: &str) -> anyhow::Result<Self> {
        sqlx::any::install_default_drivers();

        let pool = AnyPoolOptions::new()
            .max_connections(MAX_CONNECTIONS)
            .connect(database_url)
            .await?;

        tracing::debug!(max_connections = MAX_CONNECTIONS, "price history pool ready");

        Ok(Self { pool })
    }

    /// Creates the `price_history` table and its timestamp index if missing.
    pub async fn migrate(&self) -> anyhow::Result<()> {
        schema::migrate(&self.pool).await
    }
}
