use std::time::Duration;

use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

/// Upper bound on pooled connections held by a single service instance
const MAX_CONNECTIONS: u32 = 20;
const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(2);

/// Opens a connection pool to the database at [db_url], failing if the first connection
/// cannot be established
pub async fn connect_sqlx(db_url: &str) -> Result<PgPool, sqlx::Error> {
    pool_options().connect(db_url).await
}

/// Builds a pool which only connects once a query actually needs a connection
pub fn connect_sqlx_lazy(db_url: &str) -> Result<PgPool, sqlx::Error> {
    pool_options().connect_lazy(db_url)
}

fn pool_options() -> PgPoolOptions {
    PgPoolOptions::new()
        .max_connections(MAX_CONNECTIONS)
        .acquire_timeout(ACQUIRE_TIMEOUT)
}
