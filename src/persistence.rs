pub mod db_item_driven_ports;

use crate::external_connections;
use crate::external_connections::ConnectionHandle;
use sqlx::pool::PoolConnection;
use sqlx::{PgConnection, PgPool, Postgres};

/// Data structure which owns clients for connecting to external systems.
/// Allows business logic to be agnostic of the external systems it communicates with
/// so driven adapters can easily be swapped out for other implementations
#[derive(Clone)]
pub struct ExternalConnectivity {
    db: PgPool,
}

impl ExternalConnectivity {
    /// Accepts the set of clients used to connect to external systems and constructs
    /// an instance of ExternalConnectivity owning those clients
    pub fn new(db: PgPool) -> Self {
        ExternalConnectivity { db }
    }

    /// Closes every pooled connection, waiting for checked-out connections to be returned first
    pub async fn close(&self) {
        self.db.close().await;
    }
}

/// A handle from ExternalConnectivity which can connect to a database
pub struct PoolConnectionHandle {
    active_connection: PoolConnection<Postgres>,
}

impl ConnectionHandle for PoolConnectionHandle {
    fn borrow_connection(&mut self) -> &mut PgConnection {
        &mut self.active_connection
    }
}

impl external_connections::ExternalConnectivity for ExternalConnectivity {
    type DbHandle<'cxn_borrow> = PoolConnectionHandle;

    async fn database_cxn(&mut self) -> Result<Self::DbHandle<'_>, anyhow::Error> {
        let handle = PoolConnectionHandle {
            active_connection: self.db.acquire().await?,
        };

        Ok(handle)
    }
}
