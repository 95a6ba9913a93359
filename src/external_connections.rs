use sqlx::PgConnection;

/// A handle to a live database connection which can be lent out to queries
pub trait ConnectionHandle {
    fn borrow_connection(&mut self) -> &mut PgConnection;
}

/// Abstraction over the clients used to reach systems outside this service. Business logic
/// receives one of these and hands it to driven ports, so it never owns a connection itself.
pub trait ExternalConnectivity {
    type DbHandle<'cxn_borrow>: ConnectionHandle
    where
        Self: 'cxn_borrow;

    async fn database_cxn(&mut self) -> Result<Self::DbHandle<'_>, anyhow::Error>;
}
