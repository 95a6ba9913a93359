use anyhow::Context;
use dotenv::dotenv;
use std::env;
use std::net::{Ipv4Addr, SocketAddr};
use std::sync::Arc;
use todo_items::{SharedData, app_env, db, logging, persistence};
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    let otel_exporters = match (
        env::var(app_env::OTEL_SPAN_EXPORT_URL),
        env::var(app_env::OTEL_METRIC_EXPORT_URL),
    ) {
        (Ok(span_url), Ok(metric_url)) => Some(logging::init_exporters(&span_url, &metric_url)?),
        _ => None,
    };
    let meter_provider =
        logging::setup_logging_and_tracing(logging::init_env_filter()?, otel_exporters);

    let db_url = env::var(app_env::DB_URL)
        .with_context(|| format!("{} must be set to reach the database", app_env::DB_URL))?;
    let sqlx_db_connection = db::connect_sqlx(&db_url)
        .await
        .context("connecting to the database")?;
    let ext_cxn = persistence::ExternalConnectivity::new(sqlx_db_connection);

    let port = match env::var(app_env::PORT) {
        Ok(raw_port) => raw_port
            .parse()
            .with_context(|| format!("{} is not a valid port: {raw_port:?}", app_env::PORT))?,
        Err(_) => app_env::DEFAULT_PORT,
    };
    let addr = SocketAddr::from((Ipv4Addr::UNSPECIFIED, port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding to {addr}"))?;

    let router = todo_items::build_router(Arc::new(SharedData {
        ext_cxn: ext_cxn.clone(),
    }));

    info!(%addr, "Starting server");
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serving HTTP")?;

    info!("Server stopped, closing database connections");
    ext_cxn.close().await;
    if let Some(meter) = meter_provider {
        if let Err(problem) = meter.shutdown() {
            warn!("Metrics were not flushed cleanly: {problem}");
        }
    }

    Ok(())
}

/// Resolves once the process receives Ctrl-C, or SIGTERM on unix
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(problem) = tokio::signal::ctrl_c().await {
            warn!("Could not listen for Ctrl-C: {problem}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(problem) => {
                warn!("Could not listen for SIGTERM: {problem}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => info!("Received Ctrl-C, shutting down"),
        () = terminate => info!("Received SIGTERM, shutting down"),
    }
}
