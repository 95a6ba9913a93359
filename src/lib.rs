use axum::Router;
use axum::extract::State;
use axum::routing::get;
use std::sync::Arc;

pub mod api;
pub mod app_env;
pub mod db;
pub mod domain;
pub mod dto;
pub mod external_connections;
pub mod logging;
pub mod persistence;
pub mod routing_utils;

/// State shared by every request handler
pub struct SharedData {
    pub ext_cxn: persistence::ExternalConnectivity,
}

pub type AppState = State<Arc<SharedData>>;

/// Assembles every route of the service, wrapped in request tracing
pub fn build_router(shared_data: Arc<SharedData>) -> Router {
    let router = Router::new()
        .route("/", get(service_status))
        .route(
            "/api-docs/openapi.json",
            get(|| async { axum::Json(api::openapi::build_documentation()) }),
        )
        .nest("/v1/items", api::item::item_routes());

    logging::attach_tracing_http(router).with_state(shared_data)
}

/// Liveness probe
async fn service_status() -> routing_utils::Json<dto::ServiceStatus> {
    routing_utils::Json(dto::ServiceStatus {
        data: "Service is running!".to_owned(),
    })
}
