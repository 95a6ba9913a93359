use serde::Serialize;
use utoipa::{OpenApi, ToSchema};

pub mod item;

/// Registers DTO schemas with the OpenAPI document
#[derive(OpenApi)]
#[openapi(components(schemas(
    ServiceStatus,
    item::NewItem,
    item::UpdateItem,
    item::ItemStatus,
    item::TodoItem,
    item::PagingInfo,
    item::InsertedItem,
    item::ItemData,
    item::ItemList,
    item::DeletedItem,
    crate::routing_utils::BasicErrorResponse,
)))]
pub struct OpenApiSchemas;

/// Liveness message returned from the root of the API
#[derive(Serialize, ToSchema)]
#[cfg_attr(test, derive(serde::Deserialize, Debug))]
pub struct ServiceStatus {
    #[schema(example = "Service is running!")]
    pub data: String,
}
