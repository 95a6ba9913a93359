use crate::dto;
use utoipa::OpenApi;
use utoipa::openapi::OpenApi as OpenApiDocument;

#[derive(OpenApi)]
#[openapi(info(
    title = "To-do Items API",
    description = "Create, list, edit and remove to-do items"
))]
struct TodoItemsApi;

/// Assembles the full OpenAPI document, merging in definitions from the [dto] package and
/// submodules of [api][crate::api]
pub fn build_documentation() -> OpenApiDocument {
    let mut api_docs = TodoItemsApi::openapi();
    api_docs.merge(dto::OpenApiSchemas::openapi());
    api_docs.merge(super::item::ItemsApi::openapi());

    api_docs
}
