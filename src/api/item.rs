use crate::domain::item::ItemService;
use crate::domain::item::driving_ports::ItemPort;
use crate::external_connections::ExternalConnectivity;
use crate::persistence::db_item_driven_ports::{DbItemReader, DbItemWriter};
use crate::routing_utils::{
    BasicErrorResponse, DomainErrorResponse, Json, JsonErrorResponse, Query, parse_id,
};
use crate::{AppState, SharedData, domain, dto};
use axum::Router;
use axum::extract::{Path, State};
use axum::response::ErrorResponse;
use axum::routing::get;
use std::sync::Arc;
use tracing::info;
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(create_item, list_items, get_item, update_item, delete_item),
    tags((name = "Items", description = "Managing to-do items"))
)]
/// Defines the OpenAPI documentation for the items API
pub struct ItemsApi;

/// Builds a router for everything under "/v1/items"
pub fn item_routes() -> Router<Arc<SharedData>> {
    Router::new()
        .route(
            "/",
            get(
                |State(app_state): AppState, Query(query_pairs): Query<Vec<(String, String)>>| async move {
                    let mut ext_cxn = app_state.ext_cxn.clone();
                    let item_service = ItemService {};

                    list_items(query_pairs.into(), &mut ext_cxn, &item_service).await
                },
            )
            .post(
                |State(app_state): AppState, Json(new_item): Json<dto::item::NewItem>| async move {
                    let mut ext_cxn = app_state.ext_cxn.clone();
                    let item_service = ItemService {};

                    create_item(new_item, &mut ext_cxn, &item_service).await
                },
            ),
        )
        .route(
            "/:id",
            get(
                |State(app_state): AppState, Path(raw_id): Path<String>| async move {
                    let mut ext_cxn = app_state.ext_cxn.clone();
                    let item_service = ItemService {};

                    get_item(&raw_id, &mut ext_cxn, &item_service).await
                },
            )
            .patch(
                |State(app_state): AppState,
                 Path(raw_id): Path<String>,
                 update: Result<Json<dto::item::UpdateItem>, JsonErrorResponse>| async move {
                    let mut ext_cxn = app_state.ext_cxn.clone();
                    let item_service = ItemService {};

                    update_item(&raw_id, update, &mut ext_cxn, &item_service).await
                },
            )
            .delete(
                |State(app_state): AppState, Path(raw_id): Path<String>| async move {
                    let mut ext_cxn = app_state.ext_cxn.clone();
                    let item_service = ItemService {};

                    delete_item(&raw_id, &mut ext_cxn, &item_service).await
                },
            ),
        )
}

#[utoipa::path(
    post,
    path = "/v1/items",
    tag = "Items",
    request_body = dto::item::NewItem,
    responses(
        (status = 200, description = "Item created, responds with its ID", body = dto::item::InsertedItem),
        (status = 400, description = "Missing or blank fields, or the item couldn't be stored", body = BasicErrorResponse),
    ),
)]
/// Creates a new item. Its status always starts as "Doing".
async fn create_item(
    new_item: dto::item::NewItem,
    ext_cxn: &mut impl ExternalConnectivity,
    item_service: &impl ItemPort,
) -> Result<Json<dto::item::InsertedItem>, ErrorResponse> {
    info!("Creating item");
    let item_writer = DbItemWriter;

    let new_id = item_service
        .create_item(
            &domain::item::NewItem::from(new_item),
            &mut *ext_cxn,
            &item_writer,
        )
        .await
        .map_err(DomainErrorResponse::from)?;

    Ok(Json(dto::item::InsertedItem { data: new_id }))
}

#[utoipa::path(
    get,
    path = "/v1/items",
    tag = "Items",
    params(dto::item::PagingQuery),
    responses(
        (status = 200, description = "One page of items, newest first", body = dto::item::ItemList),
        (status = 400, description = "Items couldn't be read", body = BasicErrorResponse),
    ),
)]
/// Lists a page of items along with paging info
async fn list_items(
    query: dto::item::PagingQuery,
    ext_cxn: &mut impl ExternalConnectivity,
    item_service: &impl ItemPort,
) -> Result<Json<dto::item::ItemList>, ErrorResponse> {
    info!("Listing items: {query:?}");
    let item_reader = DbItemReader;

    let item_page = item_service
        .list_items(
            &domain::item::PageRequest::from(query),
            &mut *ext_cxn,
            &item_reader,
        )
        .await
        .map_err(DomainErrorResponse::from)?;

    Ok(Json(dto::item::ItemList::from(item_page)))
}

#[utoipa::path(
    get,
    path = "/v1/items/{id}",
    tag = "Items",
    params(("id" = i64, Path, description = "ID of the item")),
    responses(
        (status = 200, description = "The requested item", body = dto::item::ItemData),
        (status = 400, description = "The ID wasn't an integer", body = BasicErrorResponse),
        (status = 404, description = "No item has the ID", body = BasicErrorResponse),
    ),
)]
/// Retrieves a single item
async fn get_item(
    raw_id: &str,
    ext_cxn: &mut impl ExternalConnectivity,
    item_service: &impl ItemPort,
) -> Result<Json<dto::item::ItemData>, ErrorResponse> {
    let item_id = storable_id(parse_id(raw_id)?, domain::item::LOOKUP_MISS)?;
    info!("Get item {item_id}");
    let item_reader = DbItemReader;

    let item = item_service
        .item_by_id(item_id, &mut *ext_cxn, &item_reader)
        .await
        .map_err(DomainErrorResponse::from)?;

    Ok(Json(dto::item::ItemData { data: item.into() }))
}

#[utoipa::path(
    patch,
    path = "/v1/items/{id}",
    tag = "Items",
    params(("id" = i64, Path, description = "ID of the item")),
    request_body = dto::item::UpdateItem,
    responses(
        (status = 200, description = "The item after the edit was applied", body = dto::item::ItemData),
        (status = 400, description = "Bad ID, blank title, or unknown status", body = BasicErrorResponse),
        (status = 404, description = "No item has the ID", body = BasicErrorResponse),
        (status = 500, description = "The edit couldn't be saved", body = BasicErrorResponse),
    ),
)]
/// Replaces an item's title and status
async fn update_item(
    raw_id: &str,
    update: Result<Json<dto::item::UpdateItem>, JsonErrorResponse>,
    ext_cxn: &mut impl ExternalConnectivity,
    item_service: &impl ItemPort,
) -> Result<Json<dto::item::ItemData>, ErrorResponse> {
    let item_id = storable_id(parse_id(raw_id)?, domain::item::RECORD_NOT_FOUND)?;
    info!("Updating item {item_id}");
    let item_reader = DbItemReader;
    let item_writer = DbItemWriter;

    // A missing item is reported ahead of an unreadable body
    let update = match update {
        Ok(Json(update)) => update,
        Err(unreadable_body) => {
            item_service
                .item_by_id(item_id, &mut *ext_cxn, &item_reader)
                .await
                .map_err(|_| record_not_found(domain::item::RECORD_NOT_FOUND))?;
            return Err(unreadable_body.into());
        }
    };

    let updated_item = item_service
        .update_item(
            item_id,
            &domain::item::ItemUpdate::from(update),
            &mut *ext_cxn,
            &item_reader,
            &item_writer,
        )
        .await
        .map_err(DomainErrorResponse::from)?;

    Ok(Json(dto::item::ItemData {
        data: updated_item.into(),
    }))
}

#[utoipa::path(
    delete,
    path = "/v1/items/{id}",
    tag = "Items",
    params(("id" = i64, Path, description = "ID of the item")),
    responses(
        (status = 200, description = "The item was removed", body = dto::item::DeletedItem),
        (status = 400, description = "The ID wasn't an integer", body = BasicErrorResponse),
        (status = 404, description = "No item has the ID", body = BasicErrorResponse),
        (status = 500, description = "The item couldn't be removed", body = BasicErrorResponse),
    ),
)]
/// Deletes an item
async fn delete_item(
    raw_id: &str,
    ext_cxn: &mut impl ExternalConnectivity,
    item_service: &impl ItemPort,
) -> Result<Json<dto::item::DeletedItem>, ErrorResponse> {
    let item_id = storable_id(parse_id(raw_id)?, domain::item::RECORD_NOT_FOUND)?;
    info!("Deleting item {item_id}");
    let item_reader = DbItemReader;
    let item_writer = DbItemWriter;

    item_service
        .delete_item(item_id, &mut *ext_cxn, &item_reader, &item_writer)
        .await
        .map_err(DomainErrorResponse::from)?;

    Ok(Json(dto::item::DeletedItem { data: true }))
}

fn record_not_found(message: &str) -> ErrorResponse {
    DomainErrorResponse(domain::Error::NotFound {
        message: message.to_owned(),
    })
    .into()
}

/// Narrows a parsed path ID to the range item IDs are stored in. IDs outside that range can't
/// belong to any item, so they're reported with [miss_message] like any other missing item.
fn storable_id(item_id: i64, miss_message: &str) -> Result<i32, ErrorResponse> {
    i32::try_from(item_id).map_err(|_| {
        info!("Item id {item_id} is outside the stored id range");
        record_not_found(miss_message)
    })
}
