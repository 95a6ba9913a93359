use crate::domain;
use crate::domain::item::{CreateItem, ItemChanges, ItemStatus, TodoItem};
use crate::external_connections::{ConnectionHandle, ExternalConnectivity};
use anyhow::{Context, Error};
use chrono::{DateTime, Utc};
use sqlx::{FromRow, query, query_as, query_scalar};

pub struct DbItemReader;

#[derive(FromRow)]
struct TodoItemRow {
    id: i32,
    title: String,
    status: String,
    created_at: Option<DateTime<Utc>>,
    updated_at: Option<DateTime<Utc>>,
}

impl TryFrom<TodoItemRow> for TodoItem {
    type Error = anyhow::Error;

    fn try_from(value: TodoItemRow) -> Result<Self, Self::Error> {
        let status: ItemStatus = value
            .status
            .parse()
            .with_context(|| format!("reading the status of item {}", value.id))?;

        Ok(TodoItem {
            id: value.id,
            title: value.title,
            status,
            created_at: value.created_at,
            updated_at: value.updated_at,
        })
    }
}

impl domain::item::driven_ports::ItemReader for DbItemReader {
    async fn count_items(&self, ext_cxn: &mut impl ExternalConnectivity) -> Result<i64, Error> {
        let mut cxn = ext_cxn.database_cxn().await?;

        let total = query_scalar::<_, i64>("SELECT count(*) FROM todo_items")
            .fetch_one(cxn.borrow_connection())
            .await
            .context("trying to count todo items")?;

        Ok(total)
    }

    async fn items_page(
        &self,
        offset: i64,
        limit: i64,
        ext_cxn: &mut impl ExternalConnectivity,
    ) -> Result<Vec<TodoItem>, Error> {
        let mut cxn = ext_cxn.database_cxn().await?;

        query_as::<_, TodoItemRow>(
            "SELECT ti.id, ti.title, ti.status, ti.created_at, ti.updated_at FROM todo_items ti \
             ORDER BY ti.id DESC LIMIT $1 OFFSET $2",
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(cxn.borrow_connection())
        .await
        .context("trying to fetch a page of todo items")?
        .into_iter()
        .map(TodoItem::try_from)
        .collect()
    }

    async fn item_by_id(
        &self,
        item_id: i32,
        ext_cxn: &mut impl ExternalConnectivity,
    ) -> Result<Option<TodoItem>, Error> {
        let mut cxn = ext_cxn.database_cxn().await?;

        query_as::<_, TodoItemRow>(
            "SELECT ti.id, ti.title, ti.status, ti.created_at, ti.updated_at FROM todo_items ti \
             WHERE ti.id = $1",
        )
        .bind(item_id)
        .fetch_optional(cxn.borrow_connection())
        .await
        .context("trying to fetch a todo item by ID")?
        .map(TodoItem::try_from)
        .transpose()
    }
}

pub struct DbItemWriter;

impl domain::item::driven_ports::ItemWriter for DbItemWriter {
    async fn create_item(
        &self,
        item: &CreateItem,
        ext_cxn: &mut impl ExternalConnectivity,
    ) -> Result<i32, Error> {
        let mut cxn = ext_cxn.database_cxn().await?;

        let new_id = query_scalar::<_, i32>(
            "INSERT INTO todo_items(title, status, created_at, updated_at) VALUES ($1, $2, $3, $4) \
             RETURNING todo_items.id",
        )
        .bind(&item.title)
        .bind(item.status.to_string())
        .bind(item.created_at)
        .bind(item.updated_at)
        .fetch_one(cxn.borrow_connection())
        .await
        .context("trying to insert a new todo item into the database")?;

        Ok(new_id)
    }

    async fn update_item(
        &self,
        item_id: i32,
        changes: &ItemChanges,
        ext_cxn: &mut impl ExternalConnectivity,
    ) -> Result<(), Error> {
        let mut cxn = ext_cxn.database_cxn().await?;

        query("UPDATE todo_items SET title = $1, status = $2, updated_at = $3 WHERE id = $4")
            .bind(&changes.title)
            .bind(changes.status.to_string())
            .bind(changes.updated_at)
            .bind(item_id)
            .execute(cxn.borrow_connection())
            .await
            .context("trying to update a todo item in the database")?;

        Ok(())
    }

    async fn delete_item(
        &self,
        item_id: i32,
        ext_cxn: &mut impl ExternalConnectivity,
    ) -> Result<(), Error> {
        let mut cxn = ext_cxn.database_cxn().await?;

        query("DELETE FROM todo_items WHERE id = $1")
            .bind(item_id)
            .execute(cxn.borrow_connection())
            .await
            .context("trying to remove a todo item from the database")?;

        Ok(())
    }
}
