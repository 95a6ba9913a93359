use crate::domain::Error;
use crate::domain::item::driven_ports::{ItemReader, ItemWriter};
use crate::external_connections::ExternalConnectivity;
use chrono::{DateTime, Utc};
use derive_more::Display;
use std::borrow::Cow;
use std::str::FromStr;
use tracing::{error, info, warn};
use validator::{Validate, ValidationError, ValidationErrors};

/// Message reported when an item targeted by an update or delete can't be loaded
pub const RECORD_NOT_FOUND: &str = "Record not found";
/// Message produced by a lookup by ID that matched no rows
pub const LOOKUP_MISS: &str = "record not found";

pub const DEFAULT_PAGE: i64 = 1;
pub const DEFAULT_LIMIT: i64 = 10;

/// Fields of item inputs in the order they are checked. When several fields are invalid,
/// the earliest one in this list is the one reported to the client.
const FIELD_ORDER: [&str; 2] = ["title", "status"];

/// Seconds between the unix epoch and 0001-01-01T00:00:00Z
const ZERO_TIME_UNIX_SECONDS: i64 = -62_135_596_800;

/// Progress of a to-do item. Every item starts out as [ItemStatus::Doing].
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq)]
pub enum ItemStatus {
    Doing,
    Finished,
}

#[derive(Debug, thiserror::Error)]
#[error("unrecognized item status \"{0}\"")]
pub struct UnknownStatus(pub String);

impl FromStr for ItemStatus {
    type Err = UnknownStatus;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "Doing" => Ok(Self::Doing),
            "Finished" => Ok(Self::Finished),
            other => Err(UnknownStatus(other.to_owned())),
        }
    }
}

#[derive(PartialEq, Eq, Debug, Clone)]
pub struct TodoItem {
    pub id: i32,
    pub title: String,
    pub status: ItemStatus,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// The "zero" timestamp (0001-01-01T00:00:00Z) written to `updated_at` whenever an item is edited
pub fn zero_timestamp() -> DateTime<Utc> {
    DateTime::from_timestamp(ZERO_TIME_UNIX_SECONDS, 0)
        .expect("0001-01-01T00:00:00Z should be a representable timestamp")
}

/// Item data as submitted by a client, before any rules have been applied
#[derive(Debug, Default)]
#[cfg_attr(test, derive(Clone, PartialEq))]
pub struct NewItem {
    pub title: Option<String>,
    pub status: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// A new item which has passed validation and is ready to be stored
#[derive(Debug)]
#[cfg_attr(test, derive(Clone, PartialEq))]
pub struct CreateItem {
    pub title: String,
    pub status: ItemStatus,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Changes to an item as submitted by a client, before any rules have been applied
#[derive(Debug, Default)]
#[cfg_attr(test, derive(Clone, PartialEq))]
pub struct ItemUpdate {
    pub title: Option<String>,
    pub status: Option<String>,
}

/// Validated changes to apply to a stored item. `created_at` is never part of an edit.
#[derive(Debug)]
#[cfg_attr(test, derive(Clone, PartialEq))]
pub struct ItemChanges {
    pub title: String,
    pub status: ItemStatus,
    pub updated_at: DateTime<Utc>,
}

fn field_error(code: &'static str, message: &'static str) -> ValidationError {
    let mut err = ValidationError::new(code);
    err.message = Some(Cow::from(message));
    err
}

fn is_missing(value: &Option<String>) -> bool {
    value.as_deref().is_none_or(str::is_empty)
}

fn trimmed(value: &Option<String>) -> &str {
    value.as_deref().map(str::trim).unwrap_or_default()
}

impl Validate for NewItem {
    fn validate(&self) -> Result<(), ValidationErrors> {
        self.validated().map(|_| ())
    }
}

impl NewItem {
    /// Applies creation rules: the title is trimmed and the client's status is discarded
    /// in favor of [ItemStatus::Doing]
    pub fn validated(&self) -> Result<CreateItem, ValidationErrors> {
        let mut errors = ValidationErrors::new();

        // Presence is checked for every field before any content rules run
        if is_missing(&self.title) {
            errors.add("title", field_error("required", "title is required"));
        }
        if is_missing(&self.status) {
            errors.add("status", field_error("required", "status is required"));
        }
        if !errors.errors().is_empty() {
            return Err(errors);
        }

        let title = trimmed(&self.title);
        if title.is_empty() {
            errors.add("title", field_error("blank", "Title should not be blank"));
            return Err(errors);
        }

        Ok(CreateItem {
            title: title.to_owned(),
            status: ItemStatus::Doing,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

impl Validate for ItemUpdate {
    fn validate(&self) -> Result<(), ValidationErrors> {
        self.validated().map(|_| ())
    }
}

impl ItemUpdate {
    /// Applies edit rules: title and status are both mandatory, and `updated_at` is
    /// always reset to [zero_timestamp]
    pub fn validated(&self) -> Result<ItemChanges, ValidationErrors> {
        let mut errors = ValidationErrors::new();

        let title = trimmed(&self.title);
        if title.is_empty() {
            errors.add("title", field_error("blank", "Title should not be blank"));
        }
        let status = self
            .status
            .as_deref()
            .and_then(|status| status.parse::<ItemStatus>().ok());
        let Some(status) = status else {
            errors.add(
                "status",
                field_error("status", "Status should be Doing or Finished"),
            );
            return Err(errors);
        };
        if !errors.errors().is_empty() {
            return Err(errors);
        }

        Ok(ItemChanges {
            title: title.to_owned(),
            status,
            updated_at: zero_timestamp(),
        })
    }
}

/// Picks the message for the first invalid field, walking fields in the order they're checked
pub fn first_failure_message(errors: &ValidationErrors) -> String {
    let field_errors = errors.field_errors();
    FIELD_ORDER
        .iter()
        .filter_map(|field| field_errors.get(*field).copied())
        .chain(field_errors.values().copied())
        .flat_map(|errs| errs.iter())
        .next()
        .map(|err| match err.message {
            Some(ref message) => message.to_string(),
            None => err.code.to_string(),
        })
        .unwrap_or_else(|| "Submitted data was invalid".to_owned())
}

/// A client's request for one page of items. Missing or non-positive values fall back to
/// [DEFAULT_PAGE] and [DEFAULT_LIMIT].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Paging {
    pub page: i64,
    pub limit: i64,
    pub total: i64,
}

impl PageRequest {
    /// Resolves the page and limit the client will actually get
    pub fn normalize(&self) -> Paging {
        Paging {
            page: self.page.filter(|page| *page > 0).unwrap_or(DEFAULT_PAGE),
            limit: self.limit.filter(|limit| *limit > 0).unwrap_or(DEFAULT_LIMIT),
            total: 0,
        }
    }
}

impl Paging {
    /// Number of items that come before this page
    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.limit)
    }
}

#[derive(Debug, PartialEq, Eq)]
#[cfg_attr(test, derive(Clone))]
pub struct ItemPage {
    pub items: Vec<TodoItem>,
    pub paging: Paging,
}

pub mod driven_ports {
    use super::*;

    pub trait ItemReader {
        /// Counts every item in storage
        async fn count_items(
            &self,
            ext_cxn: &mut impl ExternalConnectivity,
        ) -> Result<i64, anyhow::Error>;

        /// Fetches up to [limit] items, newest ID first, skipping the first [offset]
        async fn items_page(
            &self,
            offset: i64,
            limit: i64,
            ext_cxn: &mut impl ExternalConnectivity,
        ) -> Result<Vec<TodoItem>, anyhow::Error>;

        async fn item_by_id(
            &self,
            item_id: i32,
            ext_cxn: &mut impl ExternalConnectivity,
        ) -> Result<Option<TodoItem>, anyhow::Error>;
    }

    pub trait ItemWriter {
        /// Stores a new item, returning the ID storage assigned to it
        async fn create_item(
            &self,
            item: &CreateItem,
            ext_cxn: &mut impl ExternalConnectivity,
        ) -> Result<i32, anyhow::Error>;

        async fn update_item(
            &self,
            item_id: i32,
            changes: &ItemChanges,
            ext_cxn: &mut impl ExternalConnectivity,
        ) -> Result<(), anyhow::Error>;

        async fn delete_item(
            &self,
            item_id: i32,
            ext_cxn: &mut impl ExternalConnectivity,
        ) -> Result<(), anyhow::Error>;
    }
}

pub mod driving_ports {
    use super::*;

    pub trait ItemPort {
        async fn create_item(
            &self,
            new_item: &NewItem,
            ext_cxn: &mut impl ExternalConnectivity,
            item_write: &impl ItemWriter,
        ) -> Result<i32, Error>;

        async fn list_items(
            &self,
            request: &PageRequest,
            ext_cxn: &mut impl ExternalConnectivity,
            item_read: &impl ItemReader,
        ) -> Result<ItemPage, Error>;

        async fn item_by_id(
            &self,
            item_id: i32,
            ext_cxn: &mut impl ExternalConnectivity,
            item_read: &impl ItemReader,
        ) -> Result<TodoItem, Error>;

        async fn update_item(
            &self,
            item_id: i32,
            update: &ItemUpdate,
            ext_cxn: &mut impl ExternalConnectivity,
            item_read: &impl ItemReader,
            item_write: &impl ItemWriter,
        ) -> Result<TodoItem, Error>;

        async fn delete_item(
            &self,
            item_id: i32,
            ext_cxn: &mut impl ExternalConnectivity,
            item_read: &impl ItemReader,
            item_write: &impl ItemWriter,
        ) -> Result<(), Error>;
    }
}

pub struct ItemService {}

impl ItemService {
    /// Loads an item that is about to be modified. Any lookup problem is reported to the
    /// client as the item not existing.
    async fn existing_item(
        item_id: i32,
        ext_cxn: &mut impl ExternalConnectivity,
        item_read: &impl ItemReader,
    ) -> Result<TodoItem, Error> {
        match item_read.item_by_id(item_id, &mut *ext_cxn).await {
            Ok(Some(item)) => Ok(item),
            Ok(None) => Err(Error::NotFound {
                message: RECORD_NOT_FOUND.to_owned(),
            }),
            Err(lookup_err) => {
                warn!("Lookup of item {item_id} failed: {lookup_err:#}");
                Err(Error::NotFound {
                    message: RECORD_NOT_FOUND.to_owned(),
                })
            }
        }
    }
}

impl driving_ports::ItemPort for ItemService {
    #[tracing::instrument(skip_all)]
    async fn create_item(
        &self,
        new_item: &NewItem,
        ext_cxn: &mut impl ExternalConnectivity,
        item_write: &impl ItemWriter,
    ) -> Result<i32, Error> {
        let to_create = new_item.validated()?;

        let new_id = item_write
            .create_item(&to_create, &mut *ext_cxn)
            .await
            .map_err(|err| {
                error!("Item insert failure: {err:#}");
                Error::retrieve_failure("insert a new to-do item", err)
            })?;

        info!("Created item {new_id}");
        Ok(new_id)
    }

    #[tracing::instrument(skip(self, ext_cxn, item_read))]
    async fn list_items(
        &self,
        request: &PageRequest,
        ext_cxn: &mut impl ExternalConnectivity,
        item_read: &impl ItemReader,
    ) -> Result<ItemPage, Error> {
        let mut paging = request.normalize();
        let offset = paging.offset();
        info!(
            page = paging.page,
            limit = paging.limit,
            offset,
            "Listing items"
        );

        paging.total = item_read
            .count_items(&mut *ext_cxn)
            .await
            .map_err(|err| {
                error!("Item count failure: {err:#}");
                Error::retrieve_failure("count to-do items", err)
            })?;

        let items = item_read
            .items_page(offset, paging.limit, &mut *ext_cxn)
            .await
            .map_err(|err| {
                error!("Item page fetch failure: {err:#}");
                Error::retrieve_failure("fetch a page of to-do items", err)
            })?;

        Ok(ItemPage { items, paging })
    }

    #[tracing::instrument(skip(self, ext_cxn, item_read))]
    async fn item_by_id(
        &self,
        item_id: i32,
        ext_cxn: &mut impl ExternalConnectivity,
        item_read: &impl ItemReader,
    ) -> Result<TodoItem, Error> {
        match item_read.item_by_id(item_id, &mut *ext_cxn).await {
            Ok(Some(item)) => Ok(item),
            Ok(None) => Err(Error::NotFound {
                message: LOOKUP_MISS.to_owned(),
            }),
            Err(lookup_err) => {
                error!("Lookup of item {item_id} failed: {lookup_err:#}");
                Err(Error::NotFound {
                    message: lookup_err.to_string(),
                })
            }
        }
    }

    #[tracing::instrument(skip(self, update, ext_cxn, item_read, item_write))]
    async fn update_item(
        &self,
        item_id: i32,
        update: &ItemUpdate,
        ext_cxn: &mut impl ExternalConnectivity,
        item_read: &impl ItemReader,
        item_write: &impl ItemWriter,
    ) -> Result<TodoItem, Error> {
        let existing = Self::existing_item(item_id, &mut *ext_cxn, item_read).await?;

        let changes = update.validated()?;

        item_write
            .update_item(item_id, &changes, &mut *ext_cxn)
            .await
            .map_err(|err| {
                error!("Update of item {item_id} failed: {err:#}");
                Error::persist_failure("update a to-do item", err)
            })?;

        Ok(TodoItem {
            title: changes.title,
            status: changes.status,
            updated_at: Some(changes.updated_at),
            ..existing
        })
    }

    #[tracing::instrument(skip(self, ext_cxn, item_read, item_write))]
    async fn delete_item(
        &self,
        item_id: i32,
        ext_cxn: &mut impl ExternalConnectivity,
        item_read: &impl ItemReader,
        item_write: &impl ItemWriter,
    ) -> Result<(), Error> {
        let existing = Self::existing_item(item_id, &mut *ext_cxn, item_read).await?;

        item_write
            .delete_item(existing.id, &mut *ext_cxn)
            .await
            .map_err(|err| {
                error!("Delete of item {item_id} failed: {err:#}");
                Error::persist_failure("delete a to-do item", err)
            })?;

        Ok(())
    }
}
