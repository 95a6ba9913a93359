use crate::domain;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

/// DTO for creating a new item via the API. `title` and `status` are required, though the
/// submitted status is replaced with "Doing".
#[derive(Deserialize, ToSchema)]
#[cfg_attr(test, derive(Serialize, Default))]
pub struct NewItem {
    #[schema(example = "Buy milk")]
    pub title: Option<String>,
    #[schema(example = "Doing")]
    pub status: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl From<NewItem> for domain::item::NewItem {
    fn from(value: NewItem) -> Self {
        domain::item::NewItem {
            title: value.title,
            status: value.status,
            created_at: value.created_at,
            updated_at: value.updated_at,
        }
    }
}

/// DTO for editing an item via the API. Both fields must be provided for the edit to succeed.
#[derive(Debug, Deserialize, ToSchema)]
#[cfg_attr(test, derive(Serialize))]
pub struct UpdateItem {
    #[schema(example = "Buy oat milk")]
    pub title: Option<String>,
    #[schema(example = "Finished")]
    pub status: Option<String>,
}

impl From<UpdateItem> for domain::item::ItemUpdate {
    fn from(value: UpdateItem) -> Self {
        domain::item::ItemUpdate {
            title: value.title,
            status: value.status,
        }
    }
}

#[derive(Serialize, ToSchema)]
#[cfg_attr(test, derive(Deserialize, PartialEq, Eq, Debug))]
pub enum ItemStatus {
    Doing,
    Finished,
}

impl From<domain::item::ItemStatus> for ItemStatus {
    fn from(value: domain::item::ItemStatus) -> Self {
        match value {
            domain::item::ItemStatus::Doing => ItemStatus::Doing,
            domain::item::ItemStatus::Finished => ItemStatus::Finished,
        }
    }
}

/// DTO for an item returned on the API
#[derive(Serialize, ToSchema)]
#[cfg_attr(test, derive(Deserialize, PartialEq, Eq, Debug))]
pub struct TodoItem {
    #[schema(example = 10)]
    pub id: i32,
    #[schema(example = "Buy milk")]
    pub title: String,
    pub status: ItemStatus,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl From<domain::item::TodoItem> for TodoItem {
    fn from(value: domain::item::TodoItem) -> Self {
        TodoItem {
            id: value.id,
            title: value.title,
            status: value.status.into(),
            created_at: value.created_at,
            updated_at: value.updated_at,
        }
    }
}

/// Query string accepted when listing items. Values which aren't positive integers are
/// treated as if they were left out, and only the first occurrence of a key counts.
#[derive(Debug, Default, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PagingQuery {
    /// 1-based page number, defaults to 1
    #[param(value_type = Option<i64>, example = 1)]
    pub page: Option<String>,
    /// Items per page, defaults to 10
    #[param(value_type = Option<i64>, example = 10)]
    pub limit: Option<String>,
}

impl From<Vec<(String, String)>> for PagingQuery {
    fn from(pairs: Vec<(String, String)>) -> Self {
        let mut query = PagingQuery::default();
        for (key, value) in pairs {
            let slot = match key.as_str() {
                "page" => &mut query.page,
                "limit" => &mut query.limit,
                _ => continue,
            };
            slot.get_or_insert(value);
        }

        query
    }
}

fn lenient_number(value: Option<&str>) -> Option<i64> {
    value.and_then(|raw| raw.trim().parse().ok())
}

impl From<PagingQuery> for domain::item::PageRequest {
    fn from(value: PagingQuery) -> Self {
        domain::item::PageRequest {
            page: lenient_number(value.page.as_deref()),
            limit: lenient_number(value.limit.as_deref()),
        }
    }
}

#[derive(Serialize, ToSchema)]
#[cfg_attr(test, derive(Deserialize, PartialEq, Eq, Debug))]
pub struct PagingInfo {
    #[schema(example = 1)]
    pub page: i64,
    #[schema(example = 10)]
    pub limit: i64,
    /// Number of items across every page
    #[schema(example = 42)]
    pub total: i64,
}

impl From<domain::item::Paging> for PagingInfo {
    fn from(value: domain::item::Paging) -> Self {
        PagingInfo {
            page: value.page,
            limit: value.limit,
            total: value.total,
        }
    }
}

/// DTO containing the ID of a newly created item
#[derive(Serialize, ToSchema)]
#[cfg_attr(test, derive(Deserialize, Debug))]
pub struct InsertedItem {
    #[schema(example = 5)]
    pub data: i32,
}

#[derive(Serialize, ToSchema)]
#[cfg_attr(test, derive(Deserialize, Debug))]
pub struct ItemData {
    pub data: TodoItem,
}

/// DTO for one page of items, newest first
#[derive(Serialize, ToSchema)]
#[cfg_attr(test, derive(Deserialize, Debug))]
pub struct ItemList {
    pub data: Vec<TodoItem>,
    pub paging: PagingInfo,
}

impl From<domain::item::ItemPage> for ItemList {
    fn from(value: domain::item::ItemPage) -> Self {
        ItemList {
            data: value.items.into_iter().map(TodoItem::from).collect(),
            paging: value.paging.into(),
        }
    }
}

#[derive(Serialize, ToSchema)]
#[cfg_attr(test, derive(Deserialize, Debug))]
pub struct DeletedItem {
    #[schema(example = true)]
    pub data: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    mod paging_query {
        use super::*;

        #[test]
        fn unparseable_values_are_dropped() {
            let request = domain::item::PageRequest::from(PagingQuery {
                page: Some("two".to_owned()),
                limit: Some(" 25 ".to_owned()),
            });
            assert_eq!(None, request.page);
            assert_eq!(Some(25), request.limit);
        }

        #[test]
        fn first_occurrence_of_a_key_wins() {
            let query = PagingQuery::from(vec![
                ("page".to_owned(), "3".to_owned()),
                ("sort".to_owned(), "title".to_owned()),
                ("page".to_owned(), "8".to_owned()),
                ("limit".to_owned(), "abc".to_owned()),
                ("limit".to_owned(), "5".to_owned()),
            ]);
            let request = domain::item::PageRequest::from(query);
            assert_eq!(Some(3), request.page);
            assert_eq!(None, request.limit);
        }

        #[test]
        fn missing_values_stay_missing() {
            let request = domain::item::PageRequest::from(PagingQuery::default());
            assert_eq!(domain::item::PageRequest::default(), request);
        }
    }

    mod todo_item {
        use super::*;

        #[test]
        fn serializes_status_and_null_timestamps() {
            let item = TodoItem::from(domain::item::TodoItem {
                id: 3,
                title: "Walk dog".to_owned(),
                status: domain::item::ItemStatus::Finished,
                created_at: None,
                updated_at: Some(domain::item::zero_timestamp()),
            });
            let serialized = serde_json::to_value(&item).expect("item should serialize");
            assert_eq!(
                serde_json::json!({
                    "id": 3,
                    "title": "Walk dog",
                    "status": "Finished",
                    "created_at": null,
                    "updated_at": "0001-01-01T00:00:00Z",
                }),
                serialized
            );
        }
    }
}
