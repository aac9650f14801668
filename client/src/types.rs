//! Wire DTOs for the todo-list API.

use serde::{Deserialize, Serialize};

/// A task as returned by the API. `status` is `"ACTIVE"` or `"DONE"`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TodoView {
    pub id: String,
    pub title: String,
    pub active_at: String,
    pub status: String,
}

/// Body of create and replace requests.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TodoInput {
    pub title: String,
    /// `YYYY-MM-DD`.
    pub active_at: String,
}

impl TodoInput {
    pub fn new(title: impl Into<String>, active_at: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            active_at: active_at.into(),
        }
    }
}

/// Listing filters. Unset fields are left out of the query string; the
/// server then lists ACTIVE tasks.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active_at_op: Option<String>,
}

impl ListQuery {
    pub fn status(status: impl Into<String>) -> Self {
        Self {
            status: Some(status.into()),
            ..Self::default()
        }
    }
}
