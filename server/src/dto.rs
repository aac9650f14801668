//! Wire types for the todo-list HTTP API.

use serde::{Deserialize, Serialize};
use todo_core::{ComparisonOperator, Status, Todo, TodoError, TodoFilter};

/// Body of create and update requests. Both fields are required and must be
/// non-empty.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TodoInput {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub active_at: Option<String>,
}

impl TodoInput {
    /// Returns `(title, active_at)`.
    pub fn into_required(self) -> Result<(String, String), TodoError> {
        Ok((
            required(self.title, "title")?,
            required(self.active_at, "activeAt")?,
        ))
    }
}

fn required(value: Option<String>, name: &'static str) -> Result<String, TodoError> {
    match value {
        Some(value) if !value.is_empty() => Ok(value),
        _ => Err(TodoError::MissingField(name)),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TodoView {
    pub id: String,
    pub title: String,
    pub active_at: String,
    pub status: Status,
}

impl From<Todo> for TodoView {
    fn from(todo: Todo) -> Self {
        Self {
            id: todo.id.to_hex(),
            active_at: todo.active_at_string(),
            title: todo.title,
            status: todo.status,
        }
    }
}

/// `GET /todo-list/tasks` query string.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    pub status: Option<String>,
    pub title: Option<String>,
    pub active_at: Option<String>,
    pub active_at_op: Option<String>,
}

impl ListQuery {
    /// Status defaults to ACTIVE; `activeAt` alone means equality.
    pub fn into_filter(self) -> Result<TodoFilter, TodoError> {
        let status = match self.status.as_deref() {
            Some(raw) => raw.parse()?,
            None => Status::Active,
        };

        let mut filter = TodoFilter::new().with_status(status);
        if let Some(title) = self.title {
            filter = filter.with_title(title);
        }

        match (self.active_at, self.active_at_op) {
            (Some(date), op) => {
                let operator = match op {
                    Some(raw) => raw.parse()?,
                    None => ComparisonOperator::Eq,
                };
                filter = filter.with_active_at(operator, todo_core::model::parse_date(&date)?);
            }
            (None, Some(_)) => return Err(TodoError::MissingField("activeAt")),
            (None, None) => {}
        }
        Ok(filter)
    }
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}
