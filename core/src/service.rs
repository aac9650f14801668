//! Business rules applied around the repository.
//!
//! # Design
//! Inputs are validated before any store call. Listing results pass through
//! a display-only projection that prefixes weekend titles; the repository
//! never sees the decorated value.

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, instrument};

use crate::criteria::{ComparisonOperator, DateCriterion, TodoFilter, TodoPatch};
use crate::error::TodoError;
use crate::model::{parse_date, validate_title, NewTodo, Status, Todo};
use crate::object_id::ObjectId;
use crate::repository::TodoRepository;

pub const DEFAULT_WEEKEND_MARKER: &str = "WEEKEND — ";

#[derive(Clone)]
pub struct TodoService {
    repository: Arc<dyn TodoRepository>,
    weekend_marker: String,
}

impl TodoService {
    pub fn new(repository: Arc<dyn TodoRepository>) -> Self {
        Self {
            repository,
            weekend_marker: DEFAULT_WEEKEND_MARKER.to_string(),
        }
    }

    pub fn with_weekend_marker(mut self, marker: impl Into<String>) -> Self {
        self.weekend_marker = marker.into();
        self
    }

    pub fn weekend_marker(&self) -> &str {
        &self.weekend_marker
    }

    #[instrument(skip(self), err(level = "debug"))]
    pub async fn create_todo(&self, title: &str, active_at: &str) -> Result<Todo, TodoError> {
        validate_title(title)?;
        let active_at = parse_date(active_at)?;

        let created = self
            .repository
            .create(NewTodo {
                title: title.to_string(),
                status: Status::Active,
                active_at,
            })
            .await?;
        debug!(id = %created.id, "todo created");
        Ok(created)
    }

    pub async fn find_todo(&self, id: ObjectId) -> Result<Todo, TodoError> {
        self.repository.find_by_id(id).await
    }

    /// Lists todos. An ACTIVE listing only shows items whose date has come
    /// (`active_at <= today`, UTC), whatever date criterion was supplied.
    #[instrument(skip(self), err(level = "debug"))]
    pub async fn find_todos(&self, filter: TodoFilter) -> Result<Vec<Todo>, TodoError> {
        let filter = match filter.status {
            Some(Status::Active) => TodoFilter {
                active_at: Some(DateCriterion::new(
                    ComparisonOperator::Lte,
                    Utc::now().date_naive(),
                )),
                ..filter
            },
            _ => filter,
        };

        let todos = self.repository.find_all(&filter).await?;
        debug!(count = todos.len(), "todos listed");
        Ok(todos.into_iter().map(|todo| self.decorate(todo)).collect())
    }

    #[instrument(skip(self), err(level = "debug"))]
    pub async fn update_todo(&self, id: ObjectId, title: &str, active_at: &str) -> Result<(), TodoError> {
        validate_title(title)?;
        let active_at = parse_date(active_at)?;

        let patch = TodoPatch::new(id).with_title(title).with_active_at(active_at);
        self.repository.update(&patch).await
    }

    #[instrument(skip(self), err(level = "debug"))]
    pub async fn update_todo_status(&self, id: ObjectId, status: Status) -> Result<(), TodoError> {
        self.repository
            .update(&TodoPatch::new(id).with_status(status))
            .await
    }

    #[instrument(skip(self), err(level = "debug"))]
    pub async fn delete_todo(&self, id: ObjectId) -> Result<(), TodoError> {
        self.repository.delete(id).await
    }

    fn decorate(&self, mut todo: Todo) -> Todo {
        if todo.is_weekend() {
            todo.title = format!("{}{}", self.weekend_marker, todo.title);
        }
        todo
    }
}
