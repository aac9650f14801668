//! Todo persistence on top of the embedded document store.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{error, info};

use crate::criteria::{TodoFilter, TodoPatch};
use crate::error::TodoError;
use crate::model::{NewTodo, Status, Todo};
use crate::object_id::ObjectId;
use crate::store::{Collection, Database, Document, IndexModel, StoreError};
use crate::translator::{self, fields};

pub const COLLECTION_NAME: &str = "todos";

#[async_trait]
pub trait TodoRepository: Send + Sync {
    async fn create(&self, todo: NewTodo) -> Result<Todo, TodoError>;
    async fn find_by_id(&self, id: ObjectId) -> Result<Todo, TodoError>;
    async fn find_all(&self, filter: &TodoFilter) -> Result<Vec<Todo>, TodoError>;
    async fn update(&self, patch: &TodoPatch) -> Result<(), TodoError>;
    async fn delete(&self, id: ObjectId) -> Result<(), TodoError>;
}

/// Stored shape of a todo.
#[derive(Debug, Serialize, Deserialize)]
struct TodoRecord {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    id: Option<ObjectId>,
    title: String,
    status: Status,
    active_at: NaiveDate,
    #[serde(with = "chrono::serde::ts_microseconds")]
    created_at: DateTime<Utc>,
    #[serde(
        default,
        with = "chrono::serde::ts_microseconds_option",
        skip_serializing_if = "Option::is_none"
    )]
    updated_at: Option<DateTime<Utc>>,
}

impl TodoRecord {
    fn into_todo(self) -> Result<Todo, TodoError> {
        let id = self
            .id
            .ok_or_else(|| TodoError::storage("stored todo has no id"))?;
        Ok(Todo {
            id,
            title: self.title,
            status: self.status,
            active_at: self.active_at,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

fn encode(record: &TodoRecord) -> Result<Document, TodoError> {
    match serde_json::to_value(record).map_err(|err| TodoError::storage(err.to_string()))? {
        Value::Object(document) => Ok(document),
        _ => Err(TodoError::storage("todo did not encode to a document")),
    }
}

fn decode(document: Document) -> Result<Todo, TodoError> {
    let record: TodoRecord = serde_json::from_value(Value::Object(document))
        .map_err(|err| TodoError::storage(format!("malformed todo document: {err}")))?;
    record.into_todo()
}

/// Maps store failures onto domain errors; store-native errors stop here.
fn store_error(err: StoreError) -> TodoError {
    match err {
        StoreError::DuplicateKey { .. } => TodoError::Conflict,
        other => {
            error!(error = %other, "todo store operation failed");
            TodoError::storage(other.to_string())
        }
    }
}

pub struct DocumentTodoRepository {
    collection: Arc<Collection>,
}

impl DocumentTodoRepository {
    /// Ensures the `todos` collection exists and carries the unique
    /// (title, active_at) index. Safe to run on every start.
    pub async fn bootstrap(database: &Database) -> Result<Self, TodoError> {
        let collection = match database.collection(COLLECTION_NAME).await {
            Some(collection) => collection,
            None => database
                .create_collection(COLLECTION_NAME)
                .await
                .map_err(store_error)?,
        };

        let created = collection
            .create_index(IndexModel::unique(&[fields::TITLE, fields::ACTIVE_AT]))
            .await
            .map_err(store_error)?;

        info!(
            database = database.name(),
            collection = COLLECTION_NAME,
            index_created = created,
            documents = collection.len().await,
            "todo repository ready"
        );
        Ok(Self { collection })
    }
}

#[async_trait]
impl TodoRepository for DocumentTodoRepository {
    async fn create(&self, todo: NewTodo) -> Result<Todo, TodoError> {
        let mut record = TodoRecord {
            id: None,
            title: todo.title,
            status: todo.status,
            active_at: todo.active_at,
            // Stored with microsecond precision.
            created_at: Utc::now().trunc_subsecs(6),
            updated_at: None,
        };
        let id = self
            .collection
            .insert_one(encode(&record)?)
            .await
            .map_err(store_error)?;
        record.id = Some(id);
        record.into_todo()
    }

    async fn find_by_id(&self, id: ObjectId) -> Result<Todo, TodoError> {
        self.collection
            .find_one(&translator::id_filter(id))
            .await
            .map_err(store_error)?
            .ok_or(TodoError::NotFound)
            .and_then(decode)
    }

    async fn find_all(&self, filter: &TodoFilter) -> Result<Vec<Todo>, TodoError> {
        let query = translator::filter_document(filter);
        self.collection
            .find(&query, &translator::list_sort())
            .await
            .map_err(store_error)?
            .into_iter()
            .map(decode)
            .collect()
    }

    async fn update(&self, patch: &TodoPatch) -> Result<(), TodoError> {
        let update = translator::update_document(patch, Utc::now())?;
        self.collection
            .find_one_and_update(&translator::id_filter(patch.id), &update)
            .await
            .map_err(store_error)?
            .map(|_| ())
            .ok_or(TodoError::NotFound)
    }

    async fn delete(&self, id: ObjectId) -> Result<(), TodoError> {
        self.collection
            .find_one_and_delete(&translator::id_filter(id))
            .await
            .map_err(store_error)?
            .map(|_| ())
            .ok_or(TodoError::NotFound)
    }
}
