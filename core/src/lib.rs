//! Core of the todo-list service.
//!
//! # Overview
//! Validates and stores dated todo items. Requests flow
//! `TodoService` -> `TodoRepository` -> translator -> document store.
//!
//! # Design
//! - Filters and patches are optional-field structs; `None` is the only
//!   "unset" marker.
//! - The translator turns them into store documents; the repository maps
//!   store outcomes to `TodoError` and owns the (title, activeAt) uniqueness
//!   index.
//! - The service holds the business rules: title length, date format,
//!   ACTIVE listing cut-off and the weekend title projection.
//! - No HTTP types live here.

pub mod command;
pub mod criteria;
pub mod error;
pub mod model;
pub mod object_id;
pub mod repository;
pub mod service;
pub mod store;
pub mod translator;

pub use command::{CommandOutput, TodoCommand};
pub use criteria::{ComparisonOperator, DateCriterion, TodoFilter, TodoPatch};
pub use error::{ErrorKind, TodoError};
pub use model::{NewTodo, Status, Todo};
pub use object_id::ObjectId;
pub use repository::{DocumentTodoRepository, TodoRepository};
pub use service::TodoService;
pub use store::{Database, StoreLocation};
