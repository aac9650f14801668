//! Typed commands for callers that want one entry point into the service.
//!
//! Every command has exactly one handler, so dispatch is a plain `match`.

use tracing::{info_span, Instrument};

use crate::criteria::TodoFilter;
use crate::error::TodoError;
use crate::model::{Status, Todo};
use crate::object_id::ObjectId;
use crate::service::TodoService;

#[derive(Debug, Clone)]
pub enum TodoCommand {
    Create { title: String, active_at: String },
    Find { id: ObjectId },
    FindAll { filter: TodoFilter },
    Update { id: ObjectId, title: String, active_at: String },
    UpdateStatus { id: ObjectId, status: Status },
    Delete { id: ObjectId },
}

impl TodoCommand {
    pub fn name(&self) -> &'static str {
        match self {
            TodoCommand::Create { .. } => "create",
            TodoCommand::Find { .. } => "find",
            TodoCommand::FindAll { .. } => "find_all",
            TodoCommand::Update { .. } => "update",
            TodoCommand::UpdateStatus { .. } => "update_status",
            TodoCommand::Delete { .. } => "delete",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandOutput {
    Todo(Todo),
    Todos(Vec<Todo>),
    Done,
}

impl TodoService {
    pub async fn dispatch(&self, command: TodoCommand) -> Result<CommandOutput, TodoError> {
        let span = info_span!("todo_command", command = command.name());
        async move {
            match command {
                TodoCommand::Create { title, active_at } => {
                    self.create_todo(&title, &active_at).await.map(CommandOutput::Todo)
                }
                TodoCommand::Find { id } => self.find_todo(id).await.map(CommandOutput::Todo),
                TodoCommand::FindAll { filter } => {
                    self.find_todos(filter).await.map(CommandOutput::Todos)
                }
                TodoCommand::Update { id, title, active_at } => self
                    .update_todo(id, &title, &active_at)
                    .await
                    .map(|()| CommandOutput::Done),
                TodoCommand::UpdateStatus { id, status } => self
                    .update_todo_status(id, status)
                    .await
                    .map(|()| CommandOutput::Done),
                TodoCommand::Delete { id } => self.delete_todo(id).await.map(|()| CommandOutput::Done),
            }
        }
        .instrument(span)
        .await
    }
}
