//! HTTP adapter for the todo-list service.
//!
//! # Design
//! Handlers decode requests into DTOs, call `TodoService` directly and encode
//! results or `ApiProblem`s. Cross-cutting concerns (request ids, request
//! logging, timeouts) are tower layers on the router.

pub mod config;
pub mod dto;
pub mod handlers;
pub mod problem;

use std::{sync::Arc, time::Duration};

use axum::{
    http::HeaderName,
    routing::{get, put},
    Router,
};
use todo_core::{Database, DocumentTodoRepository, TodoError, TodoService};
use tokio::net::TcpListener;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::handlers::{
    create_todo, delete_todo, get_todo, healthcheck, list_todos, mark_done, update_todo,
};

pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(20);

#[derive(Clone)]
pub struct AppState {
    pub service: Arc<TodoService>,
    pub url_prefix: Arc<str>,
}

#[derive(Debug, Clone)]
pub struct HttpSettings {
    /// Mount point for the API routes, e.g. `/api`. Empty mounts at the root.
    pub url_prefix: String,
    pub request_timeout: Duration,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            url_prefix: String::new(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}

pub fn app(service: Arc<TodoService>, settings: &HttpSettings) -> Router {
    let request_id_header = HeaderName::from_static("x-request-id");
    let state = AppState {
        service,
        url_prefix: Arc::from(settings.url_prefix.as_str()),
    };

    let tasks = Router::new()
        .route("/todo-list/tasks", get(list_todos).post(create_todo))
        .route(
            "/todo-list/tasks/{id}",
            get(get_todo).put(update_todo).delete(delete_todo),
        )
        .route("/todo-list/tasks/{id}/done", put(mark_done));

    let routes = if settings.url_prefix.is_empty() {
        tasks
    } else {
        Router::new().nest(&settings.url_prefix, tasks)
    };

    routes
        .route("/health", get(healthcheck))
        .layer(TimeoutLayer::new(settings.request_timeout))
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::new(request_id_header.clone()))
        .layer(SetRequestIdLayer::new(request_id_header, MakeRequestUuid))
        .with_state(state)
}

/// A service over a fresh in-memory database.
pub async fn in_memory_service() -> Result<Arc<TodoService>, TodoError> {
    let database = Database::memory("todo");
    let repository = DocumentTodoRepository::bootstrap(&database).await?;
    Ok(Arc::new(TodoService::new(Arc::new(repository))))
}

pub async fn run(listener: TcpListener, app: Router) -> Result<(), std::io::Error> {
    axum::serve(listener, app).await
}
