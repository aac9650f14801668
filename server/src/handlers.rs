use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::{header, StatusCode},
    Json,
};
use todo_core::{ObjectId, Status};

use crate::dto::{HealthResponse, ListQuery, TodoInput, TodoView};
use crate::problem::{ApiProblem, ApiResult};
use crate::AppState;

pub async fn healthcheck() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

pub async fn create_todo(
    State(state): State<AppState>,
    payload: Result<Json<TodoInput>, JsonRejection>,
) -> ApiResult<(StatusCode, [(header::HeaderName, String); 1], Json<TodoView>)> {
    let (title, active_at) = body(payload)?.into_required()?;
    let created = state.service.create_todo(&title, &active_at).await?;

    let location = format!("{}/todo-list/tasks/{}", state.url_prefix, created.id);
    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, location)],
        Json(TodoView::from(created)),
    ))
}

pub async fn list_todos(
    State(state): State<AppState>,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> ApiResult<Json<Vec<TodoView>>> {
    let Query(query) = query.map_err(|rejection| ApiProblem::validation(rejection.body_text()))?;
    let todos = state.service.find_todos(query.into_filter()?).await?;
    Ok(Json(todos.into_iter().map(TodoView::from).collect()))
}

pub async fn get_todo(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<TodoView>> {
    let todo = state.service.find_todo(parse_id(&id)?).await?;
    Ok(Json(TodoView::from(todo)))
}

pub async fn update_todo(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<TodoInput>, JsonRejection>,
) -> ApiResult<StatusCode> {
    let id = parse_id(&id)?;
    let (title, active_at) = body(payload)?.into_required()?;
    state.service.update_todo(id, &title, &active_at).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn mark_done(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    state
        .service
        .update_todo_status(parse_id(&id)?, Status::Done)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn delete_todo(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    state.service.delete_todo(parse_id(&id)?).await?;
    Ok(StatusCode::NO_CONTENT)
}

fn parse_id(raw: &str) -> ApiResult<ObjectId> {
    Ok(raw.parse::<ObjectId>()?)
}

fn body(payload: Result<Json<TodoInput>, JsonRejection>) -> ApiResult<TodoInput> {
    payload
        .map(|Json(input)| input)
        .map_err(|rejection| ApiProblem::validation(rejection.body_text()))
}
