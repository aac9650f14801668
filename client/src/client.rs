//! Stateless request builder and response parser for the todo-list API.

use serde::de::DeserializeOwned;

use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::types::{ListQuery, TodoInput, TodoView};

const TASKS: &str = "/todo-list/tasks";

/// Synchronous, stateless client for the todo-list API.
///
/// `base_url` includes any URL prefix the server is mounted under, e.g.
/// `http://localhost:8080/api`.
#[derive(Debug, Clone)]
pub struct TodoClient {
    base_url: String,
}

impl TodoClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn build_list_todos(&self, query: &ListQuery) -> Result<HttpRequest, ApiError> {
        let query =
            serde_urlencoded::to_string(query).map_err(|e| ApiError::Serialization(e.to_string()))?;
        let mut path = self.tasks_url();
        if !query.is_empty() {
            path.push('?');
            path.push_str(&query);
        }
        Ok(request(HttpMethod::Get, path, None))
    }

    pub fn build_get_todo(&self, id: &str) -> HttpRequest {
        request(HttpMethod::Get, self.task_url(id), None)
    }

    pub fn build_create_todo(&self, input: &TodoInput) -> Result<HttpRequest, ApiError> {
        Ok(request(HttpMethod::Post, self.tasks_url(), Some(json_body(input)?)))
    }

    pub fn build_update_todo(&self, id: &str, input: &TodoInput) -> Result<HttpRequest, ApiError> {
        Ok(request(HttpMethod::Put, self.task_url(id), Some(json_body(input)?)))
    }

    pub fn build_mark_done(&self, id: &str) -> HttpRequest {
        request(HttpMethod::Put, format!("{}/done", self.task_url(id)), None)
    }

    pub fn build_delete_todo(&self, id: &str) -> HttpRequest {
        request(HttpMethod::Delete, self.task_url(id), None)
    }

    pub fn parse_list_todos(&self, response: HttpResponse) -> Result<Vec<TodoView>, ApiError> {
        check_status(&response, 200)?;
        json(&response)
    }

    pub fn parse_get_todo(&self, response: HttpResponse) -> Result<TodoView, ApiError> {
        check_status(&response, 200)?;
        json(&response)
    }

    pub fn parse_create_todo(&self, response: HttpResponse) -> Result<TodoView, ApiError> {
        check_status(&response, 201)?;
        json(&response)
    }

    pub fn parse_update_todo(&self, response: HttpResponse) -> Result<(), ApiError> {
        check_status(&response, 204)
    }

    pub fn parse_mark_done(&self, response: HttpResponse) -> Result<(), ApiError> {
        check_status(&response, 204)
    }

    pub fn parse_delete_todo(&self, response: HttpResponse) -> Result<(), ApiError> {
        check_status(&response, 204)
    }

    fn tasks_url(&self) -> String {
        format!("{}{TASKS}", self.base_url)
    }

    fn task_url(&self, id: &str) -> String {
        format!("{}{TASKS}/{id}", self.base_url)
    }
}

fn request(method: HttpMethod, path: String, body: Option<String>) -> HttpRequest {
    let headers = match body {
        Some(_) => vec![("content-type".to_string(), "application/json".to_string())],
        None => Vec::new(),
    };
    HttpRequest {
        method,
        path,
        headers,
        body,
    }
}

fn json_body(input: &TodoInput) -> Result<String, ApiError> {
    serde_json::to_string(input).map_err(|e| ApiError::Serialization(e.to_string()))
}

fn json<T: DeserializeOwned>(response: &HttpResponse) -> Result<T, ApiError> {
    serde_json::from_str(&response.body).map_err(|e| ApiError::Deserialization(e.to_string()))
}

/// Map non-success status codes to the appropriate `ApiError` variant.
fn check_status(response: &HttpResponse, expected: u16) -> Result<(), ApiError> {
    match response.status {
        status if status == expected => Ok(()),
        404 => Err(ApiError::NotFound),
        409 => Err(ApiError::Conflict {
            body: response.body.clone(),
        }),
        status => Err(ApiError::HttpError {
            status,
            body: response.body.clone(),
        }),
    }
}
