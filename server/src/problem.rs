//! Error responses.
//!
//! Failures are rendered as `application/problem+json`, except "not found",
//! which is a bare 404 with an empty body.

use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use todo_core::{ErrorKind, TodoError};
use tracing::error;
use uuid::Uuid;

pub type ApiResult<T> = Result<T, ApiProblem>;

#[derive(Debug)]
pub struct ApiProblem {
    status: StatusCode,
    title: &'static str,
    kind: &'static str,
    detail: String,
    correlation_id: String,
}

impl ApiProblem {
    pub fn validation(detail: impl Into<String>) -> Self {
        Self::new(
            StatusCode::BAD_REQUEST,
            "Validation failed",
            "/problems/validation",
            detail,
        )
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    fn new(status: StatusCode, title: &'static str, kind: &'static str, detail: impl Into<String>) -> Self {
        Self {
            status,
            title,
            kind,
            detail: detail.into(),
            correlation_id: Uuid::new_v4().to_string(),
        }
    }
}

impl From<TodoError> for ApiProblem {
    fn from(error: TodoError) -> Self {
        let detail = error.to_string();
        match error.kind() {
            ErrorKind::Validation => Self::validation(detail),
            ErrorKind::NotFound => Self::new(
                StatusCode::NOT_FOUND,
                "Not found",
                "/problems/not-found",
                detail,
            ),
            ErrorKind::Conflict => Self::new(
                StatusCode::CONFLICT,
                "Conflict",
                "/problems/conflict",
                detail,
            ),
            ErrorKind::Internal => Self::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error",
                "/problems/internal",
                detail,
            ),
        }
    }
}

#[derive(Debug, Serialize)]
struct ProblemDetails {
    #[serde(rename = "type")]
    kind: &'static str,
    title: &'static str,
    status: u16,
    detail: String,
    correlation_id: String,
}

impl IntoResponse for ApiProblem {
    fn into_response(self) -> Response {
        if self.status == StatusCode::NOT_FOUND {
            return StatusCode::NOT_FOUND.into_response();
        }
        if self.status.is_server_error() {
            error!(
                correlation_id = %self.correlation_id,
                detail = %self.detail,
                "request failed"
            );
        }

        let payload = ProblemDetails {
            kind: self.kind,
            title: self.title,
            status: self.status.as_u16(),
            detail: self.detail,
            correlation_id: self.correlation_id,
        };

        let mut response = (self.status, Json(payload)).into_response();
        response.headers_mut().insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/problem+json"),
        );
        response
    }
}
