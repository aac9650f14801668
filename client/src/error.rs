//! Error types for the todo-list API client.
//!
//! `NotFound` and `Conflict` get dedicated variants because callers act on
//! them. Any other unexpected status lands in `HttpError` with the raw status
//! and body, which for 4xx/5xx is a problem+json document.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    /// 404: the task does not exist.
    #[error("resource not found")]
    NotFound,

    /// 409: another task already has this title and date.
    #[error("conflict: {body}")]
    Conflict { body: String },

    #[error("HTTP {status}: {body}")]
    HttpError { status: u16, body: String },

    #[error("deserialization failed: {0}")]
    Deserialization(String),

    #[error("serialization failed: {0}")]
    Serialization(String),
}
