//! Synchronous API client core for the todo-list service.
//!
//! # Overview
//! Builds `HttpRequest` values and parses `HttpResponse` values without
//! touching the network. The caller executes the HTTP round-trip, so every
//! operation is deterministic and testable without a server.
//!
//! # Design
//! - `TodoClient` holds only `base_url`.
//! - Each endpoint is split into `build_*` (produces the request) and
//!   `parse_*` (consumes the response).
//! - DTOs are defined independently from the server crate; the integration
//!   test catches schema drift.

pub mod client;
pub mod error;
pub mod http;
pub mod types;

pub use client::TodoClient;
pub use error::ApiError;
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use types::{ListQuery, TodoInput, TodoView};
