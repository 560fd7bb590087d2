//! REST API client module for the remote todo service.
//!
//! This module provides the `TodoService` trait describing the remote
//! operations the cache layer depends on, and `ApiClient`, the HTTP
//! implementation talking to a JSONPlaceholder-style `/todos` resource.
//!
//! Requests are issued once: no retries and no timeout beyond the
//! transport defaults.

pub mod client;
pub mod error;
pub mod service;

pub use client::ApiClient;
pub use error::ApiError;
pub use service::TodoService;
