//! Todocache core library.
//!
//! A todo list backed by a remote REST API and mirrored into a local
//! cache. The interesting part is `cache::TodoRepository`, which decides
//! for every read and write whether to consult the in-memory query cache,
//! the persisted local collection, or the remote service.
//!
//! - `api`: HTTP client for the remote `/todos` resource
//! - `cache`: local store, query cache and the reconciliation layer
//! - `view`: view models for the list, detail, form and delete screens
//! - `auth`: email/password sessions and the dashboard gate
//! - `routes`: page routes
//! - `config`: persisted user configuration

pub mod api;
pub mod auth;
pub mod cache;
pub mod config;
pub mod models;
pub mod routes;
pub mod utils;
pub mod view;

pub use api::{ApiClient, ApiError, TodoService};
pub use cache::{FileStore, MemoryStore, QueryCache, TodoRepository, TodoStore};
pub use config::Config;
pub use models::{Todo, TodoDraft, TodoPage};
pub use routes::Route;
