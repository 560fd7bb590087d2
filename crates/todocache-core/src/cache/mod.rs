//! Local caching module for offline-first todo access.
//!
//! Three layers cooperate here:
//! - `TodoStore`: the persisted snapshot of the todo collection, stored as
//!   one JSON array under the `cached_todos` key
//! - `QueryCache`: the in-memory request cache for one session, keyed by
//!   `QueryKey` and invalidated explicitly after writes
//! - `TodoRepository`: the reconciliation layer deciding, per operation,
//!   whether to answer from memory, the local snapshot, or the remote API
//!
//! Reads prefer the local snapshot even when it may be stale. Updates and
//! deletes only touch the snapshot after the remote service confirms them.
//! Creates never reach the remote service at all.

pub mod query;
pub mod repository;
pub mod store;

pub use query::{CachedData, QueryCache, QueryKey};
pub use repository::{TodoRepository, LOCAL_OWNER_ID, MAX_CACHED_TODOS};
pub use store::{FileStore, MemoryStore, TodoStore, TODOS_KEY};
