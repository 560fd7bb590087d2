//! Data models for todo records.
//!
//! - `Todo`: a todo as stored remotely and in the local cache
//! - `TodoDraft`: a todo that has not been assigned an id yet
//! - `TodoPage`: one page of the remote listing with its total count

pub mod todo;

pub use todo::{Todo, TodoDraft, TodoPage};
