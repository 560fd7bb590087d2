//! View models for the todo pages.
//!
//! These types hold no business logic: they project repository results
//! into what the list, detail, form and delete-confirmation screens show.

pub mod detail;
pub mod form;
pub mod list;

pub use detail::{DeleteConfirmation, TodoDetail};
pub use form::{TodoForm, ValidationError};
pub use list::{ListQuery, StatusFilter, TodoListView, EMPTY_LIST_MESSAGE, LOAD_ERROR_MESSAGE, PAGE_SIZE};
