use std::future::Future;

use anyhow::Result;

use crate::models::{Todo, TodoDraft, TodoPage};

/// Remote todo operations. Each call maps to exactly one HTTP request and
/// fails on any non-2xx response or transport error.
pub trait TodoService {
    /// `GET /todos?_page=&_limit=`
    fn list_todos(&self, page: u32, limit: u32) -> impl Future<Output = Result<TodoPage>>;

    /// `GET /todos` without pagination
    fn list_all_todos(&self) -> impl Future<Output = Result<Vec<Todo>>>;

    /// `GET /todos/{id}`
    fn get_todo(&self, id: i64) -> impl Future<Output = Result<Todo>>;

    /// `POST /todos`
    fn create_todo(&self, draft: &TodoDraft) -> impl Future<Output = Result<Todo>>;

    /// `PUT /todos/{id}` with the full record
    fn update_todo(&self, todo: &Todo) -> impl Future<Output = Result<Todo>>;

    /// `DELETE /todos/{id}`, resolving to the deleted id
    fn delete_todo(&self, id: i64) -> impl Future<Output = Result<i64>>;
}
