use anyhow::{Context, Result};
use chrono::Utc;
use tracing::{debug, info};

use crate::api::TodoService;
use crate::models::{Todo, TodoDraft, TodoPage};

use super::query::{QueryCache, QueryKey};
use super::store::TodoStore;

/// Maximum number of todos kept when the collection is first fetched.
pub const MAX_CACHED_TODOS: usize = 50;

/// Owner assigned to todos created locally.
pub const LOCAL_OWNER_ID: i64 = 1;

/// Mediates todo reads and writes between the session's query cache, the
/// persisted local collection, and the remote service.
///
/// Every mutation reads the whole persisted collection, changes it in
/// memory, and writes it back whole.
pub struct TodoRepository<S, L> {
    remote: S,
    store: L,
    queries: QueryCache,
}

impl<S: TodoService, L: TodoStore> TodoRepository<S, L> {
    pub fn new(remote: S, store: L) -> Self {
        Self::with_query_cache(remote, store, QueryCache::default())
    }

    pub fn with_query_cache(remote: S, store: L, queries: QueryCache) -> Self {
        Self {
            remote,
            store,
            queries,
        }
    }

    pub fn remote(&self) -> &S {
        &self.remote
    }

    pub fn store(&self) -> &L {
        &self.store
    }

    pub fn queries(&self) -> &QueryCache {
        &self.queries
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// All todos, served from the local snapshot when one exists.
    pub async fn todos(&mut self) -> Result<Vec<Todo>> {
        if let Some(todos) = self.queries.todos() {
            debug!(count = todos.len(), "Todo list served from query cache");
            return Ok(todos.to_vec());
        }

        let todos = self.load_todos().await?;
        self.queries.set_todos(todos.clone());
        Ok(todos)
    }

    async fn load_todos(&self) -> Result<Vec<Todo>> {
        if let Some(cached) = self.store.load_todos()? {
            debug!(count = cached.len(), "Todo list served from local store");
            return Ok(cached);
        }

        let mut todos = self
            .remote
            .list_all_todos()
            .await
            .context("Failed to fetch todos")?;
        todos.truncate(MAX_CACHED_TODOS);

        self.store.save_todos(&todos)?;
        info!(count = todos.len(), "Seeded local store from remote");
        Ok(todos)
    }

    /// A single todo. Falls back to the remote service when the id is not
    /// in the local snapshot; the fetched record is not added to it.
    pub async fn todo(&mut self, id: i64) -> Result<Todo> {
        if let Some(todo) = self.queries.todo(id) {
            debug!(id, "Todo served from query cache");
            return Ok(todo.clone());
        }

        let local = self
            .store
            .load_todos()?
            .unwrap_or_default()
            .into_iter()
            .find(|todo| todo.id == id);

        let todo = match local {
            Some(todo) => {
                debug!(id, "Todo served from local store");
                todo
            }
            None => self
                .remote
                .get_todo(id)
                .await
                .with_context(|| format!("Failed to fetch todo {}", id))?,
        };

        self.queries.set_todo(todo.clone());
        Ok(todo)
    }

    /// One page of the remote listing. Bypasses both caches.
    pub async fn remote_page(&self, page: u32, limit: u32) -> Result<TodoPage> {
        self.remote
            .list_todos(page, limit)
            .await
            .with_context(|| format!("Failed to fetch page {} of todos", page))
    }

    // =========================================================================
    // Writes
    // =========================================================================

    /// Add a todo to the local collection only. The remote service never
    /// learns about it, so it stays flagged `is_local`.
    pub async fn create(&mut self, draft: TodoDraft) -> Result<Todo> {
        let timestamp = Utc::now().timestamp_millis();
        let mut todos = self.store.load_todos()?.unwrap_or_default();

        let todo = Todo {
            id: Self::next_local_id(&todos, timestamp),
            title: draft.title,
            completed: draft.completed,
            user_id: Some(LOCAL_OWNER_ID),
            is_local: Some(true),
        };

        todos.push(todo.clone());
        self.store.save_todos(&todos)?;
        self.queries.invalidate(QueryKey::Todos);

        info!(id = todo.id, "Created local todo");
        Ok(todo)
    }

    /// Millisecond timestamp, or one past the largest id if that timestamp
    /// is already taken.
    fn next_local_id(todos: &[Todo], timestamp: i64) -> i64 {
        if todos.iter().any(|todo| todo.id == timestamp) {
            let max = todos.iter().map(|todo| todo.id).max().unwrap_or(timestamp);
            max + 1
        } else {
            timestamp
        }
    }

    /// Replace a todo remotely, then mirror the server's copy locally.
    /// Nothing local changes if the remote call fails.
    pub async fn update(&mut self, todo: Todo) -> Result<Todo> {
        let id = todo.id;
        let updated = self
            .remote
            .update_todo(&todo)
            .await
            .with_context(|| format!("Failed to update todo {}", id))?;

        let mut todos = self.store.load_todos()?.unwrap_or_default();
        for existing in todos.iter_mut().filter(|existing| existing.id == updated.id) {
            *existing = updated.clone();
        }
        self.store.save_todos(&todos)?;

        self.queries.invalidate(QueryKey::Todos);
        self.queries.invalidate(QueryKey::Todo(id));

        info!(id, "Updated todo");
        Ok(updated)
    }

    /// Delete a todo remotely, then drop it from the local collection.
    /// Nothing local changes if the remote call fails.
    pub async fn delete(&mut self, id: i64) -> Result<i64> {
        let deleted = self
            .remote
            .delete_todo(id)
            .await
            .with_context(|| format!("Failed to delete todo {}", id))?;

        let mut todos = self.store.load_todos()?.unwrap_or_default();
        todos.retain(|todo| todo.id != deleted);
        self.store.save_todos(&todos)?;

        self.queries.invalidate(QueryKey::Todos);
        self.queries.remove(QueryKey::Todo(deleted));

        info!(id = deleted, "Deleted todo");
        Ok(deleted)
    }

    /// Drop all in-memory query results. The persisted collection stays.
    pub fn end_session(&mut self) {
        self.queries.clear();
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use std::cell::{Cell, RefCell};

    use super::*;
    use crate::api::ApiError;
    use crate::cache::MemoryStore;

    /// Remote service double that records every call.
    #[derive(Default)]
    struct FakeService {
        todos: RefCell<Vec<Todo>>,
        calls: RefCell<Vec<String>>,
        fail_writes: Cell<bool>,
    }

    impl FakeService {
        fn with_todos(count: i64) -> Self {
            let service = Self::default();
            *service.todos.borrow_mut() = (1..=count).map(|id| todo(id, &format!("remote {}", id))).collect();
            service
        }

        fn calls(&self) -> Vec<String> {
            self.calls.borrow().clone()
        }

        fn record(&self, call: String) {
            self.calls.borrow_mut().push(call);
        }
    }

    impl TodoService for FakeService {
        async fn list_todos(&self, page: u32, limit: u32) -> Result<TodoPage> {
            self.record(format!("list {} {}", page, limit));
            let todos = self.todos.borrow();
            let start = ((page.max(1) - 1) * limit) as usize;
            let data = todos.iter().skip(start).take(limit as usize).cloned().collect();
            Ok(TodoPage {
                data,
                total: todos.len() as u64,
            })
        }

        async fn list_all_todos(&self) -> Result<Vec<Todo>> {
            self.record("list_all".to_string());
            Ok(self.todos.borrow().clone())
        }

        async fn get_todo(&self, id: i64) -> Result<Todo> {
            self.record(format!("get {}", id));
            self.todos
                .borrow()
                .iter()
                .find(|todo| todo.id == id)
                .cloned()
                .ok_or_else(|| ApiError::NotFound("{}".to_string()).into())
        }

        async fn create_todo(&self, draft: &TodoDraft) -> Result<Todo> {
            self.record("create".to_string());
            Ok(draft.clone().into_todo(201))
        }

        async fn update_todo(&self, todo: &Todo) -> Result<Todo> {
            self.record(format!("update {}", todo.id));
            if self.fail_writes.get() {
                return Err(ApiError::ServerError("unavailable".to_string()).into());
            }
            Ok(todo.clone())
        }

        async fn delete_todo(&self, id: i64) -> Result<i64> {
            self.record(format!("delete {}", id));
            if self.fail_writes.get() {
                return Err(ApiError::ServerError("unavailable".to_string()).into());
            }
            Ok(id)
        }
    }

    fn todo(id: i64, title: &str) -> Todo {
        Todo {
            id,
            title: title.to_string(),
            completed: false,
            user_id: Some(1),
            is_local: None,
        }
    }

    fn draft(title: &str) -> TodoDraft {
        TodoDraft {
            title: title.to_string(),
            completed: false,
            user_id: Some(1),
        }
    }

    fn repo_with_local(
        remote: FakeService,
        local: &[Todo],
    ) -> TodoRepository<FakeService, MemoryStore> {
        TodoRepository::new(remote, MemoryStore::with_todos(local).unwrap())
    }

    fn persisted(repo: &TodoRepository<FakeService, MemoryStore>) -> Option<Vec<Todo>> {
        repo.store().load_todos().unwrap()
    }

    // ===== Reads =====

    #[tokio::test]
    async fn test_warm_store_served_without_remote_call() {
        let local = vec![todo(1, "a"), todo(9, "b")];
        let mut repo = repo_with_local(FakeService::with_todos(3), &local);

        let todos = repo.todos().await.unwrap();

        assert_eq!(todos, local);
        assert_eq!(persisted(&repo), Some(local));
        assert!(repo.remote().calls().is_empty());
    }

    #[tokio::test]
    async fn test_cold_store_truncates_to_fifty() {
        let mut repo = TodoRepository::new(FakeService::with_todos(60), MemoryStore::new());

        let todos = repo.todos().await.unwrap();

        assert_eq!(todos.len(), MAX_CACHED_TODOS);
        assert_eq!(persisted(&repo).unwrap().len(), 50);
        assert_eq!(todos.last().map(|todo| todo.id), Some(50));
        assert_eq!(repo.remote().calls(), vec!["list_all"]);
    }

    #[tokio::test]
    async fn test_cold_store_fetched_once() {
        let store = MemoryStore::new();
        {
            let mut repo = TodoRepository::new(FakeService::with_todos(5), &store);
            repo.todos().await.unwrap();
            repo.todos().await.unwrap();
            assert_eq!(repo.remote().calls(), vec!["list_all"]);
        }

        // A new session with the same store never goes remote
        let mut repo = TodoRepository::new(FakeService::with_todos(5), &store);
        assert_eq!(repo.todos().await.unwrap().len(), 5);
        assert!(repo.remote().calls().is_empty());
    }

    #[tokio::test]
    async fn test_remote_list_failure_leaves_store_absent() {
        struct Offline;
        impl TodoService for Offline {
            async fn list_todos(&self, _: u32, _: u32) -> Result<TodoPage> {
                Err(ApiError::ServerError("offline".to_string()).into())
            }
            async fn list_all_todos(&self) -> Result<Vec<Todo>> {
                Err(ApiError::ServerError("offline".to_string()).into())
            }
            async fn get_todo(&self, _: i64) -> Result<Todo> {
                Err(ApiError::ServerError("offline".to_string()).into())
            }
            async fn create_todo(&self, _: &TodoDraft) -> Result<Todo> {
                Err(ApiError::ServerError("offline".to_string()).into())
            }
            async fn update_todo(&self, _: &Todo) -> Result<Todo> {
                Err(ApiError::ServerError("offline".to_string()).into())
            }
            async fn delete_todo(&self, _: i64) -> Result<i64> {
                Err(ApiError::ServerError("offline".to_string()).into())
            }
        }

        let mut repo = TodoRepository::new(Offline, MemoryStore::new());
        let err = repo.todos().await.unwrap_err();
        assert!(matches!(err.downcast_ref::<ApiError>(), Some(ApiError::ServerError(_))));
        assert_eq!(repo.store().load_todos().unwrap(), None);
        assert!(repo.queries().todos().is_none());
    }

    #[tokio::test]
    async fn test_single_todo_from_store_without_remote_call() {
        let local = vec![todo(1, "a"), todo(2, "b")];
        let mut repo = repo_with_local(FakeService::with_todos(3), &local);

        let found = repo.todo(2).await.unwrap();

        assert_eq!(found, todo(2, "b"));
        assert!(repo.remote().calls().is_empty());
    }

    #[tokio::test]
    async fn test_single_todo_falls_back_to_remote_without_persisting() {
        let local = vec![todo(1, "a")];
        let mut repo = repo_with_local(FakeService::with_todos(3), &local);

        let found = repo.todo(3).await.unwrap();

        assert_eq!(found, todo(3, "remote 3"));
        assert_eq!(repo.remote().calls(), vec!["get 3"]);
        assert_eq!(persisted(&repo), Some(local));

        // Second read hits the query cache
        repo.todo(3).await.unwrap();
        assert_eq!(repo.remote().calls(), vec!["get 3"]);
    }

    #[tokio::test]
    async fn test_single_todo_with_absent_store_goes_remote() {
        let mut repo = TodoRepository::new(FakeService::with_todos(3), MemoryStore::new());

        let found = repo.todo(1).await.unwrap();

        assert_eq!(found.id, 1);
        assert_eq!(repo.remote().calls(), vec!["get 1"]);
        assert_eq!(persisted(&repo), None);
    }

    #[tokio::test]
    async fn test_single_todo_not_found_anywhere() {
        let mut repo = repo_with_local(FakeService::with_todos(3), &[todo(1, "a")]);

        let err = repo.todo(404).await.unwrap_err();

        assert!(err
            .downcast_ref::<ApiError>()
            .is_some_and(|api| api.is_not_found()));
    }

    #[tokio::test]
    async fn test_remote_page_bypasses_caches() {
        let mut repo = TodoRepository::new(FakeService::with_todos(25), MemoryStore::new());

        let page = repo.remote_page(3, 10).await.unwrap();

        assert_eq!(page.total, 25);
        assert_eq!(page.data.len(), 5);
        assert_eq!(persisted(&repo), None);
        assert!(repo.queries().is_empty());
        assert_eq!(repo.todos().await.unwrap().len(), 25);
    }

    // ===== Create =====

    #[tokio::test]
    async fn test_create_is_local_only() {
        let local = vec![todo(1, "a"), todo(2, "b")];
        let mut repo = repo_with_local(FakeService::with_todos(3), &local);
        let before = Utc::now().timestamp_millis();

        let created = repo.create(draft("write report")).await.unwrap();

        assert_eq!(created.is_local, Some(true));
        assert_eq!(created.user_id, Some(LOCAL_OWNER_ID));
        assert!(created.id >= before);

        let stored = persisted(&repo).unwrap();
        assert_eq!(stored.len(), local.len() + 1);
        assert_eq!(stored.last(), Some(&created));

        // Known inconsistency: the remote service is never told about creates
        assert!(repo.remote().calls().is_empty());
    }

    #[tokio::test]
    async fn test_create_with_absent_store_starts_collection() {
        let mut repo = TodoRepository::new(FakeService::default(), MemoryStore::new());

        let created = repo.create(draft("first")).await.unwrap();

        assert_eq!(persisted(&repo), Some(vec![created]));
    }

    #[tokio::test]
    async fn test_create_invalidates_cached_list() {
        let mut repo = repo_with_local(FakeService::default(), &[todo(1, "a")]);
        assert_eq!(repo.todos().await.unwrap().len(), 1);

        let created = repo.create(draft("new")).await.unwrap();
        let todos = repo.todos().await.unwrap();

        assert_eq!(todos.len(), 2);
        assert!(todos.contains(&created));
    }

    #[test]
    fn test_next_local_id_avoids_collision() {
        let todos = vec![todo(1_000, "a"), todo(1_005, "b")];
        let next = TodoRepository::<FakeService, MemoryStore>::next_local_id;
        assert_eq!(next(&todos, 2_000), 2_000);
        assert_eq!(next(&todos, 1_000), 1_006);
    }

    // ===== Update =====

    #[tokio::test]
    async fn test_update_replaces_record() {
        let local = vec![todo(1, "a"), todo(2, "b")];
        let mut repo = repo_with_local(FakeService::default(), &local);

        let changed = Todo {
            title: "X".to_string(),
            completed: true,
            ..todo(1, "a")
        };
        let updated = repo.update(changed.clone()).await.unwrap();

        assert_eq!(updated, changed);
        assert_eq!(persisted(&repo), Some(vec![changed, todo(2, "b")]));
        assert_eq!(repo.remote().calls(), vec!["update 1"]);
    }

    #[tokio::test]
    async fn test_update_is_idempotent() {
        let mut repo = repo_with_local(FakeService::default(), &[todo(1, "a"), todo(2, "b")]);
        let changed = Todo {
            title: "X".to_string(),
            ..todo(2, "b")
        };

        repo.update(changed.clone()).await.unwrap();
        let once = persisted(&repo);
        repo.update(changed).await.unwrap();

        assert_eq!(persisted(&repo), once);
    }

    #[tokio::test]
    async fn test_update_failure_leaves_store_unchanged() {
        let remote = FakeService::default();
        remote.fail_writes.set(true);
        let local = vec![todo(1, "a")];
        let mut repo = repo_with_local(remote, &local);
        repo.todos().await.unwrap();

        let result = repo
            .update(Todo {
                title: "X".to_string(),
                ..todo(1, "a")
            })
            .await;

        assert!(result.is_err());
        assert_eq!(persisted(&repo), Some(local.clone()));
        assert_eq!(repo.todos().await.unwrap(), local);
    }

    #[tokio::test]
    async fn test_update_refreshes_cached_queries() {
        let mut repo = repo_with_local(FakeService::default(), &[todo(1, "a")]);
        repo.todos().await.unwrap();
        repo.todo(1).await.unwrap();

        let changed = Todo {
            title: "renamed".to_string(),
            ..todo(1, "a")
        };
        repo.update(changed.clone()).await.unwrap();

        assert_eq!(repo.todo(1).await.unwrap(), changed);
        assert_eq!(repo.todos().await.unwrap(), vec![changed]);
    }

    #[tokio::test]
    async fn test_update_with_absent_store_persists_empty_collection() {
        let mut repo = TodoRepository::new(FakeService::default(), MemoryStore::new());

        repo.update(todo(1, "a")).await.unwrap();

        // The updated record is not added, only existing entries are replaced
        assert_eq!(persisted(&repo), Some(vec![]));
    }

    // ===== Delete =====

    #[tokio::test]
    async fn test_delete_removes_only_target() {
        let local = vec![todo(3, "c"), todo(5, "e"), todo(7, "g")];
        let mut repo = repo_with_local(FakeService::default(), &local);

        let deleted = repo.delete(5).await.unwrap();

        assert_eq!(deleted, 5);
        assert_eq!(persisted(&repo), Some(vec![todo(3, "c"), todo(7, "g")]));
        assert_eq!(repo.remote().calls(), vec!["delete 5"]);
    }

    #[tokio::test]
    async fn test_delete_failure_leaves_store_unchanged() {
        let remote = FakeService::default();
        remote.fail_writes.set(true);
        let local = vec![todo(5, "e")];
        let mut repo = repo_with_local(remote, &local);

        assert!(repo.delete(5).await.is_err());
        assert_eq!(persisted(&repo), Some(local));
        // No retry
        assert_eq!(repo.remote().calls(), vec!["delete 5"]);
    }

    #[tokio::test]
    async fn test_delete_with_absent_store_persists_empty_collection() {
        let mut repo = TodoRepository::new(FakeService::default(), MemoryStore::new());

        repo.delete(5).await.unwrap();

        assert_eq!(persisted(&repo), Some(vec![]));
        assert!(repo.todos().await.unwrap().is_empty());
        assert_eq!(repo.remote().calls(), vec!["delete 5"]);
    }

    #[tokio::test]
    async fn test_delete_drops_cached_queries() {
        let mut repo = repo_with_local(FakeService::default(), &[todo(5, "e"), todo(6, "f")]);
        repo.todos().await.unwrap();
        repo.todo(5).await.unwrap();

        repo.delete(5).await.unwrap();

        assert_eq!(repo.todos().await.unwrap(), vec![todo(6, "f")]);
        assert!(repo.queries().todo(5).is_none());
    }

    #[tokio::test]
    async fn test_end_session_keeps_store() {
        let local = vec![todo(1, "a")];
        let mut repo = repo_with_local(FakeService::default(), &local);
        repo.todos().await.unwrap();

        repo.end_session();

        assert!(repo.queries().is_empty());
        assert_eq!(persisted(&repo), Some(local));
    }
}
