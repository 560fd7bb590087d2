use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use tracing::debug;

use crate::models::Todo;

/// Entries older than this are refetched even if never invalidated.
pub const DEFAULT_STALE_MINUTES: i64 = 5;

/// Identifies one cached query result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryKey {
    /// The full todo list
    Todos,
    /// A single todo by id
    Todo(i64),
}

#[derive(Debug, Clone)]
pub struct CachedData<T> {
    pub data: T,
    pub cached_at: DateTime<Utc>,
    invalidated: bool,
}

impl<T> CachedData<T> {
    pub fn new(data: T) -> Self {
        Self {
            data,
            cached_at: Utc::now(),
            invalidated: false,
        }
    }

    pub fn age_minutes(&self) -> i64 {
        (Utc::now() - self.cached_at).num_minutes()
    }

    pub fn age_display(&self) -> String {
        let minutes = self.age_minutes();
        if minutes < 1 {
            // Also covers clock skew
            "just now".to_string()
        } else if minutes < 60 {
            format!("{}m ago", minutes)
        } else if minutes < 1440 {
            format!("{}h ago", minutes / 60)
        } else {
            format!("{}d ago", minutes / 1440)
        }
    }

    pub fn is_invalidated(&self) -> bool {
        self.invalidated
    }

    pub fn is_stale(&self, stale_after: Duration) -> bool {
        self.invalidated || Utc::now() - self.cached_at > stale_after
    }
}

/// In-memory query results for one application session.
///
/// Created when the session starts, invalidated key by key after writes,
/// and cleared when the session ends.
pub struct QueryCache {
    stale_after: Duration,
    todos: Option<CachedData<Vec<Todo>>>,
    items: HashMap<i64, CachedData<Todo>>,
}

impl Default for QueryCache {
    fn default() -> Self {
        Self::new(Duration::minutes(DEFAULT_STALE_MINUTES))
    }
}

impl QueryCache {
    pub fn new(stale_after: Duration) -> Self {
        Self {
            stale_after,
            todos: None,
            items: HashMap::new(),
        }
    }

    /// The cached list, if present and fresh
    pub fn todos(&self) -> Option<&[Todo]> {
        self.todos
            .as_ref()
            .filter(|entry| !entry.is_stale(self.stale_after))
            .map(|entry| entry.data.as_slice())
    }

    pub fn set_todos(&mut self, todos: Vec<Todo>) {
        self.todos = Some(CachedData::new(todos));
    }

    /// The cached todo, if present and fresh
    pub fn todo(&self, id: i64) -> Option<&Todo> {
        self.items
            .get(&id)
            .filter(|entry| !entry.is_stale(self.stale_after))
            .map(|entry| &entry.data)
    }

    pub fn set_todo(&mut self, todo: Todo) {
        self.items.insert(todo.id, CachedData::new(todo));
    }

    /// Mark an entry stale so the next read re-derives it
    pub fn invalidate(&mut self, key: QueryKey) {
        debug!(?key, "Invalidating query");
        match key {
            QueryKey::Todos => {
                if let Some(entry) = self.todos.as_mut() {
                    entry.invalidated = true;
                }
            }
            QueryKey::Todo(id) => {
                if let Some(entry) = self.items.get_mut(&id) {
                    entry.invalidated = true;
                }
            }
        }
    }

    /// Drop an entry entirely
    pub fn remove(&mut self, key: QueryKey) {
        match key {
            QueryKey::Todos => self.todos = None,
            QueryKey::Todo(id) => {
                self.items.remove(&id);
            }
        }
    }

    /// Age of the cached list, for status display
    pub fn todos_age(&self) -> Option<String> {
        self.todos.as_ref().map(|entry| entry.age_display())
    }

    pub fn clear(&mut self) {
        self.todos = None;
        self.items.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.todos.is_none() && self.items.is_empty()
    }
}

// ============================================================================
// Tests
// ============================================================================
