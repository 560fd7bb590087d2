use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{anyhow, Context, Result};
use serde::{de::DeserializeOwned, Serialize};
use tracing::debug;

use crate::models::Todo;

/// Storage key of the persisted todo collection
pub const TODOS_KEY: &str = "cached_todos";

/// Durable storage for the todo collection.
///
/// The collection is always read and written whole; there are no partial
/// updates and no transactions.
pub trait TodoStore {
    /// Returns `None` if the collection was never written.
    fn load_todos(&self) -> Result<Option<Vec<Todo>>>;

    /// Overwrite the stored collection.
    fn save_todos(&self, todos: &[Todo]) -> Result<()>;
}

impl<T: TodoStore + ?Sized> TodoStore for &T {
    fn load_todos(&self) -> Result<Option<Vec<Todo>>> {
        (**self).load_todos()
    }

    fn save_todos(&self, todos: &[Todo]) -> Result<()> {
        (**self).save_todos(todos)
    }
}

// ============================================================================
// File-backed store
// ============================================================================

/// Stores each key as `<key>.json` in a cache directory.
pub struct FileStore {
    cache_dir: PathBuf,
}

impl FileStore {
    pub fn new(cache_dir: PathBuf) -> Result<Self> {
        std::fs::create_dir_all(&cache_dir)
            .with_context(|| format!("Failed to create cache directory: {}", cache_dir.display()))?;
        Ok(Self { cache_dir })
    }

    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    fn cache_path(&self, name: &str) -> PathBuf {
        self.cache_dir.join(format!("{}.json", name))
    }

    fn load<T: DeserializeOwned>(&self, name: &str) -> Result<Option<T>> {
        let path = self.cache_path(name);
        if !path.exists() {
            return Ok(None);
        }

        let contents = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read cache file: {}", name))?;

        let data: T = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse cache file: {}", name))?;

        Ok(Some(data))
    }

    fn save<T: Serialize + ?Sized>(&self, name: &str, data: &T) -> Result<()> {
        let path = self.cache_path(name);
        let contents = serde_json::to_string_pretty(data)?;
        std::fs::write(&path, contents)
            .with_context(|| format!("Failed to write cache file: {}", name))?;
        Ok(())
    }

    /// Delete the persisted collection, if any
    pub fn clear(&self) -> Result<()> {
        let path = self.cache_path(TODOS_KEY);
        if path.exists() {
            std::fs::remove_file(path)?;
        }
        Ok(())
    }
}

impl TodoStore for FileStore {
    fn load_todos(&self) -> Result<Option<Vec<Todo>>> {
        self.load(TODOS_KEY)
    }

    fn save_todos(&self, todos: &[Todo]) -> Result<()> {
        debug!(count = todos.len(), "Persisting todo collection");
        self.save(TODOS_KEY, todos)
    }
}

// ============================================================================
// In-memory store
// ============================================================================

/// Keeps serialized JSON in memory, so values round-trip through serde the
/// same way they do on disk.
#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store that already holds the given collection
    pub fn with_todos(todos: &[Todo]) -> Result<Self> {
        let store = Self::new();
        store.save_todos(todos)?;
        Ok(store)
    }
}

impl TodoStore for MemoryStore {
    fn load_todos(&self) -> Result<Option<Vec<Todo>>> {
        let entries = self
            .entries
            .lock()
            .map_err(|_| anyhow!("Memory store lock poisoned"))?;
        match entries.get(TODOS_KEY) {
            Some(json) => {
                let todos = serde_json::from_str(json)
                    .context("Failed to parse in-memory todo collection")?;
                Ok(Some(todos))
            }
            None => Ok(None),
        }
    }

    fn save_todos(&self, todos: &[Todo]) -> Result<()> {
        let json = serde_json::to_string(todos)?;
        self.entries
            .lock()
            .map_err(|_| anyhow!("Memory store lock poisoned"))?
            .insert(TODOS_KEY.to_string(), json);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn todo(id: i64, title: &str) -> Todo {
        Todo {
            id,
            title: title.to_string(),
            completed: false,
            user_id: Some(1),
            is_local: None,
        }
    }

    #[test]
    fn test_file_store_absent_until_written() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().join("cache")).unwrap();
        assert_eq!(store.load_todos().unwrap(), None);

        store.save_todos(&[]).unwrap();
        assert_eq!(store.load_todos().unwrap(), Some(vec![]));
    }

    #[test]
    fn test_file_store_writes_json_array_under_key() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().to_path_buf()).unwrap();
        store.save_todos(&[todo(1, "a"), todo(2, "b")]).unwrap();

        let raw = std::fs::read_to_string(dir.path().join("cached_todos.json")).unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert!(value.is_array());
        assert_eq!(value.as_array().unwrap().len(), 2);
    }

    #[test]
    fn test_file_store_overwrites_whole_collection() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().to_path_buf()).unwrap();
        store.save_todos(&[todo(1, "a"), todo(2, "b")]).unwrap();
        store.save_todos(&[todo(3, "c")]).unwrap();

        assert_eq!(store.load_todos().unwrap(), Some(vec![todo(3, "c")]));

        store.clear().unwrap();
        assert_eq!(store.load_todos().unwrap(), None);
    }

    #[test]
    fn test_file_store_corrupt_snapshot_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().to_path_buf()).unwrap();
        std::fs::write(dir.path().join("cached_todos.json"), "not json").unwrap();
        assert!(store.load_todos().is_err());
    }

    #[test]
    fn test_memory_store() {
        let store = MemoryStore::new();
        assert_eq!(store.load_todos().unwrap(), None);

        let store = MemoryStore::with_todos(&[todo(5, "e")]).unwrap();
        assert_eq!(store.load_todos().unwrap(), Some(vec![todo(5, "e")]));
    }
}
