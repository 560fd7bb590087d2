use crate::models::Todo;

/// What the detail screen shows for one todo.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TodoDetail {
    pub id: i64,
    pub title: String,
    pub status: &'static str,
    pub user_id: Option<i64>,
    pub local_only: bool,
}

impl From<&Todo> for TodoDetail {
    fn from(todo: &Todo) -> Self {
        Self {
            id: todo.id,
            title: todo.title.clone(),
            status: todo.status_label(),
            user_id: todo.user_id,
            local_only: todo.is_local(),
        }
    }
}

/// A pending delete that proceeds only once confirmed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteConfirmation {
    pub id: i64,
    pub title: String,
}

impl DeleteConfirmation {
    pub fn new(todo: &Todo) -> Self {
        Self {
            id: todo.id,
            title: todo.title.clone(),
        }
    }

    pub fn prompt(&self) -> String {
        format!("Delete \"{}\"? This cannot be undone. [y/N]: ", self.title)
    }

    /// Only an explicit yes confirms
    pub fn is_confirmed(answer: &str) -> bool {
        matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
    }
}
