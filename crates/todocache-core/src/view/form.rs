use thiserror::Error;

use crate::cache::LOCAL_OWNER_ID;
use crate::models::{Todo, TodoDraft};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Title must not be empty")]
    EmptyTitle,
}

/// Create/edit form state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TodoForm {
    pub title: String,
    pub completed: bool,
}

impl TodoForm {
    pub fn new(title: impl Into<String>, completed: bool) -> Self {
        Self {
            title: title.into(),
            completed,
        }
    }

    /// Prefill the form for editing an existing todo
    pub fn from_todo(todo: &Todo) -> Self {
        Self::new(todo.title.clone(), todo.completed)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.title.trim().is_empty() {
            return Err(ValidationError::EmptyTitle);
        }
        Ok(())
    }

    /// Submit for create. The title is kept as typed.
    pub fn to_draft(&self) -> Result<TodoDraft, ValidationError> {
        self.validate()?;
        Ok(TodoDraft {
            title: self.title.clone(),
            completed: self.completed,
            user_id: Some(LOCAL_OWNER_ID),
        })
    }

    /// Submit for edit: the full record with the form's fields applied
    pub fn apply_to(&self, todo: &Todo) -> Result<Todo, ValidationError> {
        self.validate()?;
        Ok(Todo {
            title: self.title.clone(),
            completed: self.completed,
            ..todo.clone()
        })
    }
}
