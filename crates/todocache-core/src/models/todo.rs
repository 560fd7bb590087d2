use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
#[serde(rename_all = "camelCase")]
pub struct Todo {
    pub id: i64,
    pub title: String,
    pub completed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<i64>,
    /// Set on records created in the local cache that the remote service
    /// has never seen.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_local: Option<bool>,
}

impl Todo {
    pub fn is_local(&self) -> bool {
        self.is_local.unwrap_or(false)
    }

    pub fn status_label(&self) -> &'static str {
        if self.completed {
            "Completed"
        } else {
            "Not completed"
        }
    }
}

/// A todo without an id, as submitted by the create form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
#[serde(rename_all = "camelCase")]
pub struct TodoDraft {
    pub title: String,
    pub completed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<i64>,
}

impl TodoDraft {
    pub fn into_todo(self, id: i64) -> Todo {
        Todo {
            id,
            title: self.title,
            completed: self.completed,
            user_id: self.user_id,
            is_local: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TodoPage {
    pub data: Vec<Todo>,
    /// Total number of todos on the server, from `x-total-count`
    pub total: u64,
}
