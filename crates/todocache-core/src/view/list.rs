use std::fmt;
use std::str::FromStr;

use crate::models::Todo;
use crate::utils::contains_ignore_case;

/// Todos shown per page
pub const PAGE_SIZE: usize = 10;

/// Shown when no todo matches the search and status filter
pub const EMPTY_LIST_MESSAGE: &str = "No todos match your search or filter.";

/// Shown when the list could not be loaded at all
pub const LOAD_ERROR_MESSAGE: &str = "Error loading todos.";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StatusFilter {
    #[default]
    All,
    Completed,
    Incomplete,
}

impl StatusFilter {
    pub fn matches(&self, todo: &Todo) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Completed => todo.completed,
            StatusFilter::Incomplete => !todo.completed,
        }
    }
}

impl fmt::Display for StatusFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StatusFilter::All => "all",
            StatusFilter::Completed => "completed",
            StatusFilter::Incomplete => "incomplete",
        };
        f.write_str(name)
    }
}

impl FromStr for StatusFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "all" => Ok(StatusFilter::All),
            "completed" => Ok(StatusFilter::Completed),
            "incomplete" => Ok(StatusFilter::Incomplete),
            other => Err(format!(
                "unknown status '{}': expected all, completed or incomplete",
                other
            )),
        }
    }
}

/// Search, filter and page selection for the list screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListQuery {
    pub search: String,
    pub status: StatusFilter,
    /// 1-based
    pub page: usize,
}

impl Default for ListQuery {
    fn default() -> Self {
        Self {
            search: String::new(),
            status: StatusFilter::All,
            page: 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TodoListView {
    /// Todos on the current page
    pub items: Vec<Todo>,
    /// Number of todos matching the query across all pages
    pub matched: usize,
    pub page: usize,
    /// Zero when nothing matches
    pub total_pages: usize,
}

impl TodoListView {
    pub fn build(todos: &[Todo], query: &ListQuery) -> Self {
        let matched: Vec<&Todo> = todos
            .iter()
            .filter(|todo| contains_ignore_case(&todo.title, &query.search))
            .filter(|todo| query.status.matches(todo))
            .collect();

        let total_pages = matched.len().div_ceil(PAGE_SIZE);
        let page = query.page.clamp(1, total_pages.max(1));
        let items = matched
            .iter()
            .skip((page - 1) * PAGE_SIZE)
            .take(PAGE_SIZE)
            .map(|todo| (*todo).clone())
            .collect();

        Self {
            items,
            matched: matched.len(),
            page,
            total_pages,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn has_prev(&self) -> bool {
        self.page > 1
    }

    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }

    /// "Page 2 of 5"; an empty result still reads "Page 1 of 1"
    pub fn page_label(&self) -> String {
        format!("Page {} of {}", self.page, self.total_pages.max(1))
    }
}
