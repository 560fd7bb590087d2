//! Plain-text rendering of the view models.

use todocache_core::models::TodoPage;
use todocache_core::utils::truncate;
use todocache_core::view::{ListQuery, TodoDetail, TodoListView, EMPTY_LIST_MESSAGE};
use todocache_core::Todo;

/// Longest title shown on a list row
const MAX_TITLE_WIDTH: usize = 60;

fn todo_row(todo: &Todo) -> String {
    let check = if todo.completed { "x" } else { " " };
    let local = if todo.is_local() { "  (local)" } else { "" };
    format!(
        "[{}] {:>4}  {}{}",
        check,
        todo.id,
        truncate(&todo.title, MAX_TITLE_WIDTH),
        local
    )
}

pub fn render_list(view: &TodoListView, query: &ListQuery, age: Option<&str>) -> String {
    let mut lines = Vec::new();

    let mut header = format!("Todos ({} matching, status: {}", view.matched, query.status);
    if !query.search.is_empty() {
        header.push_str(&format!(", search: \"{}\"", query.search));
    }
    header.push(')');
    lines.push(header);

    if view.is_empty() {
        lines.push(EMPTY_LIST_MESSAGE.to_string());
    } else {
        lines.extend(view.items.iter().map(todo_row));
    }

    let mut footer = view.page_label();
    if view.has_prev() {
        footer.push_str(&format!("  <- --page {}", view.page - 1));
    }
    if view.has_next() {
        footer.push_str(&format!("  --page {} ->", view.page + 1));
    }
    if let Some(age) = age {
        footer.push_str(&format!("  (cached {})", age));
    }
    lines.push(footer);

    lines.join("\n")
}

pub fn render_remote_page(page: &TodoPage, number: u32) -> String {
    let mut lines = vec![format!("Server page {} ({} todos on server)", number, page.total)];
    lines.extend(page.data.iter().map(todo_row));
    lines.join("\n")
}

pub fn render_detail(detail: &TodoDetail) -> String {
    let owner = detail
        .user_id
        .map(|id| id.to_string())
        .unwrap_or_else(|| "-".to_string());
    let mut lines = vec![
        format!("ID:      {}", detail.id),
        format!("User ID: {}", owner),
        format!("Title:   {}", detail.title),
        format!("Status:  {}", detail.status),
    ];
    if detail.local_only {
        lines.push("Stored locally only".to_string());
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn todo(id: i64, completed: bool) -> Todo {
        Todo {
            id,
            title: format!("task {}", id),
            completed,
            user_id: Some(1),
            is_local: None,
        }
    }

    #[test]
    fn test_render_list_rows_and_footer() {
        let todos: Vec<Todo> = (1..=12).map(|id| todo(id, id == 1)).collect();
        let query = ListQuery::default();
        let view = TodoListView::build(&todos, &query);

        let text = render_list(&view, &query, Some("just now"));
        assert!(text.starts_with("Todos (12 matching, status: all)"));
        assert!(text.contains("[x]    1  task 1"));
        assert!(text.contains("[ ]    2  task 2"));
        assert!(text.contains("Page 1 of 2  --page 2 ->  (cached just now)"));
    }

    #[test]
    fn test_render_empty_list() {
        let query = ListQuery {
            search: "zzz".to_string(),
            ..ListQuery::default()
        };
        let view = TodoListView::build(&[todo(1, false)], &query);
        let text = render_list(&view, &query, None);
        assert!(text.contains(EMPTY_LIST_MESSAGE));
        assert!(text.contains("search: \"zzz\""));
        assert!(text.ends_with("Page 1 of 1"));
    }

    #[test]
    fn test_render_detail_marks_local() {
        let mut local = todo(5, false);
        local.is_local = Some(true);
        let text = render_detail(&TodoDetail::from(&local));
        assert!(text.contains("Status:  Not completed"));
        assert!(text.contains("User ID: 1"));
        assert!(text.ends_with("Stored locally only"));
    }

    #[test]
    fn test_render_detail_without_owner() {
        let mut remote = todo(9, true);
        remote.user_id = None;
        let text = render_detail(&TodoDetail::from(&remote));
        assert!(text.contains("User ID: -"));
        assert!(text.contains("Status:  Completed"));
    }
}
