//! Page routes of the application.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    /// `/` - the todo list
    Home,
    /// `/todos/{id}` - one todo
    Todo(i64),
    SignIn,
    SignUp,
    /// `/dashboard` - requires a session
    Dashboard,
    NotFound,
}

impl Route {
    pub fn parse(path: &str) -> Self {
        let path = path.split(['?', '#']).next().unwrap_or_default();
        let trimmed = path.trim_end_matches('/');
        match trimmed {
            "" => Route::Home,
            "/signin" => Route::SignIn,
            "/signup" => Route::SignUp,
            "/dashboard" => Route::Dashboard,
            other => other
                .strip_prefix("/todos/")
                .and_then(|id| id.parse().ok())
                .map(Route::Todo)
                .unwrap_or(Route::NotFound),
        }
    }

    /// Path of a fixed route; `Todo` has no fixed path
    pub fn path_str(&self) -> &'static str {
        match self {
            Route::Home => "/",
            Route::Todo(_) => "/todos",
            Route::SignIn => "/signin",
            Route::SignUp => "/signup",
            Route::Dashboard => "/dashboard",
            Route::NotFound => "/404",
        }
    }

    pub fn is_protected(&self) -> bool {
        matches!(self, Route::Dashboard)
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Route::Todo(id) => write!(f, "/todos/{}", id),
            other => f.write_str(other.path_str()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_routes() {
        assert_eq!(Route::parse("/"), Route::Home);
        assert_eq!(Route::parse(""), Route::Home);
        assert_eq!(Route::parse("/todos/42"), Route::Todo(42));
        assert_eq!(Route::parse("/todos/42/"), Route::Todo(42));
        assert_eq!(Route::parse("/signin"), Route::SignIn);
        assert_eq!(Route::parse("/signup?next=/dashboard"), Route::SignUp);
        assert_eq!(Route::parse("/dashboard"), Route::Dashboard);
        assert_eq!(Route::parse("/todos/abc"), Route::NotFound);
        assert_eq!(Route::parse("/settings"), Route::NotFound);
    }

    #[test]
    fn test_display_and_protection() {
        assert_eq!(Route::Todo(7).to_string(), "/todos/7");
        assert_eq!(Route::SignIn.to_string(), "/signin");
        assert!(Route::Dashboard.is_protected());
        assert!(!Route::Home.is_protected());
    }
}
