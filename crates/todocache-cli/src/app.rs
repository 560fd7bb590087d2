//! Application state for one run of the terminal front end.
//!
//! `App` owns the reconciliation layer, the local auth service and the
//! session cookie, and implements one handler per page.

use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing::{debug, error, info, warn};

use todocache_core::api::ApiError;
use todocache_core::auth::{guard, AuthError, GateOutcome, LocalAuthService};
use todocache_core::cache::QueryCache;
use todocache_core::view::{
    DeleteConfirmation, ListQuery, TodoDetail, TodoForm, TodoListView, LOAD_ERROR_MESSAGE,
    PAGE_SIZE,
};
use todocache_core::{ApiClient, Config, FileStore, Route, TodoRepository};

use crate::render::{render_detail, render_list, render_remote_page};
use crate::session::CookieJar;

/// Subdirectory of the cache directory holding accounts and sessions
const AUTH_DIR: &str = "auth";

pub struct App {
    config: Config,
    repo: TodoRepository<ApiClient, FileStore>,
    auth: LocalAuthService,
    jar: CookieJar,
}

impl App {
    /// Create a new application instance
    pub fn new(api_url: Option<String>) -> Result<Self> {
        let config = match Config::load() {
            Ok(c) => c,
            Err(e) => {
                warn!(error = %e, "Failed to load config, using defaults");
                Config::default()
            }
        };

        let cache_dir = config.cache_dir().unwrap_or_else(|_| PathBuf::from("./cache"));
        debug!(?cache_dir, "Cache directory configured");

        let api_url = api_url.unwrap_or_else(|| config.api_base_url());
        let api = ApiClient::with_base_url(api_url)?;
        debug!(base_url = api.base_url(), "API client configured");

        let store = FileStore::new(cache_dir.clone())?;
        let repo = TodoRepository::with_query_cache(api, store, QueryCache::new(config.stale_after()));
        let auth = LocalAuthService::new(cache_dir.join(AUTH_DIR))?;

        let mut jar = CookieJar::new(cache_dir);
        if let Err(e) = jar.load() {
            warn!(error = %e, "Failed to load session cookie");
        }

        Ok(Self {
            config,
            repo,
            auth,
            jar,
        })
    }

    /// End the session: in-memory query results are dropped, the local
    /// store is kept.
    pub fn shutdown(&mut self) {
        self.repo.end_session();
    }

    // =========================================================================
    // Todo pages
    // =========================================================================

    pub async fn list(&mut self, query: ListQuery) -> Result<()> {
        let todos = match self.repo.todos().await {
            Ok(todos) => todos,
            Err(e) => {
                error!(error = %format!("{:#}", e), "Failed to load todos");
                println!("{}", LOAD_ERROR_MESSAGE);
                return Ok(());
            }
        };

        let view = TodoListView::build(&todos, &query);
        let age = self.repo.queries().todos_age();
        println!("{}", render_list(&view, &query, age.as_deref()));
        Ok(())
    }

    pub async fn list_remote(&self, page: usize) -> Result<()> {
        let page = u32::try_from(page.max(1)).context("Page number too large")?;
        match self.repo.remote_page(page, PAGE_SIZE as u32).await {
            Ok(todo_page) => println!("{}", render_remote_page(&todo_page, page)),
            Err(e) => {
                error!(error = %format!("{:#}", e), "Failed to load remote page");
                println!("{}", LOAD_ERROR_MESSAGE);
            }
        }
        Ok(())
    }

    pub async fn show(&mut self, id: i64) -> Result<()> {
        match self.repo.todo(id).await {
            Ok(todo) => println!("{}", render_detail(&TodoDetail::from(&todo))),
            Err(e) if Self::is_not_found(&e) => println!("Todo {} not found.", id),
            Err(e) => {
                error!(id, error = %format!("{:#}", e), "Failed to load todo");
                println!("Error loading todo.");
            }
        }
        Ok(())
    }

    pub async fn add(&mut self, title: String, completed: bool) -> Result<()> {
        let draft = TodoForm::new(title, completed).to_draft()?;
        let todo = self.repo.create(draft).await?;
        println!("Created todo {} (stored locally only)", todo.id);
        Ok(())
    }

    pub async fn edit(&mut self, id: i64, title: Option<String>, completed: Option<bool>) -> Result<()> {
        let todo = self.repo.todo(id).await?;

        let mut form = TodoForm::from_todo(&todo);
        if let Some(title) = title {
            form.title = title;
        }
        if let Some(completed) = completed {
            form.completed = completed;
        }

        let updated = self
            .repo
            .update(form.apply_to(&todo)?)
            .await
            .context("Update failed")?;
        println!("{}", render_detail(&TodoDetail::from(&updated)));
        Ok(())
    }

    pub async fn delete(&mut self, id: i64, yes: bool) -> Result<()> {
        let todo = self.repo.todo(id).await?;
        let confirmation = DeleteConfirmation::new(&todo);

        if !yes {
            let answer = Self::prompt(&confirmation.prompt())?;
            if !DeleteConfirmation::is_confirmed(&answer) {
                println!("Cancelled.");
                return Ok(());
            }
        }

        self.repo.delete(confirmation.id).await.context("Delete failed")?;
        println!("Deleted todo {}", confirmation.id);
        Ok(())
    }

    fn is_not_found(e: &anyhow::Error) -> bool {
        e.downcast_ref::<ApiError>()
            .map(|api| api.is_not_found())
            .unwrap_or(false)
    }

    // =========================================================================
    // Auth pages
    // =========================================================================

    pub fn sign_up(&mut self, email: Option<String>) -> Result<()> {
        let email = match email {
            Some(email) => email,
            None => Self::prompt("Email: ")?,
        };
        let password = rpassword::prompt_password("Password: ")?;

        let user = self.auth.sign_up(&email, &password)?;
        println!("Account created for {}. Sign in with `todocache signin`.", user.email);
        Ok(())
    }

    pub async fn sign_in(&mut self, email: Option<String>) -> Result<()> {
        let email = match email.or_else(|| self.config.last_email.clone()) {
            Some(email) => email,
            None => Self::prompt("Email: ")?,
        };
        let password = rpassword::prompt_password("Password: ")?;

        let session = match self.auth.sign_in(&email, &password) {
            Ok(session) => session,
            Err(e) => {
                if let Some(AuthError::InvalidCredentials) = e.downcast_ref::<AuthError>() {
                    println!("Login failed: invalid email or password");
                }
                return Err(e);
            }
        };

        self.jar.save(session.token.clone())?;
        self.config.last_email = Some(session.user.email.clone());
        if let Err(e) = self.config.save() {
            warn!(error = %e, "Failed to save config");
        }

        info!("Login successful");
        self.dashboard().await
    }

    pub fn sign_out(&mut self) -> Result<()> {
        if let Some(token) = self.jar.token() {
            self.auth.sign_out(token)?;
        }
        self.jar.clear()?;
        println!("Signed out. Next: {}", Route::SignIn);
        Ok(())
    }

    pub async fn dashboard(&mut self) -> Result<()> {
        let headers = self.jar.headers()?;
        match guard(&self.auth, &headers).await? {
            GateOutcome::Allow(user) => {
                println!("Welcome {}", user.email);
                println!("Sign out with `todocache signout`.");
            }
            GateOutcome::Redirect(path) => {
                println!("Not signed in. Redirecting to {}", path);
            }
        }
        Ok(())
    }

    /// Dispatch a page path to its handler
    pub async fn open(&mut self, path: &str) -> Result<()> {
        match Route::parse(path) {
            Route::Home => self.list(ListQuery::default()).await,
            Route::Todo(id) => self.show(id).await,
            Route::SignIn => self.sign_in(None).await,
            Route::SignUp => self.sign_up(None),
            Route::Dashboard => self.dashboard().await,
            Route::NotFound => {
                println!("404 - page not found: {}", path);
                Ok(())
            }
        }
    }

    fn prompt(message: &str) -> Result<String> {
        print!("{}", message);
        io::stdout().flush()?;

        let mut input = String::new();
        io::stdin().read_line(&mut input)?;
        Ok(input.trim().to_string())
    }
}
