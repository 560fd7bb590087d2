//! API client for the remote todo service.
//!
//! `ApiClient` issues plain JSON requests against the `/todos` resource of
//! a JSONPlaceholder-compatible server.

use anyhow::{Context, Result};
use reqwest::{header::HeaderMap, Client, RequestBuilder};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::models::{Todo, TodoDraft, TodoPage};

use super::{ApiError, TodoService};

// ============================================================================
// Constants
// ============================================================================

/// Default base URL of the public demo API
pub const DEFAULT_API_URL: &str = "https://jsonplaceholder.typicode.com";

/// Response header carrying the total number of todos on paginated lists
const TOTAL_COUNT_HEADER: &str = "x-total-count";

/// API client for the todo service.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone, Debug)]
pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    /// Create a client for the default public API
    pub fn new() -> Result<Self> {
        Self::with_base_url(DEFAULT_API_URL)
    }

    /// Create a client for a specific server, e.g. a local json-server
    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .build()
            .context("Failed to build HTTP client")?;

        let base_url = base_url.into().trim_end_matches('/').to_string();
        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn todos_url(&self) -> String {
        format!("{}/todos", self.base_url)
    }

    fn todo_url(&self, id: i64) -> String {
        format!("{}/todos/{}", self.base_url, id)
    }

    /// Check if response is successful, returning an error with body if not.
    async fn check_response(response: reqwest::Response) -> Result<reqwest::Response> {
        if response.status().is_success() {
            Ok(response)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(ApiError::from_status(status, &body).into())
        }
    }

    async fn send(request: RequestBuilder, method: &str, url: &str) -> Result<reqwest::Response> {
        debug!(method, url, "Sending request");
        let response = request
            .send()
            .await
            .map_err(ApiError::NetworkError)
            .with_context(|| format!("Failed to send {} request to {}", method, url))?;
        Self::check_response(response).await
    }

    async fn parse<T: DeserializeOwned>(response: reqwest::Response, url: &str) -> Result<T> {
        response
            .json()
            .await
            .map_err(|e| ApiError::InvalidResponse(e.to_string()))
            .with_context(|| format!("Failed to parse JSON response from {}", url))
    }

    /// Read the total count header, falling back to the number of items
    /// actually returned when the header is missing or malformed.
    fn total_count(headers: &HeaderMap, fallback: usize) -> u64 {
        headers
            .get(TOTAL_COUNT_HEADER)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.trim().parse().ok())
            .unwrap_or(fallback as u64)
    }
}

impl TodoService for ApiClient {
    async fn list_todos(&self, page: u32, limit: u32) -> Result<TodoPage> {
        let url = self.todos_url();
        let request = self
            .client
            .get(&url)
            .query(&[("_page", page), ("_limit", limit)]);
        let response = Self::send(request, "GET", &url).await?;

        let headers = response.headers().clone();
        let data: Vec<Todo> = Self::parse(response, &url).await?;
        let total = Self::total_count(&headers, data.len());
        debug!(page, limit, count = data.len(), total, "Fetched todo page");

        Ok(TodoPage { data, total })
    }

    async fn list_all_todos(&self) -> Result<Vec<Todo>> {
        let url = self.todos_url();
        let response = Self::send(self.client.get(&url), "GET", &url).await?;
        Self::parse(response, &url).await
    }

    async fn get_todo(&self, id: i64) -> Result<Todo> {
        let url = self.todo_url(id);
        let response = Self::send(self.client.get(&url), "GET", &url).await?;
        Self::parse(response, &url).await
    }

    async fn create_todo(&self, draft: &TodoDraft) -> Result<Todo> {
        let url = self.todos_url();
        let response = Self::send(self.client.post(&url).json(draft), "POST", &url).await?;
        Self::parse(response, &url).await
    }

    async fn update_todo(&self, todo: &Todo) -> Result<Todo> {
        let url = self.todo_url(todo.id);
        let response = Self::send(self.client.put(&url).json(todo), "PUT", &url).await?;
        Self::parse(response, &url).await
    }

    async fn delete_todo(&self, id: i64) -> Result<i64> {
        let url = self.todo_url(id);
        Self::send(self.client.delete(&url), "DELETE", &url).await?;
        Ok(id)
    }
}
