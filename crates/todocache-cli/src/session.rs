//! Persists the session cookie between runs, the way a browser would.

use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use reqwest::header::HeaderMap;
use serde::{Deserialize, Serialize};
use todocache_core::auth::session_cookie;

/// Session file name in cache directory
const SESSION_FILE: &str = "session.json";

#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredCookie {
    token: String,
    saved_at: DateTime<Utc>,
}

pub struct CookieJar {
    cache_dir: PathBuf,
    token: Option<String>,
}

impl CookieJar {
    pub fn new(cache_dir: PathBuf) -> Self {
        Self {
            cache_dir,
            token: None,
        }
    }

    /// Load the cookie from disk
    pub fn load(&mut self) -> Result<bool> {
        let path = self.session_path();
        if path.exists() {
            let contents = std::fs::read_to_string(&path).context("Failed to read session file")?;
            let stored: StoredCookie =
                serde_json::from_str(&contents).context("Failed to parse session file")?;
            self.token = Some(stored.token);
            return Ok(true);
        }
        Ok(false)
    }

    /// Remember a new session token
    pub fn save(&mut self, token: String) -> Result<()> {
        let path = self.session_path();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let stored = StoredCookie {
            token: token.clone(),
            saved_at: Utc::now(),
        };
        std::fs::write(path, serde_json::to_string_pretty(&stored)?)?;
        self.token = Some(token);
        Ok(())
    }

    pub fn clear(&mut self) -> Result<()> {
        self.token = None;
        let path = self.session_path();
        if path.exists() {
            std::fs::remove_file(path)?;
        }
        Ok(())
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    /// Request headers carrying the cookie, empty if there is none
    pub fn headers(&self) -> Result<HeaderMap> {
        match self.token() {
            Some(token) => session_cookie(token),
            None => Ok(HeaderMap::new()),
        }
    }

    fn session_path(&self) -> PathBuf {
        self.cache_dir.join(SESSION_FILE)
    }
}
