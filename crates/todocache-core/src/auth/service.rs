use std::future::Future;
use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use chrono::{DateTime, Utc};
use rand::{distributions::Alphanumeric, rngs::OsRng, Rng};
use reqwest::header::HeaderMap;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::session::{session_token, SessionData, User};
use super::AuthError;

/// Minimum accepted password length
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Length of generated session tokens
const SESSION_TOKEN_LENGTH: usize = 32;

const ACCOUNTS_FILE: &str = "accounts.json";
const SESSIONS_FILE: &str = "sessions.json";

/// Resolves the signed-in user for a request.
pub trait AuthService {
    /// `None` when the request carries no valid, unexpired session.
    fn get_session(&self, headers: &HeaderMap) -> impl Future<Output = Result<Option<SessionData>>>;
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Account {
    email: String,
    /// argon2 PHC string
    password_hash: String,
    created_at: DateTime<Utc>,
}

/// Email/password accounts and sessions stored as JSON files in a data
/// directory.
pub struct LocalAuthService {
    data_dir: PathBuf,
}

impl LocalAuthService {
    pub fn new(data_dir: PathBuf) -> Result<Self> {
        std::fs::create_dir_all(&data_dir)
            .with_context(|| format!("Failed to create auth directory: {}", data_dir.display()))?;
        Ok(Self { data_dir })
    }

    fn load<T: DeserializeOwned + Default>(&self, name: &str) -> Result<T> {
        let path = self.data_dir.join(name);
        if !path.exists() {
            return Ok(T::default());
        }
        let contents = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", name))?;
        serde_json::from_str(&contents).with_context(|| format!("Failed to parse {}", name))
    }

    fn save<T: Serialize>(&self, name: &str, data: &T) -> Result<()> {
        let contents = serde_json::to_string_pretty(data)?;
        std::fs::write(self.data_dir.join(name), contents)
            .with_context(|| format!("Failed to write {}", name))?;
        Ok(())
    }

    fn normalize_email(email: &str) -> Result<String> {
        let email = email.trim().to_lowercase();
        match email.split_once('@') {
            Some((local, domain)) if !local.is_empty() && !domain.is_empty() => Ok(email),
            _ => Err(AuthError::InvalidEmail(email).into()),
        }
    }

    fn hash_password(password: &str) -> Result<String> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| anyhow!("Failed to hash password: {}", e))?;
        Ok(hash.to_string())
    }

    fn verify_password(password: &str, hash: &str) -> bool {
        match PasswordHash::new(hash) {
            Ok(parsed) => Argon2::default()
                .verify_password(password.as_bytes(), &parsed)
                .is_ok(),
            Err(e) => {
                warn!(error = %e, "Stored password hash is malformed");
                false
            }
        }
    }

    fn generate_token() -> String {
        rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(SESSION_TOKEN_LENGTH)
            .map(char::from)
            .collect()
    }

    /// Register a new account
    pub fn sign_up(&self, email: &str, password: &str) -> Result<User> {
        let email = Self::normalize_email(email)?;
        if password.chars().count() < MIN_PASSWORD_LENGTH {
            return Err(AuthError::WeakPassword(MIN_PASSWORD_LENGTH).into());
        }

        let mut accounts: Vec<Account> = self.load(ACCOUNTS_FILE)?;
        if accounts.iter().any(|account| account.email == email) {
            return Err(AuthError::EmailTaken(email).into());
        }

        accounts.push(Account {
            email: email.clone(),
            password_hash: Self::hash_password(password)?,
            created_at: Utc::now(),
        });
        self.save(ACCOUNTS_FILE, &accounts)?;

        info!(email = %email, "Account created");
        Ok(User { email })
    }

    /// Verify credentials and open a new session
    pub fn sign_in(&self, email: &str, password: &str) -> Result<SessionData> {
        let email = Self::normalize_email(email).map_err(|_| AuthError::InvalidCredentials)?;
        let accounts: Vec<Account> = self.load(ACCOUNTS_FILE)?;

        let account = accounts
            .iter()
            .find(|account| account.email == email)
            .filter(|account| Self::verify_password(password, &account.password_hash))
            .ok_or(AuthError::InvalidCredentials)?;

        let session = SessionData::new(
            Self::generate_token(),
            User {
                email: account.email.clone(),
            },
        );

        let mut sessions: Vec<SessionData> = self.load(SESSIONS_FILE)?;
        sessions.retain(|existing| !existing.is_expired());
        sessions.push(session.clone());
        self.save(SESSIONS_FILE, &sessions)?;

        info!(email = %email, "Signed in");
        Ok(session)
    }

    /// End a session. Unknown tokens are ignored.
    pub fn sign_out(&self, token: &str) -> Result<()> {
        let mut sessions: Vec<SessionData> = self.load(SESSIONS_FILE)?;
        let before = sessions.len();
        sessions.retain(|session| session.token != token);
        if sessions.len() != before {
            self.save(SESSIONS_FILE, &sessions)?;
            info!("Signed out");
        }
        Ok(())
    }

    fn find_session(&self, token: &str) -> Result<Option<SessionData>> {
        let sessions: Vec<SessionData> = self.load(SESSIONS_FILE)?;
        Ok(sessions
            .into_iter()
            .find(|session| session.token == token)
            .filter(|session| !session.is_expired()))
    }
}

impl AuthService for LocalAuthService {
    async fn get_session(&self, headers: &HeaderMap) -> Result<Option<SessionData>> {
        let Some(token) = session_token(headers) else {
            debug!("No session cookie on request");
            return Ok(None);
        };
        self.find_session(&token)
    }
}
