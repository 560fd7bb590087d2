//! Authentication module guarding the dashboard.
//!
//! This module provides:
//! - `AuthService`: resolves a session from request headers
//! - `LocalAuthService`: file-backed email/password accounts with
//!   argon2-hashed passwords and 7-day sessions
//! - `guard`: lets a request through to a protected page or redirects it
//!   to the sign-in page
//!
//! The session token travels in a cookie named `todocache.session_token`.

pub mod error;
pub mod gate;
pub mod service;
pub mod session;

pub use error::AuthError;
pub use gate::{guard, GateOutcome};
pub use service::{AuthService, LocalAuthService};
pub use session::{session_cookie, session_token, SessionData, User, SESSION_COOKIE};
