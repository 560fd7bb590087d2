use anyhow::Result;
use reqwest::header::HeaderMap;
use tracing::debug;

use crate::routes::Route;

use super::service::AuthService;
use super::session::User;

/// Outcome of checking a request against a protected page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateOutcome {
    /// Render the page for this user
    Allow(User),
    /// Send the browser elsewhere; not an error
    Redirect(&'static str),
}

/// Resolve the session for a protected page request.
pub async fn guard<A: AuthService>(auth: &A, headers: &HeaderMap) -> Result<GateOutcome> {
    match auth.get_session(headers).await? {
        Some(session) => Ok(GateOutcome::Allow(session.user)),
        None => {
            debug!("No session, redirecting to sign-in");
            Ok(GateOutcome::Redirect(Route::SignIn.path_str()))
        }
    }
}
