use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("Invalid email address: {0}")]
    InvalidEmail(String),

    #[error("Password must be at least {0} characters")]
    WeakPassword(usize),

    #[error("An account already exists for {0}")]
    EmailTaken(String),

    #[error("Invalid email or password")]
    InvalidCredentials,
}
