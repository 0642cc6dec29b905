//! Domain errors. Used by ports and use cases.
//!
//! Adapters map infrastructure errors into these.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DomainError {
    /// Entity or remote message absent. Recoverable: triggers re-creation or surfaces to caller.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Caller is not a member of the managed guild. No session is created.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Network or platform failure. Swallowed by best-effort operations.
    #[error("Discord request failed: {0}")]
    RemoteTransient(String),

    /// Missing or invalid credential, guild or channel. Fatal at startup.
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Repository error: {0}")]
    Repo(String),

    #[error("Identity provider error: {0}")]
    Identity(String),
}

impl DomainError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, DomainError::NotFound(_))
    }
}
