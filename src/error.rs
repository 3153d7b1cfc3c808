//! Error types shared by the remote clients, repositories and interactors.

use record_store::StoreError;
use std::time::Duration;
use thiserror::Error;

/// Errors a repository call can end in. Interactors surface them unchanged inside
/// [`crate::interactor::Loadable::Failed`].
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// The request never produced a usable HTTP response, or the server answered
    /// with a non-success status.
    #[error("Transport error: {0}")]
    Transport(String),

    /// The response body did not have the expected shape.
    #[error("Decoding error: {0}")]
    Decoding(String),

    #[error("Not found: {0}")]
    NotFound(String),

    /// The guarded load did not finish in time.
    #[error("Timed out after {0:?}")]
    Timeout(Duration),

    /// The in-process store backing a stub repository failed.
    #[error("Store error: {0}")]
    Store(String),
}

impl RepositoryError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, RepositoryError::NotFound(_))
    }
}

impl From<reqwest::Error> for RepositoryError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            RepositoryError::Decoding(e.to_string())
        } else {
            RepositoryError::Transport(e.to_string())
        }
    }
}

impl From<serde_json::Error> for RepositoryError {
    fn from(e: serde_json::Error) -> Self {
        RepositoryError::Decoding(e.to_string())
    }
}

impl From<StoreError> for RepositoryError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound(id) => RepositoryError::NotFound(id),
            other => RepositoryError::Store(other.to_string()),
        }
    }
}

/// Errors from the sign-in and session endpoints.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("No active session")]
    NoSession,

    /// The callback URL carried no access token.
    #[error("Malformed auth callback: {0}")]
    MalformedCallback(String),

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl From<reqwest::Error> for AuthError {
    fn from(e: reqwest::Error) -> Self {
        AuthError::Repository(e.into())
    }
}

/// Errors while reading configuration from the environment.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ConfigError {
    #[error("Missing environment variable {0}")]
    Missing(&'static str),

    #[error("Invalid value for {key}: {reason}")]
    Invalid { key: &'static str, reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_not_found_maps_to_not_found() {
        let err: RepositoryError = StoreError::NotFound("abc".into()).into();
        assert!(err.is_not_found());

        let err: RepositoryError = StoreError::StoreClosed.into();
        assert!(matches!(err, RepositoryError::Store(_)));
    }

    #[test]
    fn test_json_errors_are_decoding_errors() {
        let err: RepositoryError = serde_json::from_str::<u32>("\"nope\"").unwrap_err().into();
        assert!(matches!(err, RepositoryError::Decoding(_)));
    }
}
