//! Shared error types for the services crate.

use thiserror::Error;

use learnly_core::model::CredentialsError;
use storage::StorageError;

/// Errors returned to the sign-in and sign-up forms.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AuthError {
    #[error(transparent)]
    InvalidInput(#[from] CredentialsError),
    /// The auth service refused the request; the message is the service's own.
    #[error("{0}")]
    Rejected(String),
    #[error(transparent)]
    Storage(StorageError),
}

impl From<StorageError> for AuthError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::Unauthorized(message) => Self::Rejected(message),
            other => Self::Storage(other),
        }
    }
}

/// Errors emitted by `ProgressService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ProgressError {
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted while bootstrapping app services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppServicesError {
    #[error(transparent)]
    Storage(#[from] StorageError),
}
