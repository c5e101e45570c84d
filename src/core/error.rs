use thiserror::Error;

use crate::backend::store::StoreError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Data store error: {0}")]
    Store(#[from] StoreError),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Storage error: {0}")]
    Storage(String),
}

impl AppError {
    /// Whether the error should be shown inline next to the originating form
    /// rather than as a global failure banner.
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            AppError::Validation(_)
                | AppError::Auth(_)
                | AppError::Forbidden(_)
                | AppError::NotFound(_)
                | AppError::Conflict(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
