//! Query execution errors.

use thiserror::Error;

use crate::pipeline::PipelineError;
use crate::storage::{InvalidNameError, StorageError};

/// Result type for query execution.
pub type ExecuteResult<T> = Result<T, ExecuteError>;

/// Query execution errors.
#[derive(Debug, Error)]
pub enum ExecuteError {
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("pipeline error: {0}")]
    Pipeline(#[from] PipelineError),

    #[error("invalid name: {0}")]
    InvalidName(#[from] InvalidNameError),

    #[error("insert payload missing key field: {0}")]
    MissingKeyField(String),

    #[error("cannot push to non-array field: {0}")]
    PushToNonArray(String),

    #[error("internal error: {0}")]
    Internal(String),
}
