//! Pipeline execution errors.

use thiserror::Error;

/// Result type for pipeline execution.
pub type PipelineResult<T> = Result<T, PipelineError>;

/// Pipeline execution errors.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("cannot unwind non-array field '{path}' (found {actual})")]
    UnwindNonArray { path: String, actual: &'static str },
}
