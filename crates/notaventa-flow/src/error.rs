//! # Workflow Error Type
//!
//! Folds core guard failures, HTTP failures and PDF rendering failures into
//! one error for the orchestration layer. Messages stay display-ready; the
//! CLI prints them as-is.

use thiserror::Error;

use notaventa_client::ClientError;
use notaventa_core::{CoreError, ValidationError};

/// Errors raised by the lifecycle and emission workflows.
#[derive(Debug, Error)]
pub enum FlowError {
    /// Business rule or guard violation.
    #[error("{0}")]
    Core(#[from] CoreError),

    /// Backend call failure, already classified.
    #[error("{0}")]
    Client(#[from] ClientError),

    /// The document font directory is missing or unreadable.
    #[error("no se encontró la fuente para el documento en {0}")]
    FontNotFound(String),

    /// PDF assembly or rendering failure.
    #[error("no se pudo generar el documento PDF: {0}")]
    Render(String),
}

impl From<ValidationError> for FlowError {
    fn from(err: ValidationError) -> Self {
        FlowError::Core(CoreError::Validation(err))
    }
}

/// Result type for workflow operations.
pub type FlowResult<T> = Result<T, FlowError>;
