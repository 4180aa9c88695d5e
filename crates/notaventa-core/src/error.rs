//! # Error Types
//!
//! Domain-specific error types for notaventa-core.
//!
//! ## Error Flow
//! ```text
//! ValidationError → CoreError → FlowError → CLI (display message)
//!                               ClientError ┘
//! ```
//!
//! Errors are enum variants, never bare strings; every variant carries a
//! display-ready Spanish message.

use thiserror::Error;

use crate::types::SaleStatus;

// =============================================================================
// Core Error
// =============================================================================

/// Business rule violations and domain logic failures.
#[derive(Debug, Error)]
pub enum CoreError {
    /// The product has no published price and cannot enter a sale.
    #[error("el producto {0} no tiene precio publicado")]
    PriceUnavailable(i64),

    /// Referenced line key does not exist in the builder.
    #[error("la línea {0} no existe en la nota de venta")]
    LineNotFound(String),

    /// Finalization requires at least one product line.
    #[error("la nota de venta no tiene productos")]
    EmptySale,

    /// Finalization requires an attached client.
    #[error("debe seleccionar un cliente antes de finalizar")]
    MissingClient,

    /// Finalization requires a selected warehouse.
    #[error("debe seleccionar una bodega antes de finalizar")]
    MissingWarehouse,

    /// The note's current status does not admit the requested operation.
    #[error("la venta {folio} está {current}, no se puede {operation}")]
    InvalidStatus {
        folio: i64,
        current: SaleStatus,
        operation: &'static str,
    },

    /// Emission was requested for a note that already carries a document.
    #[error("la venta {0} ya tiene un documento emitido")]
    AlreadyEmitted(i64),

    /// Validation error (wraps ValidationError).
    #[error("{0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors, raised before business logic runs.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} es obligatorio")]
    Required { field: &'static str },

    /// Field value exceeds its maximum length.
    #[error("{field} no puede superar {max} caracteres")]
    TooLong { field: &'static str, max: usize },

    /// Value must be positive.
    #[error("{field} debe ser mayor que cero")]
    MustBePositive { field: &'static str },

    /// Invalid format (malformed RUT, bad identifier, etc.).
    #[error("{field} tiene un formato inválido: {reason}")]
    InvalidFormat { field: &'static str, reason: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
