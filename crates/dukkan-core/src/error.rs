//! # Error Types
//!
//! Domain-specific error types for dukkan-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  dukkan-core errors (this file)                                        │
//! │  ├── CoreError        - Business rule violations                       │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  dukkan-rpc errors (separate crate)                                    │
//! │  └── ProcedureError   - Workflow procedure failures                    │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → ProcedureError → HTTP status      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (field, amounts)
//! 3. Errors are enum variants, never String
//! 4. The single arithmetic failure (over-payment) propagates unmodified to
//!    the caller; it is never retried and never clamped

use thiserror::Error;

use crate::money::Money;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
///
/// Almost every function in this crate is total. The one exception is the
/// totals derivation, which rejects a paid amount above the invoice total.
/// Callers must surface that as a rejected mutation (HTTP 400-equivalent),
/// never clamp it down.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Paid amount exceeds the invoice total.
    ///
    /// ## When This Occurs
    /// - Creating an invoice with an explicit `paidAmount` above the total
    /// - Editing a payment to more than the invoice is worth
    #[error("Paid amount {paid} cannot exceed total amount {total}")]
    PaidExceedsTotal { paid: Money, total: Money },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These occur when a request payload doesn't meet requirements. Used for
/// early validation before business logic runs, mirroring the checks the
/// console applies at its API boundary.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Value must be strictly positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Value must be zero or greater.
    #[error("{field} must not be negative")]
    MustBeNonNegative { field: String },

    /// Numeric value is NaN or infinite.
    #[error("{field} must be a finite number")]
    NotFinite { field: String },

    /// Invalid format (e.g., invalid UUID, invalid date).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CoreError::PaidExceedsTotal {
            paid: Money::from_cents(12000),
            total: Money::from_cents(10000),
        };
        assert_eq!(
            err.to_string(),
            "Paid amount EGP 120.00 cannot exceed total amount EGP 100.00"
        );
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::Required {
            field: "sku".to_string(),
        };
        assert_eq!(err.to_string(), "sku is required");

        let err = ValidationError::MustBeNonNegative {
            field: "discount".to_string(),
        };
        assert_eq!(err.to_string(), "discount must not be negative");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::Required {
            field: "items".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
