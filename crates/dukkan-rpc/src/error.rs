//! # Procedure Error Types
//!
//! Error types for the workflow procedure contracts.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Propagation                                    │
//! │                                                                         │
//! │  CoreError / ValidationError (dukkan-core)                             │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ProcedureError (this module) ← adds entity/permission context         │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  HTTP layer maps: Domain → 400, Forbidden → 403, NotFound → 404        │
//! │                                                                         │
//! │  Domain errors propagate unmodified and are never retried — an        │
//! │  over-payment stays an over-payment no matter how often it is sent.   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

use dukkan_core::{CoreError, InvoiceStatus, ValidationError};

/// Workflow procedure errors.
#[derive(Debug, Error)]
pub enum ProcedureError {
    /// Entity cannot be found.
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// The actor's role does not permit the action.
    #[error("Role is not permitted to {action}")]
    Forbidden { action: String },

    /// A business rule from dukkan-core was violated (over-payment,
    /// invalid payload field).
    #[error(transparent)]
    Domain(#[from] CoreError),

    /// The invoice's lifecycle status forbids the mutation (e.g. editing
    /// or re-voiding a voided invoice).
    #[error("Invoice {id} is {status:?}, cannot perform operation")]
    InvoiceNotEditable { id: String, status: InvoiceStatus },

    /// The product exists but cannot be sold (inactive).
    #[error("Product {sku} is not available for sale")]
    ProductUnavailable { sku: String },

    /// A custom line price was supplied for a product that does not allow
    /// price override.
    #[error("Product {sku} does not allow price override")]
    PriceOverrideNotAllowed { sku: String },
}

impl ProcedureError {
    /// Creates a NotFound error for a given entity type and ID.
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        ProcedureError::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }

    /// Creates a Forbidden error for a denied action.
    pub fn forbidden(action: impl Into<String>) -> Self {
        ProcedureError::Forbidden {
            action: action.into(),
        }
    }
}

/// Payload validation failures route through the domain error.
impl From<ValidationError> for ProcedureError {
    fn from(err: ValidationError) -> Self {
        ProcedureError::Domain(CoreError::Validation(err))
    }
}

/// Result type for procedure operations.
pub type ProcedureResult<T> = Result<T, ProcedureError>;

// =============================================================================
// Unit Tests
// =============================================================================
