//! # dukkan-core: Pure Business Logic for the Dukkan Console
//!
//! This crate is the heart of Dukkan, a small-business operations console
//! (products, stock, invoicing, reporting, user management). It contains
//! the rules that the web console and the database's stored procedures must
//! both apply — as pure functions with zero I/O dependencies, so the two
//! sides can never drift apart.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Dukkan Architecture                               │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                 Web Console (TypeScript)                        │   │
//! │  │    Invoices ──► Products ──► Reports ──► Users                 │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ JSON over HTTP                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ dukkan-core (THIS CRATE) ★                      │   │
//! │  │                                                                 │   │
//! │  │   ┌──────────┐ ┌──────────┐ ┌──────────┐ ┌──────────┐         │   │
//! │  │   │  money   │ │  stock   │ │  authz   │ │ calendar │         │   │
//! │  │   │  totals  │ │ threshold│ │  roles   │ │  Cairo   │         │   │
//! │  │   │  status  │ │ low-stock│ │  gates   │ │ windows  │         │   │
//! │  │   └──────────┘ └──────────┘ └──────────┘ └──────────┘         │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO SESSIONS • PURE FUNCTIONS          │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │          dukkan-rpc (procedure contracts)                       │   │
//! │  │   create_invoice, void_invoice, update_invoice_payment, ...    │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`money`] - Money type and the invoice totals derivation
//! - [`stock`] - Low-stock threshold resolution
//! - [`authz`] - Roles and permission predicates
//! - [`calendar`] - Cairo civil dates, visibility windows, report presets
//! - [`types`] - Persisted row shapes (Product, Invoice, UserProfile)
//! - [`validation`] - Request-payload validation
//! - [`sku`] - SKU generation
//! - [`error`] - Domain error types
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: every function is deterministic and stateless;
//!    calling it twice with the same arguments yields the same result
//! 2. **Integer Money**: amounts are cents (i64); decimals enter only
//!    through the rounding boundary in [`money`]
//! 3. **Total Functions**: apart from the over-payment rejection, nothing
//!    in this crate can fail for inputs in its documented domain
//! 4. **Closed Roles**: every permission gate matches the role enum
//!    exhaustively, never through a default arm
//!
//! ## Example Usage
//!
//! ```rust
//! use dukkan_core::{calculate_totals, PaymentStatus, TotalsInput};
//!
//! let totals = calculate_totals(TotalsInput {
//!     subtotal: 200.0,
//!     discount: Some(0.0),
//!     paid_amount: Some(120.0),
//! })
//! .unwrap();
//!
//! assert_eq!(totals.remaining_amount.cents(), 8000);
//! assert_eq!(totals.payment_status, PaymentStatus::PartiallyPaid);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod authz;
pub mod calendar;
pub mod error;
pub mod money;
pub mod sku;
pub mod stock;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use authz::{
    can_access_manager_routes, can_add_discount, can_create_invoices, can_delete_invoices,
    can_edit_invoice_info, can_edit_invoice_payments, can_manage_products, can_manage_users,
    can_void_invoices, Role,
};
pub use calendar::{
    cairo_date, clamp_date, invoice_date_bounds, invoice_date_bounds_on, parse_date, today_cairo,
    Clamp, DateBounds, DatePreset,
};
pub use error::{CoreError, CoreResult, ValidationError};
pub use money::{calculate_totals, derive_payment_status, InvoiceTotals, Money, TotalsInput};
pub use sku::generate_sku;
pub use stock::{is_low_stock, resolve_low_stock_threshold, StockLevel};
pub use types::{Invoice, InvoiceStatus, PaymentStatus, Product, ProductStatus, UserProfile};

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Currency code used in amount displays.
///
/// The console trades in Egyptian pounds; amounts are stored as integer
/// piastres and only formatted with this code at display boundaries.
pub const DEFAULT_CURRENCY: &str = "EGP";

/// Global low-stock threshold, used when a product has no per-product
/// override and no console-level configuration supplies another value.
pub const DEFAULT_GLOBAL_LOW_STOCK_THRESHOLD: i64 = 5;
