//! # Dukkan RPC - Procedure Contracts & Reference Backend
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         DUKKAN-RPC CRATE                                │
//! │                                                                         │
//! │  The server-side surface of the console: the invoice workflow and      │
//! │  reporting procedures as typed async traits, their parameter and row   │
//! │  DTOs, and an in-memory reference implementation.                      │
//! │                                                                         │
//! │  ┌──────────────┐   ┌──────────────┐   ┌──────────────┐               │
//! │  │ procedures   │   │ memory       │   │ error        │               │
//! │  │ (contracts + │   │ (reference   │   │ (ProcedureE.)│               │
//! │  │  DTO rows)   │   │  backend)    │   │              │               │
//! │  └──────────────┘   └──────────────┘   └──────────────┘               │
//! │                                                                         │
//! │  All derivation logic (money, stock, authorization, calendar) lives    │
//! │  in dukkan-core; this crate only sequences it and holds state.        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//!
//! 1. **One formula, one place**: totals, payment status, and low-stock
//!    flags come from dukkan-core. No procedure re-implements a formula.
//! 2. **Atomic mutations**: permission and payload checks run before any
//!    state change, so a failed call never leaves partial stock moves.
//! 3. **Snapshot lines**: invoice lines copy price, name, and cost at the
//!    moment of sale; catalog edits never rewrite sold history.

pub mod error;
pub mod memory;
pub mod procedures;

pub use error::{ProcedureError, ProcedureResult};
pub use memory::MemoryBackend;
pub use procedures::{
    AddOnCharge, BestSellerRow, CreateInvoiceParams, CreatedInvoice, DashboardMetrics,
    InvoiceInfoPatch, InvoiceLineInput, InvoiceProcedures, LowStockItem, NetProfitSummary,
    ReportRange, ReportingProcedures, SalesReportRow, StockMovementReason, StockMovementRow,
};
