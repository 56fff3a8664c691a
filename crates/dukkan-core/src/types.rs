//! # Domain Types
//!
//! Row shapes consumed and produced by the console, as persisted by the
//! managed database.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Product      │   │    Invoice      │   │  UserProfile    │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (UUID)      │   │  id (UUID)      │   │  id (UUID)      │       │
//! │  │  sku (business) │   │  invoice_number │   │  full_name      │       │
//! │  │  sale_price     │   │  totals tuple   │   │  role           │       │
//! │  │  current_stock  │   │  payment_status │   │  is_active      │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  PaymentStatus: unpaid | partially_paid | paid     (derived, §money)   │
//! │  InvoiceStatus: confirmed | void                                       │
//! │  ProductStatus: active | inactive                                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! These are all recomputed or re-fetched on every request; nothing in this
//! crate holds them as state.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::authz::Role;
use crate::money::{derive_payment_status, InvoiceTotals, Money};
use crate::stock::StockLevel;

// =============================================================================
// Status Enums
// =============================================================================

/// Derived classification of an invoice's payment state.
///
/// This is never set directly; it is a pure function of
/// `(paid_amount, total)` — see [`derive_payment_status`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    /// No money received (paid amount at or below zero).
    Unpaid,
    /// Some money received, but less than the total.
    PartiallyPaid,
    /// Paid in full (paid amount at or above the total).
    Paid,
}

/// Invoice lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum InvoiceStatus {
    /// A live invoice; its stock movements are applied.
    Confirmed,
    /// Irreversibly cancelled; its stock movements were restored.
    Void,
}

/// Product lifecycle status (soft delete).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum ProductStatus {
    Active,
    Inactive,
}

// =============================================================================
// Product
// =============================================================================

/// A product available for sale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Product {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Stock Keeping Unit - business identifier.
    pub sku: String,

    /// Display name shown in the console and on invoices.
    pub name: String,

    /// Optional free-text category.
    pub category: Option<String>,

    /// Sale price in cents.
    pub sale_price_cents: i64,

    /// Cost price in cents (for profit reporting). Unknown for some rows.
    pub cost_price_cents: Option<i64>,

    /// Current stock level. Can go negative (oversold).
    pub current_stock: i64,

    /// Per-product low-stock threshold override. `None` falls back to the
    /// global threshold.
    pub low_stock_threshold: Option<i64>,

    /// Whether product is active (soft delete).
    pub status: ProductStatus,

    /// Digital goods carry no stock; sales never move their stock level.
    pub is_digital: bool,

    /// Whether a per-line custom price may replace the sale price.
    pub allow_price_override: bool,
}

impl Product {
    /// Returns the sale price as a Money value.
    #[inline]
    pub fn sale_price(&self) -> Money {
        Money::from_cents(self.sale_price_cents)
    }

    /// Returns the cost price as a Money value, where known.
    #[inline]
    pub fn cost_price(&self) -> Option<Money> {
        self.cost_price_cents.map(Money::from_cents)
    }

    /// Checks whether the product is active.
    #[inline]
    pub fn is_active(&self) -> bool {
        self.status == ProductStatus::Active
    }

    /// Bridges to the stock module's threshold input.
    pub fn stock_level(&self, global_threshold: i64) -> StockLevel {
        StockLevel {
            stock: self.current_stock,
            product_threshold: self.low_stock_threshold,
            global_threshold,
        }
    }
}

// =============================================================================
// User Profile
// =============================================================================

/// An authenticated console user, as resolved by the (external) session
/// layer. Inactive profiles are rejected before any procedure runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct UserProfile {
    pub id: String,
    pub full_name: String,
    pub role: Role,
    pub is_active: bool,
}

// =============================================================================
// Invoice
// =============================================================================

/// A persisted invoice row.
///
/// The money fields are denormalized copies of one totals derivation; the
/// workflow procedures must keep them consistent with
/// [`crate::calculate_totals`] so client-displayed and server-persisted
/// values never diverge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Invoice {
    pub id: String,
    pub invoice_number: String,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    pub created_by: String,
    pub customer_name: Option<String>,
    pub customer_phone: Option<String>,
    pub reference_number: Option<String>,
    /// Civil date of the sale (Cairo calendar).
    #[ts(as = "String")]
    pub invoice_date: NaiveDate,
    pub subtotal_cents: i64,
    pub discount_cents: i64,
    pub total_cents: i64,
    pub paid_amount_cents: i64,
    pub remaining_amount_cents: i64,
    pub payment_status: PaymentStatus,
    pub status: InvoiceStatus,
    #[ts(as = "Option<String>")]
    pub voided_at: Option<DateTime<Utc>>,
    pub voided_by: Option<String>,
}

impl Invoice {
    /// Reconstructs the totals tuple view of this row.
    pub fn totals(&self) -> InvoiceTotals {
        InvoiceTotals {
            subtotal: Money::from_cents(self.subtotal_cents),
            discount: Money::from_cents(self.discount_cents),
            total: Money::from_cents(self.total_cents),
            paid_amount: Money::from_cents(self.paid_amount_cents),
            remaining_amount: Money::from_cents(self.remaining_amount_cents),
            payment_status: self.payment_status,
        }
    }

    /// Checks whether the invoice has been voided.
    #[inline]
    pub fn is_void(&self) -> bool {
        self.status == InvoiceStatus::Void
    }

    /// Checks that the persisted money fields satisfy the derivation
    /// invariants. Useful as a consistency probe over externally-written
    /// rows.
    pub fn totals_are_consistent(&self) -> bool {
        let t = self.totals();
        t.total == (t.subtotal - t.discount).max(Money::zero())
            && t.remaining_amount == t.total - t.paid_amount
            && !t.paid_amount.is_negative()
            && t.paid_amount <= t.total
            && t.payment_status == derive_payment_status(t.paid_amount, t.total)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_invoice() -> Invoice {
        Invoice {
            id: "3f6f3c1e-0000-4000-8000-000000000001".to_string(),
            invoice_number: "INV-000001".to_string(),
            created_at: Utc::now(),
            created_by: "user-1".to_string(),
            customer_name: Some("Walk-in".to_string()),
            customer_phone: None,
            reference_number: None,
            invoice_date: NaiveDate::from_ymd_opt(2024, 3, 10).unwrap(),
            subtotal_cents: 20000,
            discount_cents: 0,
            total_cents: 20000,
            paid_amount_cents: 12000,
            remaining_amount_cents: 8000,
            payment_status: PaymentStatus::PartiallyPaid,
            status: InvoiceStatus::Confirmed,
            voided_at: None,
            voided_by: None,
        }
    }

    #[test]
    fn test_payment_status_wire_names() {
        assert_eq!(
            serde_json::to_string(&PaymentStatus::PartiallyPaid).unwrap(),
            "\"partially_paid\""
        );
        assert_eq!(
            serde_json::to_string(&InvoiceStatus::Confirmed).unwrap(),
            "\"confirmed\""
        );
    }

    #[test]
    fn test_invoice_totals_view() {
        let invoice = sample_invoice();
        let totals = invoice.totals();
        assert_eq!(totals.total.cents(), 20000);
        assert_eq!(totals.remaining_amount.cents(), 8000);
        assert!(invoice.totals_are_consistent());
    }

    #[test]
    fn test_inconsistent_row_is_detected() {
        let mut invoice = sample_invoice();
        invoice.remaining_amount_cents = 9000;
        assert!(!invoice.totals_are_consistent());

        let mut invoice = sample_invoice();
        invoice.payment_status = PaymentStatus::Paid;
        assert!(!invoice.totals_are_consistent());
    }

    #[test]
    fn test_product_stock_level_bridge() {
        let product = Product {
            id: "p-1".to_string(),
            sku: "COKE-330".to_string(),
            name: "Coca-Cola 330ml".to_string(),
            category: None,
            sale_price_cents: 1500,
            cost_price_cents: Some(900),
            current_stock: 4,
            low_stock_threshold: None,
            status: ProductStatus::Active,
            is_digital: false,
            allow_price_override: false,
        };

        let level = product.stock_level(5);
        assert_eq!(level.stock, 4);
        assert_eq!(level.product_threshold, None);
        assert_eq!(level.global_threshold, 5);
    }
}
