//! # Procedure Contracts
//!
//! The named server-side routines the console invokes, as Rust traits with
//! typed parameters.
//!
//! ## Contract Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                   Who Implements These Traits                           │
//! │                                                                         │
//! │  Console API route                                                     │
//! │       │   create_invoice(actor, params)                                │
//! │       ▼                                                                 │
//! │  InvoiceProcedures / ReportingProcedures  (THIS MODULE: the contract)  │
//! │       │                                                                 │
//! │       ├──► Managed database stored procedures   (production)           │
//! │       │                                                                 │
//! │       └──► MemoryBackend                        (tests, reference)     │
//! │                                                                         │
//! │  Both implementations must apply dukkan-core's totals derivation so   │
//! │  client-displayed and server-persisted values never diverge, and      │
//! │  must treat each invoice mutation as atomic (no partial stock moves). │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Permission gates are part of the contract: every method names the
//! `dukkan_core::authz` predicate that must hold for the actor's role.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use dukkan_core::{Invoice, UserProfile};

use crate::error::ProcedureResult;

// =============================================================================
// Invoice Parameters
// =============================================================================

/// One invoice line as submitted by the console.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceLineInput {
    /// Product UUID.
    pub product_id: String,
    /// Units sold. Strictly positive.
    pub quantity: i64,
    /// Per-line price replacing the catalog price. Only honored where the
    /// product allows price override.
    #[serde(default)]
    pub custom_price: Option<f64>,
}

/// A named add-on charge (delivery fee, service charge) included in the
/// subtotal alongside the product lines.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct AddOnCharge {
    pub label: String,
    pub amount: f64,
}

/// Parameters for `create_invoice`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CreateInvoiceParams {
    #[serde(default)]
    pub customer_name: Option<String>,
    #[serde(default)]
    pub customer_phone: Option<String>,
    #[serde(default)]
    pub reference_number: Option<String>,
    /// Civil date of the sale. Omitted means today on the Cairo calendar.
    #[serde(default)]
    #[ts(as = "Option<String>")]
    pub invoice_date: Option<NaiveDate>,
    /// Flat discount amount. Non-zero requires `can_add_discount`.
    #[serde(default)]
    pub discount: f64,
    /// Explicit paid amount. Omitted means fully paid.
    #[serde(default)]
    pub paid_amount: Option<f64>,
    /// Named add-on charges folded into the subtotal.
    #[serde(default)]
    pub charges: Vec<AddOnCharge>,
    /// Ordered product lines. Must be non-empty.
    pub items: Vec<InvoiceLineInput>,
}

/// Identifier pair returned by `create_invoice`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CreatedInvoice {
    pub id: String,
    pub invoice_number: String,
}

/// Parameters for `update_invoice_info`. Money fields are deliberately
/// absent — this procedure can never change totals.
///
/// Customer fields are replaced wholesale (the edit form submits the whole
/// set); an omitted `invoice_date` leaves the current date in place.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceInfoPatch {
    #[serde(default)]
    pub customer_name: Option<String>,
    #[serde(default)]
    pub customer_phone: Option<String>,
    #[serde(default)]
    pub reference_number: Option<String>,
    #[serde(default)]
    #[ts(as = "Option<String>")]
    pub invoice_date: Option<NaiveDate>,
}

// =============================================================================
// Reporting Rows
// =============================================================================

/// A timestamp range for reporting queries, inclusive at both ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ReportRange {
    #[ts(as = "String")]
    pub from: DateTime<Utc>,
    #[ts(as = "String")]
    pub to: DateTime<Utc>,
}

impl ReportRange {
    /// Checks whether an instant falls inside the range.
    #[inline]
    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        self.from <= at && at <= self.to
    }
}

/// Headline numbers for the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct DashboardMetrics {
    pub invoices_today: i64,
    pub invoices_month: i64,
    pub revenue_today_cents: i64,
    pub revenue_month_cents: i64,
    pub low_stock_count: i64,
}

/// One low-stock alert row. `threshold` is the effective threshold the
/// server resolved — by the same formula as `dukkan_core::is_low_stock`,
/// so the console and the server always flag the same products.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct LowStockItem {
    pub id: String,
    pub sku: String,
    pub name: String,
    pub current_stock: i64,
    pub threshold: i64,
}

/// One day of the sales report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SalesReportRow {
    /// Cairo civil date the invoices fall on.
    #[ts(as = "String")]
    pub day: NaiveDate,
    pub invoice_count: i64,
    /// Invoiced total for the day.
    pub revenue_cents: i64,
    /// Money actually received for the day's invoices.
    pub collected_cents: i64,
}

/// One row of the best-sellers report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct BestSellerRow {
    pub product_id: String,
    pub sku: String,
    pub name: String,
    pub quantity_sold: i64,
    pub revenue_cents: i64,
}

/// Net profit over a range, computed over lines whose product cost is
/// known: `gross_profit = costed_revenue - total_cost`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NetProfitSummary {
    pub costed_revenue_cents: i64,
    pub total_cost_cents: i64,
    pub gross_profit_cents: i64,
}

/// Why a stock movement happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum StockMovementReason {
    /// Stock consumed by an invoice line.
    Sale,
    /// Stock restored by voiding an invoice.
    VoidRestore,
    /// Stock restored by deleting a confirmed invoice.
    DeleteRestore,
}

/// One audit row of the stock movements report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct StockMovementRow {
    pub product_id: String,
    pub sku: String,
    pub invoice_id: String,
    /// Signed stock delta: negative for sales, positive for restores.
    pub quantity_delta: i64,
    pub reason: StockMovementReason,
    #[ts(as = "String")]
    pub occurred_at: DateTime<Utc>,
}

// =============================================================================
// Contracts
// =============================================================================

/// The invoice workflow procedures.
///
/// Implementations must be atomic per invoice: either every effect of a
/// call (row write, stock movement, audit fields) happens, or none does.
/// Permission and payload checks therefore precede any state change.
#[allow(async_fn_in_trait)]
pub trait InvoiceProcedures {
    /// Creates an invoice, derives its totals, and reduces stock per line.
    ///
    /// Gated by `can_create_invoices`; a non-zero discount additionally by
    /// `can_add_discount`. Fails on over-payment (§ money engine), unknown
    /// or inactive products, and custom prices on products that don't
    /// allow override.
    async fn create_invoice(
        &self,
        actor: &UserProfile,
        params: CreateInvoiceParams,
    ) -> ProcedureResult<CreatedInvoice>;

    /// Replaces an invoice's paid amount, re-deriving status and remaining
    /// amount. Gated by `can_edit_invoice_payments`; over-payment rejects.
    async fn update_invoice_payment(
        &self,
        actor: &UserProfile,
        invoice_id: &str,
        paid_amount: f64,
    ) -> ProcedureResult<()>;

    /// Voids an invoice: restores all its stock movements and marks it
    /// non-reversible. Gated by `can_void_invoices`. Voiding a voided
    /// invoice fails.
    async fn void_invoice(
        &self,
        actor: &UserProfile,
        invoice_id: &str,
        reason: Option<String>,
    ) -> ProcedureResult<()>;

    /// Edits customer/reference/date fields. Never touches money fields.
    /// Gated by `can_edit_invoice_info`.
    async fn update_invoice_info(
        &self,
        actor: &UserProfile,
        invoice_id: &str,
        patch: InvoiceInfoPatch,
    ) -> ProcedureResult<()>;

    /// Removes an invoice outright, restoring stock if it was confirmed.
    /// Gated by `can_delete_invoices`.
    async fn delete_invoice(&self, actor: &UserProfile, invoice_id: &str) -> ProcedureResult<()>;

    /// Fetches one invoice row.
    async fn get_invoice(&self, invoice_id: &str) -> ProcedureResult<Invoice>;

    /// Lists invoices the actor may see, newest first, filtered by the
    /// role's visibility window (`invoice_date_bounds`). Managers get the
    /// unfiltered list.
    async fn list_invoices(&self, actor: &UserProfile) -> ProcedureResult<Vec<Invoice>>;
}

/// The pre-aggregated reporting procedures.
#[allow(async_fn_in_trait)]
pub trait ReportingProcedures {
    /// Headline dashboard numbers for today and the current month.
    async fn dashboard_metrics(&self) -> ProcedureResult<DashboardMetrics>;

    /// Products at or below their effective threshold.
    async fn low_stock_items(&self) -> ProcedureResult<Vec<LowStockItem>>;

    /// Per-day invoice counts and revenue over a range.
    async fn sales_report(&self, range: ReportRange) -> ProcedureResult<Vec<SalesReportRow>>;

    /// Top products by quantity sold over a range. A limit below 1 is
    /// coerced to 10.
    async fn best_selling_products(
        &self,
        range: ReportRange,
        limit: i64,
    ) -> ProcedureResult<Vec<BestSellerRow>>;

    /// Gross profit over lines with a known product cost.
    async fn net_profit_summary(&self, range: ReportRange) -> ProcedureResult<NetProfitSummary>;

    /// Audit trail of stock movements over a range.
    async fn stock_movements_report(
        &self,
        range: ReportRange,
    ) -> ProcedureResult<Vec<StockMovementRow>>;
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_params_wire_shape() {
        let json = r#"{
            "customerName": "Walk-in",
            "discount": 10,
            "items": [
                { "productId": "550e8400-e29b-41d4-a716-446655440000", "quantity": 2 }
            ]
        }"#;

        let params: CreateInvoiceParams = serde_json::from_str(json).unwrap();
        assert_eq!(params.customer_name.as_deref(), Some("Walk-in"));
        assert_eq!(params.discount, 10.0);
        assert!(params.paid_amount.is_none());
        assert!(params.charges.is_empty());
        assert_eq!(params.items[0].quantity, 2);
        assert!(params.items[0].custom_price.is_none());
    }

    #[test]
    fn test_movement_reason_wire_names() {
        assert_eq!(
            serde_json::to_string(&StockMovementReason::VoidRestore).unwrap(),
            "\"void_restore\""
        );
    }

    #[test]
    fn test_report_range_is_inclusive() {
        let from = DateTime::parse_from_rfc3339("2024-03-01T00:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        let to = DateTime::parse_from_rfc3339("2024-03-31T23:59:59Z")
            .unwrap()
            .with_timezone(&Utc);
        let range = ReportRange { from, to };

        assert!(range.contains(from));
        assert!(range.contains(to));
        assert!(!range.contains(to + chrono::Duration::seconds(1)));
    }
}
