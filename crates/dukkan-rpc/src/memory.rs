//! # In-Memory Reference Backend
//!
//! An in-memory implementation of the procedure contracts, built on
//! dukkan-core's formulas. This is what the test suite runs against, and
//! the executable specification the database's stored procedures are held
//! to.
//!
//! ## Invoice Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Invoice Lifecycle                                 │
//! │                                                                         │
//! │  1. CREATE                                                             │
//! │     └── create_invoice() → totals derived, stock reduced per line,    │
//! │         movement rows recorded, number INV-nnnnnn assigned            │
//! │                                                                         │
//! │  2. (OPTIONAL) EDIT                                                    │
//! │     ├── update_invoice_payment() → totals re-derived                  │
//! │     └── update_invoice_info()    → customer fields only               │
//! │                                                                         │
//! │  3. (OPTIONAL) VOID                                                    │
//! │     └── void_invoice() → stock restored, status void (irreversible)   │
//! │                                                                         │
//! │  4. (OPTIONAL) DELETE                                                  │
//! │     └── delete_invoice() → stock restored if confirmed, row removed   │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Atomicity is structural: every permission and payload check runs before
//! the write lock mutates anything, so a failed call leaves no partial
//! stock adjustment behind.

use std::collections::{BTreeMap, HashMap};

use chrono::{Datelike, Utc};
use tokio::sync::RwLock;
use tracing::{debug, info};
use uuid::Uuid;

use dukkan_core::{
    authz, cairo_date, calculate_totals, invoice_date_bounds, is_low_stock,
    resolve_low_stock_threshold, today_cairo, validation, Invoice, InvoiceStatus, Money, Product,
    TotalsInput, UserProfile, DEFAULT_GLOBAL_LOW_STOCK_THRESHOLD,
};

use crate::error::{ProcedureError, ProcedureResult};
use crate::procedures::{
    BestSellerRow, CreateInvoiceParams, CreatedInvoice, DashboardMetrics, InvoiceInfoPatch,
    InvoiceProcedures, LowStockItem, NetProfitSummary, ReportRange, ReportingProcedures,
    SalesReportRow, StockMovementReason, StockMovementRow,
};

/// Snapshot of one invoice line at the moment of sale. Price and name are
/// copied so later catalog edits cannot rewrite history.
#[derive(Debug, Clone, PartialEq, Eq)]
struct LineSnapshot {
    product_id: String,
    sku: String,
    name: String,
    quantity: i64,
    unit_price_cents: i64,
    line_total_cents: i64,
    cost_price_cents: Option<i64>,
    stock_tracked: bool,
}

#[derive(Debug, Default)]
struct State {
    products: HashMap<String, Product>,
    invoices: HashMap<String, Invoice>,
    lines: HashMap<String, Vec<LineSnapshot>>,
    movements: Vec<StockMovementRow>,
    /// Per-backend invoice number sequence. Explicit state, not a global.
    invoice_seq: u64,
}

/// In-memory backend implementing both procedure contracts.
#[derive(Debug)]
pub struct MemoryBackend {
    state: RwLock<State>,
    global_low_stock_threshold: i64,
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryBackend {
    /// Creates an empty backend with the default global low-stock
    /// threshold.
    pub fn new() -> Self {
        MemoryBackend {
            state: RwLock::new(State::default()),
            global_low_stock_threshold: DEFAULT_GLOBAL_LOW_STOCK_THRESHOLD,
        }
    }

    /// Creates a backend with a console-configured global threshold.
    pub fn with_global_threshold(threshold: i64) -> Self {
        MemoryBackend {
            state: RwLock::new(State::default()),
            global_low_stock_threshold: threshold,
        }
    }

    /// Seeds or replaces a product row.
    pub async fn upsert_product(&self, product: Product) {
        let mut state = self.state.write().await;
        state.products.insert(product.id.clone(), product);
    }

    /// Fetches one product row.
    pub async fn get_product(&self, id: &str) -> ProcedureResult<Product> {
        let state = self.state.read().await;
        state
            .products
            .get(id)
            .cloned()
            .ok_or_else(|| ProcedureError::not_found("product", id))
    }
}

impl InvoiceProcedures for MemoryBackend {
    async fn create_invoice(
        &self,
        actor: &UserProfile,
        params: CreateInvoiceParams,
    ) -> ProcedureResult<CreatedInvoice> {
        if !authz::can_create_invoices(actor.role) {
            return Err(ProcedureError::forbidden("create invoices"));
        }

        validation::validate_amount("discount", params.discount)?;
        if params.discount > 0.0 && !authz::can_add_discount(actor.role) {
            return Err(ProcedureError::forbidden("add a discount"));
        }
        if let Some(paid) = params.paid_amount {
            validation::validate_amount("paidAmount", paid)?;
        }
        for charge in &params.charges {
            if charge.label.trim().is_empty() {
                return Err(dukkan_core::ValidationError::Required {
                    field: "charge label".to_string(),
                }
                .into());
            }
            validation::validate_amount("charge amount", charge.amount)?;
        }
        validation::validate_invoice_lines(
            params
                .items
                .iter()
                .map(|line| (line.product_id.as_str(), line.quantity)),
        )?;
        for line in &params.items {
            if let Some(price) = line.custom_price {
                validation::validate_amount("customPrice", price)?;
            }
        }

        let mut guard = self.state.write().await;
        let state = &mut *guard;

        // Resolve every line against the catalog before touching stock.
        let mut snapshots = Vec::with_capacity(params.items.len());
        let mut subtotal = Money::zero();
        for line in &params.items {
            let product = state
                .products
                .get(&line.product_id)
                .ok_or_else(|| ProcedureError::not_found("product", &line.product_id))?;
            if !product.is_active() {
                return Err(ProcedureError::ProductUnavailable {
                    sku: product.sku.clone(),
                });
            }

            let unit_price = match line.custom_price {
                Some(price) => {
                    if !product.allow_price_override {
                        return Err(ProcedureError::PriceOverrideNotAllowed {
                            sku: product.sku.clone(),
                        });
                    }
                    Money::from_value(price)
                }
                None => product.sale_price(),
            };
            let line_total = unit_price.multiply_quantity(line.quantity);
            subtotal += line_total;

            snapshots.push(LineSnapshot {
                product_id: product.id.clone(),
                sku: product.sku.clone(),
                name: product.name.clone(),
                quantity: line.quantity,
                unit_price_cents: unit_price.cents(),
                line_total_cents: line_total.cents(),
                cost_price_cents: product.cost_price_cents,
                stock_tracked: !product.is_digital,
            });
        }
        for charge in &params.charges {
            subtotal += Money::from_value(charge.amount);
        }

        // The one place this can still fail: over-payment.
        let totals = calculate_totals(TotalsInput {
            subtotal: subtotal.to_value(),
            discount: Some(params.discount),
            paid_amount: params.paid_amount,
        })?;

        // Every check passed: from here the whole mutation applies.
        let now = Utc::now();
        let id = Uuid::new_v4().to_string();
        state.invoice_seq += 1;
        let invoice_number = format!("INV-{:06}", state.invoice_seq);

        for snapshot in &snapshots {
            if !snapshot.stock_tracked {
                continue;
            }
            if let Some(product) = state.products.get_mut(&snapshot.product_id) {
                // Stock may go negative (oversold); the low-stock report
                // flags it, the sale is not blocked.
                product.current_stock -= snapshot.quantity;
            }
            state.movements.push(StockMovementRow {
                product_id: snapshot.product_id.clone(),
                sku: snapshot.sku.clone(),
                invoice_id: id.clone(),
                quantity_delta: -snapshot.quantity,
                reason: StockMovementReason::Sale,
                occurred_at: now,
            });
        }

        let invoice = Invoice {
            id: id.clone(),
            invoice_number: invoice_number.clone(),
            created_at: now,
            created_by: actor.id.clone(),
            customer_name: normalize(params.customer_name),
            customer_phone: normalize(params.customer_phone),
            reference_number: normalize(params.reference_number),
            invoice_date: params.invoice_date.unwrap_or_else(|| cairo_date(now)),
            subtotal_cents: totals.subtotal.cents(),
            discount_cents: totals.discount.cents(),
            total_cents: totals.total.cents(),
            paid_amount_cents: totals.paid_amount.cents(),
            remaining_amount_cents: totals.remaining_amount.cents(),
            payment_status: totals.payment_status,
            status: InvoiceStatus::Confirmed,
            voided_at: None,
            voided_by: None,
        };
        state.invoices.insert(id.clone(), invoice);
        state.lines.insert(id.clone(), snapshots);

        info!(
            invoice_number = %invoice_number,
            total_cents = totals.total.cents(),
            created_by = %actor.id,
            "Created invoice"
        );

        Ok(CreatedInvoice { id, invoice_number })
    }

    async fn update_invoice_payment(
        &self,
        actor: &UserProfile,
        invoice_id: &str,
        paid_amount: f64,
    ) -> ProcedureResult<()> {
        if !authz::can_edit_invoice_payments(actor.role) {
            return Err(ProcedureError::forbidden("edit invoice payments"));
        }
        validation::validate_amount("paidAmount", paid_amount)?;

        let mut state = self.state.write().await;
        let invoice = state
            .invoices
            .get_mut(invoice_id)
            .ok_or_else(|| ProcedureError::not_found("invoice", invoice_id))?;
        if invoice.is_void() {
            return Err(ProcedureError::InvoiceNotEditable {
                id: invoice_id.to_string(),
                status: invoice.status,
            });
        }

        // Re-derive the whole tuple from persisted subtotal/discount so the
        // row can never hold a mix of old and new money fields.
        let totals = calculate_totals(TotalsInput {
            subtotal: Money::from_cents(invoice.subtotal_cents).to_value(),
            discount: Some(Money::from_cents(invoice.discount_cents).to_value()),
            paid_amount: Some(paid_amount),
        })?;

        invoice.paid_amount_cents = totals.paid_amount.cents();
        invoice.remaining_amount_cents = totals.remaining_amount.cents();
        invoice.payment_status = totals.payment_status;

        debug!(
            invoice_number = %invoice.invoice_number,
            paid_cents = totals.paid_amount.cents(),
            updated_by = %actor.id,
            "Updated invoice payment"
        );

        Ok(())
    }

    async fn void_invoice(
        &self,
        actor: &UserProfile,
        invoice_id: &str,
        reason: Option<String>,
    ) -> ProcedureResult<()> {
        if !authz::can_void_invoices(actor.role) {
            return Err(ProcedureError::forbidden("void invoices"));
        }

        let mut guard = self.state.write().await;
        let state = &mut *guard;
        let invoice = state
            .invoices
            .get_mut(invoice_id)
            .ok_or_else(|| ProcedureError::not_found("invoice", invoice_id))?;
        if invoice.is_void() {
            return Err(ProcedureError::InvoiceNotEditable {
                id: invoice_id.to_string(),
                status: invoice.status,
            });
        }

        let now = Utc::now();
        invoice.status = InvoiceStatus::Void;
        invoice.voided_at = Some(now);
        invoice.voided_by = Some(actor.id.clone());
        let invoice_number = invoice.invoice_number.clone();

        restore_stock(
            state,
            invoice_id,
            StockMovementReason::VoidRestore,
            now,
        );

        info!(
            invoice_number = %invoice_number,
            voided_by = %actor.id,
            reason = reason.as_deref().unwrap_or("-"),
            "Voided invoice"
        );

        Ok(())
    }

    async fn update_invoice_info(
        &self,
        actor: &UserProfile,
        invoice_id: &str,
        patch: InvoiceInfoPatch,
    ) -> ProcedureResult<()> {
        if !authz::can_edit_invoice_info(actor.role) {
            return Err(ProcedureError::forbidden("edit invoice info"));
        }

        let mut state = self.state.write().await;
        let invoice = state
            .invoices
            .get_mut(invoice_id)
            .ok_or_else(|| ProcedureError::not_found("invoice", invoice_id))?;
        if invoice.is_void() {
            return Err(ProcedureError::InvoiceNotEditable {
                id: invoice_id.to_string(),
                status: invoice.status,
            });
        }

        invoice.customer_name = normalize(patch.customer_name);
        invoice.customer_phone = normalize(patch.customer_phone);
        invoice.reference_number = normalize(patch.reference_number);
        if let Some(date) = patch.invoice_date {
            invoice.invoice_date = date;
        }

        debug!(
            invoice_number = %invoice.invoice_number,
            updated_by = %actor.id,
            "Updated invoice info"
        );

        Ok(())
    }

    async fn delete_invoice(&self, actor: &UserProfile, invoice_id: &str) -> ProcedureResult<()> {
        if !authz::can_delete_invoices(actor.role) {
            return Err(ProcedureError::forbidden("delete invoices"));
        }

        let mut guard = self.state.write().await;
        let state = &mut *guard;
        let invoice = state
            .invoices
            .remove(invoice_id)
            .ok_or_else(|| ProcedureError::not_found("invoice", invoice_id))?;

        // A voided invoice already had its stock restored.
        if invoice.status == InvoiceStatus::Confirmed {
            restore_stock(
                state,
                invoice_id,
                StockMovementReason::DeleteRestore,
                Utc::now(),
            );
        }
        state.lines.remove(invoice_id);

        info!(
            invoice_number = %invoice.invoice_number,
            deleted_by = %actor.id,
            "Deleted invoice"
        );

        Ok(())
    }

    async fn get_invoice(&self, invoice_id: &str) -> ProcedureResult<Invoice> {
        let state = self.state.read().await;
        state
            .invoices
            .get(invoice_id)
            .cloned()
            .ok_or_else(|| ProcedureError::not_found("invoice", invoice_id))
    }

    async fn list_invoices(&self, actor: &UserProfile) -> ProcedureResult<Vec<Invoice>> {
        let bounds = invoice_date_bounds(actor.role);

        let state = self.state.read().await;
        let mut invoices: Vec<Invoice> = state
            .invoices
            .values()
            .filter(|invoice| match bounds {
                None => true,
                Some(bounds) => bounds.contains(invoice.invoice_date),
            })
            .cloned()
            .collect();
        invoices.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        Ok(invoices)
    }
}

impl ReportingProcedures for MemoryBackend {
    async fn dashboard_metrics(&self) -> ProcedureResult<DashboardMetrics> {
        let today = today_cairo();
        // day 1 exists in every month
        let month_start = today.with_day(1).unwrap_or(today);

        let state = self.state.read().await;
        let mut metrics = DashboardMetrics {
            invoices_today: 0,
            invoices_month: 0,
            revenue_today_cents: 0,
            revenue_month_cents: 0,
            low_stock_count: 0,
        };

        for invoice in state.invoices.values() {
            if invoice.is_void() {
                continue;
            }
            if invoice.invoice_date == today {
                metrics.invoices_today += 1;
                metrics.revenue_today_cents += invoice.total_cents;
            }
            if invoice.invoice_date >= month_start && invoice.invoice_date <= today {
                metrics.invoices_month += 1;
                metrics.revenue_month_cents += invoice.total_cents;
            }
        }

        metrics.low_stock_count = state
            .products
            .values()
            .filter(|p| !p.is_digital)
            .filter(|p| is_low_stock(&p.stock_level(self.global_low_stock_threshold)))
            .count() as i64;

        Ok(metrics)
    }

    async fn low_stock_items(&self) -> ProcedureResult<Vec<LowStockItem>> {
        let state = self.state.read().await;
        let mut items: Vec<LowStockItem> = state
            .products
            .values()
            .filter(|p| !p.is_digital)
            .filter(|p| is_low_stock(&p.stock_level(self.global_low_stock_threshold)))
            .map(|p| LowStockItem {
                id: p.id.clone(),
                sku: p.sku.clone(),
                name: p.name.clone(),
                current_stock: p.current_stock,
                threshold: resolve_low_stock_threshold(
                    &p.stock_level(self.global_low_stock_threshold),
                ),
            })
            .collect();
        items.sort_by(|a, b| a.name.cmp(&b.name));

        Ok(items)
    }

    async fn sales_report(&self, range: ReportRange) -> ProcedureResult<Vec<SalesReportRow>> {
        let state = self.state.read().await;
        let mut days: BTreeMap<chrono::NaiveDate, SalesReportRow> = BTreeMap::new();

        for invoice in state.invoices.values() {
            if invoice.is_void() || !range.contains(invoice.created_at) {
                continue;
            }
            let day = cairo_date(invoice.created_at);
            let row = days.entry(day).or_insert_with(|| SalesReportRow {
                day,
                invoice_count: 0,
                revenue_cents: 0,
                collected_cents: 0,
            });
            row.invoice_count += 1;
            row.revenue_cents += invoice.total_cents;
            row.collected_cents += invoice.paid_amount_cents;
        }

        Ok(days.into_values().collect())
    }

    async fn best_selling_products(
        &self,
        range: ReportRange,
        limit: i64,
    ) -> ProcedureResult<Vec<BestSellerRow>> {
        let limit = if limit < 1 { 10 } else { limit } as usize;

        let state = self.state.read().await;
        let mut by_product: HashMap<String, BestSellerRow> = HashMap::new();

        for invoice in state.invoices.values() {
            if invoice.is_void() || !range.contains(invoice.created_at) {
                continue;
            }
            let Some(lines) = state.lines.get(&invoice.id) else {
                continue;
            };
            for line in lines {
                let row = by_product
                    .entry(line.product_id.clone())
                    .or_insert_with(|| BestSellerRow {
                        product_id: line.product_id.clone(),
                        sku: line.sku.clone(),
                        name: line.name.clone(),
                        quantity_sold: 0,
                        revenue_cents: 0,
                    });
                row.quantity_sold += line.quantity;
                row.revenue_cents += line.line_total_cents;
            }
        }

        let mut rows: Vec<BestSellerRow> = by_product.into_values().collect();
        rows.sort_by(|a, b| {
            b.quantity_sold
                .cmp(&a.quantity_sold)
                .then_with(|| a.sku.cmp(&b.sku))
        });
        rows.truncate(limit);

        Ok(rows)
    }

    async fn net_profit_summary(&self, range: ReportRange) -> ProcedureResult<NetProfitSummary> {
        let state = self.state.read().await;
        let mut costed_revenue = 0i64;
        let mut total_cost = 0i64;

        for invoice in state.invoices.values() {
            if invoice.is_void() || !range.contains(invoice.created_at) {
                continue;
            }
            let Some(lines) = state.lines.get(&invoice.id) else {
                continue;
            };
            for line in lines {
                // Lines without a known cost contribute to neither side.
                if let Some(cost) = line.cost_price_cents {
                    costed_revenue += line.line_total_cents;
                    total_cost += cost * line.quantity;
                }
            }
        }

        Ok(NetProfitSummary {
            costed_revenue_cents: costed_revenue,
            total_cost_cents: total_cost,
            gross_profit_cents: costed_revenue - total_cost,
        })
    }

    async fn stock_movements_report(
        &self,
        range: ReportRange,
    ) -> ProcedureResult<Vec<StockMovementRow>> {
        let state = self.state.read().await;
        Ok(state
            .movements
            .iter()
            .filter(|m| range.contains(m.occurred_at))
            .cloned()
            .collect())
    }
}

/// Puts back the stock an invoice consumed and records the restore
/// movements. Digital lines never moved stock, so they never restore it.
fn restore_stock(
    state: &mut State,
    invoice_id: &str,
    reason: StockMovementReason,
    at: chrono::DateTime<Utc>,
) {
    let Some(lines) = state.lines.get(invoice_id) else {
        return;
    };
    for line in lines {
        if !line.stock_tracked {
            continue;
        }
        if let Some(product) = state.products.get_mut(&line.product_id) {
            product.current_stock += line.quantity;
        }
        state.movements.push(StockMovementRow {
            product_id: line.product_id.clone(),
            sku: line.sku.clone(),
            invoice_id: invoice_id.to_string(),
            quantity_delta: line.quantity,
            reason,
            occurred_at: at,
        });
    }
}

/// Trims an optional text field; blank input becomes `None`.
fn normalize(value: Option<String>) -> Option<String> {
    value.and_then(|s| {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::procedures::InvoiceLineInput;
    use dukkan_core::{PaymentStatus, ProductStatus, Role};

    fn manager() -> UserProfile {
        UserProfile {
            id: "00000000-0000-4000-8000-00000000000a".to_string(),
            full_name: "Mona Manager".to_string(),
            role: Role::Manager,
            is_active: true,
        }
    }

    fn supervisor() -> UserProfile {
        UserProfile {
            id: "00000000-0000-4000-8000-00000000000b".to_string(),
            full_name: "Samir Supervisor".to_string(),
            role: Role::Supervisor,
            is_active: true,
        }
    }

    fn sales() -> UserProfile {
        UserProfile {
            id: "00000000-0000-4000-8000-00000000000c".to_string(),
            full_name: "Salma Sales".to_string(),
            role: Role::Sales,
            is_active: true,
        }
    }

    fn product(id: &str, sku: &str, price_cents: i64, stock: i64) -> Product {
        Product {
            id: id.to_string(),
            sku: sku.to_string(),
            name: format!("{sku} product"),
            category: None,
            sale_price_cents: price_cents,
            cost_price_cents: Some(price_cents / 2),
            current_stock: stock,
            low_stock_threshold: None,
            status: ProductStatus::Active,
            is_digital: false,
            allow_price_override: false,
        }
    }

    const P1: &str = "11111111-1111-4111-8111-111111111111";
    const P2: &str = "22222222-2222-4222-8222-222222222222";

    async fn seeded_backend() -> MemoryBackend {
        let backend = MemoryBackend::new();
        backend.upsert_product(product(P1, "COKE-330", 1500, 10)).await;
        backend.upsert_product(product(P2, "TEA-100", 4000, 8)).await;
        backend
    }

    fn lines(entries: &[(&str, i64)]) -> Vec<InvoiceLineInput> {
        entries
            .iter()
            .map(|(id, qty)| InvoiceLineInput {
                product_id: id.to_string(),
                quantity: *qty,
                custom_price: None,
            })
            .collect()
    }

    fn params(items: Vec<InvoiceLineInput>) -> CreateInvoiceParams {
        CreateInvoiceParams {
            customer_name: None,
            customer_phone: None,
            reference_number: None,
            invoice_date: None,
            discount: 0.0,
            paid_amount: None,
            charges: Vec::new(),
            items,
        }
    }

    fn everything() -> ReportRange {
        ReportRange {
            from: Utc::now() - chrono::Duration::days(1),
            to: Utc::now() + chrono::Duration::days(1),
        }
    }

    #[tokio::test]
    async fn test_create_invoice_derives_totals_and_reduces_stock() {
        let backend = seeded_backend().await;

        let created = backend
            .create_invoice(
                &manager(),
                CreateInvoiceParams {
                    discount: 10.0,
                    items: lines(&[(P1, 2), (P2, 1)]),
                    ..params(Vec::new())
                },
            )
            .await
            .unwrap();
        assert_eq!(created.invoice_number, "INV-000001");

        let invoice = backend.get_invoice(&created.id).await.unwrap();
        // 2 × 15.00 + 1 × 40.00 = 70.00, minus 10.00 discount
        assert_eq!(invoice.subtotal_cents, 7000);
        assert_eq!(invoice.total_cents, 6000);
        // omitted paid amount defaults to the total
        assert_eq!(invoice.paid_amount_cents, 6000);
        assert_eq!(invoice.remaining_amount_cents, 0);
        assert_eq!(invoice.payment_status, PaymentStatus::Paid);
        assert!(invoice.totals_are_consistent());

        assert_eq!(backend.get_product(P1).await.unwrap().current_stock, 8);
        assert_eq!(backend.get_product(P2).await.unwrap().current_stock, 7);
    }

    #[tokio::test]
    async fn test_create_invoice_rejects_over_payment_without_touching_stock() {
        let backend = seeded_backend().await;

        let err = backend
            .create_invoice(
                &manager(),
                CreateInvoiceParams {
                    paid_amount: Some(999.0),
                    items: lines(&[(P1, 1)]),
                    ..params(Vec::new())
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ProcedureError::Domain(dukkan_core::CoreError::PaidExceedsTotal { .. })
        ));

        // atomicity: the failed call moved no stock and wrote no rows
        assert_eq!(backend.get_product(P1).await.unwrap().current_stock, 10);
        assert!(backend
            .stock_movements_report(everything())
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_sales_can_create_but_not_discount() {
        let backend = seeded_backend().await;

        backend
            .create_invoice(&sales(), params(lines(&[(P1, 1)])))
            .await
            .unwrap();

        let err = backend
            .create_invoice(
                &sales(),
                CreateInvoiceParams {
                    discount: 5.0,
                    items: lines(&[(P1, 1)]),
                    ..params(Vec::new())
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ProcedureError::Forbidden { .. }));

        // supervisors gained both gates in the later revision
        backend
            .create_invoice(
                &supervisor(),
                CreateInvoiceParams {
                    discount: 5.0,
                    items: lines(&[(P1, 1)]),
                    ..params(Vec::new())
                },
            )
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_create_invoice_requires_items() {
        let backend = seeded_backend().await;
        let err = backend
            .create_invoice(&manager(), params(Vec::new()))
            .await
            .unwrap_err();
        assert!(matches!(err, ProcedureError::Domain(_)));
    }

    #[tokio::test]
    async fn test_custom_price_needs_override_flag() {
        let backend = seeded_backend().await;

        let mut items = lines(&[(P1, 1)]);
        items[0].custom_price = Some(12.0);
        let err = backend
            .create_invoice(&manager(), params(items))
            .await
            .unwrap_err();
        assert!(matches!(err, ProcedureError::PriceOverrideNotAllowed { .. }));

        let mut overridable = product(P1, "COKE-330", 1500, 10);
        overridable.allow_price_override = true;
        backend.upsert_product(overridable).await;

        let mut items = lines(&[(P1, 2)]);
        items[0].custom_price = Some(12.0);
        let created = backend.create_invoice(&manager(), params(items)).await.unwrap();
        let invoice = backend.get_invoice(&created.id).await.unwrap();
        assert_eq!(invoice.subtotal_cents, 2400);
    }

    #[tokio::test]
    async fn test_add_on_charges_fold_into_subtotal() {
        let backend = seeded_backend().await;

        let created = backend
            .create_invoice(
                &manager(),
                CreateInvoiceParams {
                    charges: vec![crate::procedures::AddOnCharge {
                        label: "Delivery".to_string(),
                        amount: 25.0,
                    }],
                    items: lines(&[(P1, 1)]),
                    ..params(Vec::new())
                },
            )
            .await
            .unwrap();

        let invoice = backend.get_invoice(&created.id).await.unwrap();
        assert_eq!(invoice.subtotal_cents, 1500 + 2500);
    }

    #[tokio::test]
    async fn test_inactive_product_cannot_be_sold() {
        let backend = seeded_backend().await;
        let mut inactive = product(P1, "COKE-330", 1500, 10);
        inactive.status = ProductStatus::Inactive;
        backend.upsert_product(inactive).await;

        let err = backend
            .create_invoice(&manager(), params(lines(&[(P1, 1)])))
            .await
            .unwrap_err();
        assert!(matches!(err, ProcedureError::ProductUnavailable { .. }));
    }

    #[tokio::test]
    async fn test_oversell_goes_negative_and_flags_low_stock() {
        let backend = seeded_backend().await;

        backend
            .create_invoice(&manager(), params(lines(&[(P1, 12)])))
            .await
            .unwrap();
        assert_eq!(backend.get_product(P1).await.unwrap().current_stock, -2);

        let items = backend.low_stock_items().await.unwrap();
        assert!(items.iter().any(|i| i.sku == "COKE-330" && i.current_stock == -2));
    }

    #[tokio::test]
    async fn test_payment_update_rederives_status() {
        let backend = seeded_backend().await;
        let created = backend
            .create_invoice(
                &manager(),
                CreateInvoiceParams {
                    paid_amount: Some(0.0),
                    items: lines(&[(P2, 2)]), // total 80.00
                    ..params(Vec::new())
                },
            )
            .await
            .unwrap();

        let err = backend
            .update_invoice_payment(&sales(), &created.id, 40.0)
            .await
            .unwrap_err();
        assert!(matches!(err, ProcedureError::Forbidden { .. }));

        backend
            .update_invoice_payment(&manager(), &created.id, 40.0)
            .await
            .unwrap();
        let invoice = backend.get_invoice(&created.id).await.unwrap();
        assert_eq!(invoice.payment_status, PaymentStatus::PartiallyPaid);
        assert_eq!(invoice.remaining_amount_cents, 4000);
        assert!(invoice.totals_are_consistent());

        // over-payment is rejected, never clamped
        let err = backend
            .update_invoice_payment(&manager(), &created.id, 80.01)
            .await
            .unwrap_err();
        assert!(matches!(err, ProcedureError::Domain(_)));
        let invoice = backend.get_invoice(&created.id).await.unwrap();
        assert_eq!(invoice.paid_amount_cents, 4000);
    }

    #[tokio::test]
    async fn test_void_restores_stock_and_is_irreversible() {
        let backend = seeded_backend().await;
        let created = backend
            .create_invoice(&manager(), params(lines(&[(P1, 4)])))
            .await
            .unwrap();
        assert_eq!(backend.get_product(P1).await.unwrap().current_stock, 6);

        let err = backend
            .void_invoice(&supervisor(), &created.id, None)
            .await
            .unwrap_err();
        assert!(matches!(err, ProcedureError::Forbidden { .. }));

        backend
            .void_invoice(&manager(), &created.id, Some("damaged goods".to_string()))
            .await
            .unwrap();

        let invoice = backend.get_invoice(&created.id).await.unwrap();
        assert!(invoice.is_void());
        assert!(invoice.voided_at.is_some());
        assert_eq!(backend.get_product(P1).await.unwrap().current_stock, 10);

        // void is irreversible; a second void fails and restores nothing
        let err = backend
            .void_invoice(&manager(), &created.id, None)
            .await
            .unwrap_err();
        assert!(matches!(err, ProcedureError::InvoiceNotEditable { .. }));
        assert_eq!(backend.get_product(P1).await.unwrap().current_stock, 10);

        let restores: Vec<_> = backend
            .stock_movements_report(everything())
            .await
            .unwrap()
            .into_iter()
            .filter(|m| m.reason == StockMovementReason::VoidRestore)
            .collect();
        assert_eq!(restores.len(), 1);
        assert_eq!(restores[0].quantity_delta, 4);
    }

    #[tokio::test]
    async fn test_void_invoice_cannot_be_edited() {
        let backend = seeded_backend().await;
        let created = backend
            .create_invoice(&manager(), params(lines(&[(P1, 1)])))
            .await
            .unwrap();
        backend.void_invoice(&manager(), &created.id, None).await.unwrap();

        let err = backend
            .update_invoice_payment(&manager(), &created.id, 1.0)
            .await
            .unwrap_err();
        assert!(matches!(err, ProcedureError::InvoiceNotEditable { .. }));

        let err = backend
            .update_invoice_info(&manager(), &created.id, InvoiceInfoPatch::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ProcedureError::InvoiceNotEditable { .. }));
    }

    #[tokio::test]
    async fn test_delete_restores_stock_once() {
        let backend = seeded_backend().await;
        let created = backend
            .create_invoice(&manager(), params(lines(&[(P1, 3)])))
            .await
            .unwrap();

        let err = backend
            .delete_invoice(&supervisor(), &created.id)
            .await
            .unwrap_err();
        assert!(matches!(err, ProcedureError::Forbidden { .. }));

        backend.delete_invoice(&manager(), &created.id).await.unwrap();
        assert_eq!(backend.get_product(P1).await.unwrap().current_stock, 10);
        assert!(matches!(
            backend.get_invoice(&created.id).await.unwrap_err(),
            ProcedureError::NotFound { .. }
        ));

        // deleting a voided invoice must not restore stock a second time
        let created = backend
            .create_invoice(&manager(), params(lines(&[(P1, 3)])))
            .await
            .unwrap();
        backend.void_invoice(&manager(), &created.id, None).await.unwrap();
        backend.delete_invoice(&manager(), &created.id).await.unwrap();
        assert_eq!(backend.get_product(P1).await.unwrap().current_stock, 10);
    }

    #[tokio::test]
    async fn test_update_info_never_touches_money() {
        let backend = seeded_backend().await;
        let created = backend
            .create_invoice(&manager(), params(lines(&[(P2, 1)])))
            .await
            .unwrap();
        let before = backend.get_invoice(&created.id).await.unwrap();

        backend
            .update_invoice_info(
                &supervisor(),
                &created.id,
                InvoiceInfoPatch {
                    customer_name: Some("  Aya  ".to_string()),
                    customer_phone: Some("".to_string()),
                    reference_number: None,
                    invoice_date: None,
                },
            )
            .await
            .unwrap();

        let after = backend.get_invoice(&created.id).await.unwrap();
        assert_eq!(after.customer_name.as_deref(), Some("Aya"));
        assert_eq!(after.customer_phone, None);
        assert_eq!(after.totals(), before.totals());
        assert_eq!(after.invoice_date, before.invoice_date);
    }

    #[tokio::test]
    async fn test_list_invoices_applies_visibility_window() {
        let backend = seeded_backend().await;
        let today = today_cairo();

        // one invoice today, one 3 days back, one 30 days back
        for days_back in [0u64, 3, 30] {
            backend
                .create_invoice(
                    &manager(),
                    CreateInvoiceParams {
                        invoice_date: Some(today - chrono::Days::new(days_back)),
                        items: lines(&[(P1, 1)]),
                        ..params(Vec::new())
                    },
                )
                .await
                .unwrap();
        }

        assert_eq!(backend.list_invoices(&manager()).await.unwrap().len(), 3);
        assert_eq!(backend.list_invoices(&supervisor()).await.unwrap().len(), 2);
        assert_eq!(backend.list_invoices(&sales()).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_invoice_numbers_are_sequential_per_backend() {
        let backend = seeded_backend().await;
        let a = backend
            .create_invoice(&manager(), params(lines(&[(P1, 1)])))
            .await
            .unwrap();
        let b = backend
            .create_invoice(&manager(), params(lines(&[(P1, 1)])))
            .await
            .unwrap();
        assert_eq!(a.invoice_number, "INV-000001");
        assert_eq!(b.invoice_number, "INV-000002");

        let other = seeded_backend().await;
        let c = other
            .create_invoice(&manager(), params(lines(&[(P1, 1)])))
            .await
            .unwrap();
        assert_eq!(c.invoice_number, "INV-000001");
    }

    #[tokio::test]
    async fn test_dashboard_and_sales_report() {
        let backend = seeded_backend().await;
        backend
            .create_invoice(
                &manager(),
                CreateInvoiceParams {
                    paid_amount: Some(10.0),
                    items: lines(&[(P1, 2)]), // total 30.00
                    ..params(Vec::new())
                },
            )
            .await
            .unwrap();
        backend
            .create_invoice(&manager(), params(lines(&[(P2, 1)]))) // total 40.00
            .await
            .unwrap();

        let metrics = backend.dashboard_metrics().await.unwrap();
        assert_eq!(metrics.invoices_today, 2);
        assert_eq!(metrics.revenue_today_cents, 7000);
        assert_eq!(metrics.invoices_month, 2);

        let report = backend.sales_report(everything()).await.unwrap();
        assert_eq!(report.len(), 1);
        assert_eq!(report[0].invoice_count, 2);
        assert_eq!(report[0].revenue_cents, 7000);
        assert_eq!(report[0].collected_cents, 1000 + 4000);
    }

    #[tokio::test]
    async fn test_void_excluded_from_reports() {
        let backend = seeded_backend().await;
        backend
            .create_invoice(&manager(), params(lines(&[(P1, 1)])))
            .await
            .unwrap();
        let voided = backend
            .create_invoice(&manager(), params(lines(&[(P2, 5)])))
            .await
            .unwrap();
        backend.void_invoice(&manager(), &voided.id, None).await.unwrap();

        let metrics = backend.dashboard_metrics().await.unwrap();
        assert_eq!(metrics.invoices_today, 1);
        assert_eq!(metrics.revenue_today_cents, 1500);

        let best = backend.best_selling_products(everything(), 10).await.unwrap();
        assert_eq!(best.len(), 1);
        assert_eq!(best[0].sku, "COKE-330");
    }

    #[tokio::test]
    async fn test_best_sellers_limit_coercion_and_order() {
        let backend = seeded_backend().await;
        backend
            .create_invoice(&manager(), params(lines(&[(P1, 5), (P2, 2)])))
            .await
            .unwrap();

        // a limit below 1 coerces to 10
        let rows = backend.best_selling_products(everything(), 0).await.unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].sku, "COKE-330");
        assert_eq!(rows[0].quantity_sold, 5);

        let rows = backend.best_selling_products(everything(), 1).await.unwrap();
        assert_eq!(rows.len(), 1);
    }

    #[tokio::test]
    async fn test_net_profit_summary() {
        let backend = seeded_backend().await;
        // P1: price 15.00, cost 7.50; P2: price 40.00, cost 20.00
        backend
            .create_invoice(&manager(), params(lines(&[(P1, 2), (P2, 1)])))
            .await
            .unwrap();

        let summary = backend.net_profit_summary(everything()).await.unwrap();
        assert_eq!(summary.costed_revenue_cents, 7000);
        assert_eq!(summary.total_cost_cents, 1500 + 2000);
        assert_eq!(summary.gross_profit_cents, 7000 - 3500);
    }

    #[tokio::test]
    async fn test_digital_products_move_no_stock() {
        let backend = seeded_backend().await;
        let mut digital = product(P2, "GIFT-CARD", 5000, 0);
        digital.is_digital = true;
        backend.upsert_product(digital).await;

        backend
            .create_invoice(&manager(), params(lines(&[(P2, 3)])))
            .await
            .unwrap();

        assert_eq!(backend.get_product(P2).await.unwrap().current_stock, 0);
        assert!(backend
            .stock_movements_report(everything())
            .await
            .unwrap()
            .is_empty());
    }
}
