//! # Money Engine
//!
//! Monetary values and the invoice totals derivation.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  In JavaScript/floating point:                                          │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌ WRONG!                           │
//! │                                                                         │
//! │  The console's business rule is "round to the nearest piastre at       │
//! │  every computation boundary". We make that structural: amounts are     │
//! │  integer cents internally, and the ONLY place a decimal number can     │
//! │  enter is `Money::from_value`, which performs the rounding.            │
//! │                                                                         │
//! │  Invariant: no amount is ever stored or returned with more than        │
//! │  2 decimal digits of precision.                                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## The Derivation
//! ```text
//! subtotal, discount?, paidAmount?
//!      │
//!      ▼
//! total = max(0, subtotal - discount)       discount never drives it negative
//!      │
//!      ▼
//! paid = paidAmount ?? total                omitted means fully paid
//!      │   (negative input clamps to 0; paid > total is a HARD ERROR)
//!      ▼
//! remaining = total - paid
//! status    = unpaid | partially_paid | paid
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};
use crate::types::PaymentStatus;
use crate::DEFAULT_CURRENCY;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in the smallest currency unit (piastres for EGP).
///
/// ## Design Decisions
/// - **i64 (signed)**: intermediate arithmetic (remaining amounts, report
///   deltas) can pass through negative values
/// - **Single field tuple struct**: zero-cost abstraction over i64
/// - **Transparent serde**: serializes as a plain integer cents value
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents (the smallest currency unit).
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Creates a Money value from a decimal amount, rounding to the nearest
    /// cent.
    ///
    /// This is the rounding boundary: `value * 100` is rounded
    /// half-away-from-zero (`f64::round` semantics, the same rule as
    /// `Math.round` for the amounts the console deals in), then stored as
    /// integer cents. Accepts any finite number.
    ///
    /// ## Example
    /// ```rust
    /// use dukkan_core::Money;
    ///
    /// assert_eq!(Money::from_value(10.994).cents(), 1099);
    /// assert_eq!(Money::from_value(10.995).cents(), 1100);
    /// assert_eq!(Money::from_value(-0.005).cents(), -1);
    /// ```
    #[inline]
    pub fn from_value(value: f64) -> Self {
        Money((value * 100.0).round() as i64)
    }

    /// Returns the value in cents (smallest currency unit).
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns the decimal amount (cents / 100), exact to 2 decimals.
    #[inline]
    pub fn to_value(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// Returns the major unit portion.
    #[inline]
    pub const fn major(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the minor unit portion (always 0-99).
    #[inline]
    pub const fn minor(&self) -> i64 {
        (self.0 % 100).abs()
    }

    /// Zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// Checks if the value is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checks if the value is negative (less than zero).
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Multiplies money by a quantity.
    ///
    /// ## Example
    /// ```rust
    /// use dukkan_core::Money;
    ///
    /// let unit_price = Money::from_cents(299);
    /// assert_eq!(unit_price.multiply_quantity(3).cents(), 897);
    /// ```
    #[inline]
    pub const fn multiply_quantity(&self, qty: i64) -> Self {
        Money(self.0 * qty)
    }
}

/// Display implementation shows money with the console's currency code.
///
/// ## Note
/// This is for error messages and debugging. The console formats amounts
/// for display with proper localization.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(
            f,
            "{}{} {}.{:02}",
            sign,
            DEFAULT_CURRENCY,
            self.major().abs(),
            self.minor()
        )
    }
}

/// Default money is zero.
impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0 + other.0)
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0 - other.0)
    }
}

impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        Money(self.0 * qty)
    }
}

// =============================================================================
// Payment Status Derivation
// =============================================================================

/// Derives the payment status from a paid amount and a total.
///
/// Boundary values belong to the stricter-satisfied category in listed
/// order: exactly 0 is `unpaid`, exactly the total is `paid`.
///
/// ## Example
/// ```rust
/// use dukkan_core::{derive_payment_status, Money, PaymentStatus};
///
/// let total = Money::from_cents(10000);
/// assert_eq!(derive_payment_status(Money::zero(), total), PaymentStatus::Unpaid);
/// assert_eq!(derive_payment_status(Money::from_cents(2500), total), PaymentStatus::PartiallyPaid);
/// assert_eq!(derive_payment_status(total, total), PaymentStatus::Paid);
/// ```
#[inline]
pub const fn derive_payment_status(paid_amount: Money, total: Money) -> PaymentStatus {
    if paid_amount.cents() <= 0 {
        PaymentStatus::Unpaid
    } else if paid_amount.cents() >= total.cents() {
        PaymentStatus::Paid
    } else {
        PaymentStatus::PartiallyPaid
    }
}

// =============================================================================
// Invoice Totals
// =============================================================================

/// Decimal inputs to the totals derivation, as they arrive from a request
/// payload.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct TotalsInput {
    /// Sum of line amounts (and any add-on charges), before discount.
    pub subtotal: f64,
    /// Flat discount amount. Omitted means no discount.
    pub discount: Option<f64>,
    /// Explicit paid amount. Omitted means the invoice is fully paid.
    pub paid_amount: Option<f64>,
}

/// The derived money tuple for one invoice.
///
/// Every field is already rounded; `remaining_amount == total - paid_amount`
/// exactly, and `payment_status` is a pure function of `(paid_amount, total)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceTotals {
    pub subtotal: Money,
    pub discount: Money,
    pub total: Money,
    pub paid_amount: Money,
    pub remaining_amount: Money,
    pub payment_status: PaymentStatus,
}

/// Derives the full totals tuple for an invoice.
///
/// ## Rules
/// - `total = max(0, subtotal - discount)` — a discount never drives the
///   total negative
/// - omitted `paid_amount` defaults to `total` (full payment assumed)
/// - a supplied `paid_amount` is clamped to `max(0, value)` then rounded
/// - a resolved paid amount above the total is a HARD ERROR, never clamped
///   down; callers must treat it as a rejected mutation
///
/// ## Example
/// ```rust
/// use dukkan_core::{calculate_totals, PaymentStatus, TotalsInput};
///
/// let totals = calculate_totals(TotalsInput {
///     subtotal: 100.0,
///     discount: Some(10.0),
///     paid_amount: None,
/// })
/// .unwrap();
///
/// assert_eq!(totals.total.cents(), 9000);
/// assert_eq!(totals.paid_amount.cents(), 9000);
/// assert_eq!(totals.remaining_amount.cents(), 0);
/// assert_eq!(totals.payment_status, PaymentStatus::Paid);
/// ```
pub fn calculate_totals(input: TotalsInput) -> CoreResult<InvoiceTotals> {
    let subtotal = Money::from_value(input.subtotal);
    let discount = Money::from_value(input.discount.unwrap_or(0.0));
    let total = (subtotal - discount).max(Money::zero());

    let paid_amount = match input.paid_amount {
        None => total,
        Some(value) => Money::from_value(value.max(0.0)),
    };

    if paid_amount > total {
        return Err(CoreError::PaidExceedsTotal {
            paid: paid_amount,
            total,
        });
    }

    let remaining_amount = total - paid_amount;
    let payment_status = derive_payment_status(paid_amount, total);

    Ok(InvoiceTotals {
        subtotal,
        discount,
        total,
        paid_amount,
        remaining_amount,
        payment_status,
    })
}

// =============================================================================
// Unit Tests
// =============================================================================
