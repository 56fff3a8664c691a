//! # Stock Threshold Resolver
//!
//! Resolves the effective low-stock threshold for a product and classifies
//! its stock level.
//!
//! The managed database computes the same rule server-side when it produces
//! low-stock rows; this module is the client-side mirror, so a product the
//! server flags is always the product the console flags.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

// =============================================================================
// Stock Level
// =============================================================================

/// Inputs to the threshold resolution for one product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct StockLevel {
    /// Current stock on hand. Can be negative (oversold).
    pub stock: i64,
    /// Per-product override; `None` falls back to the global threshold.
    pub product_threshold: Option<i64>,
    /// Console-wide default threshold.
    pub global_threshold: i64,
}

/// Returns the effective low-stock threshold: the product override when
/// present, otherwise the global default. Total; never fails.
///
/// ## Example
/// ```rust
/// use dukkan_core::{resolve_low_stock_threshold, StockLevel};
///
/// let level = StockLevel { stock: 10, product_threshold: Some(2), global_threshold: 3 };
/// assert_eq!(resolve_low_stock_threshold(&level), 2);
/// ```
#[inline]
pub const fn resolve_low_stock_threshold(level: &StockLevel) -> i64 {
    match level.product_threshold {
        Some(threshold) => threshold,
        None => level.global_threshold,
    }
}

/// Classifies a stock level as low.
///
/// The comparison is inclusive: a product exactly at its threshold counts
/// as low stock, and negative stock (oversold) always counts as low stock
/// regardless of the threshold value.
///
/// ## Example
/// ```rust
/// use dukkan_core::{is_low_stock, StockLevel};
///
/// let at_threshold = StockLevel { stock: 3, product_threshold: None, global_threshold: 3 };
/// assert!(is_low_stock(&at_threshold));
/// ```
#[inline]
pub const fn is_low_stock(level: &StockLevel) -> bool {
    level.stock <= resolve_low_stock_threshold(level)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uses_product_threshold_when_provided() {
        let level = StockLevel {
            stock: 0,
            product_threshold: Some(2),
            global_threshold: 3,
        };
        assert_eq!(resolve_low_stock_threshold(&level), 2);
    }

    #[test]
    fn test_falls_back_to_global_threshold() {
        let level = StockLevel {
            stock: 0,
            product_threshold: None,
            global_threshold: 3,
        };
        assert_eq!(resolve_low_stock_threshold(&level), 3);
    }

    #[test]
    fn test_flags_stock_equal_to_threshold() {
        let level = StockLevel {
            stock: 3,
            product_threshold: None,
            global_threshold: 3,
        };
        assert!(is_low_stock(&level));
    }

    #[test]
    fn test_flags_negative_stock() {
        let level = StockLevel {
            stock: -1,
            product_threshold: None,
            global_threshold: 3,
        };
        assert!(is_low_stock(&level));
    }

    #[test]
    fn test_does_not_flag_above_threshold() {
        let level = StockLevel {
            stock: 10,
            product_threshold: Some(3),
            global_threshold: 5,
        };
        assert!(!is_low_stock(&level));
    }

    #[test]
    fn test_zero_threshold_flags_only_at_or_below_zero() {
        let empty = StockLevel {
            stock: 0,
            product_threshold: Some(0),
            global_threshold: 5,
        };
        assert!(is_low_stock(&empty));

        let one_left = StockLevel {
            stock: 1,
            product_threshold: Some(0),
            global_threshold: 5,
        };
        assert!(!is_low_stock(&one_left));
    }
}
