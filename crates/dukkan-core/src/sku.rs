//! # SKU Generation
//!
//! Generates a SKU for products created without one: an uppercase prefix
//! derived from the product name plus a short random suffix.
//!
//! ```text
//! "Coca-Cola 330ml"  →  "COCA-COL-7F3A1"
//! "طماطم"            →  "PRD-C09E4"       (no ASCII material in the name)
//! ```

use uuid::Uuid;

use crate::validation::validate_sku;

/// Length of the name-derived prefix.
const PREFIX_LEN: usize = 8;

/// Length of the random suffix.
const SUFFIX_LEN: usize = 5;

/// Generates a SKU from a product name.
///
/// The prefix is the uppercased name with runs of non-alphanumerics
/// collapsed to a single hyphen, trimmed and truncated to 8 characters;
/// names with no usable characters fall back to `PRD`. The suffix is 5 hex
/// characters of fresh v4 UUID entropy, so two products with the same name
/// still get distinct SKUs.
///
/// The output always satisfies [`validate_sku`].
pub fn generate_sku(name: &str) -> String {
    let mut prefix = String::with_capacity(PREFIX_LEN);
    for c in name.to_uppercase().chars() {
        if prefix.len() >= PREFIX_LEN {
            break;
        }
        if c.is_ascii_alphanumeric() {
            prefix.push(c);
        } else if !prefix.is_empty() && !prefix.ends_with('-') {
            prefix.push('-');
        }
    }
    let prefix = prefix.trim_end_matches('-');

    let entropy = Uuid::new_v4().simple().to_string();
    let suffix: String = entropy
        .chars()
        .take(SUFFIX_LEN)
        .map(|c| c.to_ascii_uppercase())
        .collect();

    if prefix.is_empty() {
        format!("PRD-{suffix}")
    } else {
        format!("{prefix}-{suffix}")
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
