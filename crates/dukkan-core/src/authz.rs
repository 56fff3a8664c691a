//! # Role / Authorization Predicates
//!
//! Flat role-based access control for the console.
//!
//! ## Permission Matrix
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Action                      manager    supervisor    sales            │
//! │  ─────────────────────────   ───────    ──────────    ─────            │
//! │  manage products                ✓            ✗           ✗             │
//! │  manage users                   ✓            ✗           ✗             │
//! │  manager-only routes            ✓            ✗           ✗             │
//! │  create invoices                ✓            ✓           ✓             │
//! │  add discount                   ✓            ✓           ✗             │
//! │  edit invoice info              ✓            ✓           ✗             │
//! │  edit invoice payments          ✓            ✗           ✗             │
//! │  void invoices                  ✓            ✗           ✗             │
//! │  delete invoices                ✓            ✗           ✗             │
//! │                                                                         │
//! │  Invoice visibility window (see calendar module):                      │
//! │    manager    → unrestricted                                           │
//! │    supervisor → trailing 7 days                                        │
//! │    sales      → today only                                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. `Role` is a closed enum. Every predicate matches exhaustively — no
//!    default-false arm — so adding a role forces a decision at every gate.
//! 2. Predicates are total and stateless: they return `false` for a denied
//!    role, they never fail. The caller translates `false` into a forbidden
//!    response.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

// =============================================================================
// Role
// =============================================================================

/// Console user role.
///
/// The role set grew from two values to three; `Supervisor` sits between
/// `Manager` and `Sales` with invoice-editing but no financial-mutation
/// rights.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Manager,
    Supervisor,
    Sales,
}

impl Role {
    /// Wire name of the role, as persisted in profile rows.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Role::Manager => "manager",
            Role::Supervisor => "supervisor",
            Role::Sales => "sales",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = crate::error::ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "manager" => Ok(Role::Manager),
            "supervisor" => Ok(Role::Supervisor),
            "sales" => Ok(Role::Sales),
            other => Err(crate::error::ValidationError::InvalidFormat {
                field: "role".to_string(),
                reason: format!("unknown role '{other}'"),
            }),
        }
    }
}

// =============================================================================
// Predicates
// =============================================================================

/// Product catalog mutation (create/edit/deactivate products).
pub const fn can_manage_products(role: Role) -> bool {
    match role {
        Role::Manager => true,
        Role::Supervisor => false,
        Role::Sales => false,
    }
}

/// User administration (create users, change roles, reset passwords).
pub const fn can_manage_users(role: Role) -> bool {
    match role {
        Role::Manager => true,
        Role::Supervisor => false,
        Role::Sales => false,
    }
}

/// Access to manager-only console routes (users, settings).
pub const fn can_access_manager_routes(role: Role) -> bool {
    match role {
        Role::Manager => true,
        Role::Supervisor => false,
        Role::Sales => false,
    }
}

/// Invoice creation. All roles sell; supervisors were added to this gate in
/// a later revision.
pub const fn can_create_invoices(role: Role) -> bool {
    match role {
        Role::Manager => true,
        Role::Supervisor => true,
        Role::Sales => true,
    }
}

/// Applying a discount at invoice creation.
pub const fn can_add_discount(role: Role) -> bool {
    match role {
        Role::Manager => true,
        Role::Supervisor => true,
        Role::Sales => false,
    }
}

/// Editing non-money invoice fields (customer, reference, date).
pub const fn can_edit_invoice_info(role: Role) -> bool {
    match role {
        Role::Manager => true,
        Role::Supervisor => true,
        Role::Sales => false,
    }
}

/// Editing an invoice's paid amount. Financial mutation stays manager-only.
pub const fn can_edit_invoice_payments(role: Role) -> bool {
    match role {
        Role::Manager => true,
        Role::Supervisor => false,
        Role::Sales => false,
    }
}

/// Voiding an invoice (irreversible cancellation with stock restore).
pub const fn can_void_invoices(role: Role) -> bool {
    match role {
        Role::Manager => true,
        Role::Supervisor => false,
        Role::Sales => false,
    }
}

/// Deleting an invoice outright.
pub const fn can_delete_invoices(role: Role) -> bool {
    match role {
        Role::Manager => true,
        Role::Supervisor => false,
        Role::Sales => false,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_wire_names() {
        assert_eq!(serde_json::to_string(&Role::Manager).unwrap(), "\"manager\"");
        assert_eq!(
            serde_json::to_string(&Role::Supervisor).unwrap(),
            "\"supervisor\""
        );
        assert_eq!("sales".parse::<Role>().unwrap(), Role::Sales);
        assert!("cashier".parse::<Role>().is_err());
    }

    #[test]
    fn test_manager_only_gates() {
        for predicate in [
            can_manage_products,
            can_manage_users,
            can_access_manager_routes,
            can_edit_invoice_payments,
            can_void_invoices,
            can_delete_invoices,
        ] {
            assert!(predicate(Role::Manager));
            assert!(!predicate(Role::Supervisor));
            assert!(!predicate(Role::Sales));
        }
    }

    #[test]
    fn test_supervisor_gates() {
        assert!(can_edit_invoice_info(Role::Manager));
        assert!(can_edit_invoice_info(Role::Supervisor));
        assert!(!can_edit_invoice_info(Role::Sales));

        assert!(can_add_discount(Role::Supervisor));
        assert!(!can_add_discount(Role::Sales));
    }

    #[test]
    fn test_everyone_creates_invoices() {
        assert!(can_create_invoices(Role::Manager));
        assert!(can_create_invoices(Role::Supervisor));
        assert!(can_create_invoices(Role::Sales));
    }
}
