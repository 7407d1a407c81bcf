//! Caller identity.
//!
//! A principal is resolved once per inbound request and passed explicitly
//! through the request-handling call chain; it is never stored in shared
//! state and never outlives the request.

use serde::{Deserialize, Serialize};

use crate::token::Claims;

/// The resolved identity and privilege of the caller for one request.
///
/// Id `0` is reserved for anonymous/unauthenticated callers. Anonymous
/// principals never satisfy admin-gated rules, and ownership filters
/// resolved for them constrain to rows owned by id `0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    /// Caller identifier; `0` means anonymous.
    pub id: i64,
    /// Grants unconditional access to admin-gated rules.
    pub is_admin: bool,
}

impl Principal {
    /// Create a principal with the given identity and privilege.
    pub fn new(id: i64, is_admin: bool) -> Self {
        Self { id, is_admin }
    }

    /// Create an authenticated, non-admin principal.
    pub fn authenticated(id: i64) -> Self {
        Self::new(id, false)
    }

    /// Create an admin principal.
    pub fn admin(id: i64) -> Self {
        Self::new(id, true)
    }

    /// The anonymous principal (`id = 0`).
    pub fn anonymous() -> Self {
        Self::new(0, false)
    }

    /// Build a principal from verified token claims.
    pub fn from_claims(claims: &Claims) -> Self {
        Self::new(claims.user_id, claims.is_admin)
    }

    /// Whether this is the anonymous principal.
    pub fn is_anonymous(&self) -> bool {
        self.id == 0
    }

    /// Whether the caller presented a verified identity.
    pub fn is_authenticated(&self) -> bool {
        self.id != 0
    }
}
