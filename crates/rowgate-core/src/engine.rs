//! Policy resolution.
//!
//! Resolution walks a two-level fallback (table, then action within the
//! chosen table's rule set) over an immutable snapshot of the stored rules
//! and evaluates the matched expression against the caller's principal.

use std::collections::HashMap;

use crate::policy::{AccessRule, Action, RuleExpr, WILDCARD_TABLE};
use crate::principal::Principal;

/// Outcome of resolving a principal against a table and action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessDecision {
    /// Whether the operation may proceed.
    pub allowed: bool,
    /// Column that must additionally be constrained to the principal's id,
    /// as an equality filter applied by the caller.
    ///
    /// `None` means no row filter. `Some("")` comes from a rule whose
    /// expression names no column (`"=auth_user.id"`) and is deliberately
    /// kept distinct from `None`.
    pub filter_column: Option<String>,
}

impl AccessDecision {
    /// Unconditional allow with no row filter.
    pub fn allow() -> Self {
        Self {
            allowed: true,
            filter_column: None,
        }
    }

    /// Deny.
    pub fn deny() -> Self {
        Self {
            allowed: false,
            filter_column: None,
        }
    }

    /// Allow constrained to rows owned by the principal.
    pub fn allow_filtered(column: impl Into<String>) -> Self {
        Self {
            allowed: true,
            filter_column: Some(column.into()),
        }
    }

    /// Whether the caller must apply an ownership filter.
    pub fn is_row_filtered(&self) -> bool {
        self.filter_column.is_some()
    }
}

/// Immutable snapshot of the rule set consumed by resolution.
///
/// Built once, from [`crate::policy::default_rules`] or a store read, then
/// shared freely across request-handling threads; resolution never blocks
/// or mutates. Rule changes become visible by taking a fresh snapshot, not
/// by mutating one in place.
#[derive(Debug, Clone, Default)]
pub struct PolicySet {
    tables: HashMap<String, HashMap<Action, AccessRule>>,
}

impl PolicySet {
    /// Create an empty snapshot (every lookup default-allows).
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a snapshot from a rule iterator. The last rule wins for a
    /// duplicated (table, action) pair.
    pub fn from_rules(rules: impl IntoIterator<Item = AccessRule>) -> Self {
        let mut set = Self::new();
        for rule in rules {
            set.insert(rule);
        }
        set
    }

    /// Snapshot containing only the built-in default rules.
    pub fn defaults() -> Self {
        Self::from_rules(crate::policy::default_rules())
    }

    /// Insert a rule, replacing any existing rule for its (table, action).
    pub fn insert(&mut self, rule: AccessRule) {
        self.tables
            .entry(rule.table_name.clone())
            .or_default()
            .insert(rule.action, rule);
    }

    /// Number of rules in the snapshot.
    pub fn len(&self) -> usize {
        self.tables.values().map(|actions| actions.len()).sum()
    }

    /// Whether the snapshot holds no rules.
    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    /// Find the rule governing (table, action).
    ///
    /// A table without any rule set falls back to the [`WILDCARD_TABLE`]
    /// set; within the chosen set a missing action falls back to
    /// [`Action::All`]. The chosen table set never falls back further to
    /// the wildcard table's rules.
    pub fn rule_for(&self, table: &str, action: Action) -> Option<&AccessRule> {
        let actions = self
            .tables
            .get(table)
            .or_else(|| self.tables.get(WILDCARD_TABLE))?;
        actions.get(&action).or_else(|| actions.get(&Action::All))
    }

    /// Decide whether `principal` may perform `action` on `table`.
    ///
    /// Absence of any governing rule after both fallbacks default-allows
    /// with no filter; deployments are expected to seed explicit rules for
    /// anything sensitive. A rule with an unparseable expression denies
    /// and logs a diagnostic, never failing the caller.
    pub fn resolve(&self, principal: &Principal, table: &str, action: Action) -> AccessDecision {
        let Some(rule) = self.rule_for(table, action) else {
            return AccessDecision::allow();
        };

        match rule.expr() {
            Ok(RuleExpr::AllowAll) => AccessDecision::allow(),
            Ok(RuleExpr::AdminOnly) => {
                if principal.is_admin {
                    AccessDecision::allow()
                } else {
                    AccessDecision::deny()
                }
            }
            Ok(RuleExpr::OwnerColumn(column)) => {
                if column.is_empty() {
                    tracing::warn!(
                        table = %rule.table_name,
                        action = %rule.action,
                        "ownership rule names no filter column"
                    );
                }
                AccessDecision::allow_filtered(column)
            }
            Err(e) => {
                tracing::warn!(
                    table = %rule.table_name,
                    action = %rule.action,
                    error = %e,
                    "invalid policy expression, denying access"
                );
                AccessDecision::deny()
            }
        }
    }
}
