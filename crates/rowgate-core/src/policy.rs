//! Access rule data model.
//!
//! A rule is one declarative access-control statement keyed by
//! (table, action). The distinguished table name [`WILDCARD_TABLE`] and
//! the action [`Action::All`] act as wildcards during resolution fallback.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{AuthError, AuthResult};

/// Table name that matches any table not otherwise covered.
pub const WILDCARD_TABLE: &str = "all";

/// Suffix marking an ownership expression.
const OWNER_SUFFIX: &str = "=auth_user.id";

/// Expression granting access to admin principals only.
const ADMIN_EXPR: &str = "auth_user.is_admin";

/// Actions a rule can govern. Closed set; `All` matches any action not
/// otherwise covered for the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    /// Read rows.
    Read,
    /// Insert rows.
    Create,
    /// Update rows.
    Update,
    /// Delete rows.
    Delete,
    /// Read constrained to the caller's own rows.
    ReadMine,
    /// Matches any action not otherwise covered.
    All,
}

impl Action {
    /// Wire name of the action.
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Read => "read",
            Action::Create => "create",
            Action::Update => "update",
            Action::Delete => "delete",
            Action::ReadMine => "read_mine",
            Action::All => "all",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Action {
    type Err = AuthError;

    fn from_str(s: &str) -> AuthResult<Self> {
        match s {
            "read" => Ok(Action::Read),
            "create" => Ok(Action::Create),
            "update" => Ok(Action::Update),
            "delete" => Ok(Action::Delete),
            "read_mine" => Ok(Action::ReadMine),
            "all" => Ok(Action::All),
            other => Err(AuthError::UnknownAction(other.to_string())),
        }
    }
}

/// Parsed form of a rule expression.
///
/// The grammar has exactly three forms; anything else fails to parse and
/// the engine denies access for the rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleExpr {
    /// Empty expression: unconditional allow, no row filter.
    AllowAll,
    /// `auth_user.is_admin`: allowed iff the principal is an admin.
    AdminOnly,
    /// `<column>=auth_user.id`: allowed, rows constrained to those whose
    /// column equals the principal's id. The column name is kept verbatim;
    /// an empty name is preserved so misconfigured rules stay visible to
    /// the caller instead of silently widening access.
    OwnerColumn(String),
}

impl RuleExpr {
    /// Parse an expression, stripping all whitespace first.
    pub fn parse(raw: &str) -> AuthResult<Self> {
        let expr: String = raw.chars().filter(|c| !c.is_whitespace()).collect();
        if expr.is_empty() {
            Ok(RuleExpr::AllowAll)
        } else if expr == ADMIN_EXPR {
            Ok(RuleExpr::AdminOnly)
        } else if let Some(column) = expr.strip_suffix(OWNER_SUFFIX) {
            Ok(RuleExpr::OwnerColumn(column.to_string()))
        } else {
            Err(AuthError::InvalidPolicyExpression(raw.to_string()))
        }
    }
}

/// One access-control statement against a table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessRule {
    /// Store-assigned identifier; `0` until persisted.
    #[serde(default)]
    pub id: u64,
    /// Target table, or [`WILDCARD_TABLE`].
    pub table_name: String,
    /// Action this rule governs.
    pub action: Action,
    /// Expression in the restricted grammar (see [`RuleExpr`]).
    pub expression: String,
    /// Human-readable description.
    #[serde(default)]
    pub description: String,
    /// Built-in rules cannot be edited or deleted by callers.
    #[serde(default)]
    pub internal: bool,
}

impl AccessRule {
    /// Create a rule for the given table and action.
    pub fn new(
        table_name: impl Into<String>,
        action: Action,
        expression: impl Into<String>,
    ) -> Self {
        Self {
            id: 0,
            table_name: table_name.into(),
            action,
            expression: expression.into(),
            description: String::new(),
            internal: false,
        }
    }

    /// Set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Mark the rule as a protected built-in.
    pub fn with_internal(mut self) -> Self {
        self.internal = true;
        self
    }

    /// Parse this rule's expression.
    pub fn expr(&self) -> AuthResult<RuleExpr> {
        RuleExpr::parse(&self.expression)
    }
}

/// The built-in rule set seeded at bootstrap.
///
/// Covers the credential and policy tables explicitly and installs a
/// catch-all ownership rule for every other table.
pub fn default_rules() -> Vec<AccessRule> {
    vec![
        AccessRule::new("users", Action::All, "id = auth_user.id")
            .with_description("users are limited to their own records")
            .with_internal(),
        AccessRule::new("policies", Action::All, "auth_user.is_admin")
            .with_description("policy management is limited to admin users")
            .with_internal(),
        AccessRule::new(WILDCARD_TABLE, Action::All, "user_id = auth_user.id")
            .with_description("tables default to rows owned by the current user")
            .with_internal(),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_round_trip() {
        for action in [
            Action::Read,
            Action::Create,
            Action::Update,
            Action::Delete,
            Action::ReadMine,
            Action::All,
        ] {
            assert_eq!(action.as_str().parse::<Action>().unwrap(), action);
        }

        assert!(matches!(
            "drop".parse::<Action>(),
            Err(AuthError::UnknownAction(_))
        ));
    }

    #[test]
    fn test_expr_allow_all() {
        assert_eq!(RuleExpr::parse("").unwrap(), RuleExpr::AllowAll);
        assert_eq!(RuleExpr::parse("   ").unwrap(), RuleExpr::AllowAll);
    }

    #[test]
    fn test_expr_admin_only() {
        assert_eq!(
            RuleExpr::parse("auth_user.is_admin").unwrap(),
            RuleExpr::AdminOnly
        );
        assert_eq!(
            RuleExpr::parse(" auth_user.is_admin ").unwrap(),
            RuleExpr::AdminOnly
        );
    }

    #[test]
    fn test_expr_owner_column() {
        assert_eq!(
            RuleExpr::parse("id=auth_user.id").unwrap(),
            RuleExpr::OwnerColumn("id".to_string())
        );
        // Whitespace is stripped before matching.
        assert_eq!(
            RuleExpr::parse("author_id = auth_user.id").unwrap(),
            RuleExpr::OwnerColumn("author_id".to_string())
        );
    }

    #[test]
    fn test_expr_empty_owner_column() {
        // A bare suffix is grammatical; the empty column name is kept.
        assert_eq!(
            RuleExpr::parse("=auth_user.id").unwrap(),
            RuleExpr::OwnerColumn(String::new())
        );
    }

    #[test]
    fn test_expr_invalid() {
        for raw in [
            "id > auth_user.id",
            "auth_user.is_admin || true",
            "id=auth_user.name",
            "auth_user.id",
        ] {
            assert!(matches!(
                RuleExpr::parse(raw),
                Err(AuthError::InvalidPolicyExpression(_))
            ));
        }
    }

    #[test]
    fn test_rule_builder() {
        let rule = AccessRule::new("todos", Action::Read, "author_id = auth_user.id")
            .with_description("todos are private")
            .with_internal();

        assert_eq!(rule.table_name, "todos");
        assert_eq!(rule.action, Action::Read);
        assert!(rule.internal);
        assert_eq!(rule.id, 0);
        assert_eq!(
            rule.expr().unwrap(),
            RuleExpr::OwnerColumn("author_id".to_string())
        );
    }

    #[test]
    fn test_rule_serde_round_trip() {
        let rule = AccessRule::new("notes", Action::ReadMine, "owner=auth_user.id");
        let json = serde_json::to_string(&rule).unwrap();
        assert!(json.contains("\"read_mine\""));

        let back: AccessRule = serde_json::from_str(&json).unwrap();
        assert_eq!(back, rule);
    }

    #[test]
    fn test_default_rules_are_internal() {
        let rules = default_rules();
        assert_eq!(rules.len(), 3);
        assert!(rules.iter().all(|r| r.internal));
        assert!(rules.iter().all(|r| r.expr().is_ok()));
    }
}
