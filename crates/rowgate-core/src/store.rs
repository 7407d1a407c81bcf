//! Persistent rule storage.
//!
//! Persists access rules using sled, one entry per (table, action). The
//! resolution engine never reads the store directly; it consumes immutable
//! [`PolicySet`] snapshots, so rule mutation and concurrent resolution
//! never share mutable state.

use crate::engine::PolicySet;
use crate::error::{AuthError, AuthResult};
use crate::policy::{default_rules, AccessRule, Action};

const RULE_TREE_NAME: &[u8] = b"auth:rules";
const RULE_PREFIX: &[u8] = b"rule:";

/// Rule store for persisting access policies.
pub struct PolicyStore {
    db: sled::Db,
    tree: sled::Tree,
}

impl PolicyStore {
    /// Open the rule store.
    pub fn open(db: &sled::Db) -> AuthResult<Self> {
        let tree = db.open_tree(RULE_TREE_NAME)?;
        Ok(Self {
            db: db.clone(),
            tree,
        })
    }

    /// Seed the built-in default rules, skipping any (table, action) slot
    /// that already holds a rule. Returns the number of rules written.
    pub fn seed_defaults(&self) -> AuthResult<usize> {
        let mut written = 0;
        for mut rule in default_rules() {
            let key = Self::rule_key(&rule.table_name, rule.action);
            if self.tree.get(&key)?.is_some() {
                continue;
            }
            rule.id = self.next_id()?;
            self.tree.insert(key, Self::serialize_rule(&rule)?)?;
            written += 1;
        }
        Ok(written)
    }

    /// Save a caller-defined rule, assigning an id when unset.
    ///
    /// Built-in rules cannot be overwritten.
    pub fn put_rule(&self, mut rule: AccessRule) -> AuthResult<AccessRule> {
        let key = Self::rule_key(&rule.table_name, rule.action);
        if let Some(existing) = self.tree.get(&key)? {
            let existing = Self::deserialize_rule(&existing)?;
            if existing.internal {
                return Err(AuthError::PermissionDenied(format!(
                    "built-in rule {}/{} cannot be modified",
                    rule.table_name, rule.action
                )));
            }
            if rule.id == 0 {
                rule.id = existing.id;
            }
        }
        if rule.id == 0 {
            rule.id = self.next_id()?;
        }
        self.tree.insert(key, Self::serialize_rule(&rule)?)?;
        Ok(rule)
    }

    /// Remove a rule, returning whether one was present.
    ///
    /// Built-in rules cannot be removed.
    pub fn remove_rule(&self, table: &str, action: Action) -> AuthResult<bool> {
        let key = Self::rule_key(table, action);
        match self.tree.get(&key)? {
            None => Ok(false),
            Some(value) => {
                let rule = Self::deserialize_rule(&value)?;
                if rule.internal {
                    return Err(AuthError::PermissionDenied(format!(
                        "built-in rule {}/{} cannot be removed",
                        table, action
                    )));
                }
                self.tree.remove(key)?;
                Ok(true)
            }
        }
    }

    /// Get the rule stored for exactly (table, action); no fallback.
    pub fn get_rule(&self, table: &str, action: Action) -> AuthResult<Option<AccessRule>> {
        match self.tree.get(Self::rule_key(table, action))? {
            Some(value) => Ok(Some(Self::deserialize_rule(&value)?)),
            None => Ok(None),
        }
    }

    /// List all stored rules.
    pub fn list_rules(&self) -> AuthResult<Vec<AccessRule>> {
        let mut rules = Vec::new();
        for result in self.tree.scan_prefix(RULE_PREFIX) {
            let (_, value) = result?;
            rules.push(Self::deserialize_rule(&value)?);
        }
        Ok(rules)
    }

    /// Read an immutable snapshot for the resolution engine.
    pub fn snapshot(&self) -> AuthResult<PolicySet> {
        Ok(PolicySet::from_rules(self.list_rules()?))
    }

    fn next_id(&self) -> AuthResult<u64> {
        // sled ids start at 0; rule ids stay non-zero so "unassigned"
        // remains representable.
        Ok(self.db.generate_id()? + 1)
    }

    fn rule_key(table: &str, action: Action) -> Vec<u8> {
        let mut key = RULE_PREFIX.to_vec();
        key.extend_from_slice(table.as_bytes());
        key.push(b':');
        key.extend_from_slice(action.as_str().as_bytes());
        key
    }

    fn serialize_rule(rule: &AccessRule) -> AuthResult<Vec<u8>> {
        serde_json::to_vec(rule).map_err(|e| AuthError::Serialization(e.to_string()))
    }

    fn deserialize_rule(bytes: &[u8]) -> AuthResult<AccessRule> {
        serde_json::from_slice(bytes).map_err(|e| AuthError::Serialization(e.to_string()))
    }
}
