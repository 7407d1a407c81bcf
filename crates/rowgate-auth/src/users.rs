//! Credential records.
//!
//! Persists user records using sled, keyed by username. The store only
//! ever sees hashed credentials.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

const USER_TREE_NAME: &[u8] = b"auth:users";

/// A stored credential record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    /// Identifier; never `0`, which is reserved for anonymous callers.
    pub id: i64,
    /// Unique login identity.
    pub username: String,
    /// Argon2 PHC hash of the password.
    pub password_hash: String,
    /// Grants admin-gated rules.
    pub is_admin: bool,
}

/// Credential store.
pub struct UserStore {
    db: sled::Db,
    tree: sled::Tree,
}

impl UserStore {
    /// Open the credential store.
    pub fn open(db: &sled::Db) -> Result<Self> {
        let tree = db.open_tree(USER_TREE_NAME)?;
        Ok(Self {
            db: db.clone(),
            tree,
        })
    }

    /// Create a user. Fails with [`Error::CredentialConflict`] when the
    /// username is already registered.
    pub fn create_user(
        &self,
        username: &str,
        password_hash: &str,
        is_admin: bool,
    ) -> Result<UserRecord> {
        let record = UserRecord {
            id: self.next_id()?,
            username: username.to_string(),
            password_hash: password_hash.to_string(),
            is_admin,
        };
        let value = serde_json::to_vec(&record).map_err(|e| Error::Serialization(e.to_string()))?;

        // Atomic insert-if-vacant so concurrent registrations of the same
        // username cannot both succeed.
        match self
            .tree
            .compare_and_swap(username.as_bytes(), None as Option<&[u8]>, Some(value))?
        {
            Ok(()) => Ok(record),
            Err(_) => Err(Error::CredentialConflict(username.to_string())),
        }
    }

    /// Fetch a user by username.
    pub fn fetch_user(&self, username: &str) -> Result<Option<UserRecord>> {
        match self.tree.get(username.as_bytes())? {
            Some(value) => {
                let record = serde_json::from_slice(&value)
                    .map_err(|e| Error::Serialization(e.to_string()))?;
                Ok(Some(record))
            }
            None => Ok(None),
        }
    }

    /// Number of registered users.
    pub fn user_count(&self) -> usize {
        self.tree.len()
    }

    fn next_id(&self) -> Result<i64> {
        // sled ids start at 0; the offset keeps id 0 reserved for
        // anonymous callers.
        Ok((self.db.generate_id()? + 1) as i64)
    }
}
