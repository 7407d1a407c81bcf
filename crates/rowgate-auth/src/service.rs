//! Registration, login, logout, and bootstrap flows.
//!
//! The service owns the credential store, the rule store, and the token
//! codec, and exposes the JSON-shaped request/response types the outer
//! routing layer exchanges with clients.

use serde::{Deserialize, Serialize};

use rowgate_core::{PolicySet, PolicyStore, Principal, TokenCodec};

use crate::config::{AuthConfig, GENERATED_PASSWORD_LENGTH};
use crate::error::{Error, Result};
use crate::password::{generate_password, hash_password, verify_password};
use crate::resolver::IdentityResolver;
use crate::users::UserStore;

/// Login / registration request body: `{username, password}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credentials {
    /// Login identity.
    pub username: String,
    /// Plaintext password; hashed before it reaches any store.
    pub password: String,
}

/// Successful login response body: `{token}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    /// Signed bearer token.
    pub token: String,
}

/// Credentials of the bootstrap admin account.
///
/// Returned exactly once, on first creation; the generated password is
/// not recoverable afterwards.
#[derive(Debug, Clone, Serialize)]
pub struct AdminCredentials {
    pub username: String,
    pub password: String,
}

/// Structured error body: `{code, message}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// HTTP-style status code.
    pub code: u16,
    /// Human-readable message.
    pub message: String,
}

impl From<&Error> for ErrorResponse {
    fn from(err: &Error) -> Self {
        let code = match err {
            Error::CredentialConflict(_) => 409,
            Error::AuthenticationFailed => 401,
            _ => 500,
        };
        Self {
            code,
            message: err.to_string(),
        }
    }
}

/// Credential flows over the user and rule stores.
pub struct AuthService {
    users: UserStore,
    policies: PolicyStore,
    codec: TokenCodec,
    config: AuthConfig,
}

impl AuthService {
    /// Open the service over a sled database.
    pub fn open(db: &sled::Db, config: AuthConfig) -> Result<Self> {
        let users = UserStore::open(db)?;
        let policies = PolicyStore::open(db)?;
        let codec = TokenCodec::new(&config.secret);
        Ok(Self {
            users,
            policies,
            codec,
            config,
        })
    }

    /// Seed the default rules and the admin account.
    ///
    /// Idempotent: rules are only written into vacant slots and the admin
    /// account is only created when absent. The generated admin password
    /// is returned on first creation only.
    pub fn bootstrap(&self) -> Result<Option<AdminCredentials>> {
        let seeded = self.policies.seed_defaults()?;
        if seeded > 0 {
            tracing::info!(rules = seeded, "seeded default access rules");
        }

        if self
            .users
            .fetch_user(&self.config.admin_username)?
            .is_some()
        {
            return Ok(None);
        }

        let password = generate_password(GENERATED_PASSWORD_LENGTH);
        let hash = hash_password(&password)?;
        let record = self
            .users
            .create_user(&self.config.admin_username, &hash, true)?;
        tracing::info!(username = %record.username, "created bootstrap admin account");

        Ok(Some(AdminCredentials {
            username: record.username,
            password,
        }))
    }

    /// Register a new user, hashing the credential before persistence.
    pub fn register(&self, credentials: &Credentials) -> Result<()> {
        let hash = hash_password(&credentials.password)?;
        self.users.create_user(&credentials.username, &hash, false)?;
        Ok(())
    }

    /// Authenticate and mint a signed token.
    ///
    /// Unknown identities and credential mismatches are logged distinctly
    /// but collapse into one externally visible failure.
    pub fn login(&self, credentials: &Credentials) -> Result<TokenResponse> {
        let user = match self.users.fetch_user(&credentials.username)? {
            Some(user) => user,
            None => {
                tracing::debug!(username = %credentials.username, "login for unknown username");
                return Err(Error::AuthenticationFailed);
            }
        };

        if !verify_password(&user.password_hash, &credentials.password) {
            tracing::debug!(username = %credentials.username, "login password mismatch");
            return Err(Error::AuthenticationFailed);
        }

        let principal = Principal::new(user.id, user.is_admin);
        let token = self.codec.issue(&principal, self.config.token_ttl_secs)?;
        Ok(TokenResponse { token })
    }

    /// Log out.
    ///
    /// Tokens are not server-side revocable; the client discards its token
    /// and this is a no-op on the server.
    pub fn logout(&self) {}

    /// Build the identity resolver wired to this service's codec.
    pub fn resolver(&self) -> IdentityResolver {
        IdentityResolver::new(self.codec.clone())
    }

    /// Read the current rule snapshot for the resolution engine.
    pub fn policy_snapshot(&self) -> Result<PolicySet> {
        Ok(self.policies.snapshot()?)
    }

    /// Access the rule store (admin surface).
    pub fn policies(&self) -> &PolicyStore {
        &self.policies
    }

    /// Access the credential store.
    pub fn users(&self) -> &UserStore {
        &self.users
    }
}
