//! Rowgate auth - credential flows and identity resolution.
//!
//! Builds the collaborator surface a REST data layer needs around the
//! [`rowgate_core`] decision core: a sled-backed credential store, Argon2
//! password hashing, registration / login / logout flows, bootstrap
//! seeding of the admin account and default rules, and the per-request
//! identity resolver.
//!
//! # Example
//!
//! ```
//! use rowgate_auth::{AuthConfig, AuthService, Credentials};
//! use rowgate_core::Action;
//!
//! let db = sled::Config::new().temporary(true).open().unwrap();
//! let service = AuthService::open(&db, AuthConfig::new(b"shared-secret".to_vec())).unwrap();
//! service.bootstrap().unwrap();
//!
//! service
//!     .register(&Credentials {
//!         username: "alice".into(),
//!         password: "correct horse".into(),
//!     })
//!     .unwrap();
//!
//! let token = service
//!     .login(&Credentials {
//!         username: "alice".into(),
//!         password: "correct horse".into(),
//!     })
//!     .unwrap();
//!
//! let principal = service.resolver().resolve(Some(&token.token));
//! let policies = service.policy_snapshot().unwrap();
//! let decision = policies.resolve(&principal, "users", Action::Read);
//! assert!(decision.allowed);
//! assert_eq!(decision.filter_column.as_deref(), Some("id"));
//! ```

pub mod config;
pub mod error;
pub mod password;
pub mod resolver;
pub mod service;
pub mod users;

pub use config::{AuthConfig, DEFAULT_ADMIN_USERNAME, DEFAULT_TOKEN_TTL_SECS};
pub use error::{Error, Result};
pub use resolver::{IdentityResolver, AUTH_TOKEN_HEADER};
pub use service::{AdminCredentials, AuthService, Credentials, ErrorResponse, TokenResponse};
pub use users::{UserRecord, UserStore};
