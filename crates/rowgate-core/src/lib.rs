//! Rowgate core - policy resolution and token identity.
//!
//! This crate provides the authentication and row-level authorization
//! decision core for the rowgate data-access layer:
//!
//! - A [`TokenCodec`] that signs identity claims into tamper-evident
//!   bearer tokens and verifies them back into typed [`Claims`].
//! - A [`Principal`] carrying the resolved identity of one request.
//! - Declarative [`AccessRule`]s resolved by a [`PolicySet`] snapshot into
//!   an [`AccessDecision`]: whether the operation may proceed and which
//!   column, if any, must be constrained to rows the caller owns.
//! - A sled-backed [`PolicyStore`] that persists rules and seeds the
//!   built-in defaults.
//!
//! # Example
//!
//! ```
//! use rowgate_core::{Action, PolicySet, Principal};
//!
//! let policies = PolicySet::defaults();
//! let caller = Principal::authenticated(42);
//!
//! let decision = policies.resolve(&caller, "users", Action::Read);
//! assert!(decision.allowed);
//! assert_eq!(decision.filter_column.as_deref(), Some("id"));
//! ```

pub mod engine;
pub mod error;
pub mod policy;
pub mod principal;
pub mod store;
pub mod token;

pub use engine::{AccessDecision, PolicySet};
pub use error::{AuthError, AuthResult};
pub use policy::{default_rules, AccessRule, Action, RuleExpr, WILDCARD_TABLE};
pub use principal::Principal;
pub use store::PolicyStore;
pub use token::{Claims, TokenCodec};
