//! Identity resolution for inbound requests.
//!
//! Converts a request's bearer credential into a [`Principal`] owned by
//! that request. Verification failure degrades to anonymous; rejecting
//! anonymous access to protected resources is the policy engine's job,
//! not the resolver's.

use rowgate_core::{Principal, TokenCodec};

/// Request header carrying the signed token.
pub const AUTH_TOKEN_HEADER: &str = "auth-token";

/// Resolves the per-request principal from a bearer token header value.
pub struct IdentityResolver {
    codec: TokenCodec,
}

impl IdentityResolver {
    /// Create a resolver over the given codec.
    pub fn new(codec: TokenCodec) -> Self {
        Self { codec }
    }

    /// Resolve a header value into a principal.
    ///
    /// An absent or blank header binds the anonymous principal; this is
    /// not an error, it enables public routes. A failed verification logs
    /// the reason and also binds the anonymous principal so the request
    /// continues into downstream authorization. The returned principal is
    /// owned by the caller for the lifetime of the request; nothing is
    /// retained here.
    pub fn resolve(&self, header_value: Option<&str>) -> Principal {
        let raw = match header_value {
            Some(value) => value.trim(),
            None => return Principal::anonymous(),
        };
        if raw.is_empty() {
            return Principal::anonymous();
        }

        // Strip a bearer scheme prefix if the client sent one.
        let token = raw
            .strip_prefix("Bearer ")
            .or_else(|| raw.strip_prefix("bearer "))
            .unwrap_or(raw);

        match self.codec.verify(token) {
            Ok(claims) => Principal::from_claims(&claims),
            Err(e) => {
                tracing::warn!(error = %e, "token verification failed, continuing as anonymous");
                Principal::anonymous()
            }
        }
    }
}
