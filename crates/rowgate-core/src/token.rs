//! Signed bearer token issue and verification.
//!
//! Tokens are compact three-part structures (header, payload, signature)
//! signed with HMAC-SHA256 over a shared secret. The payload carries the
//! typed [`Claims`] binding a caller's identity and privilege flags to an
//! expiration.
//!
//! # Claims
//!
//! - `user_id`: caller identifier (required)
//! - `is_admin`: privilege flag (optional, defaults to false)
//! - `exp`: expiration as Unix timestamp in seconds (required)

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{AuthError, AuthResult};
use crate::principal::Principal;

/// The only signing algorithm the codec accepts.
const EXPECTED_ALGORITHM: Algorithm = Algorithm::HS256;

/// Decoded bearer token payload.
///
/// Validated once at decode time: a missing or mistyped `user_id` or `exp`
/// is rejected as a malformed token instead of surfacing later as a type
/// error. A missing `is_admin` claim defaults to false, never true.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Caller identifier.
    #[serde(deserialize_with = "deserialize_user_id")]
    pub user_id: i64,
    /// Privilege flag; absent means not admin.
    #[serde(default)]
    pub is_admin: bool,
    /// Expiration, seconds since the Unix epoch.
    pub exp: u64,
}

/// Accept `user_id` as either an integer or an integral float.
///
/// Generic JSON encoders on the issuing side may widen numeric claims to
/// floating point; integral values convert back without loss across the
/// positive 63-bit identifier range.
fn deserialize_user_id<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    struct UserIdVisitor;

    impl<'de> serde::de::Visitor<'de> for UserIdVisitor {
        type Value = i64;

        fn expecting(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.write_str("an integer user id")
        }

        fn visit_i64<E: serde::de::Error>(self, v: i64) -> Result<i64, E> {
            Ok(v)
        }

        fn visit_u64<E: serde::de::Error>(self, v: u64) -> Result<i64, E> {
            i64::try_from(v).map_err(|_| E::custom("user_id out of range"))
        }

        fn visit_f64<E: serde::de::Error>(self, v: f64) -> Result<i64, E> {
            if v.fract() == 0.0 && v >= 0.0 && v < i64::MAX as f64 {
                Ok(v as i64)
            } else {
                Err(E::custom("user_id is not an integral value"))
            }
        }
    }

    deserializer.deserialize_any(UserIdVisitor)
}

/// Signs identity claims into opaque bearer tokens and verifies them back
/// into [`Claims`].
///
/// Stateless: issue and verify are pure functions of the shared secret and
/// the current time, safe to call concurrently from any number of
/// request-handling threads.
#[derive(Clone)]
pub struct TokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl TokenCodec {
    /// Create a codec over a shared HMAC secret.
    pub fn new(secret: &[u8]) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
        }
    }

    /// Create a codec over an HMAC secret string.
    pub fn from_secret_str(secret: &str) -> Self {
        Self::new(secret.as_bytes())
    }

    /// Issue a signed token binding the principal's identity to an
    /// expiration `ttl_secs` from now.
    ///
    /// A negative ttl produces an already expired token.
    pub fn issue(&self, principal: &Principal, ttl_secs: i64) -> AuthResult<String> {
        let claims = Claims {
            user_id: principal.id,
            is_admin: principal.is_admin,
            exp: current_timestamp().saturating_add_signed(ttl_secs),
        };
        encode(&Header::new(EXPECTED_ALGORITHM), &claims, &self.encoding_key)
            .map_err(|e| AuthError::MalformedToken(e.to_string()))
    }

    /// Verify a token and return its claims.
    ///
    /// Fails with [`AuthError::UnsupportedAlgorithm`] when the token
    /// declares anything other than HS256, [`AuthError::SignatureMismatch`]
    /// when the MAC disagrees, [`AuthError::Expired`] when `exp` is in the
    /// past (no leeway), and [`AuthError::MalformedToken`] for structural
    /// or claims decoding failures.
    pub fn verify(&self, token: &str) -> AuthResult<Claims> {
        check_algorithm(token)?;

        let mut validation = Validation::new(EXPECTED_ALGORITHM);
        validation.leeway = 0;
        validation.validate_exp = true;

        match decode::<Claims>(token, &self.decoding_key, &validation) {
            Ok(data) => Ok(data.claims),
            Err(e) => Err(match e.kind() {
                ErrorKind::InvalidSignature => AuthError::SignatureMismatch,
                ErrorKind::ExpiredSignature => AuthError::Expired,
                ErrorKind::InvalidAlgorithm | ErrorKind::InvalidAlgorithmName => {
                    AuthError::UnsupportedAlgorithm(e.to_string())
                }
                _ => AuthError::MalformedToken(e.to_string()),
            }),
        }
    }
}

/// Reject tokens declaring any algorithm other than the expected MAC.
///
/// Runs on the raw header segment before signature verification so that a
/// token claiming `none` or an asymmetric algorithm the verifier would
/// trust improperly is refused outright.
fn check_algorithm(token: &str) -> AuthResult<()> {
    let header_segment = token
        .split('.')
        .next()
        .filter(|s| !s.is_empty())
        .ok_or_else(|| AuthError::MalformedToken("missing header segment".to_string()))?;
    let header_bytes = URL_SAFE_NO_PAD
        .decode(header_segment)
        .map_err(|e| AuthError::MalformedToken(format!("header decode error: {}", e)))?;
    let header: serde_json::Value = serde_json::from_slice(&header_bytes)
        .map_err(|e| AuthError::MalformedToken(format!("header parse error: {}", e)))?;

    match header.get("alg").and_then(|v| v.as_str()) {
        Some("HS256") => Ok(()),
        Some(other) => Err(AuthError::UnsupportedAlgorithm(other.to_string())),
        None => Err(AuthError::MalformedToken(
            "header missing alg field".to_string(),
        )),
    }
}

/// Current time in seconds since the Unix epoch.
pub(crate) fn current_timestamp() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system time before Unix epoch")
        .as_secs()
}
