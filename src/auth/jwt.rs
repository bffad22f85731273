//! Unverified JWT decoding.
//!
//! The backend issues standard three-part JWTs. This module only decodes
//! the payload segment to inspect claims (notably `exp`); it performs no
//! signature verification, so a successful decode says nothing about
//! authenticity. Callers use it purely for structural and expiry checks.

use base64::engine::general_purpose::URL_SAFE;
use base64::Engine;
use serde::Deserialize;
use thiserror::Error;

/// Number of dot-separated segments in a well-formed token
const TOKEN_SEGMENTS: usize = 3;

#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("token does not have {TOKEN_SEGMENTS} non-empty segments")]
    MalformedStructure,

    #[error("payload is not valid base64: {0}")]
    InvalidEncoding(#[from] base64::DecodeError),

    #[error("payload is not a valid claims object: {0}")]
    InvalidPayload(#[from] serde_json::Error),
}

/// Claims decoded from a token payload.
///
/// Only `exp` is interpreted by this crate; everything else is kept as-is
/// so call sites can inspect custom claims if they need to.
#[derive(Debug, Clone, Deserialize)]
pub struct Claims {
    /// Expiry as whole seconds since the Unix epoch
    pub exp: Option<i64>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Claims {
    /// Whether the token's own stated expiry has passed.
    /// A token with no `exp` claim never expires by this check.
    pub fn is_expired(&self, now_secs: i64) -> bool {
        matches!(self.exp, Some(exp) if exp < now_secs)
    }
}

/// Decode the payload segment of a `header.payload.signature` token.
///
/// The signature is not checked. Fails on anything other than exactly
/// three non-empty segments with a base64url JSON-object payload.
pub fn decode(token: &str) -> Result<Claims, DecodeError> {
    let parts: Vec<&str> = token.split('.').collect();
    if parts.len() != TOKEN_SEGMENTS || parts.iter().any(|p| p.is_empty()) {
        return Err(DecodeError::MalformedStructure);
    }

    let bytes = URL_SAFE.decode(repad(parts[1]))?;
    let claims: Claims = serde_json::from_slice(&bytes)?;
    Ok(claims)
}

/// Restore the `=` padding JWTs strip from base64url segments.
fn repad(segment: &str) -> String {
    match segment.len() % 4 {
        2 => format!("{}==", segment),
        3 => format!("{}=", segment),
        _ => segment.to_string(),
    }
}
