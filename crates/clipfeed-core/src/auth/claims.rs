//! Access token claim decoding.
//!
//! Access tokens carry a base64url-encoded JSON claim set in their middle
//! segment. Only the `exp` claim is interpreted here; everything else in
//! the token is opaque to the client.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::Utc;
use serde::Deserialize;
use thiserror::Error;

/// Decoded claim set from an access token.
#[derive(Debug, Clone, Deserialize)]
pub struct Claims {
    /// Expiry (unix timestamp, seconds).
    pub exp: i64,
    /// Subject, when present.
    #[serde(default)]
    pub sub: Option<String>,
    /// Issued at (unix timestamp, seconds), when present.
    #[serde(default)]
    pub iat: Option<i64>,
}

#[derive(Debug, Error)]
pub enum ClaimsError {
    #[error("token has no claims segment")]
    MissingSegment,

    #[error("claims segment is not valid base64url: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("claims segment is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Decode the claim set embedded in an access token.
///
/// # Errors
///
/// Returns `ClaimsError` if the token has no middle segment, the segment is
/// not base64url, or the decoded bytes are not a JSON claim set with `exp`.
pub fn decode(token: &str) -> Result<Claims, ClaimsError> {
    let payload = token.split('.').nth(1).ok_or(ClaimsError::MissingSegment)?;
    let bytes = URL_SAFE_NO_PAD.decode(payload)?;
    Ok(serde_json::from_slice(&bytes)?)
}

/// Check whether an access token is expired.
///
/// Fails closed: any decode error is treated as expired. The comparison is
/// `exp < now` in whole seconds with no leeway window, so a token expiring
/// near the boundary may trigger a spurious refresh.
pub fn is_expired(token: &str) -> bool {
    match decode(token) {
        Ok(claims) => claims.exp < Utc::now().timestamp(),
        Err(_) => true,
    }
}
