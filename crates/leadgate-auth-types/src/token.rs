//! JWT claim types and validation.
//!
//! Access, refresh, and reset tokens are three distinct claim structs rather
//! than one claims type with a magic role string, so a reset token can never
//! be mistaken for a session token by a caller that forgets to check a marker.

use jsonwebtoken::{DecodingKey, Validation, decode};
use serde::Deserialize;
use serde::de::DeserializeOwned;
#[cfg(any(feature = "USE_ONLY_IN_AUTH_SERVICE", test))]
use serde::Serialize;
use uuid::Uuid;

/// Fixed purpose marker carried by every reset token.
pub const RESET_PURPOSE: &str = "password_reset";

/// Admin identity extracted from a validated access token.
#[derive(Debug, Clone)]
pub struct TokenInfo {
    pub admin_id: Uuid,
    pub email: String,
    pub role: String,
    pub permissions: Vec<String>,
    pub access_token_exp: u64,
}

/// Errors returned by token validation. Validation fails closed: any
/// signature mismatch, expiry, or structural problem maps to one of these —
/// it never panics and never returns partially-validated claims.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("invalid signature")]
    InvalidSignature,
    #[error("token expired")]
    Expired,
    #[error("malformed token")]
    Malformed,
    #[error("wrong token purpose")]
    WrongPurpose,
}

/// Claims payload of a short-lived (15 min) access token.
///
/// [`Deserialize`] is always available — all consumers validate tokens.
/// [`Serialize`] requires the **`USE_ONLY_IN_AUTH_SERVICE`** cargo feature;
/// only the auth service enables it because it is the sole token issuer.
#[derive(Debug, Deserialize)]
#[cfg_attr(any(feature = "USE_ONLY_IN_AUTH_SERVICE", test), derive(Serialize))]
pub struct AccessClaims {
    /// Admin ID (UUID string).
    pub sub: String,
    pub email: String,
    /// "admin" or "super_admin".
    pub role: String,
    pub permissions: Vec<String>,
    /// Expiration timestamp (seconds since UNIX epoch).
    pub exp: u64,
}

/// Claims payload of a long-lived (7 day) refresh token. Signed with a
/// secret separate from the access secret so a refresh-token compromise
/// cannot forge access tokens.
#[derive(Debug, Deserialize)]
#[cfg_attr(any(feature = "USE_ONLY_IN_AUTH_SERVICE", test), derive(Serialize))]
pub struct RefreshClaims {
    pub sub: String,
    pub email: String,
    /// Account token version at issue time. Refresh is rejected once the
    /// account's version moves on (password reset bumps it).
    pub ver: i32,
    pub exp: u64,
}

/// Claims payload of a single-purpose password-reset token.
///
/// `purpose` must equal [`RESET_PURPOSE`]; [`validate_reset_token`] enforces
/// this, so signature validity alone never authorizes a password change.
/// `ver` mirrors the account token version — the successful reset bumps the
/// version, which makes the token single-use.
#[derive(Debug, Deserialize)]
#[cfg_attr(any(feature = "USE_ONLY_IN_AUTH_SERVICE", test), derive(Serialize))]
pub struct ResetClaims {
    pub sub: String,
    pub email: String,
    pub purpose: String,
    pub ver: i32,
    pub exp: u64,
}

// ── Core decode (private) ────────────────────────────────────────────────

/// Decode and validate a JWT, returning raw claims.
///
/// Validation: HS256, exp checked, required claims: `exp` + `sub`.
/// Default leeway = 60s — tolerates clock skew between instances.
fn decode_jwt<C: DeserializeOwned>(token: &str, secret: &str) -> Result<C, AuthError> {
    let mut validation = Validation::new(jsonwebtoken::Algorithm::HS256);
    validation.validate_exp = true;
    validation.required_spec_claims.clear();
    validation.set_required_spec_claims(&["exp", "sub"]);

    let data = decode::<C>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::Expired,
        jsonwebtoken::errors::ErrorKind::InvalidSignature => AuthError::InvalidSignature,
        _ => AuthError::Malformed,
    })?;

    Ok(data.claims)
}

// ── Public: all consumers ────────────────────────────────────────────────

/// Validate an access-token cookie value, returning parsed identity.
///
/// This is the primary public API for token validation: the who-am-I
/// endpoint and any future admin-facing service call this on each request.
pub fn validate_access_token(cookie_value: &str, secret: &str) -> Result<TokenInfo, AuthError> {
    let claims: AccessClaims = decode_jwt(cookie_value, secret)?;
    let admin_id = claims
        .sub
        .parse::<Uuid>()
        .map_err(|_| AuthError::Malformed)?;
    Ok(TokenInfo {
        admin_id,
        email: claims.email,
        role: claims.role,
        permissions: claims.permissions,
        access_token_exp: claims.exp,
    })
}

// ── Feature-gated: auth service only ─────────────────────────────────────

/// Validate a refresh token against the refresh secret.
///
/// Requires the `USE_ONLY_IN_AUTH_SERVICE` feature — only the auth service's
/// refresh flow should ever look inside a refresh token.
#[cfg(any(feature = "USE_ONLY_IN_AUTH_SERVICE", test))]
pub fn validate_refresh_token(token: &str, secret: &str) -> Result<RefreshClaims, AuthError> {
    decode_jwt(token, secret)
}

/// Validate a reset token, including its purpose marker.
///
/// A structurally valid token whose `purpose` is not [`RESET_PURPOSE`]
/// (e.g. an access token smuggled into the reset endpoint) is rejected with
/// [`AuthError::WrongPurpose`].
#[cfg(any(feature = "USE_ONLY_IN_AUTH_SERVICE", test))]
pub fn validate_reset_token(token: &str, secret: &str) -> Result<ResetClaims, AuthError> {
    let claims: ResetClaims = decode_jwt(token, secret)?;
    if claims.purpose != RESET_PURPOSE {
        return Err(AuthError::WrongPurpose);
    }
    Ok(claims)
}
