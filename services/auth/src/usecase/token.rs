use jsonwebtoken::{EncodingKey, Header, encode};
use std::time::{SystemTime, UNIX_EPOCH};

use leadgate_auth_types::cookie::{ACCESS_TOKEN_EXP, REFRESH_TOKEN_EXP};
use leadgate_auth_types::token::{
    AccessClaims, RESET_PURPOSE, ResetClaims, RefreshClaims, validate_refresh_token,
};

use crate::domain::repository::AdminRepository;
use crate::domain::types::AdminAccount;
use crate::error::AuthServiceError;

fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system clock before UNIX epoch")
        .as_secs()
}

fn sign<C: serde::Serialize>(claims: &C, secret: &str) -> Result<String, AuthServiceError> {
    encode(
        &Header::default(),
        claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AuthServiceError::Internal(e.into()))
}

/// Mint a 15-minute access token carrying the account's current role and
/// permissions. Returns the token and its expiry timestamp.
pub fn issue_access_token(
    admin: &AdminAccount,
    secret: &str,
) -> Result<(String, u64), AuthServiceError> {
    let exp = now_secs() + ACCESS_TOKEN_EXP;
    let claims = AccessClaims {
        sub: admin.id.to_string(),
        email: admin.email.clone(),
        role: admin.role.as_str().to_owned(),
        permissions: admin.permissions.clone(),
        exp,
    };
    Ok((sign(&claims, secret)?, exp))
}

/// Mint a 7-day refresh token. Signed with the refresh secret, carries the
/// account's token version so it dies when the version is bumped.
pub fn issue_refresh_token(admin: &AdminAccount, secret: &str) -> Result<String, AuthServiceError> {
    let claims = RefreshClaims {
        sub: admin.id.to_string(),
        email: admin.email.clone(),
        ver: admin.token_version,
        exp: now_secs() + REFRESH_TOKEN_EXP,
    };
    sign(&claims, secret)
}

/// Mint a short-lived password-reset token. Same 15-minute TTL as access
/// tokens, same signing secret, but a distinct claim type with the fixed
/// purpose marker — nothing but the reset endpoint honors it.
pub fn issue_reset_token(admin: &AdminAccount, secret: &str) -> Result<String, AuthServiceError> {
    let claims = ResetClaims {
        sub: admin.id.to_string(),
        email: admin.email.clone(),
        purpose: RESET_PURPOSE.to_owned(),
        ver: admin.token_version,
        exp: now_secs() + ACCESS_TOKEN_EXP,
    };
    sign(&claims, secret)
}

// ── RefreshToken ─────────────────────────────────────────────────────────────

#[derive(Debug)]
pub struct RefreshTokenOutput {
    pub admin: AdminAccount,
    pub access_token: String,
    pub access_token_exp: u64,
}

pub struct RefreshTokenUseCase<A: AdminRepository> {
    pub admins: A,
    pub access_secret: String,
    pub refresh_secret: String,
}

impl<A: AdminRepository> RefreshTokenUseCase<A> {
    pub async fn execute(
        &self,
        refresh_token_value: &str,
    ) -> Result<RefreshTokenOutput, AuthServiceError> {
        let claims = validate_refresh_token(refresh_token_value, &self.refresh_secret)
            .map_err(|_| AuthServiceError::InvalidToken)?;

        let admin_id = claims
            .sub
            .parse::<uuid::Uuid>()
            .map_err(|_| AuthServiceError::InvalidToken)?;

        let admin = self
            .admins
            .find_by_id(admin_id)
            .await?
            .ok_or(AuthServiceError::AdminNotFound)?;

        // A password reset bumps the version; older refresh tokens are dead.
        if claims.ver != admin.token_version {
            return Err(AuthServiceError::InvalidToken);
        }
        if !admin.is_active {
            return Err(AuthServiceError::AccountInactive);
        }

        // Fresh claims from the account's *current* role and permissions,
        // not the stale ones baked into the refresh token.
        let (access_token, access_token_exp) = issue_access_token(&admin, &self.access_secret)?;

        Ok(RefreshTokenOutput {
            admin,
            access_token,
            access_token_exp,
        })
    }
}
