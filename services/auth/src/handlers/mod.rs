pub mod login;
pub mod otp;
pub mod password;
pub mod register;
pub mod token;

use axum::extract::{ConnectInfo, FromRequestParts};
use chrono::{DateTime, Utc};
use http::StatusCode;
use http::request::Parts;
use serde::Serialize;
use std::net::SocketAddr;
use uuid::Uuid;

use crate::domain::repository::RateLimiter;
use crate::domain::types::{AdminAccount, RatePolicy};
use crate::error::AuthServiceError;

/// Response envelope shared by every endpoint: `{success, message?, data?}`.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            message: None,
            data: Some(data),
        }
    }

    pub fn ok_with_message(message: &str, data: T) -> Self {
        Self {
            success: true,
            message: Some(message.to_owned()),
            data: Some(data),
        }
    }
}

impl ApiResponse<()> {
    pub fn message_only(message: &str) -> Self {
        Self {
            success: true,
            message: Some(message.to_owned()),
            data: None,
        }
    }
}

/// Admin profile as returned by the API. Deliberately has no password field
/// of any kind — built from [`AdminAccount`] by copying the public fields.
#[derive(Debug, Serialize)]
pub struct AdminProfile {
    pub admin_id: Uuid,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub role: String,
    pub permissions: Vec<String>,
    pub is_email_verified: bool,
    #[serde(serialize_with = "leadgate_core::serde::opt_to_rfc3339_ms")]
    pub last_login: Option<DateTime<Utc>>,
}

impl From<&AdminAccount> for AdminProfile {
    fn from(admin: &AdminAccount) -> Self {
        Self {
            admin_id: admin.id,
            email: admin.email.clone(),
            first_name: admin.first_name.clone(),
            last_name: admin.last_name.clone(),
            role: admin.role.as_str().to_owned(),
            permissions: admin.permissions.clone(),
            is_email_verified: admin.is_email_verified,
            last_login: admin.last_login,
        }
    }
}

/// Client IP for rate-limit keys: first `X-Forwarded-For` entry when the
/// service sits behind the reverse proxy, else the socket peer address.
#[derive(Debug, Clone)]
pub struct ClientIp(pub String);

impl<S> FromRequestParts<S> for ClientIp
where
    S: Send + Sync,
{
    type Rejection = StatusCode;

    fn from_request_parts(
        parts: &mut Parts,
        _state: &S,
    ) -> impl std::future::Future<Output = Result<Self, Self::Rejection>> + Send {
        let forwarded = parts
            .headers
            .get("x-forwarded-for")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(',').next())
            .map(|v| v.trim().to_owned())
            .filter(|v| !v.is_empty());

        let peer = parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| addr.ip().to_string());

        async move {
            Ok(Self(
                forwarded.or(peer).unwrap_or_else(|| "unknown".to_owned()),
            ))
        }
    }
}

/// Check one rate-limit bucket, translating a denial into the 429 error.
pub(crate) async fn enforce_rate_limit<R: RateLimiter>(
    limiter: &R,
    key: String,
    policy: RatePolicy,
) -> Result<(), AuthServiceError> {
    let decision = limiter
        .check(&key, policy.limit, policy.window_secs)
        .await?;
    if !decision.allowed {
        tracing::debug!(%key, "rate limit exceeded");
        return Err(AuthServiceError::RateLimited {
            retry_after_secs: decision.retry_after_secs(),
        });
    }
    Ok(())
}
