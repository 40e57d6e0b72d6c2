use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use uuid::Uuid;

/// Auth service domain error variants, mapped to the response envelope
/// `{success: false, kind, message, data?}`.
#[derive(Debug, thiserror::Error)]
pub enum AuthServiceError {
    #[error("{0}")]
    Validation(String),
    /// Every failing strength rule, not just the first.
    #[error("password does not meet strength requirements")]
    WeakPassword { errors: Vec<String> },
    /// Deliberately identical for unknown email and wrong password.
    #[error("invalid email or password")]
    InvalidCredentials { attempts_remaining: Option<i32> },
    #[error("account temporarily locked")]
    AccountLocked { minutes_remaining: i64 },
    #[error("account deactivated")]
    AccountInactive,
    #[error("email address not verified")]
    EmailUnverified { admin_id: Uuid },
    #[error("admin account limit reached")]
    AdminCapReached,
    #[error("email already registered")]
    DuplicateEmail,
    #[error("admin not found")]
    AdminNotFound,
    #[error("no pending verification code, request a new one")]
    OtpNotFound,
    #[error("verification code expired, request a new one")]
    OtpExpired,
    #[error("too many incorrect attempts, request a new code")]
    OtpAttemptsExhausted,
    #[error("incorrect verification code")]
    InvalidOtp { attempts_remaining: i32 },
    #[error("too many requests, try again later")]
    RateLimited { retry_after_secs: u64 },
    #[error("invalid or expired token")]
    InvalidToken,
    #[error("token not valid for password reset")]
    WrongTokenPurpose,
    #[error("failed to send notification email")]
    Delivery,
    #[error("internal error")]
    Internal(#[from] anyhow::Error),
}

impl AuthServiceError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Validation(_) => "VALIDATION",
            Self::WeakPassword { .. } => "WEAK_PASSWORD",
            Self::InvalidCredentials { .. } => "INVALID_CREDENTIALS",
            Self::AccountLocked { .. } => "ACCOUNT_LOCKED",
            Self::AccountInactive => "ACCOUNT_INACTIVE",
            Self::EmailUnverified { .. } => "EMAIL_UNVERIFIED",
            Self::AdminCapReached => "ADMIN_CAP_REACHED",
            Self::DuplicateEmail => "DUPLICATE_EMAIL",
            Self::AdminNotFound => "ADMIN_NOT_FOUND",
            Self::OtpNotFound => "OTP_NOT_FOUND",
            Self::OtpExpired => "OTP_EXPIRED",
            Self::OtpAttemptsExhausted => "OTP_ATTEMPTS_EXHAUSTED",
            Self::InvalidOtp { .. } => "INVALID_OTP",
            Self::RateLimited { .. } => "RATE_LIMITED",
            Self::InvalidToken => "INVALID_TOKEN",
            Self::WrongTokenPurpose => "WRONG_TOKEN_PURPOSE",
            Self::Delivery => "DELIVERY_FAILED",
            Self::Internal(_) => "INTERNAL",
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) | Self::WeakPassword { .. } | Self::InvalidOtp { .. } => {
                StatusCode::BAD_REQUEST
            }
            Self::InvalidCredentials { .. } | Self::InvalidToken => StatusCode::UNAUTHORIZED,
            Self::AccountInactive | Self::EmailUnverified { .. } | Self::AdminCapReached
            | Self::WrongTokenPurpose => StatusCode::FORBIDDEN,
            Self::AccountLocked { .. } => StatusCode::LOCKED,
            Self::DuplicateEmail => StatusCode::CONFLICT,
            Self::AdminNotFound | Self::OtpNotFound => StatusCode::NOT_FOUND,
            Self::OtpExpired => StatusCode::GONE,
            Self::OtpAttemptsExhausted | Self::RateLimited { .. } => {
                StatusCode::TOO_MANY_REQUESTS
            }
            Self::Delivery | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Structured extras surfaced under `data` in the error envelope.
    fn data(&self) -> Option<serde_json::Value> {
        match self {
            Self::WeakPassword { errors } => Some(serde_json::json!({ "errors": errors })),
            Self::InvalidCredentials {
                attempts_remaining: Some(n),
            } => Some(serde_json::json!({ "attempts_remaining": n })),
            Self::AccountLocked { minutes_remaining } => {
                Some(serde_json::json!({ "lock_minutes_remaining": minutes_remaining }))
            }
            Self::EmailUnverified { admin_id } => {
                Some(serde_json::json!({ "admin_id": admin_id }))
            }
            Self::InvalidOtp { attempts_remaining } => {
                Some(serde_json::json!({ "attempts_remaining": attempts_remaining }))
            }
            Self::RateLimited { retry_after_secs } => {
                Some(serde_json::json!({ "retry_after_secs": retry_after_secs }))
            }
            _ => None,
        }
    }
}

impl IntoResponse for AuthServiceError {
    fn into_response(self) -> Response {
        let status = self.status();
        // Log 500s only — tower-http TraceLayer already records method/uri/status for all
        // requests. 4xx are expected client errors; logging them here would be noise.
        // Internal errors need the anyhow chain logged so the root cause is traceable.
        if let Self::Internal(ref e) = self {
            tracing::error!(error = %e, kind = "INTERNAL", "internal error");
        }
        let mut body = serde_json::json!({
            "success": false,
            "kind": self.kind(),
            "message": self.to_string(),
        });
        if let Some(data) = self.data() {
            body["data"] = data;
        }
        (status, axum::Json(body)).into_response()
    }
}
