use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Hard cap on admin accounts system-wide, enforced at registration.
pub const MAX_ADMIN_ACCOUNTS: u64 = 4;

/// OTP time-to-live in minutes.
pub const OTP_TTL_MINS: i64 = 10;

/// Maximum verification attempts per OTP record.
pub const OTP_MAX_ATTEMPTS: i32 = 3;

/// Failed logins before the account locks.
pub const MAX_LOGIN_ATTEMPTS: i32 = 5;

/// Lock duration once the attempt limit is reached.
pub const LOCK_DURATION_HOURS: i64 = 2;

/// Admin role; permissions are derived from it at account creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdminRole {
    Admin,
    SuperAdmin,
}

impl AdminRole {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "admin" => Some(Self::Admin),
            "super_admin" => Some(Self::SuperAdmin),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::SuperAdmin => "super_admin",
        }
    }

    /// Capability strings granted to a fresh account of this role.
    pub fn permissions(&self) -> Vec<String> {
        let base = ["view_dashboard", "manage_leads"];
        let extra = ["manage_admins", "manage_settings"];
        match self {
            Self::Admin => base.iter().map(|s| s.to_string()).collect(),
            Self::SuperAdmin => base
                .iter()
                .chain(extra.iter())
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

/// Admin account as the usecases see it. `password_hash` never leaves the
/// service; API-facing profile DTOs are built from the other fields.
#[derive(Debug, Clone)]
pub struct AdminAccount {
    pub id: Uuid,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub password_hash: String,
    pub role: AdminRole,
    pub permissions: Vec<String>,
    pub is_active: bool,
    pub is_email_verified: bool,
    pub login_attempts: i32,
    pub lock_until: Option<DateTime<Utc>>,
    pub last_login: Option<DateTime<Utc>>,
    pub token_version: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl AdminAccount {
    pub fn is_locked(&self) -> bool {
        self.lock_until.is_some_and(|until| until > Utc::now())
    }

    /// Whole minutes until the lock expires, rounded up so a caller never
    /// sees "0 minutes" on a still-locked account.
    pub fn lock_minutes_remaining(&self) -> i64 {
        self.lock_until
            .map(|until| {
                let secs = (until - Utc::now()).num_seconds().max(0);
                (secs + 59) / 60
            })
            .unwrap_or(0)
    }
}

/// What a one-time passcode authorizes once verified.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OtpPurpose {
    EmailVerification,
    LoginVerification,
    PasswordReset,
}

impl OtpPurpose {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "email_verification" => Some(Self::EmailVerification),
            "login_verification" => Some(Self::LoginVerification),
            "password_reset" => Some(Self::PasswordReset),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::EmailVerification => "email_verification",
            Self::LoginVerification => "login_verification",
            Self::PasswordReset => "password_reset",
        }
    }
}

/// One-time passcode record keyed by (email, purpose). Holds only the bcrypt
/// hash of the 6-digit code.
#[derive(Debug, Clone)]
pub struct OtpRecord {
    pub id: Uuid,
    pub email: String,
    pub purpose: OtpPurpose,
    pub otp_hash: String,
    pub attempts: i32,
    pub is_used: bool,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl OtpRecord {
    pub fn new(email: String, purpose: OtpPurpose, otp_hash: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            email,
            purpose,
            otp_hash,
            attempts: 0,
            is_used: false,
            expires_at: now + Duration::minutes(OTP_TTL_MINS),
            created_at: now,
        }
    }

    pub fn is_expired(&self) -> bool {
        self.expires_at <= Utc::now()
    }
}

/// Result of a successful OTP verification, tagged by purpose so the handler
/// dispatch is exhaustive at compile time instead of a raw string switch.
#[derive(Debug)]
pub enum OtpOutcome {
    EmailVerified {
        admin: AdminAccount,
    },
    LoggedIn {
        admin: AdminAccount,
        access_token: String,
        access_token_exp: u64,
        refresh_token: String,
    },
    PasswordResetAuthorized {
        reset_token: String,
    },
}

/// Outbound notification message handed to the [`Mailer`] port.
///
/// [`Mailer`]: crate::domain::repository::Mailer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MailMessage {
    pub to: String,
    pub subject: String,
    pub body: String,
}

impl MailMessage {
    /// The OTP delivery mail; the only place the plaintext code travels.
    pub fn otp(to: &str, purpose: OtpPurpose, code: &str) -> Self {
        let subject = match purpose {
            OtpPurpose::EmailVerification => "Verify your Leadgate admin account",
            OtpPurpose::LoginVerification => "Your Leadgate login code",
            OtpPurpose::PasswordReset => "Your Leadgate password reset code",
        };
        Self {
            to: to.to_owned(),
            subject: subject.to_owned(),
            body: format!("Your verification code is {code}. It expires in {OTP_TTL_MINS} minutes."),
        }
    }

    pub fn welcome(to: &str, first_name: &str) -> Self {
        Self {
            to: to.to_owned(),
            subject: "Welcome to the Leadgate admin dashboard".to_owned(),
            body: format!("Hi {first_name}, your admin account is now verified and active."),
        }
    }

    pub fn password_changed(to: &str) -> Self {
        Self {
            to: to.to_owned(),
            subject: "Your Leadgate admin password was changed".to_owned(),
            body: "Your password was just reset. If this wasn't you, contact support immediately."
                .to_owned(),
        }
    }
}

/// Limit + window pair for one rate-limit bucket.
#[derive(Debug, Clone, Copy)]
pub struct RatePolicy {
    pub limit: u32,
    pub window_secs: u64,
}

pub const REGISTER_IP_POLICY: RatePolicy = RatePolicy { limit: 3, window_secs: 3600 };
pub const LOGIN_IP_POLICY: RatePolicy = RatePolicy { limit: 5, window_secs: 900 };
pub const FORGOT_PASSWORD_IP_POLICY: RatePolicy = RatePolicy { limit: 3, window_secs: 3600 };
pub const FORGOT_PASSWORD_EMAIL_POLICY: RatePolicy = RatePolicy { limit: 3, window_secs: 3600 };
pub const RESET_PASSWORD_IP_POLICY: RatePolicy = RatePolicy { limit: 5, window_secs: 3600 };
pub const VERIFY_OTP_IP_POLICY: RatePolicy = RatePolicy { limit: 5, window_secs: 900 };

/// Outcome of a rate-limit check.
#[derive(Debug, Clone, Copy)]
pub struct RateDecision {
    pub allowed: bool,
    pub remaining: u32,
    /// Epoch milliseconds marking the end of the current window.
    pub reset_time_ms: u64,
}

impl RateDecision {
    /// Seconds until the window resets, for Retry-After style messaging.
    pub fn retry_after_secs(&self) -> u64 {
        let now_ms = Utc::now().timestamp_millis().max(0) as u64;
        self.reset_time_ms.saturating_sub(now_ms).div_ceil(1000)
    }
}
