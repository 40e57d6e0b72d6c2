#![allow(async_fn_in_trait)]

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::types::{AdminAccount, MailMessage, OtpPurpose, OtpRecord, RateDecision};
use crate::error::AuthServiceError;

/// Repository for admin accounts.
pub trait AdminRepository: Send + Sync {
    /// Lookup by lowercased email. Always returns the password hash — the
    /// API layer is responsible for never serializing it.
    async fn find_by_email(&self, email: &str) -> Result<Option<AdminAccount>, AuthServiceError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<AdminAccount>, AuthServiceError>;

    /// Insert `admin` unless the table already holds `cap` accounts, as one
    /// atomic step. Returns `false` when the cap is hit. Count-then-insert
    /// as two calls would let concurrent registrations both pass the count,
    /// so the adapter must make the pair indivisible.
    async fn create_if_under_cap(
        &self,
        admin: &AdminAccount,
        cap: u64,
    ) -> Result<bool, AuthServiceError>;

    /// Hard delete. Only used to roll back a registration whose verification
    /// mail could not be sent.
    async fn delete(&self, id: Uuid) -> Result<(), AuthServiceError>;

    /// Persist a failed login: new attempt count and, when the limit was
    /// reached, the lock expiry.
    async fn record_login_failure(
        &self,
        id: Uuid,
        attempts: i32,
        lock_until: Option<DateTime<Utc>>,
    ) -> Result<(), AuthServiceError>;

    /// Persist a successful password check: clears attempts and lock, sets
    /// `last_login`.
    async fn record_login_success(&self, id: Uuid, at: DateTime<Utc>) -> Result<(), AuthServiceError>;

    /// Flip `is_email_verified` and `is_active` to true.
    async fn mark_email_verified(&self, id: Uuid) -> Result<(), AuthServiceError>;

    /// Store a new password hash, clear attempts/lock, and set the new token
    /// version (bumped so outstanding refresh/reset tokens die).
    async fn update_password(
        &self,
        id: Uuid,
        password_hash: &str,
        token_version: i32,
    ) -> Result<(), AuthServiceError>;
}

/// Repository for one-time passcode records.
pub trait OtpRepository: Send + Sync {
    /// Delete unused records for (email, purpose). Called before every
    /// insert so at most one unused code exists per pair.
    async fn purge_unused(&self, email: &str, purpose: OtpPurpose) -> Result<(), AuthServiceError>;

    async fn create(&self, record: &OtpRecord) -> Result<(), AuthServiceError>;

    /// Most recent unused record for (email, purpose), expired or not — the
    /// usecase decides what expiry means (delete + 410).
    async fn find_latest_unused(
        &self,
        email: &str,
        purpose: OtpPurpose,
    ) -> Result<Option<OtpRecord>, AuthServiceError>;

    async fn set_attempts(&self, id: Uuid, attempts: i32) -> Result<(), AuthServiceError>;

    async fn mark_used(&self, id: Uuid) -> Result<(), AuthServiceError>;

    async fn delete(&self, id: Uuid) -> Result<(), AuthServiceError>;
}

/// Port for the notification sender. Delivery failures surface as
/// `AuthServiceError::Delivery` so each flow decides whether to roll back
/// or carry on.
pub trait Mailer: Send + Sync {
    async fn send(&self, message: &MailMessage) -> Result<(), AuthServiceError>;
}

/// Sliding-window counter keyed by arbitrary string identifiers
/// (`login_<ip>`, `forgot_password_email_<email>`, ...). Injected as a
/// capability so the backing store (process map, Redis) is swappable.
pub trait RateLimiter: Send + Sync {
    async fn check(
        &self,
        key: &str,
        limit: u32,
        window_secs: u64,
    ) -> Result<RateDecision, AuthServiceError>;
}
