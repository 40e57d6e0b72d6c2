use sea_orm::entity::prelude::*;

/// One-time passcode record, keyed by (email, purpose).
/// Expires 10 minutes after creation; at most 3 verification attempts.
/// A partial unique index on (email, purpose) WHERE is_used = false
/// backstops the one-unused-code-per-pair invariant against races.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "otp_records")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub email: String,
    /// "email_verification", "login_verification", or "password_reset".
    pub purpose: String,
    /// bcrypt hash of the 6-digit code. The plaintext is never stored.
    pub otp_hash: String,
    pub attempts: i32,
    pub is_used: bool,
    pub expires_at: chrono::DateTime<chrono::Utc>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
