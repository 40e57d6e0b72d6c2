use sea_orm::entity::prelude::*;

/// Admin account record. The password is stored only as a bcrypt hash.
/// Email is the immutable lookup key, stored lowercased; at most 4 rows may
/// exist system-wide (enforced by the registration usecase).
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "admins")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub password_hash: String,
    /// "admin" or "super_admin".
    pub role: String,
    /// JSON array of capability strings, derived from role at creation.
    pub permissions: Json,
    pub is_active: bool,
    pub is_email_verified: bool,
    /// Consecutive failed login attempts since the last success.
    pub login_attempts: i32,
    /// When set and in the future, the account is locked.
    pub lock_until: Option<chrono::DateTime<chrono::Utc>>,
    /// Set only on successful full (password + OTP) authentication.
    pub last_login: Option<chrono::DateTime<chrono::Utc>>,
    /// Bumped on password reset; embedded in refresh and reset tokens.
    pub token_version: i32,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
