use anyhow::Context as _;
use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, DatabaseConnection, DbErr, EntityTrait,
    IsolationLevel, PaginatorTrait, QueryFilter, QueryOrder, TransactionTrait,
};
use uuid::Uuid;

use leadgate_auth_schema::{admins, otp_records};

use crate::domain::repository::{AdminRepository, OtpRepository};
use crate::domain::types::{AdminAccount, AdminRole, OtpPurpose, OtpRecord};
use crate::error::AuthServiceError;

// ── Admin repository ──────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbAdminRepository {
    pub db: DatabaseConnection,
}

impl AdminRepository for DbAdminRepository {
    async fn find_by_email(&self, email: &str) -> Result<Option<AdminAccount>, AuthServiceError> {
        let model = admins::Entity::find()
            .filter(admins::Column::Email.eq(email))
            .one(&self.db)
            .await
            .context("find admin by email")?;
        model.map(admin_from_model).transpose()
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<AdminAccount>, AuthServiceError> {
        let model = admins::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .context("find admin by id")?;
        model.map(admin_from_model).transpose()
    }

    async fn create_if_under_cap(
        &self,
        admin: &AdminAccount,
        cap: u64,
    ) -> Result<bool, AuthServiceError> {
        let model = admin_active_model(admin);
        // Serializable so two concurrent registrations cannot both read a
        // count below the cap and both insert.
        let created = self
            .db
            .transaction_with_config::<_, bool, DbErr>(
                move |txn| {
                    Box::pin(async move {
                        let count = admins::Entity::find().count(txn).await?;
                        if count >= cap {
                            return Ok(false);
                        }
                        model.insert(txn).await?;
                        Ok(true)
                    })
                },
                Some(IsolationLevel::Serializable),
                None,
            )
            .await
            .context("create admin under cap")?;
        Ok(created)
    }

    async fn delete(&self, id: Uuid) -> Result<(), AuthServiceError> {
        admins::Entity::delete_by_id(id)
            .exec(&self.db)
            .await
            .context("delete admin")?;
        Ok(())
    }

    async fn record_login_failure(
        &self,
        id: Uuid,
        attempts: i32,
        lock_until: Option<DateTime<Utc>>,
    ) -> Result<(), AuthServiceError> {
        admins::ActiveModel {
            id: Set(id),
            login_attempts: Set(attempts),
            lock_until: Set(lock_until),
            updated_at: Set(Utc::now()),
            ..Default::default()
        }
        .update(&self.db)
        .await
        .context("record login failure")?;
        Ok(())
    }

    async fn record_login_success(
        &self,
        id: Uuid,
        at: DateTime<Utc>,
    ) -> Result<(), AuthServiceError> {
        admins::ActiveModel {
            id: Set(id),
            login_attempts: Set(0),
            lock_until: Set(None),
            last_login: Set(Some(at)),
            updated_at: Set(at),
            ..Default::default()
        }
        .update(&self.db)
        .await
        .context("record login success")?;
        Ok(())
    }

    async fn mark_email_verified(&self, id: Uuid) -> Result<(), AuthServiceError> {
        admins::ActiveModel {
            id: Set(id),
            is_email_verified: Set(true),
            is_active: Set(true),
            updated_at: Set(Utc::now()),
            ..Default::default()
        }
        .update(&self.db)
        .await
        .context("mark email verified")?;
        Ok(())
    }

    async fn update_password(
        &self,
        id: Uuid,
        password_hash: &str,
        token_version: i32,
    ) -> Result<(), AuthServiceError> {
        admins::ActiveModel {
            id: Set(id),
            password_hash: Set(password_hash.to_owned()),
            login_attempts: Set(0),
            lock_until: Set(None),
            token_version: Set(token_version),
            updated_at: Set(Utc::now()),
            ..Default::default()
        }
        .update(&self.db)
        .await
        .context("update password")?;
        Ok(())
    }
}

fn admin_active_model(admin: &AdminAccount) -> admins::ActiveModel {
    admins::ActiveModel {
        id: Set(admin.id),
        email: Set(admin.email.clone()),
        first_name: Set(admin.first_name.clone()),
        last_name: Set(admin.last_name.clone()),
        password_hash: Set(admin.password_hash.clone()),
        role: Set(admin.role.as_str().to_owned()),
        permissions: Set(serde_json::json!(admin.permissions)),
        is_active: Set(admin.is_active),
        is_email_verified: Set(admin.is_email_verified),
        login_attempts: Set(admin.login_attempts),
        lock_until: Set(admin.lock_until),
        last_login: Set(admin.last_login),
        token_version: Set(admin.token_version),
        created_at: Set(admin.created_at),
        updated_at: Set(admin.updated_at),
    }
}

fn admin_from_model(model: admins::Model) -> Result<AdminAccount, AuthServiceError> {
    let role = AdminRole::parse(&model.role)
        .ok_or_else(|| anyhow::anyhow!("unknown role in admins row: {}", model.role))?;
    let permissions: Vec<String> = serde_json::from_value(model.permissions)
        .context("permissions column is not a string array")?;
    Ok(AdminAccount {
        id: model.id,
        email: model.email,
        first_name: model.first_name,
        last_name: model.last_name,
        password_hash: model.password_hash,
        role,
        permissions,
        is_active: model.is_active,
        is_email_verified: model.is_email_verified,
        login_attempts: model.login_attempts,
        lock_until: model.lock_until,
        last_login: model.last_login,
        token_version: model.token_version,
        created_at: model.created_at,
        updated_at: model.updated_at,
    })
}

// ── OTP repository ────────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbOtpRepository {
    pub db: DatabaseConnection,
}

impl OtpRepository for DbOtpRepository {
    async fn purge_unused(&self, email: &str, purpose: OtpPurpose) -> Result<(), AuthServiceError> {
        otp_records::Entity::delete_many()
            .filter(otp_records::Column::Email.eq(email))
            .filter(otp_records::Column::Purpose.eq(purpose.as_str()))
            .filter(otp_records::Column::IsUsed.eq(false))
            .exec(&self.db)
            .await
            .context("purge unused otp records")?;
        Ok(())
    }

    async fn create(&self, record: &OtpRecord) -> Result<(), AuthServiceError> {
        otp_records::ActiveModel {
            id: Set(record.id),
            email: Set(record.email.clone()),
            purpose: Set(record.purpose.as_str().to_owned()),
            otp_hash: Set(record.otp_hash.clone()),
            attempts: Set(record.attempts),
            is_used: Set(record.is_used),
            expires_at: Set(record.expires_at),
            created_at: Set(record.created_at),
        }
        .insert(&self.db)
        .await
        .context("create otp record")?;
        Ok(())
    }

    async fn find_latest_unused(
        &self,
        email: &str,
        purpose: OtpPurpose,
    ) -> Result<Option<OtpRecord>, AuthServiceError> {
        let model = otp_records::Entity::find()
            .filter(otp_records::Column::Email.eq(email))
            .filter(otp_records::Column::Purpose.eq(purpose.as_str()))
            .filter(otp_records::Column::IsUsed.eq(false))
            .order_by_desc(otp_records::Column::CreatedAt)
            .one(&self.db)
            .await
            .context("find latest unused otp")?;
        model.map(otp_from_model).transpose()
    }

    async fn set_attempts(&self, id: Uuid, attempts: i32) -> Result<(), AuthServiceError> {
        otp_records::ActiveModel {
            id: Set(id),
            attempts: Set(attempts),
            ..Default::default()
        }
        .update(&self.db)
        .await
        .context("set otp attempts")?;
        Ok(())
    }

    async fn mark_used(&self, id: Uuid) -> Result<(), AuthServiceError> {
        otp_records::ActiveModel {
            id: Set(id),
            is_used: Set(true),
            ..Default::default()
        }
        .update(&self.db)
        .await
        .context("mark otp used")?;
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<(), AuthServiceError> {
        // Passive garbage collection rides along here: a delete triggered by
        // expiry or attempt exhaustion also clears any other stale rows.
        otp_records::Entity::delete_by_id(id)
            .exec(&self.db)
            .await
            .context("delete otp record")?;
        let now = Utc::now();
        otp_records::Entity::delete_many()
            .filter(otp_records::Column::ExpiresAt.lt(now))
            .exec(&self.db)
            .await
            .context("gc expired otp records")?;
        Ok(())
    }
}

fn otp_from_model(model: otp_records::Model) -> Result<OtpRecord, AuthServiceError> {
    let purpose = OtpPurpose::parse(&model.purpose)
        .ok_or_else(|| anyhow::anyhow!("unknown purpose in otp_records row: {}", model.purpose))?;
    Ok(OtpRecord {
        id: model.id,
        email: model.email,
        purpose,
        otp_hash: model.otp_hash,
        attempts: model.attempts,
        is_used: model.is_used,
        expires_at: model.expires_at,
        created_at: model.created_at,
    })
}
