use chrono::Utc;
use uuid::Uuid;

use crate::domain::credential::{
    check_password_strength, generate_otp, hash_otp, hash_password, is_valid_email, sanitize_input,
};
use crate::domain::repository::{AdminRepository, Mailer, OtpRepository};
use crate::domain::types::{
    AdminAccount, AdminRole, MAX_ADMIN_ACCOUNTS, MailMessage, OtpPurpose, OtpRecord,
};
use crate::error::AuthServiceError;

pub struct RegisterInput {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
    pub role: String,
}

#[derive(Debug)]
pub struct RegisterOutput {
    pub admin: AdminAccount,
}

pub struct RegisterUseCase<A, O, M>
where
    A: AdminRepository,
    O: OtpRepository,
    M: Mailer,
{
    pub admins: A,
    pub otps: O,
    pub mailer: M,
}

impl<A, O, M> RegisterUseCase<A, O, M>
where
    A: AdminRepository,
    O: OtpRepository,
    M: Mailer,
{
    pub async fn execute(&self, input: RegisterInput) -> Result<RegisterOutput, AuthServiceError> {
        // 1. Presence + sanitization
        let first_name = sanitize_input(&input.first_name);
        let last_name = sanitize_input(&input.last_name);
        let email = sanitize_input(&input.email).to_lowercase();
        if first_name.is_empty()
            || last_name.is_empty()
            || email.is_empty()
            || input.password.is_empty()
            || input.role.is_empty()
        {
            return Err(AuthServiceError::Validation(
                "first name, last name, email, password and role are required".to_owned(),
            ));
        }

        // 2. Shape checks
        if !is_valid_email(&email) {
            return Err(AuthServiceError::Validation(
                "invalid email address".to_owned(),
            ));
        }
        let strength = check_password_strength(&input.password);
        if !strength.is_valid {
            return Err(AuthServiceError::WeakPassword {
                errors: strength.errors,
            });
        }
        // Role checked before any account is created.
        let role = AdminRole::parse(&input.role).ok_or_else(|| {
            AuthServiceError::Validation("role must be admin or super_admin".to_owned())
        })?;

        // 3. Duplicate email gets its own error; the unique index on email
        // backstops concurrent same-address registrations.
        if self.admins.find_by_email(&email).await?.is_some() {
            return Err(AuthServiceError::DuplicateEmail);
        }

        // 4. Create the account: active but unverified until the OTP step.
        let now = Utc::now();
        let admin = AdminAccount {
            id: Uuid::new_v4(),
            email: email.clone(),
            first_name,
            last_name,
            password_hash: hash_password(&input.password)?,
            role,
            permissions: role.permissions(),
            is_active: true,
            is_email_verified: false,
            login_attempts: 0,
            lock_until: None,
            last_login: None,
            token_version: 0,
            created_at: now,
            updated_at: now,
        };
        // Count and insert happen as one atomic step in the repository, so
        // two registrations racing at the boundary admit exactly one.
        if !self
            .admins
            .create_if_under_cap(&admin, MAX_ADMIN_ACCOUNTS)
            .await?
        {
            return Err(AuthServiceError::AdminCapReached);
        }

        // 5. Issue the verification code. If anything past this point fails,
        // the just-created account is rolled back so the email can retry.
        let code = generate_otp();
        let record = OtpRecord::new(
            email.clone(),
            OtpPurpose::EmailVerification,
            hash_otp(&code)?,
        );
        self.otps
            .purge_unused(&email, OtpPurpose::EmailVerification)
            .await?;
        if let Err(e) = self.otps.create(&record).await {
            self.admins.delete(admin.id).await?;
            return Err(e);
        }

        // 6. Deliver. Send failure rolls back both writes.
        let mail = MailMessage::otp(&email, OtpPurpose::EmailVerification, &code);
        if let Err(e) = self.mailer.send(&mail).await {
            self.otps.delete(record.id).await?;
            self.admins.delete(admin.id).await?;
            return Err(e);
        }

        tracing::info!(admin_id = %admin.id, "admin registered, verification code sent");
        Ok(RegisterOutput { admin })
    }
}
