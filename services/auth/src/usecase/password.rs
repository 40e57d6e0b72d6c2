use uuid::Uuid;

use leadgate_auth_types::token::validate_reset_token;

use crate::domain::credential::{
    check_password_strength, generate_otp, hash_otp, hash_password, is_valid_email,
    sanitize_input, verify_password,
};
use crate::domain::repository::{AdminRepository, Mailer, OtpRepository, RateLimiter};
use crate::domain::types::{FORGOT_PASSWORD_EMAIL_POLICY, MailMessage, OtpPurpose, OtpRecord};
use crate::error::AuthServiceError;

// ── ForgotPassword ───────────────────────────────────────────────────────────

pub struct ForgotPasswordInput {
    pub email: String,
}

pub struct ForgotPasswordUseCase<A, O, M, R>
where
    A: AdminRepository,
    O: OtpRepository,
    M: Mailer,
    R: RateLimiter,
{
    pub admins: A,
    pub otps: O,
    pub mailer: M,
    pub rate_limiter: R,
}

impl<A, O, M, R> ForgotPasswordUseCase<A, O, M, R>
where
    A: AdminRepository,
    O: OtpRepository,
    M: Mailer,
    R: RateLimiter,
{
    /// Returns Ok(()) for missing, inactive, and unverified accounts alike —
    /// the response body is identical in every one of those cases, so the
    /// endpoint cannot be used to enumerate admin emails. Only the internal
    /// logging differs.
    pub async fn execute(&self, input: ForgotPasswordInput) -> Result<(), AuthServiceError> {
        if input.email.is_empty() {
            return Err(AuthServiceError::Validation("email is required".to_owned()));
        }
        let email = sanitize_input(&input.email).to_lowercase();
        if !is_valid_email(&email) {
            return Err(AuthServiceError::Validation(
                "invalid email address".to_owned(),
            ));
        }

        let Some(admin) = self.admins.find_by_email(&email).await? else {
            tracing::debug!("forgot-password for unknown email");
            return Ok(());
        };
        if !admin.is_active || !admin.is_email_verified {
            tracing::debug!(admin_id = %admin.id, "forgot-password for ineligible account");
            return Ok(());
        }

        // Per-email throttle applies only once the account is known to be
        // eligible; ineligible addresses never consume a bucket.
        let decision = self
            .rate_limiter
            .check(
                &format!("forgot_password_email_{email}"),
                FORGOT_PASSWORD_EMAIL_POLICY.limit,
                FORGOT_PASSWORD_EMAIL_POLICY.window_secs,
            )
            .await?;
        if !decision.allowed {
            return Err(AuthServiceError::RateLimited {
                retry_after_secs: decision.retry_after_secs(),
            });
        }

        let code = generate_otp();
        let record = OtpRecord::new(email.clone(), OtpPurpose::PasswordReset, hash_otp(&code)?);
        self.otps
            .purge_unused(&email, OtpPurpose::PasswordReset)
            .await?;
        self.otps.create(&record).await?;

        // At this point the caller legitimately expects delivery, so a send
        // failure is a real error rather than a silent generic success.
        let mail = MailMessage::otp(&email, OtpPurpose::PasswordReset, &code);
        if let Err(e) = self.mailer.send(&mail).await {
            self.otps.delete(record.id).await?;
            return Err(e);
        }

        tracing::info!(admin_id = %admin.id, "password reset code sent");
        Ok(())
    }
}

// ── ResetPassword ────────────────────────────────────────────────────────────

pub struct ResetPasswordInput {
    pub reset_token: String,
    pub new_password: String,
    pub confirm_password: String,
}

pub struct ResetPasswordUseCase<A, M>
where
    A: AdminRepository,
    M: Mailer,
{
    pub admins: A,
    pub mailer: M,
    pub access_secret: String,
}

impl<A, M> ResetPasswordUseCase<A, M>
where
    A: AdminRepository,
    M: Mailer,
{
    pub async fn execute(&self, input: ResetPasswordInput) -> Result<(), AuthServiceError> {
        if input.reset_token.is_empty()
            || input.new_password.is_empty()
            || input.confirm_password.is_empty()
        {
            return Err(AuthServiceError::Validation(
                "reset token, new password and confirmation are required".to_owned(),
            ));
        }
        if input.new_password != input.confirm_password {
            return Err(AuthServiceError::Validation(
                "passwords do not match".to_owned(),
            ));
        }
        let strength = check_password_strength(&input.new_password);
        if !strength.is_valid {
            return Err(AuthServiceError::WeakPassword {
                errors: strength.errors,
            });
        }

        // Signature validity alone is not authorization: the claim type's
        // purpose marker must also check out (validate_reset_token enforces
        // it), otherwise an access token could drive a password change.
        let claims = validate_reset_token(&input.reset_token, &self.access_secret).map_err(
            |e| match e {
                leadgate_auth_types::token::AuthError::WrongPurpose => {
                    AuthServiceError::WrongTokenPurpose
                }
                _ => AuthServiceError::InvalidToken,
            },
        )?;
        let admin_id = claims
            .sub
            .parse::<Uuid>()
            .map_err(|_| AuthServiceError::InvalidToken)?;

        let admin = self
            .admins
            .find_by_id(admin_id)
            .await?
            .ok_or(AuthServiceError::AdminNotFound)?;

        // The reset bumps token_version, so a replayed token fails here.
        if claims.ver != admin.token_version {
            return Err(AuthServiceError::InvalidToken);
        }
        if !admin.is_active {
            return Err(AuthServiceError::AccountInactive);
        }
        if !admin.is_email_verified {
            return Err(AuthServiceError::EmailUnverified { admin_id: admin.id });
        }

        if verify_password(&input.new_password, &admin.password_hash)? {
            return Err(AuthServiceError::Validation(
                "new password must be different from the current password".to_owned(),
            ));
        }

        let new_hash = hash_password(&input.new_password)?;
        self.admins
            .update_password(admin.id, &new_hash, admin.token_version + 1)
            .await?;

        // Best-effort: the password change already succeeded.
        let mail = MailMessage::password_changed(&admin.email);
        if self.mailer.send(&mail).await.is_err() {
            tracing::warn!(admin_id = %admin.id, "password-changed mail failed to send");
        }

        tracing::info!(admin_id = %admin.id, "password reset complete");
        Ok(())
    }
}
