use crate::domain::credential::{is_otp_shape, sanitize_input, verify_otp_hash};
use crate::domain::repository::{AdminRepository, Mailer, OtpRepository};
use crate::domain::types::{MailMessage, OTP_MAX_ATTEMPTS, OtpOutcome, OtpPurpose};
use crate::error::AuthServiceError;
use crate::usecase::token::{issue_access_token, issue_refresh_token, issue_reset_token};

pub struct VerifyOtpInput {
    pub email: String,
    pub otp: String,
    pub purpose: String,
}

pub struct VerifyOtpUseCase<A, O, M>
where
    A: AdminRepository,
    O: OtpRepository,
    M: Mailer,
{
    pub admins: A,
    pub otps: O,
    pub mailer: M,
    pub access_secret: String,
    pub refresh_secret: String,
}

impl<A, O, M> VerifyOtpUseCase<A, O, M>
where
    A: AdminRepository,
    O: OtpRepository,
    M: Mailer,
{
    pub async fn execute(&self, input: VerifyOtpInput) -> Result<OtpOutcome, AuthServiceError> {
        if input.email.is_empty() || input.otp.is_empty() || input.purpose.is_empty() {
            return Err(AuthServiceError::Validation(
                "email, otp and purpose are required".to_owned(),
            ));
        }
        if !is_otp_shape(&input.otp) {
            return Err(AuthServiceError::Validation(
                "verification code must be exactly 6 digits".to_owned(),
            ));
        }
        let purpose = OtpPurpose::parse(&input.purpose).ok_or_else(|| {
            AuthServiceError::Validation("unknown verification purpose".to_owned())
        })?;
        let email = sanitize_input(&input.email).to_lowercase();

        let admin = self
            .admins
            .find_by_email(&email)
            .await?
            .ok_or(AuthServiceError::AdminNotFound)?;

        let record = self
            .otps
            .find_latest_unused(&email, purpose)
            .await?
            .ok_or(AuthServiceError::OtpNotFound)?;

        // Expiry and attempt exhaustion both delete the record, so the next
        // call lands on OtpNotFound rather than a double-delete error.
        if record.is_expired() {
            self.otps.delete(record.id).await?;
            return Err(AuthServiceError::OtpExpired);
        }
        if record.attempts >= OTP_MAX_ATTEMPTS {
            self.otps.delete(record.id).await?;
            return Err(AuthServiceError::OtpAttemptsExhausted);
        }

        if !verify_otp_hash(&input.otp, &record.otp_hash)? {
            let attempts = record.attempts + 1;
            self.otps.set_attempts(record.id, attempts).await?;
            return Err(AuthServiceError::InvalidOtp {
                attempts_remaining: OTP_MAX_ATTEMPTS - attempts,
            });
        }

        self.otps.mark_used(record.id).await?;

        match purpose {
            OtpPurpose::EmailVerification => {
                self.admins.mark_email_verified(admin.id).await?;
                // Welcome mail is best-effort; the verification already stuck.
                let mail = MailMessage::welcome(&admin.email, &admin.first_name);
                if self.mailer.send(&mail).await.is_err() {
                    tracing::warn!(admin_id = %admin.id, "welcome mail failed to send");
                }
                let mut admin = admin;
                admin.is_email_verified = true;
                admin.is_active = true;
                tracing::info!(admin_id = %admin.id, "email verified");
                Ok(OtpOutcome::EmailVerified { admin })
            }
            OtpPurpose::LoginVerification => {
                // The account state may have changed between the password
                // step and this one; no session for a deactivated or locked
                // account. The code is already consumed at this point.
                if !admin.is_active {
                    return Err(AuthServiceError::AccountInactive);
                }
                if admin.is_locked() {
                    return Err(AuthServiceError::AccountLocked {
                        minutes_remaining: admin.lock_minutes_remaining(),
                    });
                }
                // Tokens reflect the account's current role and permissions.
                let (access_token, access_token_exp) =
                    issue_access_token(&admin, &self.access_secret)?;
                let refresh_token = issue_refresh_token(&admin, &self.refresh_secret)?;
                tracing::info!(admin_id = %admin.id, "two-factor login complete");
                Ok(OtpOutcome::LoggedIn {
                    admin,
                    access_token,
                    access_token_exp,
                    refresh_token,
                })
            }
            OtpPurpose::PasswordReset => {
                let reset_token = issue_reset_token(&admin, &self.access_secret)?;
                tracing::info!(admin_id = %admin.id, "password reset authorized");
                Ok(OtpOutcome::PasswordResetAuthorized { reset_token })
            }
        }
    }
}
