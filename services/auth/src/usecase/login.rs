use chrono::{Duration, Utc};

use crate::domain::credential::{
    generate_otp, hash_otp, is_valid_email, sanitize_input, verify_password,
};
use crate::domain::repository::{AdminRepository, Mailer, OtpRepository};
use crate::domain::types::{
    LOCK_DURATION_HOURS, MAX_LOGIN_ATTEMPTS, MailMessage, OtpPurpose, OtpRecord,
};
use crate::error::AuthServiceError;

pub struct LoginInput {
    pub email: String,
    pub password: String,
}

/// A successful password check only gets you as far as the OTP mail — no
/// tokens are minted until `login_verification` completes.
#[derive(Debug)]
pub struct LoginOutput {
    pub email: String,
}

pub struct LoginUseCase<A, O, M>
where
    A: AdminRepository,
    O: OtpRepository,
    M: Mailer,
{
    pub admins: A,
    pub otps: O,
    pub mailer: M,
}

impl<A, O, M> LoginUseCase<A, O, M>
where
    A: AdminRepository,
    O: OtpRepository,
    M: Mailer,
{
    pub async fn execute(&self, input: LoginInput) -> Result<LoginOutput, AuthServiceError> {
        if input.email.is_empty() || input.password.is_empty() {
            return Err(AuthServiceError::Validation(
                "email and password are required".to_owned(),
            ));
        }
        let email = sanitize_input(&input.email).to_lowercase();
        if !is_valid_email(&email) {
            return Err(AuthServiceError::Validation(
                "invalid email address".to_owned(),
            ));
        }

        // Unknown email gets the same message as a wrong password, with no
        // attempt counter — nothing distinguishes the two to the caller.
        let Some(admin) = self.admins.find_by_email(&email).await? else {
            tracing::debug!("login attempt for unknown email");
            return Err(AuthServiceError::InvalidCredentials {
                attempts_remaining: None,
            });
        };

        // Lock state wins over everything, including a correct password.
        if admin.is_locked() {
            return Err(AuthServiceError::AccountLocked {
                minutes_remaining: admin.lock_minutes_remaining(),
            });
        }
        if !admin.is_active {
            return Err(AuthServiceError::AccountInactive);
        }
        if !admin.is_email_verified {
            return Err(AuthServiceError::EmailUnverified { admin_id: admin.id });
        }

        if !verify_password(&input.password, &admin.password_hash)? {
            // An expired lock clears and the count restarts at 1; otherwise
            // this failure stacks on the previous ones.
            let attempts = if admin.lock_until.is_some() && !admin.is_locked() {
                1
            } else {
                admin.login_attempts + 1
            };
            let lock_until = (attempts >= MAX_LOGIN_ATTEMPTS)
                .then(|| Utc::now() + Duration::hours(LOCK_DURATION_HOURS));
            self.admins
                .record_login_failure(admin.id, attempts, lock_until)
                .await?;

            if lock_until.is_some() {
                tracing::warn!(admin_id = %admin.id, "account locked after repeated login failures");
                return Err(AuthServiceError::AccountLocked {
                    minutes_remaining: LOCK_DURATION_HOURS * 60,
                });
            }
            return Err(AuthServiceError::InvalidCredentials {
                attempts_remaining: Some(MAX_LOGIN_ATTEMPTS - attempts),
            });
        }

        // Password accepted: clear the counter and stamp last_login.
        self.admins
            .record_login_success(admin.id, Utc::now())
            .await?;

        // Second factor: issue and mail the login code.
        let code = generate_otp();
        let record = OtpRecord::new(email.clone(), OtpPurpose::LoginVerification, hash_otp(&code)?);
        self.otps
            .purge_unused(&email, OtpPurpose::LoginVerification)
            .await?;
        self.otps.create(&record).await?;

        let mail = MailMessage::otp(&email, OtpPurpose::LoginVerification, &code);
        if let Err(e) = self.mailer.send(&mail).await {
            self.otps.delete(record.id).await?;
            return Err(e);
        }

        tracing::info!(admin_id = %admin.id, "password accepted, login code sent");
        Ok(LoginOutput { email })
    }
}
