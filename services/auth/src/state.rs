use sea_orm::DatabaseConnection;

use leadgate_auth_types::identity::AccessSecretProvider;

use crate::config::AuthConfig;
use crate::infra::db::{DbAdminRepository, DbOtpRepository};
use crate::infra::mailer::HttpMailer;
use crate::infra::ratelimit::AppRateLimiter;

/// Shared service state. Handlers assemble usecases from these parts per
/// request; everything here is cheap to clone.
#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub mailer: HttpMailer,
    pub rate_limiter: AppRateLimiter,
    pub access_secret: String,
    pub refresh_secret: String,
    pub cookie_domain: String,
}

impl AppState {
    pub fn new(
        db: DatabaseConnection,
        rate_limiter: AppRateLimiter,
        config: &AuthConfig,
    ) -> Self {
        Self {
            db,
            mailer: HttpMailer::new(
                config.mail_api_url.clone(),
                config.mail_api_key.clone(),
                config.mail_from.clone(),
            ),
            rate_limiter,
            access_secret: config.access_token_secret.clone(),
            refresh_secret: config.refresh_token_secret.clone(),
            cookie_domain: config.cookie_domain.clone(),
        }
    }

    pub fn admin_repo(&self) -> DbAdminRepository {
        DbAdminRepository {
            db: self.db.clone(),
        }
    }

    pub fn otp_repo(&self) -> DbOtpRepository {
        DbOtpRepository {
            db: self.db.clone(),
        }
    }
}

impl AccessSecretProvider for AppState {
    fn access_secret(&self) -> &str {
        &self.access_secret
    }
}
