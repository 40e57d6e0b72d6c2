use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use uuid::Uuid;

use leadgate_auth::domain::credential::{hash_otp, hash_password};
use leadgate_auth::domain::repository::{AdminRepository, Mailer, OtpRepository};
use leadgate_auth::domain::types::{
    AdminAccount, AdminRole, MailMessage, OtpPurpose, OtpRecord,
};
use leadgate_auth::error::AuthServiceError;

pub const TEST_ACCESS_SECRET: &str = "test-access-secret-for-integration-tests";
pub const TEST_REFRESH_SECRET: &str = "test-refresh-secret-for-integration-tests";

/// Strong enough to pass every strength rule.
pub const TEST_PASSWORD: &str = "Correct-Horse-7";

// ── MockAdminRepo ────────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct MockAdminRepo {
    pub admins: Arc<Mutex<Vec<AdminAccount>>>,
}

impl MockAdminRepo {
    pub fn new(admins: Vec<AdminAccount>) -> Self {
        Self {
            admins: Arc::new(Mutex::new(admins)),
        }
    }

    pub fn empty() -> Self {
        Self::new(vec![])
    }

    /// Current state of an account, for post-execution assertions.
    pub fn get(&self, id: Uuid) -> Option<AdminAccount> {
        self.admins.lock().unwrap().iter().find(|a| a.id == id).cloned()
    }

    pub fn len(&self) -> usize {
        self.admins.lock().unwrap().len()
    }
}

impl AdminRepository for MockAdminRepo {
    async fn find_by_email(&self, email: &str) -> Result<Option<AdminAccount>, AuthServiceError> {
        Ok(self
            .admins
            .lock()
            .unwrap()
            .iter()
            .find(|a| a.email == email)
            .cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<AdminAccount>, AuthServiceError> {
        Ok(self.admins.lock().unwrap().iter().find(|a| a.id == id).cloned())
    }

    async fn create_if_under_cap(
        &self,
        admin: &AdminAccount,
        cap: u64,
    ) -> Result<bool, AuthServiceError> {
        // One lock hold for count and push, mirroring the real adapter's
        // transaction.
        let mut admins = self.admins.lock().unwrap();
        if admins.len() as u64 >= cap {
            return Ok(false);
        }
        admins.push(admin.clone());
        Ok(true)
    }

    async fn delete(&self, id: Uuid) -> Result<(), AuthServiceError> {
        self.admins.lock().unwrap().retain(|a| a.id != id);
        Ok(())
    }

    async fn record_login_failure(
        &self,
        id: Uuid,
        attempts: i32,
        lock_until: Option<DateTime<Utc>>,
    ) -> Result<(), AuthServiceError> {
        let mut admins = self.admins.lock().unwrap();
        if let Some(a) = admins.iter_mut().find(|a| a.id == id) {
            a.login_attempts = attempts;
            a.lock_until = lock_until;
            a.updated_at = Utc::now();
        }
        Ok(())
    }

    async fn record_login_success(
        &self,
        id: Uuid,
        at: DateTime<Utc>,
    ) -> Result<(), AuthServiceError> {
        let mut admins = self.admins.lock().unwrap();
        if let Some(a) = admins.iter_mut().find(|a| a.id == id) {
            a.login_attempts = 0;
            a.lock_until = None;
            a.last_login = Some(at);
            a.updated_at = at;
        }
        Ok(())
    }

    async fn mark_email_verified(&self, id: Uuid) -> Result<(), AuthServiceError> {
        let mut admins = self.admins.lock().unwrap();
        if let Some(a) = admins.iter_mut().find(|a| a.id == id) {
            a.is_email_verified = true;
            a.is_active = true;
        }
        Ok(())
    }

    async fn update_password(
        &self,
        id: Uuid,
        password_hash: &str,
        token_version: i32,
    ) -> Result<(), AuthServiceError> {
        let mut admins = self.admins.lock().unwrap();
        if let Some(a) = admins.iter_mut().find(|a| a.id == id) {
            a.password_hash = password_hash.to_owned();
            a.login_attempts = 0;
            a.lock_until = None;
            a.token_version = token_version;
            a.updated_at = Utc::now();
        }
        Ok(())
    }
}

// ── MockOtpRepo ──────────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct MockOtpRepo {
    pub records: Arc<Mutex<Vec<OtpRecord>>>,
}

impl MockOtpRepo {
    pub fn new(records: Vec<OtpRecord>) -> Self {
        Self {
            records: Arc::new(Mutex::new(records)),
        }
    }

    pub fn empty() -> Self {
        Self::new(vec![])
    }

    pub fn len(&self) -> usize {
        self.records.lock().unwrap().len()
    }

    pub fn get(&self, id: Uuid) -> Option<OtpRecord> {
        self.records.lock().unwrap().iter().find(|r| r.id == id).cloned()
    }

    /// The single unused record for (email, purpose), if any.
    pub fn unused_for(&self, email: &str, purpose: OtpPurpose) -> Option<OtpRecord> {
        self.records
            .lock()
            .unwrap()
            .iter()
            .find(|r| r.email == email && r.purpose == purpose && !r.is_used)
            .cloned()
    }
}

impl OtpRepository for MockOtpRepo {
    async fn purge_unused(&self, email: &str, purpose: OtpPurpose) -> Result<(), AuthServiceError> {
        self.records
            .lock()
            .unwrap()
            .retain(|r| !(r.email == email && r.purpose == purpose && !r.is_used));
        Ok(())
    }

    async fn create(&self, record: &OtpRecord) -> Result<(), AuthServiceError> {
        self.records.lock().unwrap().push(record.clone());
        Ok(())
    }

    async fn find_latest_unused(
        &self,
        email: &str,
        purpose: OtpPurpose,
    ) -> Result<Option<OtpRecord>, AuthServiceError> {
        let records = self.records.lock().unwrap();
        let mut candidates: Vec<&OtpRecord> = records
            .iter()
            .filter(|r| r.email == email && r.purpose == purpose && !r.is_used)
            .collect();
        candidates.sort_by_key(|r| r.created_at);
        Ok(candidates.last().map(|r| (*r).clone()))
    }

    async fn set_attempts(&self, id: Uuid, attempts: i32) -> Result<(), AuthServiceError> {
        let mut records = self.records.lock().unwrap();
        if let Some(r) = records.iter_mut().find(|r| r.id == id) {
            r.attempts = attempts;
        }
        Ok(())
    }

    async fn mark_used(&self, id: Uuid) -> Result<(), AuthServiceError> {
        let mut records = self.records.lock().unwrap();
        if let Some(r) = records.iter_mut().find(|r| r.id == id) {
            r.is_used = true;
        }
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<(), AuthServiceError> {
        self.records.lock().unwrap().retain(|r| r.id != id);
        Ok(())
    }
}

// ── MockMailer ───────────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct MockMailer {
    pub sent: Arc<Mutex<Vec<MailMessage>>>,
    pub fail: Arc<Mutex<bool>>,
}

impl MockMailer {
    pub fn new() -> Self {
        Self {
            sent: Arc::new(Mutex::new(vec![])),
            fail: Arc::new(Mutex::new(false)),
        }
    }

    pub fn failing() -> Self {
        let mailer = Self::new();
        *mailer.fail.lock().unwrap() = true;
        mailer
    }

    pub fn sent_count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }

    pub fn last_sent(&self) -> Option<MailMessage> {
        self.sent.lock().unwrap().last().cloned()
    }
}

impl Mailer for MockMailer {
    async fn send(&self, message: &MailMessage) -> Result<(), AuthServiceError> {
        if *self.fail.lock().unwrap() {
            return Err(AuthServiceError::Delivery);
        }
        self.sent.lock().unwrap().push(message.clone());
        Ok(())
    }
}

// ── Fixtures ─────────────────────────────────────────────────────────────────

/// A verified, active admin whose password is [`TEST_PASSWORD`].
pub fn verified_admin(email: &str) -> AdminAccount {
    let now = Utc::now();
    AdminAccount {
        id: Uuid::new_v4(),
        email: email.to_owned(),
        first_name: "Jane".to_owned(),
        last_name: "Doe".to_owned(),
        password_hash: hash_password(TEST_PASSWORD).unwrap(),
        role: AdminRole::Admin,
        permissions: AdminRole::Admin.permissions(),
        is_active: true,
        is_email_verified: true,
        login_attempts: 0,
        lock_until: None,
        last_login: None,
        token_version: 0,
        created_at: now,
        updated_at: now,
    }
}

/// An unused OTP record for (email, purpose) hashing the given code.
pub fn otp_record(email: &str, purpose: OtpPurpose, code: &str) -> OtpRecord {
    OtpRecord::new(email.to_owned(), purpose, hash_otp(code).unwrap())
}

/// The plaintext code travels only in the mail body; pull the first 6-digit
/// run back out for the verification step of a flow test.
pub fn code_from_mail(message: &MailMessage) -> String {
    message
        .body
        .chars()
        .skip_while(|c| !c.is_ascii_digit())
        .take_while(|c| c.is_ascii_digit())
        .collect()
}
