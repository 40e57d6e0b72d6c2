//! Password and OTP hashing, strength rules, and input sanitization.

use rand::RngExt;

use crate::error::AuthServiceError;

/// bcrypt work factor for passwords.
pub const PASSWORD_BCRYPT_COST: u32 = 12;

/// bcrypt work factor for OTP codes. Lighter than passwords: codes live 10
/// minutes, are rate-limited, and allow 3 attempts.
pub const OTP_BCRYPT_COST: u32 = 8;

const PASSWORD_MIN_LEN: usize = 8;
const PASSWORD_SYMBOLS: &str = "!@#$%^&*()_+-=[]{};':\"\\|,.<>/?";

pub fn hash_password(plaintext: &str) -> Result<String, AuthServiceError> {
    bcrypt::hash(plaintext, PASSWORD_BCRYPT_COST)
        .map_err(|e| AuthServiceError::Internal(anyhow::anyhow!("bcrypt hash failed: {e}")))
}

pub fn verify_password(plaintext: &str, hash: &str) -> Result<bool, AuthServiceError> {
    bcrypt::verify(plaintext, hash)
        .map_err(|e| AuthServiceError::Internal(anyhow::anyhow!("bcrypt verify failed: {e}")))
}

/// Generate a 6-digit numeric code, uniform over [100000, 999999].
pub fn generate_otp() -> String {
    let mut rng = rand::rng();
    rng.random_range(100_000..=999_999u32).to_string()
}

pub fn hash_otp(code: &str) -> Result<String, AuthServiceError> {
    bcrypt::hash(code, OTP_BCRYPT_COST)
        .map_err(|e| AuthServiceError::Internal(anyhow::anyhow!("bcrypt hash failed: {e}")))
}

pub fn verify_otp_hash(code: &str, hash: &str) -> Result<bool, AuthServiceError> {
    bcrypt::verify(code, hash)
        .map_err(|e| AuthServiceError::Internal(anyhow::anyhow!("bcrypt verify failed: {e}")))
}

/// Every failing rule, not just the first, so the caller can show them all.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StrengthReport {
    pub is_valid: bool,
    pub errors: Vec<String>,
}

pub fn check_password_strength(plaintext: &str) -> StrengthReport {
    let mut errors = Vec::new();
    if plaintext.chars().count() < PASSWORD_MIN_LEN {
        errors.push(format!("must be at least {PASSWORD_MIN_LEN} characters long"));
    }
    if !plaintext.chars().any(|c| c.is_ascii_uppercase()) {
        errors.push("must contain an uppercase letter".to_owned());
    }
    if !plaintext.chars().any(|c| c.is_ascii_lowercase()) {
        errors.push("must contain a lowercase letter".to_owned());
    }
    if !plaintext.chars().any(|c| c.is_ascii_digit()) {
        errors.push("must contain a digit".to_owned());
    }
    if !plaintext.chars().any(|c| PASSWORD_SYMBOLS.contains(c)) {
        errors.push("must contain a symbol".to_owned());
    }
    StrengthReport {
        is_valid: errors.is_empty(),
        errors,
    }
}

/// Strip anything tag-shaped plus stray angle brackets and quotes from
/// free-text input. Defense in depth only — storage goes through sea-orm's
/// parameterized queries regardless.
pub fn sanitize_input(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_tag = false;
    for c in text.chars() {
        match c {
            '<' => in_tag = true,
            '>' => in_tag = false,
            '"' | '\'' => {}
            _ if in_tag => {}
            _ => out.push(c),
        }
    }
    out.trim().to_owned()
}

/// Minimal email shape check: one `@`, non-empty local part, domain with a
/// dot, no whitespace.
pub fn is_valid_email(email: &str) -> bool {
    if email.chars().any(|c| c.is_whitespace()) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.is_empty() || domain.contains('@') {
        return false;
    }
    match domain.rsplit_once('.') {
        Some((name, tld)) => !name.is_empty() && tld.len() >= 2,
        None => false,
    }
}

/// True when the string is exactly six ASCII digits.
pub fn is_otp_shape(code: &str) -> bool {
    code.len() == 6 && code.bytes().all(|b| b.is_ascii_digit())
}
