use chrono::{Duration, Utc};

use leadgate_auth::domain::types::OtpPurpose;
use leadgate_auth::error::AuthServiceError;
use leadgate_auth::usecase::login::{LoginInput, LoginUseCase};

use crate::helpers::{MockAdminRepo, MockMailer, MockOtpRepo, TEST_PASSWORD, verified_admin};

fn login(email: &str, password: &str) -> LoginInput {
    LoginInput {
        email: email.to_owned(),
        password: password.to_owned(),
    }
}

#[tokio::test]
async fn should_send_login_code_on_valid_password() {
    let admin = verified_admin("jane@example.com");
    let admin_id = admin.id;
    let admins = MockAdminRepo::new(vec![admin]);
    let otps = MockOtpRepo::empty();
    let mailer = MockMailer::new();

    let uc = LoginUseCase {
        admins: admins.clone(),
        otps: otps.clone(),
        mailer: mailer.clone(),
    };
    let output = uc
        .execute(login("jane@example.com", TEST_PASSWORD))
        .await
        .unwrap();

    assert_eq!(output.email, "jane@example.com");
    assert!(
        otps.unused_for("jane@example.com", OtpPurpose::LoginVerification)
            .is_some(),
        "a login_verification code should be pending"
    );
    assert_eq!(mailer.sent_count(), 1);

    let updated = admins.get(admin_id).unwrap();
    assert!(updated.last_login.is_some(), "last_login should be stamped");
    assert_eq!(updated.login_attempts, 0);
}

#[tokio::test]
async fn should_not_reveal_whether_email_exists() {
    let uc = LoginUseCase {
        admins: MockAdminRepo::empty(),
        otps: MockOtpRepo::empty(),
        mailer: MockMailer::new(),
    };

    let result = uc.execute(login("nobody@example.com", TEST_PASSWORD)).await;
    match result {
        Err(AuthServiceError::InvalidCredentials { attempts_remaining }) => {
            assert!(
                attempts_remaining.is_none(),
                "unknown email must not leak an attempt counter"
            );
        }
        other => panic!("expected InvalidCredentials, got {other:?}"),
    }
}

#[tokio::test]
async fn should_count_attempts_on_wrong_password() {
    let admin = verified_admin("jane@example.com");
    let admin_id = admin.id;
    let admins = MockAdminRepo::new(vec![admin]);

    let uc = LoginUseCase {
        admins: admins.clone(),
        otps: MockOtpRepo::empty(),
        mailer: MockMailer::new(),
    };
    let result = uc.execute(login("jane@example.com", "Wrong-Pass-1!")).await;

    match result {
        Err(AuthServiceError::InvalidCredentials { attempts_remaining }) => {
            assert_eq!(attempts_remaining, Some(4));
        }
        other => panic!("expected InvalidCredentials, got {other:?}"),
    }
    assert_eq!(admins.get(admin_id).unwrap().login_attempts, 1);
}

#[tokio::test]
async fn should_lock_account_on_fifth_failure() {
    let mut admin = verified_admin("jane@example.com");
    admin.login_attempts = 4;
    let admin_id = admin.id;
    let admins = MockAdminRepo::new(vec![admin]);

    let uc = LoginUseCase {
        admins: admins.clone(),
        otps: MockOtpRepo::empty(),
        mailer: MockMailer::new(),
    };
    let result = uc.execute(login("jane@example.com", "Wrong-Pass-1!")).await;

    match result {
        Err(AuthServiceError::AccountLocked { minutes_remaining }) => {
            assert_eq!(minutes_remaining, 120);
        }
        other => panic!("expected AccountLocked, got {other:?}"),
    }
    let locked = admins.get(admin_id).unwrap();
    assert!(locked.lock_until.is_some());
    assert!(locked.is_locked());
}

#[tokio::test]
async fn should_reject_locked_account_even_with_correct_password() {
    let mut admin = verified_admin("jane@example.com");
    admin.login_attempts = 5;
    admin.lock_until = Some(Utc::now() + Duration::hours(1));
    let admins = MockAdminRepo::new(vec![admin]);
    let mailer = MockMailer::new();

    let uc = LoginUseCase {
        admins,
        otps: MockOtpRepo::empty(),
        mailer: mailer.clone(),
    };
    let result = uc.execute(login("jane@example.com", TEST_PASSWORD)).await;

    assert!(
        matches!(result, Err(AuthServiceError::AccountLocked { .. })),
        "lock wins over a correct password, got {result:?}"
    );
    assert_eq!(mailer.sent_count(), 0, "no code while locked");
}

#[tokio::test]
async fn should_restart_attempt_counter_after_lock_expiry() {
    let mut admin = verified_admin("jane@example.com");
    admin.login_attempts = 5;
    admin.lock_until = Some(Utc::now() - Duration::minutes(1));
    let admin_id = admin.id;
    let admins = MockAdminRepo::new(vec![admin]);

    let uc = LoginUseCase {
        admins: admins.clone(),
        otps: MockOtpRepo::empty(),
        mailer: MockMailer::new(),
    };
    let result = uc.execute(login("jane@example.com", "Wrong-Pass-1!")).await;

    match result {
        Err(AuthServiceError::InvalidCredentials { attempts_remaining }) => {
            assert_eq!(attempts_remaining, Some(4), "counter restarts at 1");
        }
        other => panic!("expected InvalidCredentials, got {other:?}"),
    }
    assert_eq!(admins.get(admin_id).unwrap().login_attempts, 1);
}

#[tokio::test]
async fn should_reject_unverified_email() {
    let mut admin = verified_admin("jane@example.com");
    admin.is_email_verified = false;
    let uc = LoginUseCase {
        admins: MockAdminRepo::new(vec![admin]),
        otps: MockOtpRepo::empty(),
        mailer: MockMailer::new(),
    };

    let result = uc.execute(login("jane@example.com", TEST_PASSWORD)).await;
    assert!(matches!(
        result,
        Err(AuthServiceError::EmailUnverified { .. })
    ));
}

#[tokio::test]
async fn should_reject_inactive_account() {
    let mut admin = verified_admin("jane@example.com");
    admin.is_active = false;
    let uc = LoginUseCase {
        admins: MockAdminRepo::new(vec![admin]),
        otps: MockOtpRepo::empty(),
        mailer: MockMailer::new(),
    };

    let result = uc.execute(login("jane@example.com", TEST_PASSWORD)).await;
    assert!(matches!(result, Err(AuthServiceError::AccountInactive)));
}

#[tokio::test]
async fn should_delete_pending_code_when_mail_fails() {
    let admin = verified_admin("jane@example.com");
    let otps = MockOtpRepo::empty();

    let uc = LoginUseCase {
        admins: MockAdminRepo::new(vec![admin]),
        otps: otps.clone(),
        mailer: MockMailer::failing(),
    };
    let result = uc.execute(login("jane@example.com", TEST_PASSWORD)).await;

    assert!(matches!(result, Err(AuthServiceError::Delivery)));
    assert_eq!(otps.len(), 0, "undeliverable code must not linger");
}

#[tokio::test]
async fn should_replace_previous_pending_login_code() {
    let admin = verified_admin("jane@example.com");
    let admins = MockAdminRepo::new(vec![admin]);
    let otps = MockOtpRepo::empty();
    let mailer = MockMailer::new();

    let uc = LoginUseCase {
        admins,
        otps: otps.clone(),
        mailer,
    };
    uc.execute(login("jane@example.com", TEST_PASSWORD))
        .await
        .unwrap();
    uc.execute(login("jane@example.com", TEST_PASSWORD))
        .await
        .unwrap();

    assert_eq!(otps.len(), 1, "only the latest code should remain pending");
}
