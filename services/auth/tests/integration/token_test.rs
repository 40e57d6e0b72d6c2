use leadgate_auth_types::token::validate_access_token;

use leadgate_auth::error::AuthServiceError;
use leadgate_auth::usecase::token::{RefreshTokenUseCase, issue_refresh_token};

use crate::helpers::{MockAdminRepo, TEST_ACCESS_SECRET, TEST_REFRESH_SECRET, verified_admin};

fn usecase(admins: MockAdminRepo) -> RefreshTokenUseCase<MockAdminRepo> {
    RefreshTokenUseCase {
        admins,
        access_secret: TEST_ACCESS_SECRET.to_owned(),
        refresh_secret: TEST_REFRESH_SECRET.to_owned(),
    }
}

#[tokio::test]
async fn should_mint_fresh_access_token_from_refresh_token() {
    let admin = verified_admin("jane@example.com");
    let admin_id = admin.id;
    let refresh = issue_refresh_token(&admin, TEST_REFRESH_SECRET).unwrap();

    let uc = usecase(MockAdminRepo::new(vec![admin]));
    let output = uc.execute(&refresh).await.unwrap();

    assert_eq!(output.admin.id, admin_id);
    let info = validate_access_token(&output.access_token, TEST_ACCESS_SECRET).unwrap();
    assert_eq!(info.admin_id, admin_id);
    assert_eq!(info.email, "jane@example.com");
    assert_eq!(info.access_token_exp, output.access_token_exp);
}

#[tokio::test]
async fn should_carry_current_permissions_not_token_snapshot() {
    // Token minted while the account was a plain admin...
    let admin = verified_admin("jane@example.com");
    let refresh = issue_refresh_token(&admin, TEST_REFRESH_SECRET).unwrap();

    // ...but the account has since been promoted.
    let mut promoted = admin;
    promoted.role = leadgate_auth::domain::types::AdminRole::SuperAdmin;
    promoted.permissions = promoted.role.permissions();

    let uc = usecase(MockAdminRepo::new(vec![promoted]));
    let output = uc.execute(&refresh).await.unwrap();

    let info = validate_access_token(&output.access_token, TEST_ACCESS_SECRET).unwrap();
    assert_eq!(info.role, "super_admin");
    assert!(info.permissions.contains(&"manage_admins".to_owned()));
}

#[tokio::test]
async fn should_reject_refresh_token_after_version_bump() {
    let admin = verified_admin("jane@example.com");
    let refresh = issue_refresh_token(&admin, TEST_REFRESH_SECRET).unwrap();

    let mut bumped = admin;
    bumped.token_version = 1;

    let uc = usecase(MockAdminRepo::new(vec![bumped]));
    let result = uc.execute(&refresh).await;
    assert!(
        matches!(result, Err(AuthServiceError::InvalidToken)),
        "stale version must be rejected, got {result:?}"
    );
}

#[tokio::test]
async fn should_reject_refresh_for_inactive_account() {
    let mut admin = verified_admin("jane@example.com");
    let refresh = issue_refresh_token(&admin, TEST_REFRESH_SECRET).unwrap();
    admin.is_active = false;

    let uc = usecase(MockAdminRepo::new(vec![admin]));
    let result = uc.execute(&refresh).await;
    assert!(matches!(result, Err(AuthServiceError::AccountInactive)));
}

#[tokio::test]
async fn should_reject_refresh_for_deleted_account() {
    let admin = verified_admin("jane@example.com");
    let refresh = issue_refresh_token(&admin, TEST_REFRESH_SECRET).unwrap();

    let uc = usecase(MockAdminRepo::empty());
    let result = uc.execute(&refresh).await;
    assert!(matches!(result, Err(AuthServiceError::AdminNotFound)));
}

#[tokio::test]
async fn should_reject_token_signed_with_access_secret() {
    // A refresh token must be signed with the refresh secret specifically.
    let admin = verified_admin("jane@example.com");
    let wrong = issue_refresh_token(&admin, TEST_ACCESS_SECRET).unwrap();

    let uc = usecase(MockAdminRepo::new(vec![admin]));
    let result = uc.execute(&wrong).await;
    assert!(matches!(result, Err(AuthServiceError::InvalidToken)));
}

#[tokio::test]
async fn should_reject_garbage_refresh_token() {
    let uc = usecase(MockAdminRepo::empty());
    let result = uc.execute("definitely.not.ajwt").await;
    assert!(matches!(result, Err(AuthServiceError::InvalidToken)));
}
