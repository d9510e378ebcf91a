use zari_auth_types::token::validate_access_token;
use zari_licensing::error::LicensingServiceError;
use zari_licensing::usecase::admin::{
    ListAdminsUseCase, LoginInput, LoginUseCase, RegisterAdminInput, RegisterAdminUseCase,
    SeedAdminUseCase,
};

use crate::helpers::{MockAdminRepo, TEST_BCRYPT_COST, test_admin};

const SECRET: &str = "admin-test-secret";

fn login_uc(admins: MockAdminRepo) -> LoginUseCase<MockAdminRepo> {
    LoginUseCase {
        admins,
        jwt_secret: SECRET.to_owned(),
        token_ttl_secs: 3600,
    }
}

fn credentials(username: &str, password: &str) -> LoginInput {
    LoginInput {
        username: username.to_owned(),
        password: password.to_owned(),
    }
}

// ── Login ────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_issue_admin_token_for_valid_credentials() {
    let admins = MockAdminRepo::new(vec![test_admin("root", "s3cret", true)]);

    let output = login_uc(admins)
        .execute(credentials("root", "s3cret"))
        .await
        .unwrap();

    assert_eq!(output.username, "root");
    assert!(output.is_admin);
    assert_eq!(output.expires_in, 3600);

    let info = validate_access_token(&output.access_token, SECRET).unwrap();
    assert_eq!(info.username, "root");
    assert!(info.is_admin);
}

#[tokio::test]
async fn should_reject_wrong_password() {
    let admins = MockAdminRepo::new(vec![test_admin("root", "s3cret", true)]);

    let result = login_uc(admins)
        .execute(credentials("root", "guess"))
        .await;

    assert!(
        matches!(result, Err(LicensingServiceError::InvalidCredentials)),
        "expected InvalidCredentials, got {result:?}"
    );
}

#[tokio::test]
async fn should_reject_unknown_username() {
    let result = login_uc(MockAdminRepo::empty())
        .execute(credentials("ghost", "s3cret"))
        .await;

    assert!(
        matches!(result, Err(LicensingServiceError::InvalidCredentials)),
        "expected InvalidCredentials, got {result:?}"
    );
}

#[tokio::test]
async fn should_reject_missing_credentials() {
    let result = login_uc(MockAdminRepo::empty())
        .execute(credentials("", "s3cret"))
        .await;

    assert!(
        matches!(result, Err(LicensingServiceError::MissingData)),
        "expected MissingData, got {result:?}"
    );
}

#[tokio::test]
async fn should_carry_non_admin_flag_into_token() {
    let admins = MockAdminRepo::new(vec![test_admin("viewer", "pw", false)]);

    let output = login_uc(admins)
        .execute(credentials("viewer", "pw"))
        .await
        .unwrap();

    let info = validate_access_token(&output.access_token, SECRET).unwrap();
    assert!(!info.is_admin);
}

// ── SeedInitialAdmin ─────────────────────────────────────────────────────────

#[tokio::test]
async fn should_seed_admin_into_empty_store() {
    let admins = MockAdminRepo::empty();
    let seeder = SeedAdminUseCase {
        admins: admins.clone(),
        cost: TEST_BCRYPT_COST,
    };

    assert!(seeder.execute("admin", "changeme").await.unwrap());

    let stored = admins.snapshot();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].username, "admin");
    assert!(stored[0].is_admin);
    assert_ne!(stored[0].password_hash, "changeme");
    assert!(bcrypt::verify("changeme", &stored[0].password_hash).unwrap());
}

#[tokio::test]
async fn should_skip_seeding_when_admin_exists() {
    let admins = MockAdminRepo::new(vec![test_admin("root", "pw", true)]);
    let seeder = SeedAdminUseCase {
        admins: admins.clone(),
        cost: TEST_BCRYPT_COST,
    };

    assert!(!seeder.execute("admin", "changeme").await.unwrap());
    assert_eq!(admins.snapshot().len(), 1);
}

#[tokio::test]
async fn should_login_with_seeded_credentials() {
    let admins = MockAdminRepo::empty();
    SeedAdminUseCase {
        admins: admins.clone(),
        cost: TEST_BCRYPT_COST,
    }
    .execute("admin", "changeme")
    .await
    .unwrap();

    let output = login_uc(admins)
        .execute(credentials("admin", "changeme"))
        .await
        .unwrap();

    assert!(output.is_admin);
}

// ── RegisterAdmin / ListAdmins ───────────────────────────────────────────────

fn register_uc(admins: &MockAdminRepo) -> RegisterAdminUseCase<MockAdminRepo> {
    RegisterAdminUseCase {
        admins: admins.clone(),
        cost: TEST_BCRYPT_COST,
    }
}

fn registration(username: &str, password: &str, is_admin: bool) -> RegisterAdminInput {
    RegisterAdminInput {
        username: username.to_owned(),
        password: password.to_owned(),
        is_admin,
    }
}

#[tokio::test]
async fn should_register_non_admin_account() {
    let admins = MockAdminRepo::new(vec![test_admin("root", "pw", true)]);

    let account = register_uc(&admins)
        .execute(registration("viewer", "hunter2", false))
        .await
        .unwrap();

    assert_eq!(account.username, "viewer");
    assert!(!account.is_admin);
    assert!(bcrypt::verify("hunter2", &account.password_hash).unwrap());
    assert_eq!(admins.snapshot().len(), 2);

    let output = login_uc(admins)
        .execute(credentials("viewer", "hunter2"))
        .await
        .unwrap();
    assert!(!output.is_admin);
    let info = validate_access_token(&output.access_token, SECRET).unwrap();
    assert!(!info.is_admin);
}

#[tokio::test]
async fn should_reject_duplicate_username_on_register() {
    let admins = MockAdminRepo::new(vec![test_admin("root", "pw", true)]);

    let result = register_uc(&admins)
        .execute(registration("root", "other", false))
        .await;

    assert!(
        matches!(result, Err(LicensingServiceError::AdminAlreadyExists)),
        "expected AdminAlreadyExists, got {result:?}"
    );
    assert_eq!(admins.snapshot().len(), 1);
}

#[tokio::test]
async fn should_reject_incomplete_registration() {
    let admins = MockAdminRepo::empty();

    for (username, password) in [("", "pw"), ("viewer", "")] {
        let result = register_uc(&admins)
            .execute(registration(username, password, false))
            .await;
        assert!(
            matches!(result, Err(LicensingServiceError::MissingData)),
            "expected MissingData, got {result:?}"
        );
    }
    assert!(admins.snapshot().is_empty());
}

#[tokio::test]
async fn should_list_accounts_in_creation_order() {
    let admins = MockAdminRepo::new(vec![test_admin("root", "pw", true)]);
    register_uc(&admins)
        .execute(registration("second", "pw", true))
        .await
        .unwrap();

    let listed = ListAdminsUseCase { admins }.execute().await.unwrap();

    let names: Vec<(&str, bool)> = listed
        .iter()
        .map(|a| (a.username.as_str(), a.is_admin))
        .collect();
    assert_eq!(names, vec![("root", true), ("second", true)]);
}
