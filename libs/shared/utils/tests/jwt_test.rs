use shared_utils::jwt::validate_token;
use shared_utils::test_utils::{JwtTestUtils, TestConfig, TestUser};

#[test]
fn valid_token_round_trips_the_user() {
    let config = TestConfig::default();
    let user = TestUser::professional("pro@example.com");

    let token = JwtTestUtils::create_test_token(&user, &config.jwt_secret, None);
    let validated = validate_token(&token, &config.jwt_secret).unwrap();

    assert_eq!(validated.id, user.id);
    assert_eq!(validated.email.as_deref(), Some("pro@example.com"));
    assert_eq!(validated.role.as_deref(), Some("professional"));
}

#[test]
fn expired_token_is_rejected() {
    let config = TestConfig::default();
    let user = TestUser::default();

    let token = JwtTestUtils::create_expired_token(&user, &config.jwt_secret);

    assert_eq!(
        validate_token(&token, &config.jwt_secret).unwrap_err(),
        "Token expired"
    );
}

#[test]
fn wrong_secret_is_rejected() {
    let config = TestConfig::default();
    let user = TestUser::default();

    let token = JwtTestUtils::create_test_token(&user, &config.jwt_secret, None);

    assert_eq!(
        validate_token(&token, "a-completely-different-secret").unwrap_err(),
        "Invalid token signature"
    );
}

#[test]
fn malformed_token_is_rejected() {
    let config = TestConfig::default();

    assert!(validate_token("not-a-jwt", &config.jwt_secret).is_err());
    assert!(validate_token("", &config.jwt_secret).is_err());
}
