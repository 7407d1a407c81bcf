//! End-to-end credential flow tests: bootstrap, register, login, resolve,
//! and authorize.

use rowgate_auth::{AuthConfig, AuthService, Credentials, Error, ErrorResponse};
use rowgate_core::{Action, Principal};

struct TestContext {
    service: AuthService,
    _db: sled::Db,
}

impl TestContext {
    fn new() -> Self {
        let _ = tracing_subscriber::fmt().with_test_writer().try_init();

        let db = sled::Config::new().temporary(true).open().unwrap();
        let config = AuthConfig::new(b"auth-flow-test-secret".to_vec());
        let service = AuthService::open(&db, config).unwrap();

        Self { service, _db: db }
    }

    fn credentials(username: &str, password: &str) -> Credentials {
        Credentials {
            username: username.to_string(),
            password: password.to_string(),
        }
    }
}

#[test]
fn bootstrap_creates_admin_exactly_once() {
    let ctx = TestContext::new();

    let admin = ctx.service.bootstrap().unwrap().expect("first bootstrap");
    assert!(!admin.password.is_empty());
    assert_eq!(ctx.service.policies().list_rules().unwrap().len(), 3);

    // Second bootstrap seeds nothing and reveals nothing.
    assert!(ctx.service.bootstrap().unwrap().is_none());
    assert_eq!(ctx.service.policies().list_rules().unwrap().len(), 3);

    // The generated credentials actually log in, with admin privilege.
    let token = ctx
        .service
        .login(&TestContext::credentials(&admin.username, &admin.password))
        .unwrap();
    let principal = ctx.service.resolver().resolve(Some(&token.token));
    assert!(principal.is_admin);
    assert!(principal.is_authenticated());
}

#[test]
fn register_login_resolve_round_trip() {
    let ctx = TestContext::new();
    ctx.service.bootstrap().unwrap();

    ctx.service
        .register(&TestContext::credentials("hello", "world"))
        .unwrap();

    let token = ctx
        .service
        .login(&TestContext::credentials("hello", "world"))
        .unwrap();

    let principal = ctx.service.resolver().resolve(Some(&token.token));
    assert!(principal.is_authenticated());
    assert!(!principal.is_admin);

    let stored = ctx.service.users().fetch_user("hello").unwrap().unwrap();
    assert_eq!(principal.id, stored.id);
    // Only the hash was persisted.
    assert_ne!(stored.password_hash, "world");

    // The resolved principal drives authorization: reads on the users
    // table are allowed but filtered to the caller's own records.
    let policies = ctx.service.policy_snapshot().unwrap();
    let decision = policies.resolve(&principal, "users", Action::Read);
    assert!(decision.allowed);
    assert_eq!(decision.filter_column.as_deref(), Some("id"));

    let decision = policies.resolve(&principal, "policies", Action::Create);
    assert!(!decision.allowed);
}

#[test]
fn duplicate_registration_conflicts() {
    let ctx = TestContext::new();

    ctx.service
        .register(&TestContext::credentials("hello", "world"))
        .unwrap();
    let err = ctx
        .service
        .register(&TestContext::credentials("hello", "world"))
        .unwrap_err();

    assert!(matches!(err, Error::CredentialConflict(_)));
    assert_eq!(ErrorResponse::from(&err).code, 409);
}

#[test]
fn wrong_password_and_unknown_username_are_indistinguishable() {
    let ctx = TestContext::new();
    ctx.service
        .register(&TestContext::credentials("hello", "world"))
        .unwrap();

    let wrong_password = ctx
        .service
        .login(&TestContext::credentials("hello", "wr0ng"))
        .unwrap_err();
    let unknown_username = ctx
        .service
        .login(&TestContext::credentials("nobody", "world"))
        .unwrap_err();

    assert!(matches!(wrong_password, Error::AuthenticationFailed));
    assert!(matches!(unknown_username, Error::AuthenticationFailed));
    assert_eq!(
        ErrorResponse::from(&wrong_password),
        ErrorResponse::from(&unknown_username)
    );
}

#[test]
fn bad_tokens_degrade_to_anonymous_and_policies_deny() {
    let ctx = TestContext::new();
    ctx.service.bootstrap().unwrap();

    let resolver = ctx.service.resolver();
    let principal = resolver.resolve(Some("Bearer mangled.token.value"));
    assert_eq!(principal, Principal::anonymous());

    let policies = ctx.service.policy_snapshot().unwrap();

    // Anonymous callers are denied on the admin-gated table but only
    // filtered, not denied, on ownership-gated tables.
    assert!(
        !policies
            .resolve(&principal, "policies", Action::Read)
            .allowed
    );
    let decision = policies.resolve(&principal, "comments", Action::Read);
    assert!(decision.allowed);
    assert_eq!(decision.filter_column.as_deref(), Some("user_id"));
}

#[test]
fn logout_is_stateless() {
    let ctx = TestContext::new();
    ctx.service.bootstrap().unwrap();
    ctx.service
        .register(&TestContext::credentials("hello", "world"))
        .unwrap();

    let token = ctx
        .service
        .login(&TestContext::credentials("hello", "world"))
        .unwrap();
    ctx.service.logout();

    // No server-side revocation: the token still verifies until expiry.
    let principal = ctx.service.resolver().resolve(Some(&token.token));
    assert!(principal.is_authenticated());
}
