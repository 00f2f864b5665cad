//! End-to-end flows through `AppState` and the auth service.

use std::net::{IpAddr, Ipv4Addr};

use argon2::Argon2;
use argon2::password_hash::{PasswordHasher as _, SaltString, rand_core::OsRng};
use gatekeep::auth::{HashedCredential, LEGACY_ARGON2, USER_PROFILE};
use gatekeep::config::Config;
use gatekeep::db::repositories::user::UserRepository;
use gatekeep::domain::{ActiveState, CredentialQuery, IdentityId, UserEvent};
use gatekeep::services::{AuthError, CredentialRequest, Registration};
use gatekeep::state::AppState;

const CLIENT: IpAddr = IpAddr::V4(Ipv4Addr::new(192, 0, 2, 10));

fn test_config() -> Config {
    let db_path =
        std::env::temp_dir().join(format!("gatekeep-service-test-{}.db", uuid::Uuid::new_v4()));

    let mut config = Config::default();
    config.general.database_url = format!("sqlite:{}", db_path.display());
    config.general.max_db_connections = 1;
    config.general.min_db_connections = 1;
    config.security.bcrypt_cost = 4;
    config
}

async fn spawn_state(config: Config) -> AppState {
    AppState::new(config)
        .await
        .expect("failed to create app state")
}

fn registration(login: &str, password: &str) -> Registration {
    Registration {
        login: login.to_string(),
        password: Some(password.to_string()),
        email: format!("{login}@example.com"),
        groups: vec!["users".to_string()],
        ..Registration::default()
    }
}

#[tokio::test]
async fn test_startup_provisions_default_groups() {
    let state = spawn_state(test_config()).await;

    let groups = state.auth.list_groups().await.unwrap();
    let names: Vec<_> = groups.iter().map(|g| g.name.as_str()).collect();
    assert_eq!(names, ["users", "admin"]);
}

#[tokio::test]
async fn test_unknown_plugin_keys_fail_startup() {
    let mut config = test_config();
    config.auth.fallback_auth = Some("ldap".to_string());
    let err = AppState::new(config).await.err().expect("startup should fail");
    assert!(format!("{err:#}").contains("unknown fallback authenticator"));

    let mut config = test_config();
    config.auth.auth_profile = Some("nope".to_string());
    let err = AppState::new(config).await.err().expect("startup should fail");
    assert!(format!("{err:#}").contains("unknown profile kind"));
}

#[tokio::test]
async fn test_register_then_login() {
    let state = spawn_state(test_config()).await;
    let ctx = state.context_from(CLIENT);

    let registered = state
        .auth
        .register(&ctx, registration("alice", "s3cret"))
        .await
        .unwrap();
    assert_eq!(registered.user.login, "alice");
    assert_eq!(registered.user.provider, "local");
    assert!(registered.user.has_password);

    let result = state.auth.login(&ctx, "alice", "s3cret").await.unwrap();
    assert_eq!(result.identity, registered.identity);
    assert_eq!(result.display_name, "alice");
    assert_eq!(result.groups, "users");

    let err = state.auth.login(&ctx, "alice", "wrong").await.unwrap_err();
    assert!(matches!(err, AuthError::InvalidCredentials));
    let err = state.auth.login(&ctx, "nobody", "s3cret").await.unwrap_err();
    assert!(matches!(err, AuthError::InvalidCredentials));

    let history = state
        .auth
        .login_history(registered.identity, 10)
        .await
        .unwrap();
    let events: Vec<_> = history.iter().map(|e| e.event).collect();
    assert_eq!(events, [UserEvent::Register, UserEvent::Login]);
    assert_eq!(history[1].ip_addr, "192.0.2.10");
}

#[tokio::test]
async fn test_check_records_nothing() {
    let state = spawn_state(test_config()).await;
    let ctx = state.context_from(CLIENT);
    let registered = state
        .auth
        .register(&ctx, registration("bob", "pw"))
        .await
        .unwrap();

    let query = CredentialQuery::by_login("bob");
    assert!(state.auth.check(&state.context(), &query, "pw").await.unwrap());
    assert!(!state.auth.check(&state.context(), &query, "nope").await.unwrap());

    let history = state
        .auth
        .login_history(registered.identity, 10)
        .await
        .unwrap();
    assert_eq!(history.len(), 1);
}

#[tokio::test]
async fn test_events_require_client_address() {
    let state = spawn_state(test_config()).await;

    let err = state
        .auth
        .register(&state.context(), registration("carol", "pw"))
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::Validation(_)));
    assert!(state.store.get_user_by_login("carol").await.unwrap().is_none());
}

#[tokio::test]
async fn test_register_rejects_duplicates_and_unknown_groups() {
    let state = spawn_state(test_config()).await;
    let ctx = state.context_from(CLIENT);

    state
        .auth
        .register(&ctx, registration("dave", "pw"))
        .await
        .unwrap();
    let err = state
        .auth
        .register(&ctx, registration("dave", "pw2"))
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::Conflict(_)));

    let mut with_missing_group = registration("erin", "pw");
    with_missing_group.groups = vec!["ghosts".to_string()];
    let err = state
        .auth
        .register(&ctx, with_missing_group)
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::GroupNotFound(ref g) if g == "ghosts"));

    // The failed registration rolled back entirely.
    assert!(state.store.get_user_by_login("erin").await.unwrap().is_none());
}

#[tokio::test]
async fn test_link_credential() {
    let state = spawn_state(test_config()).await;
    let ctx = state.context_from(CLIENT);
    let registered = state
        .auth
        .register(&ctx, registration("frank", "pw"))
        .await
        .unwrap();

    let linked = state
        .auth
        .link_credential(
            &ctx,
            registered.identity,
            CredentialRequest {
                provider: "github".to_string(),
                login: "frank-gh".to_string(),
                email: "frank@example.com".to_string(),
                password: None,
            },
        )
        .await
        .unwrap();
    assert_eq!(linked.auth_id, Some(registered.identity));
    assert!(!linked.has_password);

    let info = state.auth.identity_info(registered.identity).await.unwrap();
    assert_eq!(info.credentials.len(), 2);

    let err = state
        .auth
        .link_credential(
            &ctx,
            IdentityId::new(999),
            CredentialRequest {
                provider: "github".to_string(),
                login: "someone".to_string(),
                ..CredentialRequest::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::IdentityNotFound));

    // A credential without a stored secret never verifies.
    let query = CredentialQuery::by_login("frank-gh");
    assert!(!state.auth.check(&ctx, &query, "").await.unwrap());
}

#[tokio::test]
async fn test_change_and_reset_password() {
    let state = spawn_state(test_config()).await;
    let ctx = state.context_from(CLIENT);
    let registered = state
        .auth
        .register(&ctx, registration("grace", "old-pw"))
        .await
        .unwrap();
    let user = registered.user.id;

    let err = state
        .auth
        .change_password(&ctx, user, "not-it", "new-pw")
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::InvalidCredentials));

    state
        .auth
        .change_password(&ctx, user, "old-pw", "new-pw")
        .await
        .unwrap();
    assert!(state.auth.login(&ctx, "grace", "new-pw").await.is_ok());
    assert!(state.auth.login(&ctx, "grace", "old-pw").await.is_err());

    state
        .auth
        .reset_password(&ctx, user, "after-reset")
        .await
        .unwrap();
    assert!(state.auth.login(&ctx, "grace", "after-reset").await.is_ok());

    let events: Vec<_> = state
        .auth
        .login_history(registered.identity, 10)
        .await
        .unwrap()
        .into_iter()
        .map(|e| e.event)
        .collect();
    assert_eq!(
        events,
        [
            UserEvent::Register,
            UserEvent::PasswordChange,
            UserEvent::Login,
            UserEvent::Forgot,
            UserEvent::Login,
        ]
    );
}

#[tokio::test]
async fn test_retired_identity_cannot_log_in() {
    let state = spawn_state(test_config()).await;
    let ctx = state.context_from(CLIENT);
    let registered = state
        .auth
        .register(&ctx, registration("heidi", "pw"))
        .await
        .unwrap();

    state
        .auth
        .set_identity_state(registered.identity, ActiveState::Disabled)
        .await
        .unwrap();
    let err = state.auth.login(&ctx, "heidi", "pw").await.unwrap_err();
    assert!(matches!(err, AuthError::IdentityInactive(ActiveState::Disabled)));

    // The pure check does not look at identity state.
    let query = CredentialQuery::by_login("heidi");
    assert!(state.auth.check(&ctx, &query, "pw").await.unwrap());

    state
        .auth
        .set_identity_state(registered.identity, ActiveState::Active)
        .await
        .unwrap();
    assert!(state.auth.login(&ctx, "heidi", "pw").await.is_ok());

    let err = state
        .auth
        .set_identity_state(IdentityId::new(999), ActiveState::Deleted)
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::IdentityNotFound));
}

#[tokio::test]
async fn test_group_administration() {
    let state = spawn_state(test_config()).await;
    let ctx = state.context_from(CLIENT);
    let registered = state
        .auth
        .register(&ctx, registration("ivan", "pw"))
        .await
        .unwrap();
    let identity = registered.identity;

    let staff = state.auth.create_group("staff", "Staff").await.unwrap();
    assert_eq!(staff.name, "staff");
    let err = state.auth.create_group("staff", "").await.unwrap_err();
    assert!(matches!(err, AuthError::Conflict(_)));

    assert!(state.auth.grant_group(identity, "admin").await.unwrap());
    assert!(!state.auth.grant_group(identity, "admin").await.unwrap());
    assert!(state.auth.grant_group(identity, "staff").await.unwrap());
    assert!(state.auth.in_group(identity, "admin").await.unwrap());
    assert_eq!(
        state.auth.group_list(identity).await.unwrap(),
        "users,admin,staff"
    );

    assert!(state.auth.revoke_group(identity, "admin").await.unwrap());
    assert!(!state.auth.in_group(identity, "admin").await.unwrap());
    assert_eq!(state.auth.group_list(identity).await.unwrap(), "users,staff");

    let err = state
        .auth
        .grant_group(identity, "ghosts")
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::GroupNotFound(_)));
}

#[tokio::test]
async fn test_identity_info_reports_last_event() {
    let state = spawn_state(test_config()).await;
    let ctx = state.context_from(CLIENT);
    let registered = state
        .auth
        .register(&ctx, registration("judy", "pw"))
        .await
        .unwrap();

    state
        .auth
        .record_event(&ctx, registered.user.id, UserEvent::Login)
        .await
        .unwrap();

    let info = state.auth.identity_info(registered.identity).await.unwrap();
    assert_eq!(info.display_name, "judy");
    assert_eq!(info.active, ActiveState::Active);
    assert_eq!(info.groups, ["users"]);
    assert_eq!(info.last_login.map(|e| e.event), Some(UserEvent::Login));
}

#[tokio::test]
async fn test_profile_requires_configured_kind() {
    let state = spawn_state(test_config()).await;
    let ctx = state.context_from(CLIENT);
    let registered = state
        .auth
        .register(&ctx, registration("kim", "pw"))
        .await
        .unwrap();
    assert!(state
        .auth
        .get_profile(&ctx, registered.identity)
        .await
        .unwrap()
        .is_none());

    let mut config = test_config();
    config.auth.auth_profile = Some(USER_PROFILE.to_string());
    let state = spawn_state(config).await;
    let ctx = state.context_from(CLIENT);
    let registered = state
        .auth
        .register(&ctx, registration("lee", "pw"))
        .await
        .unwrap();

    let first = state
        .auth
        .get_profile(&ctx, registered.identity)
        .await
        .unwrap()
        .unwrap();
    let second = state
        .auth
        .get_profile(&ctx, registered.identity)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(first["id"], second["id"]);
    assert_eq!(first["auth_id"], registered.identity.value());

    let err = state
        .auth
        .get_profile(&ctx, IdentityId::new(999))
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::IdentityNotFound));
}

#[tokio::test]
async fn test_concurrent_profile_requests_share_one_row() {
    let mut config = test_config();
    config.general.max_db_connections = 4;
    config.auth.auth_profile = Some(USER_PROFILE.to_string());
    let state = spawn_state(config).await;
    let ctx = state.context_from(CLIENT);

    for round in 0..5 {
        let registered = state
            .auth
            .register(&ctx, registration(&format!("user{round}"), "pw"))
            .await
            .unwrap();
        let identity = registered.identity;

        let mut handles = Vec::new();
        for _ in 0..8 {
            let state = state.clone();
            let ctx = ctx.clone();
            handles.push(tokio::spawn(async move {
                state.auth.get_profile(&ctx, identity).await
            }));
        }

        let mut ids = Vec::new();
        for handle in handles {
            let profile = handle
                .await
                .unwrap()
                .expect("get_profile failed")
                .expect("profile kind configured");
            ids.push(profile["id"].as_i64().unwrap());
        }
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), 1, "round {round} created several profiles");
    }
}

#[tokio::test]
async fn test_retired_identity_keeps_legacy_hash() {
    let mut config = test_config();
    config.auth.fallback_auth = Some(LEGACY_ARGON2.to_string());
    config.security.upgrade_legacy_hashes = true;
    let state = spawn_state(config).await;
    let ctx = state.context_from(CLIENT);
    let registered = state
        .auth
        .register(&ctx, registration("mallory", "unused"))
        .await
        .unwrap();

    let salt = SaltString::generate(&mut OsRng);
    let legacy = Argon2::default()
        .hash_password(b"old secret", &salt)
        .unwrap()
        .to_string();
    UserRepository::new(&state.store.conn)
        .set_password_hash(registered.user.id, &HashedCredential::new(legacy.clone()))
        .await
        .unwrap();

    state
        .auth
        .set_identity_state(registered.identity, ActiveState::Disabled)
        .await
        .unwrap();
    let err = state
        .auth
        .login(&ctx, "mallory", "old secret")
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::IdentityInactive(ActiveState::Disabled)));

    let row = state
        .store
        .get_user_by_id(registered.user.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(row.password_hash, legacy);

    state
        .auth
        .set_identity_state(registered.identity, ActiveState::Active)
        .await
        .unwrap();
    state.auth.login(&ctx, "mallory", "old secret").await.unwrap();
    let row = state
        .store
        .get_user_by_id(registered.user.id)
        .await
        .unwrap()
        .unwrap();
    assert!(row.password_hash.starts_with("$2"));
}
