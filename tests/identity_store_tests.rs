//! Identity store lookups against a throwaway SQLite file.

use gatekeep::auth::PasswordHasher;
use gatekeep::db::repositories::group::GroupRepository;
use gatekeep::db::repositories::identity::IdentityRepository;
use gatekeep::db::repositories::user::UserRepository;
use gatekeep::db::repositories::user_log::UserLogRepository;
use gatekeep::db::{LOCAL_PROVIDER, NewUser, Store};
use gatekeep::domain::{ActiveState, GroupId, IdentityId, UserEvent, UserId};
use std::net::{IpAddr, Ipv4Addr};

async fn open_store() -> Store {
    let db_path =
        std::env::temp_dir().join(format!("gatekeep-store-test-{}.db", uuid::Uuid::new_v4()));
    Store::with_pool_options(&format!("sqlite:{}", db_path.display()), 1, 1)
        .await
        .expect("failed to open store")
}

async fn seed_identity(store: &Store, login: &str) -> (IdentityId, UserId) {
    let identity = IdentityRepository::new(&store.conn)
        .create(login)
        .await
        .unwrap();
    let hash = PasswordHasher::new(4).unwrap().hash(b"secret").unwrap();
    let user = UserRepository::new(&store.conn)
        .create(NewUser {
            auth_id: Some(IdentityId::new(identity.id)),
            provider: LOCAL_PROVIDER.to_string(),
            login: login.to_string(),
            email: format!("{login}@example.com"),
            password_hash: Some(hash),
        })
        .await
        .unwrap();
    (IdentityId::new(identity.id), UserId::new(user.id))
}

const LOCALHOST: IpAddr = IpAddr::V4(Ipv4Addr::LOCALHOST);

#[tokio::test]
async fn test_lookups_return_none_when_missing() {
    let store = open_store().await;

    assert!(store.get_user_by_id(UserId::new(42)).await.unwrap().is_none());
    assert!(store.get_user_by_login("nobody").await.unwrap().is_none());
    assert!(store.get_user_by_email("nobody@example.com").await.unwrap().is_none());
    assert!(store.get_identity(IdentityId::new(42)).await.unwrap().is_none());
    assert!(store.get_group_by_name("ghosts").await.unwrap().is_none());
    assert!(store.last_login(IdentityId::new(42)).await.unwrap().is_none());
    assert!(!store.in_group(IdentityId::new(42), "users").await.unwrap());
    assert_eq!(store.group_list(IdentityId::new(42)).await.unwrap(), "");
}

#[tokio::test]
async fn test_lookups_find_seeded_rows() {
    let store = open_store().await;
    let (identity, user) = seed_identity(&store, "alice").await;

    let by_id = store.get_user_by_id(user).await.unwrap().unwrap();
    assert_eq!(by_id.login, "alice");
    assert_eq!(by_id.auth_id, Some(identity.value()));
    assert!(by_id.salt.is_none());
    assert!(by_id.password_hash.starts_with("$2"));

    let by_login = store.get_user_by_login("alice").await.unwrap().unwrap();
    assert_eq!(by_login.id, user.value());

    let by_email = store
        .get_user_by_email("alice@example.com")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(by_email.id, user.value());

    let credentials = store.list_credentials(identity).await.unwrap();
    assert_eq!(credentials.len(), 1);
    assert!(credentials[0].has_password);

    let record = store.get_identity(identity).await.unwrap().unwrap();
    assert_eq!(record.display_name, "alice");
    assert_eq!(record.active, ActiveState::Active);
}

#[tokio::test]
async fn test_in_group_and_group_list() {
    let store = open_store().await;
    let (identity, _) = seed_identity(&store, "bob").await;
    let groups = GroupRepository::new(&store.conn);

    let staff = groups.create("staff", "Staff").await.unwrap();
    let admin = groups.create("admin", "Admin Group").await.unwrap();
    groups.create("unused", "").await.unwrap();

    // Granted in reverse creation order; listing follows creation order.
    assert!(groups.add_member(identity, GroupId::new(admin.id)).await.unwrap());
    assert!(groups.add_member(identity, GroupId::new(staff.id)).await.unwrap());
    assert!(!groups.add_member(identity, GroupId::new(staff.id)).await.unwrap());

    assert!(store.in_group(identity, "staff").await.unwrap());
    assert!(store.in_group(identity, "admin").await.unwrap());
    assert!(!store.in_group(identity, "unused").await.unwrap());
    assert!(!store.in_group(identity, "missing").await.unwrap());
    assert_eq!(store.group_list(identity).await.unwrap(), "staff,admin");

    assert!(groups.remove_member(identity, GroupId::new(admin.id)).await.unwrap());
    assert!(!groups.remove_member(identity, GroupId::new(admin.id)).await.unwrap());
    assert_eq!(store.group_list(identity).await.unwrap(), "staff");
}

#[tokio::test]
async fn test_duplicate_group_name_is_rejected() {
    let store = open_store().await;
    let groups = GroupRepository::new(&store.conn);

    groups.create("users", "User Group").await.unwrap();
    let err = groups.create("users", "again").await.unwrap_err();
    let db_err = err.downcast_ref::<sea_orm::DbErr>().expect("db error");
    assert!(gatekeep::auth::error::is_unique_violation(db_err));
    assert_eq!(store.list_groups().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_same_login_provider_identity_is_unique() {
    let store = open_store().await;
    let (identity, _) = seed_identity(&store, "carol").await;

    let err = UserRepository::new(&store.conn)
        .create(NewUser {
            auth_id: Some(identity),
            provider: LOCAL_PROVIDER.to_string(),
            login: "carol".to_string(),
            email: String::new(),
            password_hash: None,
        })
        .await
        .unwrap_err();
    let db_err = err.downcast_ref::<sea_orm::DbErr>().expect("db error");
    assert!(gatekeep::auth::error::is_unique_violation(db_err));

    // A different provider for the same login is a separate binding.
    UserRepository::new(&store.conn)
        .create(NewUser {
            auth_id: Some(identity),
            provider: "github".to_string(),
            login: "carol".to_string(),
            email: String::new(),
            password_hash: None,
        })
        .await
        .unwrap();
    assert_eq!(store.list_credentials(identity).await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_last_login_and_history() {
    let store = open_store().await;
    let (identity, user) = seed_identity(&store, "dave").await;
    let log = UserLogRepository::new(&store.conn);

    log.append(Some(identity), Some(user), LOCALHOST, UserEvent::Register)
        .await
        .unwrap();
    log.append(Some(identity), Some(user), LOCALHOST, UserEvent::Login)
        .await
        .unwrap();
    let remote: IpAddr = "2001:db8::1".parse().unwrap();
    log.append(Some(identity), Some(user), remote, UserEvent::PasswordChange)
        .await
        .unwrap();

    let last = store.last_login(identity).await.unwrap().unwrap();
    assert_eq!(last.event, UserEvent::PasswordChange);
    assert_eq!(last.ip_addr, "2001:db8::1");

    let history = store.login_history(identity, 2).await.unwrap();
    let events: Vec<_> = history.iter().map(|e| e.event).collect();
    assert_eq!(events, [UserEvent::Login, UserEvent::PasswordChange]);

    let all = store.login_history(identity, 10).await.unwrap();
    assert_eq!(all.len(), 3);
    assert_eq!(all[0].event, UserEvent::Register);
}

#[tokio::test]
async fn test_identity_state_changes() {
    let store = open_store().await;
    let (identity, _) = seed_identity(&store, "erin").await;
    let identities = IdentityRepository::new(&store.conn);

    assert!(identities.set_state(identity, ActiveState::Deleted).await.unwrap());
    assert_eq!(
        store.get_identity(identity).await.unwrap().unwrap().active,
        ActiveState::Deleted
    );
    assert!(!identities
        .set_state(IdentityId::new(999), ActiveState::Disabled)
        .await
        .unwrap());
}

#[tokio::test]
async fn test_store_creates_missing_directories() {
    let root = std::env::temp_dir().join(format!("gatekeep-dir-test-{}", uuid::Uuid::new_v4()));
    let db_path = root.join("nested").join("auth.db");

    let store = Store::with_pool_options(&format!("sqlite:{}", db_path.display()), 1, 1)
        .await
        .expect("failed to open store");
    assert!(db_path.exists());
    drop(store);

    // A regular file where the directory should be cannot be created over.
    let blocker = root.join("blocker");
    std::fs::write(&blocker, b"").unwrap();
    let err = Store::with_pool_options(
        &format!("sqlite:{}", blocker.join("auth.db").display()),
        1,
        1,
    )
    .await
    .err()
    .expect("opening under a file should fail");
    assert!(format!("{err:#}").contains("Failed to create database directory"));

    std::fs::remove_dir_all(&root).ok();
}
