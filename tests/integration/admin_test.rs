//! Integration tests for administrative member management.

mod helpers;

use helpers::{ADMIN_PASSWORD, ADMIN_USERNAME, TestApp, member_request};
use warden_core::error::ErrorKind;
use warden_entity::PrincipalId;

#[tokio::test]
async fn test_super_admin_is_untouchable() {
    let app = TestApp::new().await;
    let admin_id = app.principal(ADMIN_USERNAME).await.id;
    let edit = member_request("renamed", "a", "b", "", "player");

    let results = [
        app.admin.lock_member(admin_id).await.map(|_| ()),
        app.admin.unlock_member(admin_id).await,
        app.admin.delete_member(admin_id).await,
        app.admin.edit_member(admin_id, &edit).await.map(|_| ()),
    ];
    for result in results {
        assert_eq!(
            result.unwrap_err().kind,
            ErrorKind::ProtectedAccountModification
        );
    }

    let err = app.admin.get_member(admin_id).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);

    // Still intact and able to log in.
    let admin = app.principal(ADMIN_USERNAME).await;
    assert!(admin.lockout.lockout_end.is_none());
    app.engine
        .login(ADMIN_USERNAME, ADMIN_PASSWORD)
        .await
        .unwrap();
}

#[tokio::test]
async fn test_cannot_create_or_rename_into_super_admin() {
    let app = TestApp::new().await;

    let err = app
        .admin
        .create_member(&member_request("Admin@Gmail.com", "a", "b", "secret1", ""))
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::ProtectedAccountModification);

    let bob = app.create_member("bob", "secret1", "player").await;
    let err = app
        .admin
        .edit_member(bob.id, &member_request(ADMIN_USERNAME, "a", "b", "", ""))
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::ProtectedAccountModification);
}

#[tokio::test]
async fn test_list_excludes_super_admin() {
    let app = TestApp::new().await;
    app.create_member("bob", "secret1", "player").await;
    app.create_member("eve", "secret1", "manager").await;

    let members = app.admin.list_members().await.unwrap();
    let mut names: Vec<_> = members.iter().map(|m| m.username.as_str()).collect();
    names.sort_unstable();
    assert_eq!(names, vec!["bob", "eve"]);
}

#[tokio::test]
async fn test_create_member_keeps_known_roles_only() {
    let app = TestApp::new().await;

    let view = app
        .admin
        .create_member(&member_request(
            "Zed",
            "Zed",
            "Zulu",
            "secret1",
            "Manager, player, ghost,,",
        ))
        .await
        .unwrap();
    assert_eq!(view.username, "zed");
    assert_eq!(view.first_name, "zed");
    assert!(!view.is_locked);

    let mut roles = view.roles.clone();
    roles.sort();
    assert_eq!(roles, vec!["manager".to_string(), "player".to_string()]);

    // Admin-created members are confirmed and can sign in immediately.
    app.engine.login("zed", "secret1").await.unwrap();
}

#[tokio::test]
async fn test_create_member_rejections() {
    let app = TestApp::new().await;
    app.create_member("bob", "secret1", "").await;

    let err = app
        .admin
        .create_member(&member_request("BOB", "a", "b", "secret1", ""))
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::DuplicateAccount);

    let err = app
        .admin
        .create_member(&member_request("carl", "a", "b", "123", ""))
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Validation);

    let err = app
        .admin
        .create_member(&member_request("", "a", "b", "secret1", ""))
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Validation);
}

#[tokio::test]
async fn test_lock_and_unlock_member() {
    let app = TestApp::new().await;
    let bob = app.create_member("bob", "secret1", "player").await;

    let until = app.admin.lock_member(bob.id).await.unwrap();
    assert!(app.admin.get_member(bob.id).await.unwrap().is_locked);

    let err = app.engine.login("bob", "secret1").await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::Locked);
    assert_eq!(err.locked_until, Some(until));

    app.admin.unlock_member(bob.id).await.unwrap();
    let view = app.admin.get_member(bob.id).await.unwrap();
    assert!(!view.is_locked);
    assert_eq!(app.principal("bob").await.lockout.failed_attempts, 0);
    app.engine.login("bob", "secret1").await.unwrap();
}

#[tokio::test]
async fn test_edit_member_replaces_profile_roles_and_password() {
    let app = TestApp::new().await;
    let bob = app.create_member("bob", "secret1", "player").await;

    let view = app
        .admin
        .edit_member(
            bob.id,
            &member_request("Robert", "Robert", "Ullah", "", "manager"),
        )
        .await
        .unwrap();
    assert_eq!(view.username, "robert");
    assert_eq!(view.last_name, "ullah");
    assert_eq!(view.roles, vec!["manager".to_string()]);

    // Empty password keeps the old one.
    app.engine.login("robert", "secret1").await.unwrap();

    app.admin
        .edit_member(
            bob.id,
            &member_request("robert", "Robert", "Ullah", "changed1", ""),
        )
        .await
        .unwrap();
    let err = app.engine.login("robert", "secret1").await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::InvalidCredential);
    let login = app.engine.login("robert", "changed1").await.unwrap();
    assert!(login.principal.roles.is_empty());
}

#[tokio::test]
async fn test_delete_member() {
    let app = TestApp::new().await;
    let bob = app.create_member("bob", "secret1", "player").await;

    app.admin.delete_member(bob.id).await.unwrap();

    let err = app.admin.get_member(bob.id).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);
    let err = app.admin.delete_member(bob.id).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);
    let err = app.engine.login("bob", "secret1").await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::InvalidCredential);
}

#[tokio::test]
async fn test_unknown_member_is_not_found() {
    let app = TestApp::new().await;
    let err = app.admin.lock_member(PrincipalId::new()).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);
}
