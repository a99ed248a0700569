//! Integration tests for policy-based authorization over session tokens.

mod helpers;

use helpers::{ADMIN_PASSWORD, ADMIN_USERNAME, TestApp, test_config};
use warden_auth::PolicyRegistry;
use warden_auth::policy::defaults::{ADMIN_OR_MANAGER_POLICY, ADMIN_POLICY, VIP_POLICY};
use warden_core::config::PolicyDefinition;
use warden_core::error::ErrorKind;
use warden_entity::{ClaimSet, PrincipalId};

async fn token_for(app: &TestApp, username: &str, roles: &str) -> String {
    app.create_member(username, "secret1", roles).await;
    app.engine
        .login(username, "secret1")
        .await
        .unwrap()
        .session
        .token
}

#[tokio::test]
async fn test_admin_or_manager() {
    let app = TestApp::new().await;
    let manager = token_for(&app, "mia", "manager").await;
    let player = token_for(&app, "pat", "player").await;
    let admin = app
        .engine
        .login(ADMIN_USERNAME, ADMIN_PASSWORD)
        .await
        .unwrap()
        .session
        .token;

    assert!(app.engine.authorize_token(&manager, ADMIN_OR_MANAGER_POLICY).unwrap());
    assert!(app.engine.authorize_token(&admin, ADMIN_OR_MANAGER_POLICY).unwrap());
    assert!(!app.engine.authorize_token(&player, ADMIN_OR_MANAGER_POLICY).unwrap());
    assert!(!app.engine.authorize_token(&manager, ADMIN_POLICY).unwrap());
}

#[tokio::test]
async fn test_vip_requires_player_role_and_vip_email() {
    let app = TestApp::new().await;
    let vip_player = token_for(&app, "vip.ana@x.com", "player").await;
    let plain_player = token_for(&app, "ana@x.com", "player").await;
    let vip_manager = token_for(&app, "vip.mia@x.com", "manager").await;

    assert!(app.engine.authorize_token(&vip_player, VIP_POLICY).unwrap());
    assert!(!app.engine.authorize_token(&plain_player, VIP_POLICY).unwrap());
    assert!(!app.engine.authorize_token(&vip_manager, VIP_POLICY).unwrap());
}

#[tokio::test]
async fn test_configured_claim_policy() {
    let app = TestApp::new().await;
    let view = app
        .admin
        .create_member(&helpers::member_request("sam", "Sam", "Ullah", "secret1", ""))
        .await
        .unwrap();
    let token = app.engine.login("sam", "secret1").await.unwrap().session.token;
    let other = token_for(&app, "kim", "player").await;

    assert!(app.engine.authorize_token(&token, "ullah-surname").unwrap());
    assert!(!app.engine.authorize_token(&other, "ullah-surname").unwrap());
    assert_eq!(view.last_name, "ullah");
}

#[tokio::test]
async fn test_claims_from_token_match_principal() {
    let app = TestApp::new().await;
    let token = token_for(&app, "mia", "manager").await;

    let claims = app.engine.verify_token(&token).unwrap();
    let set = ClaimSet::from(&claims);
    assert!(set.has_role("manager"));
    assert!(set.has_claim("email", "mia"));
    assert!(set.has_claim("tenant", "blue"));
    assert!(app.engine.authorize(&set, ADMIN_OR_MANAGER_POLICY).unwrap());
}

#[tokio::test]
async fn test_admin_email_policy_uses_stored_claims() {
    let app = TestApp::new().await;
    let admin = app.principal(ADMIN_USERNAME).await;
    let player = app.create_member("pat", "secret1", "player").await;

    assert!(app.engine.authorize_principal(admin.id, "admin-email").await.unwrap());
    assert!(!app.engine.authorize_principal(player.id, "admin-email").await.unwrap());
    assert!(app.engine.policies().contains("admin-email"));

    let err = app
        .engine
        .authorize_principal(PrincipalId::new(), "admin-email")
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);
}

#[tokio::test]
async fn test_demo_accounts_satisfy_their_policies() {
    let app = TestApp::with_demo_accounts().await;
    let manager = app.principal("manager@gmail.com").await;
    let player = app.principal("player@gmail.com").await;
    let vip = app.principal("vipplayer@gmail.com").await;

    assert!(app.engine.authorize_principal(manager.id, ADMIN_OR_MANAGER_POLICY).await.unwrap());
    assert!(app.engine.authorize_principal(player.id, "ullah-surname").await.unwrap());
    assert!(!app.engine.authorize_principal(manager.id, "ullah-surname").await.unwrap());
    assert!(app.engine.authorize_principal(vip.id, VIP_POLICY).await.unwrap());
    assert!(!app.engine.authorize_principal(player.id, VIP_POLICY).await.unwrap());

    // Demo accounts share the admin password and are pre-confirmed.
    app.engine.login("player@gmail.com", ADMIN_PASSWORD).await.unwrap();
}

#[tokio::test]
async fn test_tampered_token_is_rejected() {
    let app = TestApp::new().await;
    let token = token_for(&app, "pat", "player").await;

    let mut parts: Vec<String> = token.split('.').map(str::to_string).collect();
    let payload = parts[1].clone();
    let flipped = if payload.ends_with('A') { 'B' } else { 'A' };
    parts[1] = format!("{}{}", &payload[..payload.len() - 1], flipped);
    let tampered = parts.join(".");

    let err = app
        .engine
        .authorize_token(&tampered, ADMIN_OR_MANAGER_POLICY)
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::InvalidToken);

    let err = app.engine.verify_token("").unwrap_err();
    assert_eq!(err.kind, ErrorKind::InvalidToken);
}

#[tokio::test]
async fn test_unregistered_policy_is_configuration_error() {
    let app = TestApp::new().await;
    let token = token_for(&app, "pat", "player").await;

    let err = app.engine.authorize_token(&token, "no-such-policy").unwrap_err();
    assert_eq!(err.kind, ErrorKind::Configuration);
    assert!(err.is_fatal());
}

#[test]
fn test_required_policy_must_resolve() {
    let mut config = test_config().authorization;
    config.required_policies.push("billing".into());
    let err = PolicyRegistry::from_config(&config).unwrap_err();
    assert_eq!(err.kind, ErrorKind::Configuration);

    config.policies.push(PolicyDefinition {
        name: "billing".into(),
        roles: vec!["admin".into()],
        claim_type: None,
        claim_value: None,
    });
    let registry = PolicyRegistry::from_config(&config).unwrap();
    assert!(registry.contains("billing"));
}

#[test]
fn test_incomplete_claim_policy_fails_startup() {
    let mut config = test_config().authorization;
    config.policies.push(PolicyDefinition {
        name: "half".into(),
        roles: vec![],
        claim_type: Some("family_name".into()),
        claim_value: None,
    });
    let err = PolicyRegistry::from_config(&config).unwrap_err();
    assert_eq!(err.kind, ErrorKind::Configuration);
}
