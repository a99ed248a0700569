//! Integration tests for registration, email confirmation, and password reset.

mod helpers;

use helpers::{TestApp, link_token, register_request};
use warden_core::error::ErrorKind;
use warden_core::traits::CredentialStore;

#[tokio::test]
async fn test_register_sends_confirmation_and_assigns_default_role() {
    let app = TestApp::new().await;

    let principal = app
        .engine
        .register(&register_request("Ana@X.com", "secret1"))
        .await
        .unwrap();
    assert_eq!(principal.username, "ana@x.com");
    assert_eq!(principal.email.as_deref(), Some("ana@x.com"));
    assert!(!principal.email_confirmed);
    assert_eq!(principal.roles, vec!["player".to_string()]);
    assert_eq!(principal.first_name, "robert");

    let mail = app.outbox.last_to("ana@x.com").await.expect("confirmation");
    assert_eq!(mail.subject, "Confirm your email");
    assert!(mail.html_body.contains("localhost:4200&#x2F;account&#x2F;confirm-email?token="));
    assert!(!link_token(&mail).is_empty());
}

#[tokio::test]
async fn test_duplicate_email_differs_only_in_case() {
    let app = TestApp::new().await;
    app.engine
        .register(&register_request("a@x.com", "secret1"))
        .await
        .unwrap();

    let err = app
        .engine
        .register(&register_request("A@X.com", "secret2"))
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::DuplicateAccount);
    assert_eq!(app.outbox.sent().await.len(), 1);
}

#[tokio::test]
async fn test_invalid_registration_input_is_rejected() {
    let app = TestApp::new().await;

    let mut request = register_request("not-an-email", "secret1");
    let err = app.engine.register(&request).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::Validation);

    request.email = "ok@x.com".into();
    request.last_name = "Li".into();
    let err = app.engine.register(&request).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::Validation);

    let err = app
        .engine
        .register(&register_request("ok@x.com", "123"))
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Validation);
    assert!(app.store.find_by_email("ok@x.com").await.unwrap().is_none());
}

#[tokio::test]
async fn test_confirmation_token_is_single_use() {
    let app = TestApp::new().await;
    app.engine
        .register(&register_request("ana@x.com", "secret1"))
        .await
        .unwrap();
    let token = link_token(&app.outbox.last_to("ana@x.com").await.unwrap());

    app.engine.confirm_email("ana@x.com", &token).await.unwrap();
    app.engine.login("ana@x.com", "secret1").await.unwrap();

    let err = app
        .engine
        .confirm_email("ana@x.com", &token)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::InvalidToken);
}

#[tokio::test]
async fn test_confirmation_rejects_bad_tokens_uniformly() {
    let app = TestApp::new().await;
    app.engine
        .register(&register_request("ana@x.com", "secret1"))
        .await
        .unwrap();

    for (email, token) in [
        ("ana@x.com", "not base64 at all!"),
        ("ana@x.com", "d3Jvbmc"),
        ("ghost@x.com", "d3Jvbmc"),
    ] {
        let err = app.engine.confirm_email(email, token).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidToken, "{email} / {token}");
    }

    let stored = app.store.find_by_email("ana@x.com").await.unwrap().unwrap();
    assert!(!stored.email_confirmed);
}

#[tokio::test]
async fn test_resend_confirmation() {
    let app = TestApp::new().await;
    app.engine
        .register(&register_request("ana@x.com", "secret1"))
        .await
        .unwrap();

    app.engine
        .resend_confirmation_email("ana@x.com")
        .await
        .unwrap();
    assert_eq!(app.outbox.sent().await.len(), 2);

    let token = link_token(&app.outbox.last_to("ana@x.com").await.unwrap());
    app.engine.confirm_email("ana@x.com", &token).await.unwrap();

    let err = app
        .engine
        .resend_confirmation_email("ana@x.com")
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Validation);

    let err = app
        .engine
        .resend_confirmation_email("ghost@x.com")
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);
}

#[tokio::test]
async fn test_delivery_failure_keeps_account() {
    let app = TestApp::new().await;
    app.outbox.set_accepting(false);

    let err = app
        .engine
        .register(&register_request("ana@x.com", "secret1"))
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Delivery);
    assert!(app.store.find_by_email("ana@x.com").await.unwrap().is_some());

    app.outbox.set_accepting(true);
    app.engine
        .resend_confirmation_email("ana@x.com")
        .await
        .unwrap();
    assert!(app.outbox.last_to("ana@x.com").await.is_some());
}

#[tokio::test]
async fn test_forgot_and_reset_password() {
    let app = TestApp::new().await;
    app.register_confirmed("ana@x.com", "secret1").await;

    app.engine
        .forgot_username_or_password("ana@x.com")
        .await
        .unwrap();
    let mail = app.outbox.last_to("ana@x.com").await.unwrap();
    assert_eq!(mail.subject, "Forgot your username or password");
    assert!(mail.html_body.contains("Username: ana@x.com"));
    let token = link_token(&mail);

    app.engine
        .reset_password("ana@x.com", &token, "brand-new")
        .await
        .unwrap();

    let err = app.engine.login("ana@x.com", "secret1").await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::InvalidCredential);
    app.engine.login("ana@x.com", "brand-new").await.unwrap();

    let err = app
        .engine
        .reset_password("ana@x.com", &token, "another-one")
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::InvalidToken);
}

#[tokio::test]
async fn test_reset_requires_policy_compliant_password() {
    let app = TestApp::new().await;
    app.register_confirmed("ana@x.com", "secret1").await;
    app.engine
        .forgot_username_or_password("ana@x.com")
        .await
        .unwrap();
    let token = link_token(&app.outbox.last_to("ana@x.com").await.unwrap());

    let err = app
        .engine
        .reset_password("ana@x.com", &token, "abc")
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Validation);

    // The token survives a rejected password.
    app.engine
        .reset_password("ana@x.com", &token, "valid-one")
        .await
        .unwrap();
}

#[tokio::test]
async fn test_forgot_password_requires_confirmed_email() {
    let app = TestApp::new().await;
    app.engine
        .register(&register_request("ana@x.com", "secret1"))
        .await
        .unwrap();

    let err = app
        .engine
        .forgot_username_or_password("ana@x.com")
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::UnconfirmedEmail);

    let err = app
        .engine
        .forgot_username_or_password("ghost@x.com")
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);

    let err = app
        .engine
        .reset_password("ana@x.com", "d3Jvbmc", "secret2")
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::UnconfirmedEmail);
}
