//! Integration tests for third-party registration and login.

mod helpers;

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use helpers::{TestApp, member_request, test_config};
use jsonwebtoken::{Algorithm, EncodingKey, Header, encode};
use mockito::{Matcher, Server, ServerGuard};
use serde_json::json;
use warden_auth::third_party::{JwksKeySource, StaticKeySource};
use warden_auth::{
    RemoteIntrospectionVerifier, SignedAssertionVerifier, ThirdPartyRegisterRequest,
    ThirdPartyRequest, ThirdPartyValidators,
};
use warden_core::error::ErrorKind;
use warden_entity::ExternalProvider;

const KID: &str = "google-test-key";
const CLIENT_ID: &str = "test-client.apps.googleusercontent.com";
const SIGNING_KEY: &[u8] = include_bytes!("../fixtures/google_rsa.pem");
const PUBLIC_KEY: &[u8] = include_bytes!("../fixtures/google_rsa_pub.pem");
const ROGUE_KEY: &[u8] = include_bytes!("../fixtures/rogue_rsa.pem");

fn google_validators() -> ThirdPartyValidators {
    let config = test_config();
    let keys = StaticKeySource::new().with_rsa_pem(KID, PUBLIC_KEY).unwrap();
    let verifier = SignedAssertionVerifier::new(&config.third_party.google, Arc::new(keys)).unwrap();
    ThirdPartyValidators::new().with_validator(ExternalProvider::Google, Arc::new(verifier))
}

fn facebook_validators(server: &ServerGuard) -> ThirdPartyValidators {
    let mut facebook = test_config().third_party.facebook;
    facebook.introspection_url = format!("{}/debug_token", server.url());
    let verifier = RemoteIntrospectionVerifier::new(&facebook).unwrap();
    ThirdPartyValidators::new().with_validator(ExternalProvider::Facebook, Arc::new(verifier))
}

/// Signs a Google-style assertion with the given key.
fn sign(key: &[u8], aud: &str, iss: &str, exp_offset_secs: i64, sub: &str) -> String {
    let mut header = Header::new(Algorithm::RS256);
    header.kid = Some(KID.to_string());
    let claims = json!({
        "aud": aud,
        "iss": iss,
        "exp": Utc::now().timestamp() + exp_offset_secs,
        "sub": sub,
    });
    encode(&header, &claims, &EncodingKey::from_rsa_pem(key).unwrap()).unwrap()
}

fn valid_google_token(sub: &str) -> String {
    sign(SIGNING_KEY, CLIENT_ID, "https://accounts.google.com", 3600, sub)
}

fn request(provider: &str, token: &str, user_id: &str) -> ThirdPartyRequest {
    ThirdPartyRequest {
        provider: provider.into(),
        access_token: token.into(),
        user_id: user_id.into(),
    }
}

fn register_request(provider: &str, token: &str, user_id: &str) -> ThirdPartyRegisterRequest {
    ThirdPartyRegisterRequest {
        first_name: "Grace".into(),
        last_name: "Hopper".into(),
        assertion: request(provider, token, user_id),
    }
}

#[tokio::test]
async fn test_google_register_then_login() {
    let app = TestApp::with_validators(google_validators()).await;
    let token = valid_google_token("g-123");

    let registered = app
        .engine
        .register_third_party(&register_request("google", &token, "g-123"))
        .await
        .unwrap();
    assert_eq!(registered.principal.username, "google:g-123");
    assert_eq!(registered.principal.external_id.as_deref(), Some("g-123"));
    assert_eq!(registered.principal.provider, Some(ExternalProvider::Google));
    assert!(registered.principal.email_confirmed);
    assert!(registered.principal.email.is_none());
    assert!(registered.principal.has_role("player"));

    let login = app
        .engine
        .login_third_party(&request("Google", &token, "g-123"))
        .await
        .unwrap();
    assert_eq!(login.principal.id, registered.principal.id);
    let claims = app.engine.verify_token(&login.session.token).unwrap();
    assert_eq!(claims.email, "google:g-123");
}

#[tokio::test]
async fn test_third_party_login_never_creates_account() {
    let app = TestApp::with_validators(google_validators()).await;
    let token = valid_google_token("g-404");

    let err = app
        .engine
        .login_third_party(&request("google", &token, "g-404"))
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::InvalidCredential);
    assert_eq!(err.message, "Unable to find your account");
}

#[tokio::test]
async fn test_duplicate_third_party_registration() {
    let app = TestApp::with_validators(google_validators()).await;
    let token = valid_google_token("g-123");
    app.engine
        .register_third_party(&register_request("google", &token, "g-123"))
        .await
        .unwrap();

    let err = app
        .engine
        .register_third_party(&register_request("google", &token, "g-123"))
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::DuplicateAccount);
}

#[tokio::test]
async fn test_google_rejections() {
    let app = TestApp::with_validators(google_validators()).await;

    let cases = [
        (
            "wrong audience",
            sign(SIGNING_KEY, "someone-else", "accounts.google.com", 3600, "g-1"),
            "g-1",
        ),
        (
            "untrusted issuer",
            sign(SIGNING_KEY, CLIENT_ID, "https://evil.example", 3600, "g-1"),
            "g-1",
        ),
        (
            "expired",
            sign(SIGNING_KEY, CLIENT_ID, "accounts.google.com", -60, "g-1"),
            "g-1",
        ),
        (
            "subject mismatch",
            sign(SIGNING_KEY, CLIENT_ID, "accounts.google.com", 3600, "g-1"),
            "g-2",
        ),
        (
            "foreign signature",
            sign(ROGUE_KEY, CLIENT_ID, "accounts.google.com", 3600, "g-1"),
            "g-1",
        ),
        ("garbage", "not-a-jwt".to_string(), "g-1"),
    ];

    for (name, token, user_id) in cases {
        let err = app
            .engine
            .register_third_party(&register_request("google", &token, user_id))
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::ExternalValidationFailure, "{name}");
    }
}

#[tokio::test]
async fn test_unconfigured_provider_is_rejected() {
    let app = TestApp::with_validators(google_validators()).await;
    let err = app
        .engine
        .login_third_party(&request("facebook", "anything", "fb-1"))
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::ExternalValidationFailure);

    let err = app
        .engine
        .login_third_party(&request("myspace", "anything", "x"))
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Validation);
}

#[tokio::test]
async fn test_google_keys_from_jwks_endpoint() {
    let mut server = Server::new_async().await;
    let jwks = json!({
        "keys": [{
            "kty": "RSA",
            "use": "sig",
            "alg": "RS256",
            "kid": KID,
            "n": "lrmZR6EzhRA5qW4nhTaGLYuAodsqvEkpHs-yskcSs90ldCgJu21Gt4n_FIAY37EY3RA2NoMA0CWknKtyP8xjjmsA7jnm2eonkOdeySLkL2Iz41ESrFPO-FKwa49dkzUdcZhj2rQ59gmLytzhKNVkG-hYLCgWLrfSd4KNumV9PH5cRnPr_Tm2ZQju0e6mZ_XusiIwt5r6o7h91fo9BhgPLVE6dSy7m1qQ2hJVApCyzajgZxjTkaNOCg-BhOorsc8ZD0Yck9JjSHJoNxFmBHCh80zHMZVGL5aRAllt3CYS_LEp19VlPk1WwZjR7Ou4ZR9MaXtWsD0NrzvmSMXC6SNWTw",
            "e": "AQAB"
        }]
    });
    let mock = server
        .mock("GET", "/certs")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(jwks.to_string())
        .expect(1)
        .create_async()
        .await;

    let keys = JwksKeySource::new(
        format!("{}/certs", server.url()),
        Duration::from_secs(300),
        Duration::from_secs(5),
    )
    .unwrap();
    let verifier =
        SignedAssertionVerifier::new(&test_config().third_party.google, Arc::new(keys)).unwrap();
    let validators =
        ThirdPartyValidators::new().with_validator(ExternalProvider::Google, Arc::new(verifier));
    let app = TestApp::with_validators(validators).await;

    let token = valid_google_token("g-jwks");
    app.engine
        .register_third_party(&register_request("google", &token, "g-jwks"))
        .await
        .unwrap();
    app.engine
        .login_third_party(&request("google", &token, "g-jwks"))
        .await
        .unwrap();

    // Second verification is served from the cache.
    mock.assert_async().await;
}

#[tokio::test]
async fn test_facebook_register_then_login() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/debug_token")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("input_token".into(), "fb-token".into()),
            Matcher::UrlEncoded("access_token".into(), "test-app|test-app-secret".into()),
        ]))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"data":{"is_valid":true,"user_id":"fb-42"}}"#)
        .expect(2)
        .create_async()
        .await;

    let app = TestApp::with_validators(facebook_validators(&server)).await;

    let registered = app
        .engine
        .register_third_party(&register_request("facebook", "fb-token", "fb-42"))
        .await
        .unwrap();
    assert_eq!(
        registered.principal.provider,
        Some(ExternalProvider::Facebook)
    );

    let login = app
        .engine
        .login_third_party(&request("facebook", "fb-token", "fb-42"))
        .await
        .unwrap();
    assert_eq!(login.principal.id, registered.principal.id);

    mock.assert_async().await;
}

#[tokio::test]
async fn test_facebook_rejections() {
    let mut server = Server::new_async().await;
    let _other_user = server
        .mock("GET", "/debug_token")
        .match_query(Matcher::UrlEncoded("input_token".into(), "other".into()))
        .with_status(200)
        .with_body(r#"{"data":{"is_valid":true,"user_id":"fb-99"}}"#)
        .create_async()
        .await;
    let _invalid = server
        .mock("GET", "/debug_token")
        .match_query(Matcher::UrlEncoded("input_token".into(), "revoked".into()))
        .with_status(200)
        .with_body(r#"{"data":{"is_valid":false,"user_id":"fb-42"}}"#)
        .create_async()
        .await;
    let _error = server
        .mock("GET", "/debug_token")
        .match_query(Matcher::UrlEncoded("input_token".into(), "boom".into()))
        .with_status(500)
        .create_async()
        .await;

    let app = TestApp::with_validators(facebook_validators(&server)).await;

    for token in ["other", "revoked", "boom"] {
        let err = app
            .engine
            .register_third_party(&register_request("facebook", token, "fb-42"))
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::ExternalValidationFailure, "{token}");
    }
}

#[tokio::test]
async fn test_local_login_cannot_lock_federated_account() {
    let app = TestApp::with_validators(google_validators()).await;
    let token = valid_google_token("g-777");
    let registered = app
        .engine
        .register_third_party(&register_request("google", &token, "g-777"))
        .await
        .unwrap();

    for _ in 0..5 {
        let err = app
            .engine
            .login("google:g-777", "guessing")
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidCredential);
    }

    let stored = app.principal("google:g-777").await;
    assert_eq!(stored.lockout.failed_attempts, 0);
    assert!(stored.lockout.lockout_end.is_none());
    app.engine.refresh(registered.principal.id).await.unwrap();
    app.engine
        .login_third_party(&request("google", &token, "g-777"))
        .await
        .unwrap();
}

#[tokio::test]
async fn test_renamed_federated_account_still_signs_in() {
    let app = TestApp::with_validators(google_validators()).await;
    let token = valid_google_token("g-500");
    let registered = app
        .engine
        .register_third_party(&register_request("google", &token, "g-500"))
        .await
        .unwrap();

    let view = app
        .admin
        .edit_member(
            registered.principal.id,
            &member_request("grace", "Grace", "Hopper", "", "player"),
        )
        .await
        .unwrap();
    assert_eq!(view.username, "grace");

    let login = app
        .engine
        .login_third_party(&request("google", &token, "g-500"))
        .await
        .unwrap();
    assert_eq!(login.principal.id, registered.principal.id);
    assert_eq!(login.principal.username, "grace");

    // The new name does not become a federated identity.
    let err = app
        .engine
        .login_third_party(&request("google", &valid_google_token("grace"), "grace"))
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::InvalidCredential);
}

#[tokio::test]
async fn test_same_subject_at_two_providers_are_distinct_accounts() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/debug_token")
        .match_query(Matcher::UrlEncoded("input_token".into(), "fb-shared".into()))
        .with_status(200)
        .with_body(r#"{"data":{"is_valid":true,"user_id":"shared-1"}}"#)
        .create_async()
        .await;

    let mut facebook = test_config().third_party.facebook;
    facebook.introspection_url = format!("{}/debug_token", server.url());
    let validators = google_validators().with_validator(
        ExternalProvider::Facebook,
        Arc::new(RemoteIntrospectionVerifier::new(&facebook).unwrap()),
    );
    let app = TestApp::with_validators(validators).await;

    let google = app
        .engine
        .register_third_party(&register_request(
            "google",
            &valid_google_token("shared-1"),
            "shared-1",
        ))
        .await
        .unwrap();
    let facebook = app
        .engine
        .register_third_party(&register_request("facebook", "fb-shared", "shared-1"))
        .await
        .unwrap();

    assert_ne!(google.principal.id, facebook.principal.id);
    assert_eq!(facebook.principal.username, "facebook:shared-1");

    let login = app
        .engine
        .login_third_party(&request("facebook", "fb-shared", "shared-1"))
        .await
        .unwrap();
    assert_eq!(login.principal.id, facebook.principal.id);
}
