#![allow(clippy::unwrap_used)]
// Integration tests for `RemixClient` using wiremock.

use secrecy::SecretString;
use serde_json::json;
use url::Url;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use remixly_api::{ContactForm, Error, LoginRequest, RemixClient, TransportConfig, UsesLeft};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, RemixClient) {
    let server = MockServer::start().await;
    let base_url = Url::parse(&server.uri()).unwrap();
    let client = RemixClient::new(base_url, &TransportConfig::default()).unwrap();
    (server, client)
}

fn login_request(password: &str) -> LoginRequest {
    LoginRequest {
        username: "amy".into(),
        password: SecretString::from(password.to_owned()),
        access_code: None,
        captcha_token: None,
    }
}

// ── Session tests ───────────────────────────────────────────────────

#[tokio::test]
async fn test_check_session_logged_in() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/check_session"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "logged_in": true,
            "role": "student",
            "is_paid": true,
            "uses_left": "unlimited",
            "referral_code": "AMY42"
        })))
        .mount(&server)
        .await;

    let info = client.check_session().await.unwrap();

    assert!(info.logged_in);
    assert!(info.is_paid);
    assert_eq!(info.uses_left, Some(UsesLeft::Unlimited));
    assert_eq!(info.referral_code.as_deref(), Some("AMY42"));
}

#[tokio::test]
async fn test_check_session_backend_waking() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/check_session"))
        .respond_with(ResponseTemplate::new(502).set_body_string("Bad Gateway"))
        .mount(&server)
        .await;

    let result = client.check_session().await;

    assert!(
        matches!(result, Err(Error::ServiceWaking { status: 502 })),
        "expected ServiceWaking, got: {result:?}"
    );
}

#[tokio::test]
async fn test_gateway_timeout_counts_as_waking() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/check_session"))
        .respond_with(ResponseTemplate::new(504).set_body_string("Gateway Timeout"))
        .mount(&server)
        .await;

    let result = client.check_session().await;

    assert!(
        matches!(result, Err(Error::ServiceWaking { status: 504 })),
        "expected ServiceWaking, got: {result:?}"
    );
}

#[tokio::test]
async fn test_check_session_numeric_referral_code() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/check_session"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "logged_in": true,
            "role": "student",
            "referral_code": 4242
        })))
        .mount(&server)
        .await;

    let info = client.check_session().await.unwrap();

    assert!(info.logged_in);
    assert_eq!(info.referral_code.as_deref(), Some("4242"));
}

#[tokio::test]
async fn test_login_success_stores_cookie() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/login"))
        .and(body_json(json!({ "username": "amy", "password": "hunter2" })))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("set-cookie", "session=abc123; Path=/")
                .set_body_json(json!({
                    "user": { "role": "student", "course_completed": true },
                    "is_paid": false,
                    "uses_left": 3
                })),
        )
        .mount(&server)
        .await;

    let info = client.login(&login_request("hunter2")).await.unwrap();

    let user = info.user.unwrap();
    assert_eq!(user.role.as_deref(), Some("student"));
    assert!(user.course_completed);
    assert_eq!(info.uses_left, Some(UsesLeft::Count(3)));
    assert_eq!(client.cookie_header().as_deref(), Some("session=abc123"));
}

#[tokio::test]
async fn test_login_failure_carries_server_message() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/login"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({ "error": "Invalid credentials" })),
        )
        .mount(&server)
        .await;

    let result = client.login(&login_request("wrong")).await;

    match result {
        Err(Error::Authentication { ref message }) => {
            assert_eq!(message, "Invalid credentials");
        }
        other => panic!("expected Authentication error, got: {other:?}"),
    }
}

#[tokio::test]
async fn test_restored_cookie_is_sent() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/check_session"))
        .and(header("cookie", "session=restored"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "logged_in": true })))
        .mount(&server)
        .await;

    client.restore_cookies("session=restored");
    let info = client.check_session().await.unwrap();

    assert!(info.logged_in);
}

#[tokio::test]
async fn test_logout() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/logout"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    client.logout().await.unwrap();
}

// ── Remix tests ─────────────────────────────────────────────────────

#[tokio::test]
async fn test_remix_success() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/remix"))
        .and(body_json(json!({
            "content": "hello world",
            "style": "tweet",
            "is_guest": true
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "output": "Hello, world! #remix",
            "uses_left": 2
        })))
        .mount(&server)
        .await;

    let out = client.remix("hello world", "tweet", true).await.unwrap();

    assert_eq!(out.output, "Hello, world! #remix");
    assert_eq!(out.uses_left, Some(UsesLeft::Count(2)));
}

#[tokio::test]
async fn test_remix_premium_flag() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/remix"))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({
            "error": "Not allowed",
            "requiresPremium": true
        })))
        .mount(&server)
        .await;

    let result = client.remix("hi", "email", false).await;

    assert!(
        matches!(result, Err(Error::PremiumRequired { .. })),
        "expected PremiumRequired, got: {result:?}"
    );
}

#[tokio::test]
async fn test_remix_quota_exceeded() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/remix"))
        .respond_with(
            ResponseTemplate::new(403).set_body_json(json!({ "error": "No free remixes left" })),
        )
        .mount(&server)
        .await;

    let result = client.remix("hi", "tweet", false).await;

    assert!(
        matches!(result, Err(Error::QuotaExceeded { .. })),
        "expected QuotaExceeded, got: {result:?}"
    );
}

#[tokio::test]
async fn test_remix_ok_status_without_output() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/remix"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "error": "Please log in to continue" })),
        )
        .mount(&server)
        .await;

    let result = client.remix("hi", "tweet", true).await;

    assert!(
        matches!(result, Err(Error::LoginRequired { .. })),
        "expected LoginRequired, got: {result:?}"
    );
}

#[tokio::test]
async fn test_remix_generic_error() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/remix"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({ "error": "model offline" })))
        .mount(&server)
        .await;

    let result = client.remix("hi", "tweet", true).await;

    match result {
        Err(Error::Api { status, ref message }) => {
            assert_eq!(status, 500);
            assert_eq!(message, "model offline");
        }
        other => panic!("expected Api error, got: {other:?}"),
    }
}

// ── History tests ───────────────────────────────────────────────────

#[tokio::test]
async fn test_save_remix_sends_backend_fields() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/save_remix"))
        .and(body_json(json!({
            "original_text": "Meeting moved to 3pm",
            "remixed_text": "Heads up: 3pm now!",
            "remix_type": "tweet"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "success": true })))
        .expect(1)
        .mount(&server)
        .await;

    client
        .save_remix("Meeting moved to 3pm", "Heads up: 3pm now!", "tweet")
        .await
        .unwrap();
}

#[tokio::test]
async fn test_history_lists_entries() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/get_history"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "history": [
                {
                    "remix_type": "email",
                    "original_text": "need the report",
                    "remixed_text": "Could you send the report?",
                    "created_at": "2026-05-01T10:00:00"
                },
                { "remix_type": "tweet", "original_text": "hi", "remixed_text": "hey" }
            ]
        })))
        .mount(&server)
        .await;

    let history = client.history().await.unwrap();

    assert_eq!(history.len(), 2);
    assert_eq!(history[0].remix_type.as_deref(), Some("email"));
    assert_eq!(history[0].created_at.as_deref(), Some("2026-05-01T10:00:00"));
    assert!(history[1].created_at.is_none());
}

#[tokio::test]
async fn test_history_missing_list_is_empty() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/get_history"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .mount(&server)
        .await;

    assert!(client.history().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_history_requires_login() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/get_history"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({ "error": "Please log in first" })),
        )
        .mount(&server)
        .await;

    let result = client.history().await;
    assert!(
        matches!(result, Err(Error::LoginRequired { .. })),
        "expected LoginRequired, got: {result:?}"
    );
}

// ── Account tests ───────────────────────────────────────────────────

#[tokio::test]
async fn test_referral_data() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/get_referral_data"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "referral_code": "AMY42",
            "referral_count": 3,
            "pending_rewards": "2"
        })))
        .mount(&server)
        .await;

    let data = client.referral_data().await.unwrap();

    assert_eq!(data.referral_code.as_deref(), Some("AMY42"));
    assert_eq!(data.referral_count, 3);
    assert_eq!(data.pending_rewards, 2);
}

#[tokio::test]
async fn test_update_subscription() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/update_subscription"))
        .and(body_json(json!({ "subscriptionID": "I-SUB123" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "success": true })))
        .expect(1)
        .mount(&server)
        .await;

    client.update_subscription("I-SUB123").await.unwrap();
}

#[tokio::test]
async fn test_contact_rejected() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/contact"))
        .respond_with(
            ResponseTemplate::new(400).set_body_json(json!({ "error": "Email is required" })),
        )
        .mount(&server)
        .await;

    let form = ContactForm {
        name: "Amy".into(),
        email: String::new(),
        message: "hi".into(),
    };
    let result = client.submit_contact(&form).await;

    match result {
        Err(Error::Api { ref message, .. }) => assert_eq!(message, "Email is required"),
        other => panic!("expected Api error, got: {other:?}"),
    }
}

#[tokio::test]
async fn test_base_url_with_trailing_slash() {
    let server = MockServer::start().await;
    let base_url = Url::parse(&format!("{}/", server.uri())).unwrap();
    let client = RemixClient::with_client(reqwest::Client::new(), base_url);

    Mock::given(method("GET"))
        .and(path("/check_session"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "logged_in": false })))
        .mount(&server)
        .await;

    let info = client.check_session().await.unwrap();
    assert!(!info.logged_in);
}
