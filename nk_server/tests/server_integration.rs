//! Integration tests for the HTTP API.
//!
//! Drives the real router with `oneshot` against in-memory storage, a
//! recording mailer and a fixed Google verifier.

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use http_body_util::BodyExt;
use nk_server::api::{AppState, cors_layer, create_router};
use notekeeper::auth::{
    AuthError, AuthManager, AuthResult, FederatedIdentity, FederatedVerifier, InMemoryOtpStore,
    SessionIssuer,
};
use notekeeper::db::{MemoryNoteRepository, MemoryUserRepository};
use notekeeper::mail::MemoryMailer;
use notekeeper::notes::NoteManager;
use serde_json::{Value, json};
use std::sync::Arc;
use tower::ServiceExt; // For `oneshot` method

const SECRET: &str = "test_secret_key_for_testing_only_0123456789";
const CLIENT_URL: &str = "http://localhost:5173";

/// Accepts `google:<email>` tokens
struct PrefixVerifier;

#[async_trait]
impl FederatedVerifier for PrefixVerifier {
    async fn verify(&self, id_token: &str) -> AuthResult<FederatedIdentity> {
        let email = id_token
            .strip_prefix("google:")
            .ok_or_else(|| AuthError::InvalidFederatedToken("bad signature".to_string()))?;

        Ok(FederatedIdentity {
            subject: format!("sub-{email}"),
            email: email.to_string(),
            name: Some("Google User".to_string()),
        })
    }
}

struct TestServer {
    app: axum::Router,
    mailer: Arc<MemoryMailer>,
}

fn create_test_server() -> TestServer {
    let mailer = Arc::new(MemoryMailer::new());

    let auth_manager = AuthManager::new(
        Arc::new(MemoryUserRepository::new()),
        Arc::new(InMemoryOtpStore::new()),
        mailer.clone(),
        Arc::new(PrefixVerifier),
        SessionIssuer::new(SECRET),
    );
    let note_manager = NoteManager::new(Arc::new(MemoryNoteRepository::new()));

    let state = AppState::new(auth_manager, note_manager, None);
    let app = create_router(state, cors_layer(CLIENT_URL).unwrap());

    TestServer { app, mailer }
}

impl TestServer {
    async fn call(
        &self,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }

        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };

        (status, value)
    }

    async fn post(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.call("POST", uri, None, Some(body)).await
    }

    async fn code_for(&self, email: &str) -> String {
        self.mailer
            .last_to(email)
            .await
            .unwrap()
            .text
            .trim_start_matches("Your OTP is ")
            .to_string()
    }

    /// Sign up through the passcode flow and return the session token
    async fn sign_up(&self, email: &str) -> String {
        let (status, _) = self.post("/api/auth/send-otp", json!({ "email": email })).await;
        assert_eq!(status, StatusCode::OK);

        let otp = self.code_for(email).await;
        let (status, body) = self
            .post(
                "/api/auth/verify-otp-signup",
                json!({ "name": "Ada", "dob": "1990-05-17", "email": email, "otp": otp }),
            )
            .await;
        assert_eq!(status, StatusCode::OK);

        body["token"].as_str().unwrap().to_string()
    }
}

// ============================================================================
// Health Check Tests
// ============================================================================

#[tokio::test]
async fn test_health_check_endpoint() {
    let server = create_test_server();
    let (status, body) = server.call("GET", "/health", None, None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["storage"], "memory");
}

#[tokio::test]
async fn test_request_id_is_echoed() {
    let server = create_test_server();
    let request = Request::builder()
        .uri("/health")
        .header("x-request-id", "abc-123")
        .body(Body::empty())
        .unwrap();

    let response = server.app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.headers()["x-request-id"], "abc-123");
}

// ============================================================================
// Passcode Flow Tests
// ============================================================================

#[tokio::test]
async fn test_send_otp_then_signup_then_replay() {
    let server = create_test_server();

    let (status, body) = server
        .post("/api/auth/send-otp", json!({ "email": "ada@example.com" }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "success": true }));

    let otp = server.code_for("ada@example.com").await;
    let signup = json!({ "name": "Ada", "dob": "1990-05-17", "email": "ada@example.com", "otp": otp });

    let (status, body) = server.post("/api/auth/verify-otp-signup", signup.clone()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert!(!body["token"].as_str().unwrap().is_empty());
    assert_eq!(body["user"]["email"], "ada@example.com");
    assert_eq!(body["user"]["name"], "Ada");

    let (status, body) = server.post("/api/auth/verify-otp-signup", signup).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid OTP");
}

#[tokio::test]
async fn test_login_without_account_is_not_found() {
    let server = create_test_server();
    server
        .post("/api/auth/send-otp", json!({ "email": "ghost@example.com" }))
        .await;
    let otp = server.code_for("ghost@example.com").await;

    let (status, body) = server
        .post(
            "/api/auth/verify-otp-login",
            json!({ "email": "ghost@example.com", "otp": otp }),
        )
        .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "No user found with this email");
}

#[tokio::test]
async fn test_login_after_signup() {
    let server = create_test_server();
    server.sign_up("ada@example.com").await;

    server
        .post("/api/auth/send-otp", json!({ "email": "ada@example.com" }))
        .await;
    let otp = server.code_for("ada@example.com").await;

    let (status, body) = server
        .post(
            "/api/auth/verify-otp-login",
            json!({ "email": "ada@example.com", "otp": otp }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["email"], "ada@example.com");
}

#[tokio::test]
async fn test_malformed_bodies_are_bad_requests() {
    let server = create_test_server();

    let (status, body) = server.post("/api/auth/send-otp", json!({})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());

    let (status, body) = server
        .post("/api/auth/send-otp", json!({ "email": "nope" }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Please enter a valid email");
}

// ============================================================================
// Google Flow Tests
// ============================================================================

#[tokio::test]
async fn test_google_signup_conflict_and_login() {
    let server = create_test_server();

    let (status, body) = server
        .post("/api/auth/google-signup", json!({ "id_token": "google:g@example.com" }))
        .await;
    assert_eq!(status, StatusCode::OK);
    let user_id = body["user"]["id"].clone();

    let (status, body) = server
        .post("/api/auth/google-signup", json!({ "id_token": "google:g@example.com" }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "User already exists, please log in instead");

    let (status, body) = server
        .post("/api/auth/google-login", json!({ "id_token": "google:g@example.com" }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["id"], user_id);
}

#[tokio::test]
async fn test_invalid_google_token() {
    let server = create_test_server();
    let (status, body) = server
        .post("/api/auth/google-login", json!({ "id_token": "forged" }))
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid Google token");
}

// ============================================================================
// Authorization Tests
// ============================================================================

#[tokio::test]
async fn test_missing_token_is_unauthorized() {
    let server = create_test_server();
    let (status, body) = server.call("GET", "/api/notes", None, None).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Unauthorized");
}

#[tokio::test]
async fn test_non_bearer_header_is_unauthorized() {
    let server = create_test_server();
    let request = Request::builder()
        .uri("/api/user/me")
        .header(header::AUTHORIZATION, "Basic dXNlcjpwYXNz")
        .body(Body::empty())
        .unwrap();

    let response = server.app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_invalid_token_is_forbidden() {
    let server = create_test_server();
    let (status, body) = server
        .call("GET", "/api/user/me", Some("not.a.token"), None)
        .await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "Invalid token");
}

#[tokio::test]
async fn test_expired_token_is_forbidden() {
    let server = create_test_server();
    let expired = SessionIssuer::with_validity(SECRET, chrono::Duration::minutes(-10))
        .issue(1)
        .unwrap();

    let (status, _) = server.call("GET", "/api/notes", Some(&expired), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_me_returns_profile() {
    let server = create_test_server();
    let token = server.sign_up("ada@example.com").await;

    let (status, body) = server.call("GET", "/api/user/me", Some(&token), None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["email"], "ada@example.com");
    assert_eq!(body["name"], "Ada");
    assert!(body["id"].is_i64());
    assert!(body.get("dob").is_none());
}

// ============================================================================
// Note Tests
// ============================================================================

#[tokio::test]
async fn test_note_lifecycle() {
    let server = create_test_server();
    let token = server.sign_up("ada@example.com").await;

    let (status, first) = server
        .call("POST", "/api/notes", Some(&token), Some(json!({ "title": "first" })))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(first["title"], "first");

    server
        .call("POST", "/api/notes", Some(&token), Some(json!({ "title": "second" })))
        .await;

    let (status, list) = server.call("GET", "/api/notes", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    let titles: Vec<&str> = list
        .as_array()
        .unwrap()
        .iter()
        .map(|n| n["title"].as_str().unwrap())
        .collect();
    assert_eq!(titles, vec!["second", "first"]);

    let uri = format!("/api/notes/{}", first["id"]);
    let (status, body) = server.call("DELETE", &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "success": true }));

    let (status, body) = server.call("DELETE", &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Note not found or unauthorized");
}

#[tokio::test]
async fn test_blank_title_is_rejected() {
    let server = create_test_server();
    let token = server.sign_up("ada@example.com").await;

    let (status, body) = server
        .call("POST", "/api/notes", Some(&token), Some(json!({ "title": "   " })))
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Title is required");
}

#[tokio::test]
async fn test_invalid_note_id() {
    let server = create_test_server();
    let token = server.sign_up("ada@example.com").await;

    let (status, body) = server
        .call("DELETE", "/api/notes/abc", Some(&token), None)
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid note ID");
}

#[tokio::test]
async fn test_notes_are_owner_scoped() {
    let server = create_test_server();
    let ada = server.sign_up("ada@example.com").await;
    let bob = server.sign_up("bob@example.com").await;

    let (_, note) = server
        .call("POST", "/api/notes", Some(&ada), Some(json!({ "title": "private" })))
        .await;

    let (_, list) = server.call("GET", "/api/notes", Some(&bob), None).await;
    assert_eq!(list, json!([]));

    let uri = format!("/api/notes/{}", note["id"]);
    let (status, _) = server.call("DELETE", &uri, Some(&bob), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, list) = server.call("GET", "/api/notes", Some(&ada), None).await;
    assert_eq!(list.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_cors_preflight_allows_client_origin() {
    let server = create_test_server();
    let request = Request::builder()
        .method("OPTIONS")
        .uri("/api/notes")
        .header(header::ORIGIN, CLIENT_URL)
        .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
        .body(Body::empty())
        .unwrap();

    let response = server.app.clone().oneshot(request).await.unwrap();
    assert_eq!(
        response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
        CLIENT_URL
    );
    assert_eq!(
        response.headers()[header::ACCESS_CONTROL_ALLOW_CREDENTIALS],
        "true"
    );
}
