//! Integration tests for nk_client against a live in-process server.
//!
//! Tests the full sign-in and notes flow over real HTTP, plus network error
//! handling when no server is reachable.

use async_trait::async_trait;
use nk_client::api_client::ApiClient;
use nk_server::api::{AppState, cors_layer, create_router};
use notekeeper::auth::{
    AuthError, AuthManager, AuthResult, FederatedIdentity, FederatedVerifier, InMemoryOtpStore,
    SessionIssuer,
};
use notekeeper::db::{MemoryNoteRepository, MemoryUserRepository};
use notekeeper::mail::MemoryMailer;
use notekeeper::notes::NoteManager;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;

const SECRET: &str = "test_secret_key_for_testing_only_0123456789";

/// Generate a unique email for tests
fn unique_email(prefix: &str) -> String {
    let rand_id: u32 = rand::random();
    format!("{}_{}@example.com", prefix, rand_id % 100000)
}

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

/// Serve the API on an ephemeral port; returns its base URL and the mail outbox
async fn spawn_server() -> (String, Arc<MemoryMailer>) {
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
    let app = create_router(state, cors_layer("http://localhost:5173").unwrap());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{addr}"), mailer)
}

async fn code_for(mailer: &MemoryMailer, email: &str) -> String {
    mailer
        .last_to(email)
        .await
        .unwrap()
        .text
        .trim_start_matches("Your OTP is ")
        .to_string()
}

// ============================================================================
// Full flow against a live server
// ============================================================================

#[tokio::test]
async fn test_signup_and_note_lifecycle() {
    let (url, mailer) = spawn_server().await;
    let mut client = ApiClient::new(url);
    let email = unique_email("ada");

    client.send_otp(&email).await.unwrap();
    let otp = code_for(&mailer, &email).await;

    let auth = client
        .signup(Some("Ada"), Some("1815-12-10"), &email, &otp)
        .await
        .unwrap();
    assert!(auth.success);
    assert_eq!(auth.user.email, email);
    assert_eq!(client.token(), Some(auth.token.as_str()));

    let profile = client.me().await.unwrap();
    assert_eq!(profile.id, auth.user.id);
    assert_eq!(profile.name.as_deref(), Some("Ada"));

    let first = client.create_note("first").await.unwrap();
    let second = client.create_note("  second  ").await.unwrap();
    assert_eq!(second.title, "second");

    let notes = client.list_notes().await.unwrap();
    let ids: Vec<i64> = notes.iter().map(|n| n.id).collect();
    assert_eq!(ids, vec![second.id, first.id]);

    client.delete_note(&first.id.to_string()).await.unwrap();
    let notes = client.list_notes().await.unwrap();
    assert_eq!(notes.len(), 1);
    assert_eq!(notes[0].id, second.id);
}

#[tokio::test]
async fn test_login_requires_existing_account() {
    let (url, mailer) = spawn_server().await;
    let mut client = ApiClient::new(url);
    let email = unique_email("ghost");

    client.send_otp(&email).await.unwrap();
    let otp = code_for(&mailer, &email).await;

    let err = client.login(&email, &otp).await.unwrap_err();
    assert!(err.to_string().contains("No user found"), "{err}");
    assert!(client.token().is_none());
}

#[tokio::test]
async fn test_login_after_signup_and_otp_single_use() {
    let (url, mailer) = spawn_server().await;
    let mut client = ApiClient::new(url);
    let email = unique_email("bob");

    client.send_otp(&email).await.unwrap();
    let otp = code_for(&mailer, &email).await;
    let signup = client.signup(None, None, &email, &otp).await.unwrap();

    let err = client.login(&email, &otp).await.unwrap_err();
    assert!(err.to_string().contains("400"), "{err}");

    client.send_otp(&email).await.unwrap();
    let otp = code_for(&mailer, &email).await;
    let login = client.login(&email, &otp).await.unwrap();
    assert_eq!(login.user.id, signup.user.id);
}

#[tokio::test]
async fn test_google_signup_then_login() {
    let (url, _mailer) = spawn_server().await;
    let mut client = ApiClient::new(url);
    let token = format!("google:{}", unique_email("gina"));

    let signup = client.google_signup(&token).await.unwrap();
    let err = client.google_signup(&token).await.unwrap_err();
    assert!(err.to_string().contains("User already exists"), "{err}");

    let login = client.google_login(&token).await.unwrap();
    assert_eq!(login.user.id, signup.user.id);

    let err = client.google_login("forged").await.unwrap_err();
    assert!(err.to_string().contains("400"), "{err}");
}

#[tokio::test]
async fn test_notes_are_private() {
    let (url, _mailer) = spawn_server().await;

    let mut alice = ApiClient::new(url.clone());
    alice
        .google_login(&format!("google:{}", unique_email("alice")))
        .await
        .unwrap();
    let mut mallory = ApiClient::new(url);
    mallory
        .google_login(&format!("google:{}", unique_email("mallory")))
        .await
        .unwrap();

    let note = alice.create_note("secret").await.unwrap();

    assert!(mallory.list_notes().await.unwrap().is_empty());
    let err = mallory.delete_note(&note.id.to_string()).await.unwrap_err();
    assert!(err.to_string().contains("404"), "{err}");
    assert_eq!(alice.list_notes().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_invalid_token_is_forbidden() {
    let (url, _mailer) = spawn_server().await;
    let mut client = ApiClient::new(url);
    client.set_token(Some("not-a-jwt".to_string()));

    let err = client.me().await.unwrap_err();
    assert!(err.to_string().contains("403"), "{err}");
}

#[tokio::test]
async fn test_invalid_note_id() {
    let (url, _mailer) = spawn_server().await;
    let mut client = ApiClient::new(url);
    client
        .google_login(&format!("google:{}", unique_email("ivan")))
        .await
        .unwrap();

    let err = client.delete_note("abc").await.unwrap_err();
    assert!(err.to_string().contains("Invalid note ID"), "{err}");
}

// ============================================================================
// Network Error Scenario Tests
// ============================================================================

#[tokio::test]
async fn test_connection_refused() {
    // Try to connect to invalid port
    let client = ApiClient::new("http://localhost:19999".to_string());

    let result = client.send_otp("a@example.com").await;

    assert!(result.is_err(), "Should fail when server is not available");
    let error_msg = result.unwrap_err().to_string();
    assert!(
        error_msg.contains("Failed to send OTP request"),
        "Error should indicate connection failure"
    );
}

#[tokio::test]
async fn test_timeout_handling() {
    // Non-routable address; either times out or fails to connect
    let mut client = ApiClient::new("http://192.0.2.1:80".to_string());

    let result = timeout(Duration::from_secs(3), client.login("a@example.com", "123456")).await;

    assert!(
        result.is_err() || result.unwrap().is_err(),
        "Should fail when connecting to unreachable host"
    );
}

#[tokio::test]
async fn test_malformed_url() {
    let client = ApiClient::new("not a url".to_string());

    let result = client.send_otp("a@example.com").await;
    assert!(result.is_err(), "Should fail with malformed URL");
}
