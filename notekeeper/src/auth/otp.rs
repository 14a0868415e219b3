//! One-time passcode storage and issuance.
//!
//! A passcode is a 6-digit decimal string. Each email has at most one pending
//! passcode: issuing a new one replaces the old one, and a successful
//! verification removes it.

use super::errors::{AuthError, AuthResult};
use crate::mail::{MailTransport, OutgoingMail};
use async_trait::async_trait;
use rand::Rng;
use std::{collections::HashMap, sync::Arc, time::Duration};
use subtle::ConstantTimeEq;
use tokio::{sync::Mutex, time::Instant};

/// Smallest passcode value
pub const OTP_MIN: u32 = 100_000;

/// Largest passcode value
pub const OTP_MAX: u32 = 999_999;

/// Subject line of passcode mails
pub const OTP_SUBJECT: &str = "Your OTP Code";

/// Generate a passcode uniformly distributed over `OTP_MIN..=OTP_MAX`
pub fn generate_code() -> String {
    rand::rng().random_range(OTP_MIN..=OTP_MAX).to_string()
}

/// Pending passcodes keyed by email.
///
/// Implementations must make `consume` an atomic check-then-delete: of two
/// concurrent calls presenting the right code, exactly one returns `true`.
#[async_trait]
pub trait OtpStore: Send + Sync {
    /// Store `code` for `email`, replacing any pending code
    async fn put(&self, email: &str, code: &str) -> AuthResult<()>;

    /// Remove and accept the pending code if it equals `code`
    ///
    /// Returns `false` and leaves the entry in place on mismatch or when
    /// nothing is pending.
    async fn consume(&self, email: &str, code: &str) -> AuthResult<bool>;
}

#[derive(Debug)]
struct PendingOtp {
    code: String,
    issued_at: Instant,
}

/// Single-process passcode store.
///
/// Entries never expire unless a TTL is configured, in which case `consume`
/// rejects and drops entries older than the TTL.
#[derive(Debug, Default)]
pub struct InMemoryOtpStore {
    entries: Mutex<HashMap<String, PendingOtp>>,
    ttl: Option<Duration>,
}

impl InMemoryOtpStore {
    /// Create a store without expiry
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store whose entries expire `ttl` after being issued
    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            ttl: Some(ttl),
        }
    }

    /// Number of pending passcodes
    pub async fn pending_count(&self) -> usize {
        self.entries.lock().await.len()
    }
}

#[async_trait]
impl OtpStore for InMemoryOtpStore {
    async fn put(&self, email: &str, code: &str) -> AuthResult<()> {
        self.entries.lock().await.insert(
            email.to_string(),
            PendingOtp {
                code: code.to_string(),
                issued_at: Instant::now(),
            },
        );
        Ok(())
    }

    async fn consume(&self, email: &str, code: &str) -> AuthResult<bool> {
        // Held across check and removal
        let mut entries = self.entries.lock().await;

        let Some(pending) = entries.get(email) else {
            return Ok(false);
        };

        if self.ttl.is_some_and(|ttl| pending.issued_at.elapsed() > ttl) {
            entries.remove(email);
            return Ok(false);
        }

        let matches: bool = pending.code.as_bytes().ct_eq(code.as_bytes()).into();
        if matches {
            entries.remove(email);
        }

        Ok(matches)
    }
}

/// Generates passcodes, records them and mails them out
#[derive(Clone)]
pub struct OtpIssuer {
    store: Arc<dyn OtpStore>,
    mailer: Arc<dyn MailTransport>,
    advertised_ttl: Option<Duration>,
}

impl OtpIssuer {
    /// Create a new issuer
    ///
    /// # Arguments
    ///
    /// * `store` - Where pending passcodes live
    /// * `mailer` - Transport used to deliver them
    pub fn new(store: Arc<dyn OtpStore>, mailer: Arc<dyn MailTransport>) -> Self {
        Self {
            store,
            mailer,
            advertised_ttl: None,
        }
    }

    /// Mention an expiry in outgoing mails
    pub fn with_advertised_ttl(mut self, ttl: Option<Duration>) -> Self {
        self.advertised_ttl = ttl;
        self
    }

    /// Issue a fresh passcode for `email`
    ///
    /// The passcode is stored before delivery is attempted and stays stored
    /// when delivery fails.
    ///
    /// # Errors
    ///
    /// * `AuthError::TransportFailure` - The mail transport rejected the message
    pub async fn issue(&self, email: &str) -> AuthResult<()> {
        let code = generate_code();
        self.store.put(email, &code).await?;
        log::debug!("Generated OTP for {}", email);

        self.mailer
            .send(otp_mail(email, &code, self.advertised_ttl))
            .await
            .map_err(AuthError::TransportFailure)
    }
}

fn otp_mail(email: &str, code: &str, ttl: Option<Duration>) -> OutgoingMail {
    let expiry = ttl
        .map(|ttl| format!(" It will expire in {} minutes.", ttl.as_secs().div_ceil(60)))
        .unwrap_or_default();

    OutgoingMail {
        to: email.to_string(),
        subject: OTP_SUBJECT.to_string(),
        text: format!("Your OTP is {code}"),
        html: Some(format!(
            "<p>Your OTP is <strong>{code}</strong>.{expiry}</p>"
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mail::MemoryMailer;

    #[test]
    fn test_generate_code_is_six_digits() {
        for _ in 0..1000 {
            let code = generate_code();
            assert_eq!(code.len(), 6);
            let value: u32 = code.parse().unwrap();
            assert!((OTP_MIN..=OTP_MAX).contains(&value));
        }
    }

    #[tokio::test]
    async fn test_consume_is_single_use() {
        let store = InMemoryOtpStore::new();
        store.put("a@x.com", "123456").await.unwrap();

        assert!(store.consume("a@x.com", "123456").await.unwrap());
        assert!(!store.consume("a@x.com", "123456").await.unwrap());
    }

    #[tokio::test]
    async fn test_mismatch_keeps_entry() {
        let store = InMemoryOtpStore::new();
        store.put("a@x.com", "123456").await.unwrap();

        assert!(!store.consume("a@x.com", "654321").await.unwrap());
        assert!(!store.consume("a@x.com", "12345").await.unwrap());
        assert_eq!(store.pending_count().await, 1);
        assert!(store.consume("a@x.com", "123456").await.unwrap());
    }

    #[tokio::test]
    async fn test_put_overwrites_previous_code() {
        let store = InMemoryOtpStore::new();
        store.put("a@x.com", "111111").await.unwrap();
        store.put("a@x.com", "222222").await.unwrap();

        assert!(!store.consume("a@x.com", "111111").await.unwrap());
        assert!(store.consume("a@x.com", "222222").await.unwrap());
    }

    #[tokio::test]
    async fn test_codes_are_per_email() {
        let store = InMemoryOtpStore::new();
        store.put("a@x.com", "111111").await.unwrap();

        assert!(!store.consume("b@x.com", "111111").await.unwrap());
        assert!(store.consume("a@x.com", "111111").await.unwrap());
    }

    #[tokio::test]
    async fn test_concurrent_consume_has_one_winner() {
        let store = Arc::new(InMemoryOtpStore::new());
        store.put("a@x.com", "424242").await.unwrap();

        let handles: Vec<_> = (0..16)
            .map(|_| {
                let store = store.clone();
                tokio::spawn(async move { store.consume("a@x.com", "424242").await.unwrap() })
            })
            .collect();

        let mut winners = 0;
        for handle in handles {
            if handle.await.unwrap() {
                winners += 1;
            }
        }
        assert_eq!(winners, 1);
    }

    #[tokio::test]
    async fn test_ttl_expires_entries() {
        let store = InMemoryOtpStore::with_ttl(Duration::from_millis(20));
        store.put("a@x.com", "123456").await.unwrap();

        tokio::time::sleep(Duration::from_millis(60)).await;

        assert!(!store.consume("a@x.com", "123456").await.unwrap());
        assert_eq!(store.pending_count().await, 0);
    }

    #[tokio::test]
    async fn test_issue_stores_and_mails_code() {
        let store = Arc::new(InMemoryOtpStore::new());
        let mailer = Arc::new(MemoryMailer::new());
        let issuer = OtpIssuer::new(store.clone(), mailer.clone());

        issuer.issue("a@x.com").await.unwrap();

        let sent = mailer.sent().await;
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].to, "a@x.com");
        assert_eq!(sent[0].subject, OTP_SUBJECT);

        let code = sent[0].text.trim_start_matches("Your OTP is ").to_string();
        assert!(store.consume("a@x.com", &code).await.unwrap());
    }

    #[tokio::test]
    async fn test_issue_keeps_code_when_delivery_fails() {
        let store = Arc::new(InMemoryOtpStore::new());
        let mailer = Arc::new(MemoryMailer::failing());
        let issuer = OtpIssuer::new(store.clone(), mailer);

        let result = issuer.issue("a@x.com").await;

        assert!(matches!(result, Err(AuthError::TransportFailure(_))));
        assert_eq!(store.pending_count().await, 1);
    }

    #[test]
    fn test_mail_mentions_expiry_only_with_ttl() {
        let mail = otp_mail("a@x.com", "123456", None);
        assert!(!mail.html.as_deref().unwrap().contains("expire"));

        let mail = otp_mail("a@x.com", "123456", Some(Duration::from_secs(300)));
        assert!(mail.html.as_deref().unwrap().contains("expire in 5 minutes"));
    }
}
