//! Transports that never touch the network.

use super::{MailError, MailResult, MailTransport, OutgoingMail};
use async_trait::async_trait;
use tokio::sync::Mutex;

/// Writes messages to the log instead of sending them
///
/// Only the envelope is logged at `info`. Bodies carry passcodes, so they
/// appear at `debug` and need `RUST_LOG=notekeeper=debug` to be seen.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogMailer;

impl LogMailer {
    fn envelope(mail: &OutgoingMail) -> String {
        format!("Mail to {} [{}]", mail.to, mail.subject)
    }
}

#[async_trait]
impl MailTransport for LogMailer {
    async fn send(&self, mail: OutgoingMail) -> MailResult<()> {
        log::info!("{} (body logged at debug)", LogMailer::envelope(&mail));
        log::debug!("{}: {}", LogMailer::envelope(&mail), mail.text);
        Ok(())
    }
}

/// Records every message; optionally fails every send
#[derive(Debug, Default)]
pub struct MemoryMailer {
    sent: Mutex<Vec<OutgoingMail>>,
    fail: bool,
}

impl MemoryMailer {
    pub fn new() -> Self {
        Self::default()
    }

    /// A mailer whose every send fails
    pub fn failing() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    /// Messages accepted so far
    pub async fn sent(&self) -> Vec<OutgoingMail> {
        self.sent.lock().await.clone()
    }

    /// Most recent message to `to`
    pub async fn last_to(&self, to: &str) -> Option<OutgoingMail> {
        self.sent
            .lock()
            .await
            .iter()
            .rev()
            .find(|mail| mail.to == to)
            .cloned()
    }
}

#[async_trait]
impl MailTransport for MemoryMailer {
    async fn send(&self, mail: OutgoingMail) -> MailResult<()> {
        if self.fail {
            return Err(MailError::Smtp("connection refused".to_string()));
        }
        self.sent.lock().await.push(mail);
        Ok(())
    }
}
