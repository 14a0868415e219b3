//! Outbound mail.
//!
//! The authentication flows only see the [`MailTransport`] trait. Production
//! wires in [`SmtpMailer`]; development without credentials uses [`LogMailer`]
//! and tests capture messages with [`MemoryMailer`].

pub mod errors;
pub mod memory;
pub mod smtp;

pub use errors::{MailError, MailResult};
pub use memory::{LogMailer, MemoryMailer};
pub use smtp::{SmtpConfig, SmtpMailer};

use async_trait::async_trait;

/// A message ready to hand to a transport
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingMail {
    pub to: String,
    pub subject: String,
    /// Plain-text body
    pub text: String,
    /// Optional HTML alternative
    pub html: Option<String>,
}

/// Delivers [`OutgoingMail`]
#[async_trait]
pub trait MailTransport: Send + Sync {
    /// Send a single message
    ///
    /// # Errors
    ///
    /// * `MailError::InvalidAddress` - Recipient or sender cannot be parsed
    /// * `MailError::Build` - Message could not be assembled
    /// * `MailError::Smtp` - The relay refused or the connection failed
    async fn send(&self, mail: OutgoingMail) -> MailResult<()>;
}
