//! SMTP delivery through lettre.

use super::{MailError, MailResult, MailTransport, OutgoingMail};
use async_trait::async_trait;
use lettre::{
    Address, AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
    message::{Mailbox, MultiPart, header::ContentType},
    transport::smtp::authentication::Credentials,
};

/// Port that speaks TLS from the first byte
pub const IMPLICIT_TLS_PORT: u16 = 465;

/// SMTP relay settings
#[derive(Debug, Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    /// Login name, also used as the sender address
    pub username: String,
    pub password: String,
    /// Display name shown in the `From` header
    pub from_name: String,
}

/// Sends mail through an authenticated SMTP relay
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpMailer {
    /// Build a mailer for `config`
    ///
    /// Port 465 uses implicit TLS, any other port negotiates STARTTLS.
    /// No connection is opened until the first send.
    ///
    /// # Errors
    ///
    /// * `MailError::InvalidAddress` - `username` is not an email address
    /// * `MailError::Smtp` - The relay host is unusable
    pub fn new(config: &SmtpConfig) -> MailResult<Self> {
        let credentials = Credentials::new(config.username.clone(), config.password.clone());

        let builder = if config.port == IMPLICIT_TLS_PORT {
            AsyncSmtpTransport::<Tokio1Executor>::relay(&config.host)?
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)?
        };

        let transport = builder
            .port(config.port)
            .credentials(credentials)
            .build();

        let address: Address = config.username.parse()?;
        let from = Mailbox::new(Some(config.from_name.clone()), address);

        Ok(Self { transport, from })
    }
}

#[async_trait]
impl MailTransport for SmtpMailer {
    async fn send(&self, mail: OutgoingMail) -> MailResult<()> {
        let to: Mailbox = mail.to.parse()?;

        let builder = Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject(mail.subject);

        let message = match mail.html {
            Some(html) => builder.multipart(MultiPart::alternative_plain_html(mail.text, html))?,
            None => builder.header(ContentType::TEXT_PLAIN).body(mail.text)?,
        };

        self.transport.send(message).await?;
        Ok(())
    }
}
