//! Async SMTP sending via lettre.

use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use streakbeat_core::config::SmtpConfig;
use streakbeat_core::error::{Result, StreakbeatError};
use streakbeat_core::traits::MailTransport;

/// SMTP mailer — one transport reused for the whole process lifetime.
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpMailer {
    /// Build a STARTTLS relay from config. Fails fast on a malformed sender
    /// address or relay host.
    pub fn new(config: &SmtpConfig) -> Result<Self> {
        let from: Mailbox = format!("{} <{}>", config.from_name, config.from_address)
            .parse()
            .map_err(|e| StreakbeatError::Mail(format!("Invalid from address: {e}")))?;

        let creds = Credentials::new(config.username.clone(), config.password.clone());
        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)
            .map_err(|e| StreakbeatError::Mail(format!("SMTP relay: {e}")))?
            .port(config.port)
            .credentials(creds)
            .build();

        Ok(Self { transport, from })
    }
}

#[async_trait]
impl MailTransport for SmtpMailer {
    async fn send(&self, to: &str, subject: &str, html_body: &str) -> Result<()> {
        let to_mailbox: Mailbox = to
            .parse()
            .map_err(|e| StreakbeatError::Mail(format!("Invalid to address: {e}")))?;

        let email = Message::builder()
            .from(self.from.clone())
            .to(to_mailbox)
            .subject(subject)
            .header(ContentType::TEXT_HTML)
            .body(html_body.to_string())
            .map_err(|e| StreakbeatError::Mail(format!("Build email: {e}")))?;

        self.transport
            .send(email)
            .await
            .map_err(|e| StreakbeatError::Mail(format!("SMTP send: {e}")))?;

        tracing::info!("📤 Email sent to: {to}");
        Ok(())
    }
}
