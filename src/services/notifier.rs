use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use std::time::Duration;

use crate::config::SmtpConfig;
use crate::error::Result;
use crate::services::drop_detector::PriceDrop;

const SMTP_TIMEOUT_SECS: u64 = 30;

/// Delivers alerts. Failures are reported as `false`, never as errors.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send_alert(&self, recipient: &str, subject: &str, body: &str) -> bool;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlertMessage {
    pub subject: String,
    pub body: String,
}

impl AlertMessage {
    pub fn price_drop(url: &str, drop: &PriceDrop) -> Self {
        let subject = format!("🎵 Ticket Price Drop Alert! Save ${:.2} 🎵", drop.amount);

        let body = format!(
            "Ticket Price Drop Alert!\n\n\
            Current price: ${:.2}\n\
            Previous price: ${:.2}\n\
            You save: ${:.2} ({:.1}%)\n\n\
            Check it out: {}",
            drop.current, drop.previous, drop.amount, drop.percent, url
        );

        Self { subject, body }
    }
}

/// SMTP submission with STARTTLS, logging in as the sender address
pub struct EmailNotifier {
    mailer: AsyncSmtpTransport<Tokio1Executor>,
    from: String,
}

impl EmailNotifier {
    pub fn new(config: &SmtpConfig) -> Result<Self> {
        let credentials = Credentials::new(
            config.email_from.clone(),
            config.email_password.clone(),
        );

        let mailer = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.server)?
            .port(config.port)
            .credentials(credentials)
            .timeout(Some(Duration::from_secs(SMTP_TIMEOUT_SECS)))
            .build();

        Ok(Self {
            mailer,
            from: config.email_from.clone(),
        })
    }

    async fn try_send(&self, recipient: &str, subject: &str, body: &str) -> Result<()> {
        let message = Message::builder()
            .from(self.from.parse::<Mailbox>()?)
            .to(recipient.parse::<Mailbox>()?)
            .subject(subject)
            .header(ContentType::TEXT_PLAIN)
            .body(body.to_string())?;

        self.mailer.send(message).await?;
        Ok(())
    }
}

#[async_trait]
impl Notifier for EmailNotifier {
    async fn send_alert(&self, recipient: &str, subject: &str, body: &str) -> bool {
        tracing::info!("Sending email to {}...", recipient);

        match self.try_send(recipient, subject, body).await {
            Ok(()) => {
                tracing::info!("Email sent successfully to {}", recipient);
                true
            }
            Err(e) => {
                tracing::error!(
                    "Error sending email to {}: {}. Check the email credentials in your configuration.",
                    recipient,
                    e
                );
                false
            }
        }
    }
}
