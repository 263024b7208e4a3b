//! Mail transport abstraction
//!
//! Provides:
//! - `MailTransport` trait over outgoing mail delivery
//! - SMTP backend (lettre) for production
//! - In-memory backend for tests and mail-less deployments
//! - Fixed-format contact notification composition

use crate::config::MailConfig;
use crate::errors::{AppError, Result};
use async_trait::async_trait;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use std::sync::{Arc, Mutex};

/// Subject line for contact notifications
pub const CONTACT_SUBJECT: &str = "New Contact Request";

/// Compose the contact notification body. The format is fixed.
pub fn contact_message_body(name: &str, email: &str, content: &str) -> String {
    format!("Name: {}\n Reply-To: {}\nContent: {}", name, email, content)
}

/// A fully-addressed outgoing email
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingEmail {
    pub from: String,
    pub to: Vec<String>,
    pub subject: String,
    pub body: String,
}

/// Delivery backend for outgoing mail
#[async_trait]
pub trait MailTransport: Send + Sync {
    async fn send(&self, mail: &OutgoingEmail) -> Result<()>;
}

/// SMTP delivery via lettre
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
}

impl SmtpMailer {
    /// Build an SMTP transport from configuration
    pub fn new(config: &MailConfig) -> Result<Self> {
        let mut builder = AsyncSmtpTransport::<Tokio1Executor>::relay(&config.smtp_host)
            .map_err(|e| AppError::Configuration {
                message: format!("Invalid SMTP relay '{}': {}", config.smtp_host, e),
            })?
            .port(config.smtp_port);

        if let (Some(username), Some(password)) = (&config.smtp_username, &config.smtp_password) {
            builder = builder.credentials(Credentials::new(username.clone(), password.clone()));
        }

        Ok(Self {
            transport: builder.build(),
        })
    }
}

#[async_trait]
impl MailTransport for SmtpMailer {
    async fn send(&self, mail: &OutgoingEmail) -> Result<()> {
        let from: Mailbox = mail.from.parse().map_err(|e| AppError::Mail {
            message: format!("Invalid sender address '{}': {}", mail.from, e),
        })?;

        let mut builder = Message::builder().from(from).subject(mail.subject.clone());

        for recipient in &mail.to {
            let to: Mailbox = recipient.parse().map_err(|e| AppError::Mail {
                message: format!("Invalid recipient address '{}': {}", recipient, e),
            })?;
            builder = builder.to(to);
        }

        let message = builder.body(mail.body.clone()).map_err(|e| AppError::Mail {
            message: format!("Failed to build message: {}", e),
        })?;

        self.transport.send(message).await.map_err(|e| AppError::Mail {
            message: format!("SMTP delivery failed: {}", e),
        })?;

        Ok(())
    }
}

/// In-memory backend that records every message instead of delivering it
#[derive(Default)]
pub struct MemoryMailer {
    sent: Mutex<Vec<OutgoingEmail>>,
}

impl MemoryMailer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of every message recorded so far
    pub fn sent(&self) -> Vec<OutgoingEmail> {
        self.sent.lock().expect("mailer lock poisoned").clone()
    }
}

#[async_trait]
impl MailTransport for MemoryMailer {
    async fn send(&self, mail: &OutgoingEmail) -> Result<()> {
        self.sent.lock().expect("mailer lock poisoned").push(mail.clone());
        Ok(())
    }
}

/// Build the configured mail backend
pub fn build_transport(config: &MailConfig) -> Result<Arc<dyn MailTransport>> {
    match config.backend.as_str() {
        "smtp" => Ok(Arc::new(SmtpMailer::new(config)?)),
        "memory" => Ok(Arc::new(MemoryMailer::new())),
        other => Err(AppError::Configuration {
            message: format!("Unknown mail backend '{}'", other),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contact_message_body_format() {
        let body = contact_message_body("Test User", "test@example.com", "Test message");
        assert_eq!(
            body,
            "Name: Test User\n Reply-To: test@example.com\nContent: Test message"
        );
    }

    #[tokio::test]
    async fn test_memory_mailer_records_messages() {
        let mailer = MemoryMailer::new();
        let mail = OutgoingEmail {
            from: "noreply@example.com".to_string(),
            to: vec!["admin@example.com".to_string()],
            subject: CONTACT_SUBJECT.to_string(),
            body: "hello".to_string(),
        };

        mailer.send(&mail).await.unwrap();

        let sent = mailer.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0], mail);
    }

    #[test]
    fn test_unknown_backend_rejected() {
        let mut config = MailConfig {
            backend: "carrier-pigeon".to_string(),
            smtp_host: "localhost".to_string(),
            smtp_port: 587,
            smtp_username: None,
            smtp_password: None,
            sender: "noreply@example.com".to_string(),
            recipients: vec![],
        };
        assert!(build_transport(&config).is_err());

        config.backend = "memory".to_string();
        assert!(build_transport(&config).is_ok());
    }
}
