//! Contact notification dispatch
//!
//! A bounded in-process queue plus a worker task. Request handlers enqueue
//! without blocking and never observe delivery status; the worker composes
//! the fixed-format message and hands it to the mail transport. Delivery
//! failures are logged here and go no further. Pending notifications are
//! not drained at shutdown.

use crate::config::MailConfig;
use crate::mail::{contact_message_body, MailTransport, OutgoingEmail, CONTACT_SUBJECT};
use crate::metrics::{
    record_notification_dropped, record_notification_enqueued, record_notification_outcome,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

/// Payload for one contact notification
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactNotification {
    pub name: String,
    pub email: String,
    pub content: String,
}

/// Handle for enqueueing notifications; cheap to clone
#[derive(Clone)]
pub struct Notifier {
    tx: mpsc::Sender<ContactNotification>,
}

impl Notifier {
    /// Enqueue a notification without blocking. A full queue drops the
    /// notification; the persisted contact request remains the durable record.
    pub fn dispatch(&self, notification: ContactNotification) {
        match self.tx.try_send(notification) {
            Ok(()) => {
                record_notification_enqueued();
            }
            Err(TrySendError::Full(dropped)) => {
                record_notification_dropped("queue_full");
                warn!(
                    email = %dropped.email,
                    "Notification queue full, dropping contact notification"
                );
            }
            Err(TrySendError::Closed(dropped)) => {
                record_notification_dropped("worker_gone");
                warn!(
                    email = %dropped.email,
                    "Notification worker stopped, dropping contact notification"
                );
            }
        }
    }
}

/// Spawn the dispatcher worker and return the enqueue handle.
///
/// The worker runs until every `Notifier` clone is dropped.
pub fn spawn_dispatcher(
    mail_config: &MailConfig,
    queue_capacity: usize,
    transport: Arc<dyn MailTransport>,
) -> (Notifier, JoinHandle<()>) {
    let (tx, rx) = mpsc::channel(queue_capacity);

    let sender = mail_config.sender.clone();
    let recipients = mail_config.recipients.clone();

    let handle = tokio::spawn(run_worker(rx, transport, sender, recipients));

    (Notifier { tx }, handle)
}

async fn run_worker(
    mut rx: mpsc::Receiver<ContactNotification>,
    transport: Arc<dyn MailTransport>,
    sender: String,
    recipients: Vec<String>,
) {
    info!(recipients = recipients.len(), "Notification dispatcher ready");

    while let Some(notification) = rx.recv().await {
        let mail = OutgoingEmail {
            from: sender.clone(),
            to: recipients.clone(),
            subject: CONTACT_SUBJECT.to_string(),
            body: contact_message_body(
                &notification.name,
                &notification.email,
                &notification.content,
            ),
        };

        match transport.send(&mail).await {
            Ok(()) => {
                record_notification_outcome(true);
                info!(email = %notification.email, "Contact notification sent");
            }
            Err(e) => {
                // Contained at this boundary: the submitter never sees it and
                // the stored contact request is untouched.
                record_notification_outcome(false);
                error!(
                    error = %e,
                    email = %notification.email,
                    "Failed to send contact notification"
                );
            }
        }
    }

    info!("Notification dispatcher stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::{AppError, Result};
    use crate::mail::MemoryMailer;
    use async_trait::async_trait;

    fn mail_config(recipients: Vec<&str>) -> MailConfig {
        MailConfig {
            backend: "memory".to_string(),
            smtp_host: "localhost".to_string(),
            smtp_port: 587,
            smtp_username: None,
            smtp_password: None,
            sender: "noreply@example.com".to_string(),
            recipients: recipients.into_iter().map(String::from).collect(),
        }
    }

    struct FailingMailer;

    #[async_trait]
    impl MailTransport for FailingMailer {
        async fn send(&self, _mail: &OutgoingEmail) -> Result<()> {
            Err(AppError::Mail {
                message: "connection refused".to_string(),
            })
        }
    }

    #[tokio::test]
    async fn test_dispatch_delivers_exactly_once() {
        let mailer = Arc::new(MemoryMailer::new());
        let transport: Arc<dyn MailTransport> = mailer.clone();

        let (notifier, handle) = spawn_dispatcher(&mail_config(vec!["admin@example.com"]), 8, transport);

        notifier.dispatch(ContactNotification {
            name: "Test User".to_string(),
            email: "test@example.com".to_string(),
            content: "Test message".to_string(),
        });

        drop(notifier);
        handle.await.unwrap();

        let sent = mailer.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].from, "noreply@example.com");
        assert_eq!(sent[0].to, vec!["admin@example.com".to_string()]);
        assert_eq!(sent[0].subject, "New Contact Request");
        assert_eq!(
            sent[0].body,
            "Name: Test User\n Reply-To: test@example.com\nContent: Test message"
        );
    }

    #[tokio::test]
    async fn test_delivery_failure_is_contained() {
        let (notifier, handle) =
            spawn_dispatcher(&mail_config(vec!["admin@example.com"]), 8, Arc::new(FailingMailer));

        notifier.dispatch(ContactNotification {
            name: "Someone".to_string(),
            email: "someone@example.com".to_string(),
            content: "Hello".to_string(),
        });

        drop(notifier);
        // The worker absorbs the failure and exits cleanly
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn test_dispatch_after_worker_stopped_is_dropped() {
        let mailer = Arc::new(MemoryMailer::new());
        let transport: Arc<dyn MailTransport> = mailer.clone();

        let (notifier, handle) = spawn_dispatcher(&mail_config(vec!["admin@example.com"]), 8, transport);

        handle.abort();
        let _ = handle.await;

        // Must not panic or block
        notifier.dispatch(ContactNotification {
            name: "Late".to_string(),
            email: "late@example.com".to_string(),
            content: "too late".to_string(),
        });
    }
}
