// Outbound email seam
// Delivery itself belongs to an external provider; the service only needs `send`

use axum::async_trait;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::info;

/// Errors reported by an email sender
#[derive(Debug, Error)]
pub enum EmailError {
    #[error("email delivery failed: {0}")]
    Delivery(String),

    #[error("email delivery timed out")]
    Timeout,
}

/// A single message with a text and/or HTML body
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailMessage {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub text: Option<String>,
    pub html: Option<String>,
}

#[async_trait]
pub trait EmailSender: Send + Sync {
    async fn send(&self, message: EmailMessage) -> Result<(), EmailError>;
}

pub type EmailSenderArc = Arc<dyn EmailSender>;

/// Writes messages to the log instead of delivering them
#[derive(Debug, Clone, Default)]
pub struct LogEmailSender;

#[async_trait]
impl EmailSender for LogEmailSender {
    async fn send(&self, message: EmailMessage) -> Result<(), EmailError> {
        info!(
            to = %message.to,
            subject = %message.subject,
            "Email delivery is not configured; message logged only"
        );
        Ok(())
    }
}

/// Keeps sent messages in memory
#[derive(Debug, Clone, Default)]
pub struct MemoryEmailSender {
    outbox: Arc<Mutex<Vec<EmailMessage>>>,
    fail: bool,
}

impl MemoryEmailSender {
    pub fn new() -> Self {
        Self::default()
    }

    /// A sender whose every delivery fails
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub async fn sent(&self) -> Vec<EmailMessage> {
        self.outbox.lock().await.clone()
    }
}

#[async_trait]
impl EmailSender for MemoryEmailSender {
    async fn send(&self, message: EmailMessage) -> Result<(), EmailError> {
        if self.fail {
            return Err(EmailError::Delivery(format!("refused message to {}", message.to)));
        }
        self.outbox.lock().await.push(message);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message() -> EmailMessage {
        EmailMessage {
            from: "from@example.com".into(),
            to: "to@example.com".into(),
            subject: "Hello".into(),
            text: Some("Hi".into()),
            html: None,
        }
    }

    #[tokio::test]
    async fn test_memory_sender_records_messages() {
        let sender = MemoryEmailSender::new();
        sender.send(message()).await.unwrap();

        assert_eq!(sender.sent().await, vec![message()]);
    }

    #[tokio::test]
    async fn test_failing_sender() {
        let sender = MemoryEmailSender::failing();
        assert!(sender.send(message()).await.is_err());
        assert!(sender.sent().await.is_empty());
    }

    #[tokio::test]
    async fn test_log_sender_accepts_everything() {
        assert!(LogEmailSender.send(message()).await.is_ok());
    }
}
