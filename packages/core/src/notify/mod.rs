//! Outbound notifications.
//!
//! The account flow hands messages (signup OTPs) to a [`Notifier`] built
//! once at startup. Delivery is fire-and-forget: [`dispatch`] runs the send
//! on its own task and only logs the outcome, so a failing relay never
//! fails the request that triggered it.

pub mod webhook;

use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;
use tokio::task::JoinHandle;

pub use webhook::WebhookNotifier;

/// An email-style message.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Notification {
    pub from: Option<String>,
    pub to: String,
    pub subject: String,
    pub text: String,
}

#[derive(Error, Debug)]
pub enum NotifyError {
    #[error("Network error: {message}")]
    Network { message: String },

    #[error("Relay rejected message with HTTP {status}")]
    Rejected { status: u16 },
}

/// Capability to deliver a [`Notification`].
#[async_trait]
pub trait Notifier {
    async fn send(&self, notification: &Notification) -> Result<(), NotifyError>;

    /// Name used in log lines.
    fn name(&self) -> &str;
}

pub type SharedNotifier = Arc<dyn Notifier + Send + Sync>;

/// Notifier used when no relay is configured: logs and succeeds.
#[derive(Debug, Default, Clone)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn send(&self, notification: &Notification) -> Result<(), NotifyError> {
        tracing::info!(
            to = %notification.to,
            subject = %notification.subject,
            "No notification relay configured; message not delivered"
        );
        Ok(())
    }

    fn name(&self) -> &str {
        "log"
    }
}

/// Wraps another notifier and counts its failed sends.
pub struct CountingNotifier {
    inner: SharedNotifier,
    failures: prometheus::Counter,
}

impl CountingNotifier {
    pub fn new(inner: SharedNotifier, failures: prometheus::Counter) -> Self {
        Self { inner, failures }
    }
}

#[async_trait]
impl Notifier for CountingNotifier {
    async fn send(&self, notification: &Notification) -> Result<(), NotifyError> {
        let result = self.inner.send(notification).await;
        if result.is_err() {
            self.failures.inc();
        }
        result
    }

    fn name(&self) -> &str {
        self.inner.name()
    }
}

/// Send `notification` in the background. The returned handle never yields
/// an error; failures are logged.
pub fn dispatch(notifier: SharedNotifier, notification: Notification) -> JoinHandle<()> {
    tokio::spawn(async move {
        match notifier.send(&notification).await {
            Ok(()) => tracing::debug!(
                notifier = notifier.name(),
                to = %notification.to,
                "Notification sent"
            ),
            Err(err) => tracing::error!(
                "Failed to send notification via {} to {}: {}",
                notifier.name(),
                notification.to,
                err
            ),
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FailingNotifier {
        attempts: AtomicUsize,
    }

    #[async_trait]
    impl Notifier for FailingNotifier {
        async fn send(&self, _: &Notification) -> Result<(), NotifyError> {
            self.attempts.fetch_add(1, Ordering::SeqCst);
            Err(NotifyError::Rejected { status: 502 })
        }

        fn name(&self) -> &str {
            "failing"
        }
    }

    fn make_notification() -> Notification {
        Notification {
            from: None,
            to: "ada@example.com".to_string(),
            subject: "Your OTP for signup".to_string(),
            text: "Your OTP is: 123456".to_string(),
        }
    }

    #[tokio::test]
    async fn dispatch_swallows_send_failures() {
        let notifier = Arc::new(FailingNotifier { attempts: AtomicUsize::new(0) });

        let handle = dispatch(notifier.clone(), make_notification());

        assert!(handle.await.is_ok());
        assert_eq!(notifier.attempts.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn counting_notifier_counts_only_failures() {
        let failures = prometheus::Counter::new("failures", "failed sends").unwrap();

        let failing = CountingNotifier::new(
            Arc::new(FailingNotifier { attempts: AtomicUsize::new(0) }),
            failures.clone(),
        );
        assert!(failing.send(&make_notification()).await.is_err());
        assert_eq!(failing.name(), "failing");

        let logging = CountingNotifier::new(Arc::new(LogNotifier), failures.clone());
        assert!(logging.send(&make_notification()).await.is_ok());

        assert!((failures.get() - 1.0).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn log_notifier_always_succeeds() {
        assert!(LogNotifier.send(&make_notification()).await.is_ok());
    }
}
