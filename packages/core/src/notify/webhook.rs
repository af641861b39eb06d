//! Email relay delivery over HTTP.
//!
//! Posts each [`Notification`] as JSON to a relay endpoint that owns the
//! actual mail transport. One `reqwest::Client` is built at startup and
//! reused for every send.

use async_trait::async_trait;
use reqwest::Client;

use super::{Notification, Notifier, NotifyError};

#[derive(Clone)]
pub struct WebhookNotifier {
    url: String,
    http: Client,
}

impl WebhookNotifier {
    pub fn new(url: String) -> Self {
        Self {
            url,
            http: Client::new(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl Notifier for WebhookNotifier {
    async fn send(&self, notification: &Notification) -> Result<(), NotifyError> {
        let response = self
            .http
            .post(&self.url)
            .json(notification)
            .send()
            .await
            .map_err(|err| NotifyError::Network { message: err.to_string() })?;

        if !response.status().is_success() {
            return Err(NotifyError::Rejected {
                status: response.status().as_u16(),
            });
        }

        Ok(())
    }

    fn name(&self) -> &str {
        "webhook"
    }
}
