use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;

use super::{ProviderError, error_message};
use crate::{config::WhatsAppConfig, domain::validation::whatsapp_recipient};

/// Text-message delivery to a phone number.
#[async_trait]
pub trait Notifier: Send + Sync {
    fn is_configured(&self) -> bool;

    /// Sends `body` and returns the provider's message id.
    async fn send_text(&self, phone: &str, body: &str) -> Result<String, ProviderError>;
}

pub struct WhatsAppClient {
    http: reqwest::Client,
    config: WhatsAppConfig,
}

impl WhatsAppClient {
    pub fn new(http: reqwest::Client, config: WhatsAppConfig) -> Self {
        Self { http, config }
    }

    fn credentials(&self) -> Option<(&str, &str)> {
        match (&self.config.phone_number_id, &self.config.access_token) {
            (Some(id), Some(token)) => Some((id.as_str(), token.as_str())),
            _ => None,
        }
    }
}

#[derive(Deserialize)]
struct SendResponse {
    messages: Vec<SentMessage>,
}

#[derive(Deserialize)]
struct SentMessage {
    id: String,
}

#[async_trait]
impl Notifier for WhatsAppClient {
    fn is_configured(&self) -> bool {
        self.credentials().is_some()
    }

    async fn send_text(&self, phone: &str, body: &str) -> Result<String, ProviderError> {
        let (phone_number_id, token) = self
            .credentials()
            .ok_or(ProviderError::NotConfigured("WhatsApp"))?;

        let url = format!(
            "{}/{}/messages",
            self.config.api_base.trim_end_matches('/'),
            phone_number_id
        );
        let response = self
            .http
            .post(url)
            .bearer_auth(token)
            .json(&json!({
                "messaging_product": "whatsapp",
                "to": whatsapp_recipient(phone),
                "type": "text",
                "text": { "body": body },
            }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body: serde_json::Value = response.json().await.unwrap_or_default();
            return Err(ProviderError::Rejected(error_message(status, &body)));
        }

        let sent: SendResponse = response.json().await?;
        sent.messages
            .into_iter()
            .next()
            .map(|m| m.id)
            .ok_or_else(|| ProviderError::Rejected("provider returned no message id".into()))
    }
}

#[derive(Debug, Clone)]
pub struct BulkOutcome {
    pub phone: String,
    pub result: Result<String, String>,
}

/// Sends `body` to each phone in turn, pausing `delay` between sends to stay
/// under the provider's rate limit. A failed send does not stop the run.
pub async fn send_bulk(
    notifier: &dyn Notifier,
    phones: &[String],
    body: &str,
    delay: Duration,
) -> Vec<BulkOutcome> {
    let mut outcomes = Vec::with_capacity(phones.len());
    for (index, phone) in phones.iter().enumerate() {
        if index > 0 && !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        let result = notifier
            .send_text(phone, body)
            .await
            .map_err(|err| err.to_string());
        if let Err(err) = &result {
            tracing::warn!(phone = %phone, error = %err, "bulk send failed for recipient");
        }
        outcomes.push(BulkOutcome {
            phone: phone.clone(),
            result,
        });
    }
    outcomes
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;

    struct RecordingNotifier {
        fail_for: &'static str,
        sent: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl Notifier for RecordingNotifier {
        fn is_configured(&self) -> bool {
            true
        }

        async fn send_text(&self, phone: &str, _body: &str) -> Result<String, ProviderError> {
            self.sent.lock().unwrap().push(phone.to_string());
            if phone == self.fail_for {
                Err(ProviderError::Rejected("invalid recipient".into()))
            } else {
                Ok(format!("wamid.{phone}"))
            }
        }
    }

    #[tokio::test]
    async fn bulk_send_keeps_going_after_a_failure() {
        let notifier = RecordingNotifier {
            fail_for: "9000000002",
            sent: Mutex::new(Vec::new()),
        };
        let phones = vec![
            "9000000001".to_string(),
            "9000000002".to_string(),
            "9000000003".to_string(),
        ];

        let outcomes = send_bulk(&notifier, &phones, "Diwali sale!", Duration::ZERO).await;

        assert_eq!(*notifier.sent.lock().unwrap(), phones);
        assert_eq!(outcomes.len(), 3);
        assert_eq!(outcomes[0].result, Ok("wamid.9000000001".to_string()));
        assert_eq!(outcomes[1].result, Err("invalid recipient".to_string()));
        assert!(outcomes[2].result.is_ok());
    }

    #[tokio::test]
    async fn unconfigured_client_refuses_without_network() {
        let client = WhatsAppClient::new(reqwest::Client::new(), WhatsAppConfig::default());
        assert!(!client.is_configured());
        let err = client.send_text("9876543210", "hi").await.unwrap_err();
        assert!(matches!(err, ProviderError::NotConfigured("WhatsApp")));
    }
}
