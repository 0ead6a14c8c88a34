use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;

use super::{ProviderError, error_message};
use crate::config::PaymentConfig;

#[derive(Debug, Clone, Deserialize)]
pub struct GatewayOrder {
    pub id: String,
    pub amount: i64,
    pub currency: String,
}

/// Hosted-checkout payment gateway.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Public key id handed to the browser checkout; `None` when unconfigured.
    fn key_id(&self) -> Option<&str>;

    /// Secret used to verify callback signatures; `None` when unconfigured.
    fn key_secret(&self) -> Option<&str>;

    async fn create_order(
        &self,
        amount_paise: i64,
        currency: &str,
        receipt: &str,
    ) -> Result<GatewayOrder, ProviderError>;
}

pub struct RazorpayClient {
    http: reqwest::Client,
    config: PaymentConfig,
}

impl RazorpayClient {
    pub fn new(http: reqwest::Client, config: PaymentConfig) -> Self {
        Self { http, config }
    }
}

#[async_trait]
impl PaymentGateway for RazorpayClient {
    fn key_id(&self) -> Option<&str> {
        self.config.key_id.as_deref()
    }

    fn key_secret(&self) -> Option<&str> {
        self.config.key_secret.as_deref()
    }

    async fn create_order(
        &self,
        amount_paise: i64,
        currency: &str,
        receipt: &str,
    ) -> Result<GatewayOrder, ProviderError> {
        let (Some(key_id), Some(key_secret)) = (self.key_id(), self.key_secret()) else {
            return Err(ProviderError::NotConfigured("Payment gateway"));
        };

        let url = format!("{}/orders", self.config.api_base.trim_end_matches('/'));
        let response = self
            .http
            .post(url)
            .basic_auth(key_id, Some(key_secret))
            .json(&json!({
                "amount": amount_paise,
                "currency": currency,
                "receipt": receipt,
            }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body: serde_json::Value = response.json().await.unwrap_or_default();
            return Err(ProviderError::Rejected(error_message(status, &body)));
        }
        Ok(response.json().await?)
    }
}
