use async_trait::async_trait;
use serde_json::json;

use super::{ProviderError, error_message};
use crate::config::EmailConfig;

/// Transactional email. Every call site treats failures as best-effort.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, to: &str, subject: &str, html: &str) -> Result<(), ProviderError>;
}

/// Posts `{from, to, subject, html}` to a JSON email API with a bearer key.
pub struct HttpMailer {
    http: reqwest::Client,
    config: EmailConfig,
}

impl HttpMailer {
    pub fn new(http: reqwest::Client, config: EmailConfig) -> Self {
        Self { http, config }
    }
}

#[async_trait]
impl Mailer for HttpMailer {
    async fn send(&self, to: &str, subject: &str, html: &str) -> Result<(), ProviderError> {
        let (Some(url), Some(key), Some(from)) = (
            self.config.api_url.as_deref(),
            self.config.api_key.as_deref(),
            self.config.from.as_deref(),
        ) else {
            return Err(ProviderError::NotConfigured("Email service"));
        };

        let response = self
            .http
            .post(url)
            .bearer_auth(key)
            .json(&json!({
                "from": format!("LocalBiz AI <{from}>"),
                "to": [to],
                "subject": subject,
                "html": html,
            }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body: serde_json::Value = response.json().await.unwrap_or_default();
            return Err(ProviderError::Rejected(error_message(status, &body)));
        }
        Ok(())
    }
}

pub fn welcome_email(name: &str, dashboard_url: &str) -> (String, String) {
    let subject = "Welcome to LocalBiz AI! 🎉".to_string();
    let html = format!(
        "<h2>Welcome to LocalBiz AI, {name}!</h2>\
         <p>Thank you for joining LocalBiz AI - your digital business assistant.</p>\
         <p>You can now:</p>\
         <ul>\
         <li>📦 Manage products and inventory</li>\
         <li>🛒 Track orders and customers</li>\
         <li>📱 Send WhatsApp messages automatically</li>\
         <li>🤖 Get AI-powered business insights</li>\
         </ul>\
         <p><a href=\"{dashboard_url}\">Go to Dashboard</a></p>\
         <p>Best regards,<br>LocalBiz AI Team</p>"
    );
    (subject, html)
}

pub fn payment_confirmation_email(
    name: &str,
    plan: &str,
    amount: &str,
    valid_until: &str,
) -> (String, String) {
    let subject = "Payment Successful - LocalBiz AI".to_string();
    let html = format!(
        "<h2>Payment Successful!</h2>\
         <p>Hi {name},</p>\
         <p>Your payment of ₹{amount} for the {plan} plan has been received.</p>\
         <p>Your plan is active until {valid_until}.</p>\
         <p>Best regards,<br>LocalBiz AI Team</p>"
    );
    (subject, html)
}
