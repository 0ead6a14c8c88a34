use std::sync::Arc;

use crate::{
    clients::{
        self,
        ai::{Advisor, ChatCompletionClient},
        email::{HttpMailer, Mailer},
        payments::{PaymentGateway, RazorpayClient},
        whatsapp::{Notifier, WhatsAppClient},
    },
    config::AppConfig,
    db::{DbPool, OrmConn},
    domain::analytics::BusinessClock,
};

/// Long-lived outbound clients, built once per process.
#[derive(Clone)]
pub struct Providers {
    pub notifier: Arc<dyn Notifier>,
    pub advisor: Arc<dyn Advisor>,
    pub mailer: Arc<dyn Mailer>,
    pub gateway: Arc<dyn PaymentGateway>,
}

impl Providers {
    pub fn from_config(config: &AppConfig) -> anyhow::Result<Self> {
        let http = clients::http_client(config.provider_timeout)?;
        Ok(Self {
            notifier: Arc::new(WhatsAppClient::new(http.clone(), config.whatsapp.clone())),
            advisor: Arc::new(ChatCompletionClient::new(http.clone(), config.ai.clone())),
            mailer: Arc::new(HttpMailer::new(http.clone(), config.email.clone())),
            gateway: Arc::new(RazorpayClient::new(http, config.payments.clone())),
        })
    }
}

#[derive(Clone)]
pub struct AppState {
    pub pool: DbPool,
    pub orm: OrmConn,
    pub config: Arc<AppConfig>,
    pub clock: BusinessClock,
    pub notifier: Arc<dyn Notifier>,
    pub advisor: Arc<dyn Advisor>,
    pub mailer: Arc<dyn Mailer>,
    pub gateway: Arc<dyn PaymentGateway>,
}

impl AppState {
    pub fn new(pool: DbPool, orm: OrmConn, config: AppConfig, providers: Providers) -> Self {
        Self {
            pool,
            orm,
            clock: BusinessClock::new(config.business_offset),
            config: Arc::new(config),
            notifier: providers.notifier,
            advisor: providers.advisor,
            mailer: providers.mailer,
            gateway: providers.gateway,
        }
    }
}
