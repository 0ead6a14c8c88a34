use std::env;
use std::time::Duration;

use chrono::FixedOffset;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub jwt: JwtConfig,
    pub frontend_url: String,
    pub rate_limit: RateLimitConfig,
    pub business_offset: FixedOffset,
    pub campaign_delay: Duration,
    pub provider_timeout: Duration,
    pub whatsapp: WhatsAppConfig,
    pub ai: AiConfig,
    pub email: EmailConfig,
    pub payments: PaymentConfig,
}

#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub refresh_secret: String,
    pub access_ttl_minutes: i64,
    pub refresh_ttl_days: i64,
}

#[derive(Debug, Clone, Copy)]
pub struct RateLimitConfig {
    pub window: Duration,
    pub max_requests: u32,
}

#[derive(Debug, Clone, Default)]
pub struct WhatsAppConfig {
    pub phone_number_id: Option<String>,
    pub access_token: Option<String>,
    pub api_base: String,
}

#[derive(Debug, Clone, Default)]
pub struct AiConfig {
    pub api_key: Option<String>,
    pub model: String,
    pub api_url: String,
}

#[derive(Debug, Clone, Default)]
pub struct EmailConfig {
    pub api_url: Option<String>,
    pub api_key: Option<String>,
    pub from: Option<String>,
    pub dashboard_url: String,
}

#[derive(Debug, Clone, Default)]
pub struct PaymentConfig {
    pub key_id: Option<String>,
    pub key_secret: Option<String>,
    pub api_base: String,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = env::var("DATABASE_URL")?;
        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = parse_or("APP_PORT", 3000u16);

        let jwt = JwtConfig {
            secret: env::var("JWT_SECRET")
                .map_err(|_| anyhow::anyhow!("JWT_SECRET is not set"))?,
            refresh_secret: env::var("JWT_REFRESH_SECRET")
                .map_err(|_| anyhow::anyhow!("JWT_REFRESH_SECRET is not set"))?,
            access_ttl_minutes: parse_or("JWT_EXPIRE_MINUTES", 15),
            refresh_ttl_days: parse_or("JWT_REFRESH_EXPIRE_DAYS", 7),
        };

        let frontend_url =
            env::var("FRONTEND_URL").unwrap_or_else(|_| "http://localhost:5173".to_string());

        let rate_limit = RateLimitConfig {
            window: Duration::from_secs(parse_or("RATE_LIMIT_WINDOW_SECS", 900)),
            max_requests: parse_or("RATE_LIMIT_MAX_REQUESTS", 100),
        };

        let offset_minutes: i32 = parse_or("BUSINESS_UTC_OFFSET_MINUTES", 330);
        let business_offset = FixedOffset::east_opt(offset_minutes * 60)
            .ok_or_else(|| anyhow::anyhow!("BUSINESS_UTC_OFFSET_MINUTES out of range"))?;

        let whatsapp = WhatsAppConfig {
            phone_number_id: optional("WHATSAPP_PHONE_NUMBER_ID"),
            access_token: optional("WHATSAPP_ACCESS_TOKEN"),
            api_base: env::var("WHATSAPP_API_BASE")
                .unwrap_or_else(|_| "https://graph.facebook.com/v18.0".to_string()),
        };

        let ai = AiConfig {
            api_key: optional("GROQ_API_KEY"),
            model: env::var("GROQ_MODEL")
                .unwrap_or_else(|_| "llama-3.1-70b-versatile".to_string()),
            api_url: env::var("GROQ_API_URL").unwrap_or_else(|_| {
                "https://api.groq.com/openai/v1/chat/completions".to_string()
            }),
        };

        let email = EmailConfig {
            api_url: optional("EMAIL_API_URL"),
            api_key: optional("EMAIL_API_KEY"),
            from: optional("EMAIL_FROM"),
            dashboard_url: format!("{}/dashboard", frontend_url.trim_end_matches('/')),
        };

        let payments = PaymentConfig {
            key_id: optional("RAZORPAY_KEY_ID"),
            key_secret: optional("RAZORPAY_KEY_SECRET"),
            api_base: env::var("RAZORPAY_API_BASE")
                .unwrap_or_else(|_| "https://api.razorpay.com/v1".to_string()),
        };

        Ok(Self {
            port,
            database_url,
            host,
            jwt,
            frontend_url,
            rate_limit,
            business_offset,
            campaign_delay: Duration::from_millis(parse_or("CAMPAIGN_DELAY_MS", 1500)),
            provider_timeout: Duration::from_secs(parse_or("PROVIDER_TIMEOUT_SECS", 10)),
            whatsapp,
            ai,
            email,
            payments,
        })
    }
}

fn parse_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.parse::<T>().ok())
        .unwrap_or(default)
}

fn optional(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}
