use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub ttl_minutes: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PaymentConfig {
    pub api_url: String,
    pub secret_key: String,
    pub redirect_url: String,
    pub amount: u32,
    pub currency: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub session: SessionConfig,
    pub payment: PaymentConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL")?;
        let session = SessionConfig {
            secret: std::env::var("SESSION_SECRET")?,
            issuer: std::env::var("SESSION_ISSUER").unwrap_or_else(|_| "jobboard".into()),
            audience: std::env::var("SESSION_AUDIENCE")
                .unwrap_or_else(|_| "jobboard-session".into()),
            ttl_minutes: std::env::var("SESSION_TTL_MINUTES")
                .ok()
                .and_then(|v| v.parse::<i64>().ok())
                .unwrap_or(12 * 60),
        };
        let payment = PaymentConfig {
            api_url: std::env::var("PAYMENT_API_URL")
                .unwrap_or_else(|_| "https://api.flutterwave.com/v3/payments".into()),
            secret_key: std::env::var("PAYMENT_SECRET_KEY").unwrap_or_default(),
            redirect_url: std::env::var("PAYMENT_REDIRECT_URL")
                .unwrap_or_else(|_| "https://example.com/payment-success".into()),
            amount: std::env::var("PAYMENT_AMOUNT")
                .ok()
                .and_then(|v| v.parse::<u32>().ok())
                .unwrap_or(10),
            currency: std::env::var("PAYMENT_CURRENCY").unwrap_or_else(|_| "GHS".into()),
        };
        Ok(Self {
            database_url,
            session,
            payment,
        })
    }
}
