use std::env;
use std::time::Duration;

pub mod cors;
pub mod security;

pub use cors::{create_cors_layer, create_gateway_cors_layer};
pub use security::security_headers;

pub struct Config {
    pub database_url: String,
    pub port: u16,
    pub gateway_base_url: String,
    pub gateway_secret_key: String,
    pub gateway_currency: String,
    pub gateway_timeout: Duration,
    pub checkout_return_url: Option<String>,
    pub admin_email: Option<String>,
    pub storage_base_url: String,
    pub storage_bucket: String,
    pub storage_api_key: String,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| "postgres://localhost/pavilion".to_string()),
            port: env::var("PORT")
                .ok()
                .and_then(|value| value.parse().ok())
                .unwrap_or(3001),
            gateway_base_url: env::var("CHAPA_BASE_URL")
                .unwrap_or_else(|_| "https://api.chapa.co/v1".to_string()),
            gateway_secret_key: env::var("CHAPA_SECRET_KEY").unwrap_or_default(),
            gateway_currency: env::var("PAYMENT_CURRENCY").unwrap_or_else(|_| "ETB".to_string()),
            gateway_timeout: Duration::from_secs(
                env::var("GATEWAY_TIMEOUT_SECS")
                    .ok()
                    .and_then(|value| value.parse().ok())
                    .unwrap_or(15),
            ),
            checkout_return_url: env::var("CHECKOUT_RETURN_URL").ok(),
            admin_email: env::var("ADMIN_EMAIL").ok(),
            storage_base_url: env::var("STORAGE_BASE_URL")
                .unwrap_or_else(|_| "http://localhost:54321/storage/v1".to_string()),
            storage_bucket: env::var("STORAGE_BUCKET").unwrap_or_else(|_| "banners".to_string()),
            storage_api_key: env::var("STORAGE_API_KEY").unwrap_or_default(),
        }
    }
}
