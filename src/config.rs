use std::time::Duration;

use chrono::FixedOffset;

/// Application configuration loaded from environment variables
///
/// Timeout and timezone behavior is deliberately explicit here instead of
/// relying on HTTP client defaults: every outbound collaborator (payment
/// provider, POS upload, email) builds its client from `http_timeout`.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub host: String,
    pub port: String,
    /// Payment provider secret key (connected-account checkout sessions)
    pub stripe_secret_key: String,
    /// Shared secret for webhook signature verification
    pub stripe_webhook_secret: String,
    /// Base URL the customer lands on after paying; the order id is appended
    pub checkout_success_url: String,
    /// URL the customer returns to when abandoning the hosted payment page
    pub checkout_cancel_url: String,
    /// Fixed endpoint of the legacy point-of-sale system
    pub pos_endpoint: String,
    /// API key for the transactional email provider (receipts)
    pub email_api_key: String,
    /// Sender address for receipts
    pub email_from: String,
    /// Timeout applied to all outbound HTTP calls
    pub http_timeout: Duration,
    /// Bakery local timezone as a UTC offset in hours (e.g. -6 for Monterrey)
    pub utc_offset_hours: i32,
    /// Optional path to a JSON branch routing table; the built-in default is
    /// used when unset
    pub routing_table_path: Option<String>,
}

impl AppConfig {
    /// Load configuration from the environment
    ///
    /// Only DATABASE_URL is required; everything else has a deploy-friendly
    /// default so local development works with a minimal .env file.
    pub fn from_env() -> Result<Self, String> {
        let database_url = std::env::var("DATABASE_URL")
            .map_err(|_| "DATABASE_URL must be set in environment".to_string())?;

        let http_timeout_secs: u64 = std::env::var("HTTP_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(15);

        let utc_offset_hours: i32 = std::env::var("UTC_OFFSET_HOURS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(-6);

        if !(-12..=14).contains(&utc_offset_hours) {
            return Err(format!("UTC_OFFSET_HOURS out of range: {}", utc_offset_hours));
        }

        Ok(Self {
            database_url,
            host: std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: std::env::var("PORT").unwrap_or_else(|_| "8080".to_string()),
            stripe_secret_key: std::env::var("STRIPE_SECRET_KEY").unwrap_or_default(),
            stripe_webhook_secret: std::env::var("STRIPE_WEBHOOK_SECRET").unwrap_or_default(),
            checkout_success_url: std::env::var("CHECKOUT_SUCCESS_URL")
                .unwrap_or_else(|_| "http://localhost:4321/order-success".to_string()),
            checkout_cancel_url: std::env::var("CHECKOUT_CANCEL_URL")
                .unwrap_or_else(|_| "http://localhost:4321/checkout".to_string()),
            pos_endpoint: std::env::var("POS_ENDPOINT")
                .unwrap_or_else(|_| "https://app.rmstech.mx/api/guardar_pedido".to_string()),
            email_api_key: std::env::var("EMAIL_API_KEY").unwrap_or_default(),
            email_from: std::env::var("EMAIL_FROM")
                .unwrap_or_else(|_| "recibos@lapasteleria.mx".to_string()),
            http_timeout: Duration::from_secs(http_timeout_secs),
            utc_offset_hours,
            routing_table_path: std::env::var("ROUTING_TABLE_PATH").ok(),
        })
    }

    /// Bakery local timezone offset for cutoff evaluation
    pub fn local_offset(&self) -> FixedOffset {
        // Checked in from_env, so the unwrap cannot fire at runtime
        FixedOffset::east_opt(self.utc_offset_hours * 3600)
            .unwrap_or_else(|| FixedOffset::east_opt(0).expect("zero offset is valid"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_local_offset_negative() {
        let config = AppConfig {
            database_url: String::new(),
            host: String::new(),
            port: String::new(),
            stripe_secret_key: String::new(),
            stripe_webhook_secret: String::new(),
            checkout_success_url: String::new(),
            checkout_cancel_url: String::new(),
            pos_endpoint: String::new(),
            email_api_key: String::new(),
            email_from: String::new(),
            http_timeout: Duration::from_secs(15),
            utc_offset_hours: -6,
            routing_table_path: None,
        };

        assert_eq!(config.local_offset().local_minus_utc(), -6 * 3600);
    }
}
