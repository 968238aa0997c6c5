//! Server configuration

use crate::error::BoxError;
use crate::payment::GatewayConfig;

/// Server configuration, loaded once at startup
#[derive(Debug, Clone)]
pub struct Config {
    /// Environment: development | staging | production
    pub environment: String,
    /// SQLite database file
    pub database_path: String,
    /// HTTP port
    pub http_port: u16,
    /// KBZPay merchant code
    pub kpay_merchant_id: String,
    /// KBZPay shared signing secret
    pub kpay_api_key: String,
    /// KBZPay API base URL
    pub kpay_api_url: String,
    /// Public base URL of this server (payment notify_url)
    pub app_url: String,
    /// Storefront base URL (continue_url, mock payment page)
    pub frontend_url: String,
    /// Store name printed on receipts
    pub store_name: String,
    /// Receipt line width in characters (58mm paper = 32)
    pub receipt_width: usize,
    /// Gateway success also moves the order to completed
    pub payment_completes_order: bool,
    pub log_level: String,
    pub log_dir: Option<String>,
    pub log_json: bool,
}

impl Config {
    /// Require a secret env var: must be set and non-empty in non-development environments.
    fn require_secret(name: &str, environment: &str) -> Result<String, BoxError> {
        let val = match std::env::var(name) {
            Ok(v) => v,
            Err(_) => {
                if environment != "development" {
                    return Err(format!("{name} must be set in {environment} environment").into());
                }
                format!("dev-{name}-not-for-production")
            }
        };
        if val.is_empty() && environment != "development" {
            return Err(format!("{name} must not be empty in {environment} environment").into());
        }
        Ok(val)
    }

    fn flag(name: &str) -> bool {
        std::env::var(name)
            .map(|v| matches!(v.to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(false)
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, BoxError> {
        let environment = std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into());

        Ok(Self {
            database_path: std::env::var("DATABASE_PATH").unwrap_or_else(|_| "data/pos.db".into()),
            http_port: std::env::var("HTTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(3000),
            kpay_merchant_id: Self::require_secret("KPAY_MERCHANT_ID", &environment)?,
            kpay_api_key: Self::require_secret("KPAY_API_KEY", &environment)?,
            kpay_api_url: std::env::var("KPAY_API_URL")
                .unwrap_or_else(|_| "https://api.kbzpay.com".into()),
            app_url: std::env::var("APP_URL").unwrap_or_else(|_| "http://localhost:3000".into()),
            frontend_url: std::env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:5173".into()),
            store_name: std::env::var("STORE_NAME").unwrap_or_else(|_| "Alisa Cake".into()),
            receipt_width: std::env::var("RECEIPT_WIDTH")
                .ok()
                .and_then(|w| w.parse().ok())
                .filter(|w| *w >= 24)
                .unwrap_or(32),
            payment_completes_order: Self::flag("PAYMENT_COMPLETES_ORDER"),
            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".into()),
            log_dir: std::env::var("LOG_DIR").ok().filter(|s| !s.is_empty()),
            log_json: Self::flag("LOG_JSON"),
            environment,
        })
    }

    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }

    /// Explicit gateway settings handed to the payment adapter
    pub fn gateway_config(&self) -> GatewayConfig {
        GatewayConfig {
            merchant_id: self.kpay_merchant_id.clone(),
            api_key: self.kpay_api_key.clone(),
            api_url: self.kpay_api_url.trim_end_matches('/').to_string(),
            notify_url: format!("{}/api/payment/callback", self.app_url.trim_end_matches('/')),
            frontend_url: self.frontend_url.trim_end_matches('/').to_string(),
            mock_mode: self.is_development(),
            completes_order: self.payment_completes_order,
        }
    }
}
