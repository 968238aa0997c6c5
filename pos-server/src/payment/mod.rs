//! KBZPay (KPay) gateway adapter
//!
//! - [`signature`]: HMAC-SHA256 over the sorted `key=value&...` string
//! - [`gateway`]: outbound create / query requests (or mock mode)
//! - [`callback`]: inbound callback verification and application
//! - [`service`]: payment operations used by the HTTP layer

pub mod callback;
pub mod gateway;
pub mod service;
pub mod signature;

use shared::models::PaymentStatus;

pub use callback::CallbackOutcome;
pub use gateway::{GatewayQuery, GatewayTransport, HttpTransport, KPayGateway, PaymentInit};

/// Gateway settings, handed to [`KPayGateway`] at construction
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub merchant_id: String,
    /// Shared HMAC secret
    pub api_key: String,
    pub api_url: String,
    /// Where the gateway posts callbacks
    pub notify_url: String,
    pub frontend_url: String,
    /// No outbound calls; deterministic mock URLs instead
    pub mock_mode: bool,
    /// Gateway success also moves an open order to completed
    pub completes_order: bool,
}

/// Map the gateway's status vocabulary onto [`PaymentStatus`]
///
/// `None` means "not final yet" (e.g. `pending`); such callbacks are
/// acknowledged without a transition.
pub fn map_status(token: &str) -> Option<PaymentStatus> {
    match token.trim().to_ascii_lowercase().as_str() {
        "success" | "paid" | "completed" | "pay_success" => Some(PaymentStatus::Paid),
        "failed" | "fail" | "cancelled" | "canceled" | "expired" | "closed" => {
            Some(PaymentStatus::Failed)
        }
        _ => None,
    }
}

/// Payment method tokens accepted by the mock endpoint
pub const METHOD_KPAY: &str = "kpay";
pub const METHOD_CASH: &str = "cash";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_map_status() {
        assert_eq!(map_status("SUCCESS"), Some(PaymentStatus::Paid));
        assert_eq!(map_status("success"), Some(PaymentStatus::Paid));
        assert_eq!(map_status("failed"), Some(PaymentStatus::Failed));
        assert_eq!(map_status("expired"), Some(PaymentStatus::Failed));
        assert_eq!(map_status("pending"), None);
        assert_eq!(map_status(""), None);
    }
}
