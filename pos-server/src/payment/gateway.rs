//! Outbound gateway calls
//!
//! The HTTP hop sits behind [`GatewayTransport`] so tests can swap in a fake.
//! A failed call is reported as `PaymentGatewayError`; nothing local changes,
//! so the caller may simply retry.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use shared::models::Order;
use shared::util::now_millis;

use super::GatewayConfig;
use super::signature::{self, SIGN_FIELD};
use crate::error::BoxError;
use crate::orders::money::format_amount;
use crate::utils::{AppError, AppResult, ErrorCode};

/// Outbound request timeout
const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

const CURRENCY: &str = "MMK";
const METHOD_CODE: &str = "011";
const TRADE_TYPE: &str = "APP";

/// One POST of signed form fields, JSON back
#[async_trait]
pub trait GatewayTransport: Send + Sync {
    async fn post(&self, url: &str, params: &BTreeMap<String, String>) -> Result<Value, BoxError>;
}

/// reqwest-backed transport
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new() -> Result<Self, BoxError> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl GatewayTransport for HttpTransport {
    async fn post(&self, url: &str, params: &BTreeMap<String, String>) -> Result<Value, BoxError> {
        let resp = self
            .client
            .post(url)
            .json(params)
            .send()
            .await?
            .error_for_status()?
            .json::<Value>()
            .await?;
        Ok(resp)
    }
}

/// Result of `create_payment`
#[derive(Debug, Clone, Serialize)]
pub struct PaymentInit {
    pub order_no: String,
    /// Where the customer is sent to pay
    pub payment_url: Option<String>,
    pub transaction_id: Option<String>,
    pub mock: bool,
    /// Raw gateway answer (absent in mock mode)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gateway_response: Option<Value>,
}

/// Result of `query_order`: the gateway's view, never applied by itself
#[derive(Debug, Clone, Serialize)]
pub struct GatewayQuery {
    pub order_no: String,
    /// Gateway status token, if the gateway reported one
    pub trade_status: Option<String>,
    pub transaction_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gateway_response: Option<Value>,
}

pub struct KPayGateway {
    config: GatewayConfig,
    transport: Arc<dyn GatewayTransport>,
}

impl KPayGateway {
    pub fn new(config: GatewayConfig) -> Result<Self, BoxError> {
        Ok(Self::with_transport(config, Arc::new(HttpTransport::new()?)))
    }

    pub fn with_transport(config: GatewayConfig, transport: Arc<dyn GatewayTransport>) -> Self {
        Self { config, transport }
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    /// Check a callback's `sign` against the shared secret
    pub fn verify(&self, params: &BTreeMap<String, String>, signature: &str) -> bool {
        signature::verify(params, signature, &self.config.api_key)
    }

    fn signed(&self, mut params: BTreeMap<String, String>) -> AppResult<BTreeMap<String, String>> {
        let sign = signature::sign(&params, &self.config.api_key)?;
        params.insert(SIGN_FIELD.to_string(), sign);
        Ok(params)
    }

    /// Build and send a signed payment request
    pub async fn create_payment(&self, order: &Order) -> AppResult<PaymentInit> {
        if self.config.mock_mode {
            let url = format!(
                "{}/payment/mock?order_no={}",
                self.config.frontend_url, order.order_no
            );
            tracing::info!(order_no = %order.order_no, "Mock payment created");
            return Ok(PaymentInit {
                order_no: order.order_no.clone(),
                payment_url: Some(url),
                transaction_id: Some(format!("MOCK_{}", now_millis())),
                mock: true,
                gateway_response: None,
            });
        }

        let params = self.signed(BTreeMap::from([
            ("merch_code".to_string(), self.config.merchant_id.clone()),
            ("merch_order_id".to_string(), order.order_no.clone()),
            ("total_amount".to_string(), format_amount(order.total_amount)),
            ("trans_currency".to_string(), CURRENCY.to_string()),
            ("method".to_string(), METHOD_CODE.to_string()),
            ("trade_type".to_string(), TRADE_TYPE.to_string()),
            ("notify_url".to_string(), self.config.notify_url.clone()),
            (
                "continue_url".to_string(),
                format!("{}/order/success", self.config.frontend_url),
            ),
            ("timestamp".to_string(), now_millis().to_string()),
        ]))?;

        let url = format!("{}/payment/gateway", self.config.api_url);
        let resp = self
            .transport
            .post(&url, &params)
            .await
            .map_err(|e| gateway_error("create_payment", &order.order_no, e))?;

        tracing::info!(order_no = %order.order_no, "Payment request accepted by gateway");
        Ok(PaymentInit {
            order_no: order.order_no.clone(),
            payment_url: string_field(&resp, &["payment_url", "pay_url", "url"]),
            transaction_id: string_field(&resp, &["transaction_id", "prepay_id"]),
            mock: false,
            gateway_response: Some(resp),
        })
    }

    /// Ask the gateway for an order's status
    pub async fn query_order(&self, order_no: &str) -> AppResult<GatewayQuery> {
        if self.config.mock_mode {
            return Ok(GatewayQuery {
                order_no: order_no.to_string(),
                trade_status: None,
                transaction_id: None,
                gateway_response: None,
            });
        }

        let params = self.signed(BTreeMap::from([
            ("merch_code".to_string(), self.config.merchant_id.clone()),
            ("merch_order_id".to_string(), order_no.to_string()),
            ("timestamp".to_string(), now_millis().to_string()),
        ]))?;

        let url = format!("{}/payment/query", self.config.api_url);
        let resp = self
            .transport
            .post(&url, &params)
            .await
            .map_err(|e| gateway_error("query_order", order_no, e))?;

        Ok(GatewayQuery {
            order_no: order_no.to_string(),
            trade_status: string_field(&resp, &["trade_status", "status"]),
            transaction_id: string_field(&resp, &["transaction_id", "trade_no"]),
            gateway_response: Some(resp),
        })
    }
}

fn gateway_error(op: &str, order_no: &str, e: BoxError) -> AppError {
    tracing::error!(op, order_no, error = %e, "Payment gateway call failed");
    AppError::new(ErrorCode::PaymentGatewayError).with_detail("order_no", order_no)
}

fn string_field(value: &Value, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|k| match value.get(*k) {
        Some(Value::String(s)) if !s.is_empty() => Some(s.clone()),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}
