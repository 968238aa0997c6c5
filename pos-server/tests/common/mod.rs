//! Shared fixtures for integration tests
//!
//! Catalog:
//! - table `A01` (id 1), table `B02` (id 2)
//! - product 1 "拿铁"/"Latte" 3500, options: 1 = Large +1000 (size), 2 = Hot +0 (temperature)
//! - product 2 "蛋糕"/"Cake" 4000, option 3 = Extra cream +500
//! - product 3 "季节限定" 5000, not available

#![allow(dead_code)]

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use pos_server::error::BoxError;
use pos_server::orders::{CartRequest, create_order};
use pos_server::payment::signature::{SIGN_FIELD, sign};
use pos_server::payment::{GatewayConfig, GatewayTransport, KPayGateway};
use pos_server::{AppState, Config, DbService};
use serde_json::{Value, json};
use shared::models::OrderCreated;
use sqlx::SqlitePool;

pub const API_KEY: &str = "test-signing-key";
pub const TABLE_A01: i64 = 1;
pub const LATTE: i64 = 1;
pub const CAKE: i64 = 2;
pub const SEASONAL: i64 = 3;
pub const OPT_LARGE: i64 = 1;
pub const OPT_HOT: i64 = 2;
pub const OPT_CREAM: i64 = 3;

pub async fn setup_pool() -> SqlitePool {
    let db = DbService::in_memory().await.unwrap();
    seed(&db.pool).await;
    db.pool
}

async fn seed(pool: &SqlitePool) {
    let statements = [
        "INSERT INTO dining_tables (id, table_number, qr_code, status) VALUES (1, 'A01', 'qr-a01', 'available')",
        "INSERT INTO dining_tables (id, table_number, qr_code, status) VALUES (2, 'B02', NULL, 'available')",
        "INSERT INTO products (id, category_id, name_zh, name_my, name_en, price, is_available, sort_order) VALUES (1, 1, '拿铁', NULL, 'Latte', 3500, 1, 1)",
        "INSERT INTO products (id, category_id, name_zh, name_my, name_en, price, is_available, sort_order) VALUES (2, 2, '蛋糕', NULL, 'Cake', 4000, 1, 2)",
        "INSERT INTO products (id, category_id, name_zh, name_my, name_en, price, is_available, sort_order) VALUES (3, 1, '季节限定', NULL, NULL, 5000, 0, 3)",
        "INSERT INTO product_options (id, product_id, option_type, name_zh, name_my, name_en, extra_price, is_default, sort_order) VALUES (1, 1, 'size', '大杯', NULL, 'Large', 1000, 0, 1)",
        "INSERT INTO product_options (id, product_id, option_type, name_zh, name_my, name_en, extra_price, is_default, sort_order) VALUES (2, 1, 'temperature', '热', NULL, 'Hot', 0, 1, 2)",
        "INSERT INTO product_options (id, product_id, option_type, name_zh, name_my, name_en, extra_price, is_default, sort_order) VALUES (3, 2, 'topping', '加奶油', NULL, 'Extra cream', 500, 0, 1)",
    ];
    for sql in statements {
        sqlx::query(sql).execute(pool).await.unwrap();
    }
}

/// Validate and materialize a cart given as JSON
pub async fn place(pool: &SqlitePool, cart: Value) -> OrderCreated {
    let cart: CartRequest = serde_json::from_value(cart).unwrap();
    create_order(pool, cart.validate().unwrap()).await.unwrap()
}

/// Two large hot lattes at A01: (3500 + 1000 + 0) x 2 = 9000
pub async fn place_dine_in(pool: &SqlitePool) -> OrderCreated {
    place(
        pool,
        json!({
            "service_type": "dine-in",
            "table_number": "A01",
            "language": "en",
            "device_id": "device-1",
            "items": [{"product_id": LATTE, "quantity": 2, "options": {"size": OPT_LARGE, "temperature": OPT_HOT}}]
        }),
    )
    .await
}

pub async fn place_takeaway(pool: &SqlitePool) -> OrderCreated {
    place(
        pool,
        json!({
            "service_type": "takeaway",
            "remark": "17:30",
            "items": [
                {"product_id": LATTE, "quantity": 1},
                {"product_id": CAKE, "quantity": 2, "options": {"topping": OPT_CREAM}}
            ]
        }),
    )
    .await
}

/// Transport that answers every POST with a canned body and remembers the calls
pub struct FakeTransport {
    pub response: Value,
    pub calls: Mutex<Vec<(String, BTreeMap<String, String>)>>,
}

impl FakeTransport {
    pub fn new(response: Value) -> Arc<Self> {
        Arc::new(Self {
            response,
            calls: Mutex::new(Vec::new()),
        })
    }
}

#[async_trait]
impl GatewayTransport for FakeTransport {
    async fn post(&self, url: &str, params: &BTreeMap<String, String>) -> Result<Value, BoxError> {
        self.calls
            .lock()
            .unwrap()
            .push((url.to_string(), params.clone()));
        Ok(self.response.clone())
    }
}

pub fn gateway_config(mock_mode: bool, completes_order: bool) -> GatewayConfig {
    GatewayConfig {
        merchant_id: "M100".into(),
        api_key: API_KEY.into(),
        api_url: "https://kpay.test".into(),
        notify_url: "https://pos.test/api/payment/callback".into(),
        frontend_url: "https://shop.test".into(),
        mock_mode,
        completes_order,
    }
}

pub fn gateway(
    mock_mode: bool,
    completes_order: bool,
    transport: Arc<dyn GatewayTransport>,
) -> KPayGateway {
    KPayGateway::with_transport(gateway_config(mock_mode, completes_order), transport)
}

pub fn test_config() -> Config {
    Config {
        environment: "development".into(),
        database_path: ":memory:".into(),
        http_port: 0,
        kpay_merchant_id: "M100".into(),
        kpay_api_key: API_KEY.into(),
        kpay_api_url: "https://kpay.test".into(),
        app_url: "https://pos.test".into(),
        frontend_url: "https://shop.test".into(),
        store_name: "Alisa Cake".into(),
        receipt_width: 32,
        payment_completes_order: false,
        log_level: "debug".into(),
        log_dir: None,
        log_json: false,
    }
}

/// App state over a seeded in-memory database, mock gateway
pub async fn test_state() -> AppState {
    let pool = setup_pool().await;
    let transport = FakeTransport::new(json!({}));
    AppState::from_parts(pool, test_config(), gateway(true, false, transport))
}

/// A signed callback body
pub fn signed_callback(fields: &[(&str, &str)], key: &str) -> Vec<u8> {
    let mut params: BTreeMap<String, String> = fields
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    let signature = sign(&params, key).unwrap();
    params.insert(SIGN_FIELD.to_string(), signature);
    serde_json::to_vec(&params).unwrap()
}

pub fn paid_callback(order_no: &str, transaction_id: &str) -> Vec<u8> {
    signed_callback(
        &[
            ("merch_order_id", order_no),
            ("transaction_id", transaction_id),
            ("status", "SUCCESS"),
            ("total_amount", "9000"),
        ],
        API_KEY,
    )
}
