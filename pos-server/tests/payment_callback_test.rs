//! 支付回调集成测试
//!
//! Signature checks, replay handling and the gateway's view of the state machine.

mod common;

use common::*;
use pos_server::db::{callbacks, orders as order_rows};
use pos_server::orders::state_machine::{self, OrderRef, TransitionRequest, TransitionSource};
use pos_server::payment::CallbackOutcome;
use pos_server::payment::callback::handle_callback;
use pos_server::payment::service::{self, MockPaymentRequest};
use pos_server::utils::ErrorCode;
use serde_json::json;
use shared::models::{OrderStatus, PaymentStatus};

#[tokio::test]
async fn test_valid_callback_marks_paid() {
    let pool = setup_pool().await;
    let gw = gateway(false, false, FakeTransport::new(json!({})));
    let created = place_dine_in(&pool).await;

    let outcome = handle_callback(&pool, &gw, &paid_callback(&created.order_no, "KP1001"))
        .await
        .unwrap();
    assert_eq!(outcome, CallbackOutcome::Applied);

    let order = order_rows::find_by_id(&pool, created.order_id).await.unwrap().unwrap();
    assert_eq!(order.payment_status, PaymentStatus::Paid);
    assert_eq!(order.payment_method.as_deref(), Some("kpay"));
    assert_eq!(order.kpay_transaction_id.as_deref(), Some("KP1001"));
    assert!(order.paid_at.is_some());
    // Fulfillment is untouched unless configured otherwise
    assert_eq!(order.status, OrderStatus::Pending);
}

#[tokio::test]
async fn test_bad_signature_changes_nothing() {
    let pool = setup_pool().await;
    let gw = gateway(false, false, FakeTransport::new(json!({})));
    let created = place_dine_in(&pool).await;

    let forged = signed_callback(
        &[
            ("merch_order_id", created.order_no.as_str()),
            ("transaction_id", "KP666"),
            ("status", "SUCCESS"),
        ],
        "wrong-key",
    );
    let err = handle_callback(&pool, &gw, &forged).await.unwrap_err();
    assert_eq!(err.code(), Some(ErrorCode::PaymentSignatureInvalid));

    let unsigned = serde_json::to_vec(&json!({
        "merch_order_id": created.order_no,
        "transaction_id": "KP666",
        "status": "SUCCESS"
    }))
    .unwrap();
    let err = handle_callback(&pool, &gw, &unsigned).await.unwrap_err();
    assert_eq!(err.code(), Some(ErrorCode::PaymentSignatureInvalid));

    let order = order_rows::find_by_id(&pool, created.order_id).await.unwrap().unwrap();
    assert_eq!(order.payment_status, PaymentStatus::Unpaid);
    assert!(order.kpay_transaction_id.is_none());
    assert_eq!(callbacks::count_for_order(&pool, &created.order_no).await.unwrap(), 0);
}

#[tokio::test]
async fn test_tampered_field_fails_verification() {
    let pool = setup_pool().await;
    let gw = gateway(false, false, FakeTransport::new(json!({})));
    let created = place_dine_in(&pool).await;

    let body = paid_callback(&created.order_no, "KP1001");
    let mut value: serde_json::Value = serde_json::from_slice(&body).unwrap();
    value["total_amount"] = json!("1");
    let tampered = serde_json::to_vec(&value).unwrap();

    let err = handle_callback(&pool, &gw, &tampered).await.unwrap_err();
    assert_eq!(err.code(), Some(ErrorCode::PaymentSignatureInvalid));
}

#[tokio::test]
async fn test_replayed_callback_is_idempotent() {
    let pool = setup_pool().await;
    let gw = gateway(false, false, FakeTransport::new(json!({})));
    let created = place_dine_in(&pool).await;
    let body = paid_callback(&created.order_no, "KP2002");

    handle_callback(&pool, &gw, &body).await.unwrap();
    let first = order_rows::find_by_id(&pool, created.order_id).await.unwrap().unwrap();

    let outcome = handle_callback(&pool, &gw, &body).await.unwrap();
    assert_eq!(outcome, CallbackOutcome::Duplicate);

    let second = order_rows::find_by_id(&pool, created.order_id).await.unwrap().unwrap();
    assert_eq!(second.paid_at, first.paid_at);
    assert_eq!(second.payment_status, PaymentStatus::Paid);
    assert_eq!(callbacks::count_for_order(&pool, &created.order_no).await.unwrap(), 1);
}

#[tokio::test]
async fn test_paid_is_not_downgraded_by_gateway() {
    let pool = setup_pool().await;
    let gw = gateway(false, false, FakeTransport::new(json!({})));
    let created = place_dine_in(&pool).await;

    handle_callback(&pool, &gw, &paid_callback(&created.order_no, "KP3003"))
        .await
        .unwrap();

    let late_failure = signed_callback(
        &[
            ("merch_order_id", created.order_no.as_str()),
            ("transaction_id", "KP3003"),
            ("status", "FAILED"),
        ],
        API_KEY,
    );
    let outcome = handle_callback(&pool, &gw, &late_failure).await.unwrap();
    assert_eq!(outcome, CallbackOutcome::NoChange);

    let order = order_rows::find_by_id(&pool, created.order_id).await.unwrap().unwrap();
    assert_eq!(order.payment_status, PaymentStatus::Paid);
}

#[tokio::test]
async fn test_pending_status_is_acknowledged_only() {
    let pool = setup_pool().await;
    let gw = gateway(false, false, FakeTransport::new(json!({})));
    let created = place_dine_in(&pool).await;

    let body = signed_callback(
        &[
            ("merch_order_id", created.order_no.as_str()),
            ("trade_no", "KP4004"),
            ("trade_status", "PENDING"),
        ],
        API_KEY,
    );
    let outcome = handle_callback(&pool, &gw, &body).await.unwrap();
    assert_eq!(outcome, CallbackOutcome::Ignored);

    let order = order_rows::find_by_id(&pool, created.order_id).await.unwrap().unwrap();
    assert_eq!(order.payment_status, PaymentStatus::Unpaid);
}

#[tokio::test]
async fn test_unknown_order_is_rejected() {
    let pool = setup_pool().await;
    let gw = gateway(false, false, FakeTransport::new(json!({})));

    let err = handle_callback(&pool, &gw, &paid_callback("ORD0000000000000000000", "KP5005"))
        .await
        .unwrap_err();
    assert_eq!(err.code(), Some(ErrorCode::OrderNotFound));
}

#[tokio::test]
async fn test_cancelled_order_records_payment_but_stays_cancelled() {
    let pool = setup_pool().await;
    let gw = gateway(false, true, FakeTransport::new(json!({})));
    let created = place_dine_in(&pool).await;

    let cancel = TransitionRequest {
        status: Some(OrderStatus::Cancelled),
        ..Default::default()
    };
    state_machine::apply(&pool, OrderRef::Id(created.order_id), &cancel, TransitionSource::Staff)
        .await
        .unwrap();

    let outcome = handle_callback(&pool, &gw, &paid_callback(&created.order_no, "KP6006"))
        .await
        .unwrap();
    assert_eq!(outcome, CallbackOutcome::Applied);

    let order = order_rows::find_by_id(&pool, created.order_id).await.unwrap().unwrap();
    assert_eq!(order.status, OrderStatus::Cancelled);
    assert_eq!(order.payment_status, PaymentStatus::Paid);
    assert!(order.completed_at.is_none());
}

#[tokio::test]
async fn test_completes_order_when_configured() {
    let pool = setup_pool().await;
    let gw = gateway(false, true, FakeTransport::new(json!({})));
    let created = place_dine_in(&pool).await;

    handle_callback(&pool, &gw, &paid_callback(&created.order_no, "KP7007"))
        .await
        .unwrap();

    let order = order_rows::find_by_id(&pool, created.order_id).await.unwrap().unwrap();
    assert_eq!(order.status, OrderStatus::Completed);
    assert!(order.completed_at.is_some());
    assert!(order.paid_at.is_some());
}

#[tokio::test]
async fn test_malformed_body() {
    let pool = setup_pool().await;
    let gw = gateway(false, false, FakeTransport::new(json!({})));

    let err = handle_callback(&pool, &gw, b"merch_order_id=1").await.unwrap_err();
    assert_eq!(err.code(), Some(ErrorCode::PaymentCallbackMalformed));

    // Signed but missing the status field
    let body = signed_callback(
        &[("merch_order_id", "ORD1"), ("transaction_id", "KP1")],
        API_KEY,
    );
    let err = handle_callback(&pool, &gw, &body).await.unwrap_err();
    assert_eq!(err.code(), Some(ErrorCode::PaymentCallbackMalformed));

    // Numbers are not re-rendered for signing
    let created = place_dine_in(&pool).await;
    let body = json!({
        "merch_order_id": created.order_no,
        "transaction_id": "KP1",
        "status": "SUCCESS",
        "total_amount": 9000.00,
        "sign": "00"
    });
    let err = handle_callback(&pool, &gw, body.to_string().as_bytes()).await.unwrap_err();
    assert_eq!(err.code(), Some(ErrorCode::PaymentCallbackMalformed));
    assert_eq!(callbacks::count_for_order(&pool, &created.order_no).await.unwrap(), 0);
}

#[tokio::test]
async fn test_create_payment_sends_signed_request() {
    let pool = setup_pool().await;
    let transport = FakeTransport::new(json!({
        "payment_url": "https://kpay.test/pay/abc",
        "prepay_id": "PP-1"
    }));
    let gw = gateway(false, false, transport.clone());
    let created = place_dine_in(&pool).await;

    let init = service::create_payment(&pool, &gw, &created.order_no).await.unwrap();
    assert!(!init.mock);
    assert_eq!(init.payment_url.as_deref(), Some("https://kpay.test/pay/abc"));
    assert_eq!(init.transaction_id.as_deref(), Some("PP-1"));

    let calls = transport.calls.lock().unwrap();
    assert_eq!(calls.len(), 1);
    let (url, params) = &calls[0];
    assert_eq!(url, "https://kpay.test/payment/gateway");
    assert_eq!(params.get("merch_order_id"), Some(&created.order_no));
    assert_eq!(params.get("total_amount").map(String::as_str), Some("9000"));
    let sign = params.get("sign").unwrap();
    assert!(gw.verify(params, sign));
}

#[tokio::test]
async fn test_create_payment_refuses_paid_order() {
    let pool = setup_pool().await;
    let gw = gateway(false, false, FakeTransport::new(json!({})));
    let created = place_dine_in(&pool).await;
    handle_callback(&pool, &gw, &paid_callback(&created.order_no, "KP8008"))
        .await
        .unwrap();

    let err = service::create_payment(&pool, &gw, &created.order_no).await.unwrap_err();
    assert_eq!(err.code(), Some(ErrorCode::OrderAlreadyPaid));
}

#[tokio::test]
async fn test_reconcile_applies_gateway_answer() {
    let pool = setup_pool().await;
    let transport = FakeTransport::new(json!({
        "trade_status": "PAY_SUCCESS",
        "trade_no": "KP9009"
    }));
    let gw = gateway(false, false, transport);
    let created = place_dine_in(&pool).await;

    let result = service::reconcile(&pool, &gw, &created.order_no).await.unwrap();
    assert!(result.applied);
    assert_eq!(result.payment.payment_status, PaymentStatus::Paid);
    assert_eq!(result.payment.kpay_transaction_id.as_deref(), Some("KP9009"));

    // Asking again changes nothing
    let again = service::reconcile(&pool, &gw, &created.order_no).await.unwrap();
    assert!(!again.applied);
    assert_eq!(again.payment.paid_at, result.payment.paid_at);
}

#[tokio::test]
async fn test_mock_success() {
    let pool = setup_pool().await;
    let created = place_dine_in(&pool).await;

    let live = gateway(false, true, FakeTransport::new(json!({})));
    let err = service::mock_success(
        &pool,
        &live,
        MockPaymentRequest {
            order_no: created.order_no.clone(),
            payment_method: None,
        },
    )
    .await
    .unwrap_err();
    assert_eq!(err.code(), Some(ErrorCode::PaymentMockDisabled));

    let mock = gateway(true, true, FakeTransport::new(json!({})));
    let err = service::mock_success(
        &pool,
        &mock,
        MockPaymentRequest {
            order_no: created.order_no.clone(),
            payment_method: Some("card".into()),
        },
    )
    .await
    .unwrap_err();
    assert_eq!(err.code(), Some(ErrorCode::PaymentInvalidMethod));

    // Cash is recorded without finishing the order
    let view = service::mock_success(
        &pool,
        &mock,
        MockPaymentRequest {
            order_no: created.order_no.clone(),
            payment_method: Some("cash".into()),
        },
    )
    .await
    .unwrap();
    assert_eq!(view.payment_status, PaymentStatus::Paid);
    assert_eq!(view.payment_method.as_deref(), Some("cash"));
    assert!(view.kpay_transaction_id.unwrap().starts_with("CASH_"));
    assert_eq!(view.status, OrderStatus::Pending);
}
