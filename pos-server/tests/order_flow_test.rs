//! 下单与状态流转集成测试
//!
//! Runs the materializer and state machine against a seeded in-memory database.

mod common;

use common::*;
use pos_server::db::{catalog, orders as order_rows};
use pos_server::orders::state_machine::{self, OrderRef, StatusUpdateRequest, TransitionSource};
use pos_server::orders::{CartRequest, create_order, money, queries};
use pos_server::utils::ErrorCode;
use serde_json::json;
use shared::models::{OrderStatus, PaymentStatus, ServiceType, TableStatus};

async fn count_orders(pool: &sqlx::SqlitePool) -> i64 {
    let (n,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM orders")
        .fetch_one(pool)
        .await
        .unwrap();
    n
}

#[tokio::test]
async fn test_dine_in_order_is_priced_and_occupies_table() {
    let pool = setup_pool().await;

    let created = place_dine_in(&pool).await;
    assert_eq!(created.total_amount, 9000.0);
    assert!(created.order_no.starts_with("ORD"));

    let detail = queries::detail(&pool, OrderRef::Id(created.order_id)).await.unwrap();
    assert_eq!(detail.order.service_type, ServiceType::DineIn);
    assert_eq!(detail.order.table_id, Some(TABLE_A01));
    assert_eq!(detail.order.table_number.as_deref(), Some("A01"));
    assert_eq!(detail.order.status, OrderStatus::Pending);
    assert_eq!(detail.order.payment_status, PaymentStatus::Unpaid);
    assert_eq!(detail.order.device_id.as_deref(), Some("device-1"));
    assert!(!detail.order.is_printed);
    assert!(detail.order.paid_at.is_none());

    assert_eq!(detail.items.len(), 1);
    let item = &detail.items[0];
    assert_eq!(item.product_name, "Latte");
    assert_eq!(item.quantity, 2);
    assert_eq!(item.unit_price, 4500.0);
    assert_eq!(item.subtotal, 9000.0);

    let selections = item.selections().unwrap();
    assert_eq!(selections.len(), 2);
    let large = selections.iter().find(|s| s.slot == "size").unwrap();
    assert_eq!(large.option_id, OPT_LARGE);
    assert_eq!(large.name, "Large");
    assert_eq!(large.extra_price, 1000.0);

    let table = catalog::find_table_by_id(&pool, TABLE_A01).await.unwrap().unwrap();
    assert_eq!(table.status, TableStatus::Occupied);
}

#[tokio::test]
async fn test_total_is_sum_of_line_subtotals() {
    let pool = setup_pool().await;

    // 3500 + (4000 + 500) x 2 = 12500
    let created = place_takeaway(&pool).await;
    assert_eq!(created.total_amount, 12500.0);

    let items = order_rows::find_items(&pool, created.order_id).await.unwrap();
    let sum: f64 = items.iter().map(|i| i.subtotal).sum();
    assert_eq!(sum, created.total_amount);

    let detail = queries::detail(&pool, OrderRef::OrderNo(&created.order_no)).await.unwrap();
    assert_eq!(detail.order.remark.as_deref(), Some("17:30"));
    assert!(detail.order.table_id.is_none());
    // Chinese is the default snapshot language
    assert!(detail.items.iter().any(|i| i.product_name == "蛋糕"));
}

#[tokio::test]
async fn test_fractional_price_keeps_money_invariants() {
    let pool = setup_pool().await;
    sqlx::query(
        "INSERT INTO products (id, category_id, name_zh, name_my, name_en, price, is_available, sort_order) VALUES (4, 2, '曲奇', NULL, 'Cookie', 10.125, 1, 4)",
    )
    .execute(&pool)
    .await
    .unwrap();

    let created = place(
        &pool,
        json!({
            "service_type": "takeaway",
            "remark": "12:00",
            "items": [
                {"product_id": 4, "quantity": 2},
                {"product_id": 4, "quantity": 1},
                {"product_id": 4, "quantity": 1}
            ]
        }),
    )
    .await;

    let items = order_rows::find_items(&pool, created.order_id).await.unwrap();
    assert_eq!(items.len(), 3);
    for item in &items {
        assert_eq!(item.unit_price, 10.13);
        let expected = money::to_decimal(item.unit_price) * rust_decimal::Decimal::from(item.quantity);
        assert_eq!(item.subtotal, money::to_f64(expected));
    }
    assert_eq!(items[0].subtotal, 20.26);

    let sum = money::sum_subtotals(items.iter().map(|i| i.subtotal));
    assert_eq!(money::to_f64(sum), created.total_amount);
    assert_eq!(created.total_amount, 40.52);
}

#[tokio::test]
async fn test_option_of_another_product_is_not_charged() {
    let pool = setup_pool().await;

    // Option 3 belongs to the cake; on a latte it does not resolve
    let created = place(
        &pool,
        json!({
            "service_type": "takeaway",
            "remark": "18:00",
            "items": [{"product_id": LATTE, "options": {"topping": OPT_CREAM, "size": 999}}]
        }),
    )
    .await;
    assert_eq!(created.total_amount, 3500.0);

    let items = order_rows::find_items(&pool, created.order_id).await.unwrap();
    assert!(items[0].options.is_none());
}

#[tokio::test]
async fn test_unavailable_product_rolls_back_everything() {
    let pool = setup_pool().await;

    let cart: CartRequest = serde_json::from_value(json!({
        "service_type": "dine-in",
        "table_number": "A01",
        "items": [
            {"product_id": LATTE, "quantity": 1},
            {"product_id": SEASONAL, "quantity": 1}
        ]
    }))
    .unwrap();
    let err = create_order(&pool, cart.validate().unwrap()).await.unwrap_err();
    assert_eq!(err.code(), Some(ErrorCode::ProductUnavailable));

    assert_eq!(count_orders(&pool).await, 0);
    let table = catalog::find_table_by_id(&pool, TABLE_A01).await.unwrap().unwrap();
    assert_eq!(table.status, TableStatus::Available);
}

#[tokio::test]
async fn test_unknown_product_and_table() {
    let pool = setup_pool().await;

    let cart: CartRequest = serde_json::from_value(json!({
        "service_type": "takeaway",
        "remark": "now",
        "items": [{"product_id": 404}]
    }))
    .unwrap();
    let err = create_order(&pool, cart.validate().unwrap()).await.unwrap_err();
    assert_eq!(err.code(), Some(ErrorCode::ProductNotFound));

    let cart: CartRequest = serde_json::from_value(json!({
        "service_type": "dine-in",
        "table_number": "Z99",
        "items": [{"product_id": LATTE}]
    }))
    .unwrap();
    let err = create_order(&pool, cart.validate().unwrap()).await.unwrap_err();
    assert_eq!(err.code(), Some(ErrorCode::TableNotFound));

    assert_eq!(count_orders(&pool).await, 0);
}

#[tokio::test]
async fn test_dine_in_without_remark_stores_null() {
    let pool = setup_pool().await;
    let created = place(
        &pool,
        json!({
            "service_type": "dine-in",
            "table_number": "B02",
            "remark": "   ",
            "items": [{"product_id": CAKE}]
        }),
    )
    .await;

    let detail = queries::detail(&pool, OrderRef::Id(created.order_id)).await.unwrap();
    assert!(detail.order.remark.is_none());
}

#[tokio::test]
async fn test_status_flow_stamps_completed_at_once() {
    let pool = setup_pool().await;
    let created = place_dine_in(&pool).await;

    let preparing = StatusUpdateRequest {
        status: Some("preparing".into()),
        payment_status: None,
    }
    .validate()
    .unwrap();
    let order = state_machine::apply(&pool, OrderRef::Id(created.order_id), &preparing, TransitionSource::Staff)
        .await
        .unwrap();
    assert_eq!(order.status, OrderStatus::Preparing);
    assert!(order.completed_at.is_none());

    let completed = StatusUpdateRequest {
        status: Some("completed".into()),
        payment_status: Some("paid".into()),
    }
    .validate()
    .unwrap();
    let order = state_machine::apply(
        &pool,
        OrderRef::OrderNo(&created.order_no),
        &completed,
        TransitionSource::Staff,
    )
    .await
    .unwrap();
    assert_eq!(order.status, OrderStatus::Completed);
    assert_eq!(order.payment_status, PaymentStatus::Paid);
    let completed_at = order.completed_at.clone().unwrap();
    let paid_at = order.paid_at.clone().unwrap();

    // Same request again: nothing is re-stamped
    let again = state_machine::apply(&pool, OrderRef::Id(created.order_id), &completed, TransitionSource::Staff)
        .await
        .unwrap();
    assert_eq!(again.completed_at.as_deref(), Some(completed_at.as_str()));
    assert_eq!(again.paid_at.as_deref(), Some(paid_at.as_str()));

    // Terminal status is final for staff
    let reopen = StatusUpdateRequest {
        status: Some("pending".into()),
        payment_status: None,
    }
    .validate()
    .unwrap();
    let err = state_machine::apply(&pool, OrderRef::Id(created.order_id), &reopen, TransitionSource::Staff)
        .await
        .unwrap_err();
    assert_eq!(err.code(), Some(ErrorCode::OrderAlreadyCompleted));
}

#[tokio::test]
async fn test_invalid_payment_value_leaves_order_untouched() {
    let pool = setup_pool().await;
    let created = place_dine_in(&pool).await;

    let err = StatusUpdateRequest {
        status: Some("preparing".into()),
        payment_status: Some("refunded".into()),
    }
    .validate()
    .unwrap_err();
    assert_eq!(err.code, ErrorCode::InvalidPaymentStatus);

    let order = order_rows::find_by_id(&pool, created.order_id).await.unwrap().unwrap();
    assert_eq!(order.status, OrderStatus::Pending);
    assert_eq!(order.payment_status, PaymentStatus::Unpaid);
}

#[tokio::test]
async fn test_staff_can_reset_payment() {
    let pool = setup_pool().await;
    let created = place_dine_in(&pool).await;

    let paid = StatusUpdateRequest {
        status: None,
        payment_status: Some("paid".into()),
    }
    .validate()
    .unwrap();
    let order = state_machine::apply(&pool, OrderRef::Id(created.order_id), &paid, TransitionSource::Staff)
        .await
        .unwrap();
    assert!(order.paid_at.is_some());

    let unpaid = StatusUpdateRequest {
        status: None,
        payment_status: Some("unpaid".into()),
    }
    .validate()
    .unwrap();
    let order = state_machine::apply(&pool, OrderRef::Id(created.order_id), &unpaid, TransitionSource::Staff)
        .await
        .unwrap();
    assert_eq!(order.payment_status, PaymentStatus::Unpaid);
    assert!(order.paid_at.is_none());
}

#[tokio::test]
async fn test_remove_item_recomputes_total() {
    let pool = setup_pool().await;
    let created = place_takeaway(&pool).await;

    let items = order_rows::find_items(&pool, created.order_id).await.unwrap();
    let latte = items.iter().find(|i| i.product_id == LATTE).unwrap();

    let order = state_machine::remove_item(&pool, latte.id).await.unwrap();
    assert_eq!(order.total_amount, 9000.0);
    assert_eq!(order.status, OrderStatus::Pending);

    let remaining = order_rows::find_items(&pool, created.order_id).await.unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].product_id, CAKE);
}

#[tokio::test]
async fn test_removing_last_item_cancels_order() {
    let pool = setup_pool().await;
    let created = place_dine_in(&pool).await;

    let items = order_rows::find_items(&pool, created.order_id).await.unwrap();
    let order = state_machine::remove_item(&pool, items[0].id).await.unwrap();
    assert_eq!(order.total_amount, 0.0);
    assert_eq!(order.status, OrderStatus::Cancelled);

    let err = state_machine::remove_item(&pool, items[0].id).await.unwrap_err();
    assert_eq!(err.code(), Some(ErrorCode::OrderItemNotFound));
}

#[tokio::test]
async fn test_purge_cascades_items() {
    let pool = setup_pool().await;
    let created = place_takeaway(&pool).await;

    state_machine::purge(&pool, created.order_id).await.unwrap();
    assert_eq!(count_orders(&pool).await, 0);
    assert!(order_rows::find_items(&pool, created.order_id).await.unwrap().is_empty());

    let err = state_machine::purge(&pool, created.order_id).await.unwrap_err();
    assert_eq!(err.code(), Some(ErrorCode::OrderNotFound));
}

#[tokio::test]
async fn test_listings() {
    let pool = setup_pool().await;
    let dine_in = place_dine_in(&pool).await;
    let takeaway = place_takeaway(&pool).await;

    let mine = queries::for_device(&pool, "device-1").await.unwrap();
    assert_eq!(mine.len(), 1);
    assert_eq!(mine[0].order.order_no, dine_in.order_no);

    let at_table = queries::for_table_number(&pool, "A01").await.unwrap();
    assert_eq!(at_table.len(), 1);
    assert_eq!(at_table[0].items.len(), 1);

    let boards = queries::by_service_type(&pool, ServiceType::Takeaway).await.unwrap();
    assert_eq!(boards.len(), 1);
    assert_eq!(boards[0].order.id, takeaway.order_id);

    let all = queries::page(&pool, None, 1, 50).await.unwrap();
    assert_eq!(all.len(), 2);
    let second_page = queries::page(&pool, None, 2, 1).await.unwrap();
    assert_eq!(second_page.len(), 1);
    let far_page = queries::page(&pool, None, i64::MAX, 200).await.unwrap();
    assert!(far_page.is_empty());
    let pending = queries::page(&pool, Some(OrderStatus::Pending), 1, 50).await.unwrap();
    assert_eq!(pending.len(), 2);

    let err = queries::for_table_id(&pool, 77).await.unwrap_err();
    assert_eq!(err.code(), Some(ErrorCode::TableNotFound));
}
