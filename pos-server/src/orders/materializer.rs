//! Order materializer
//!
//! Turns a validated cart into a persisted order inside one transaction:
//! table lookup, per-line pricing, header insert, item inserts and (dine-in
//! only) the table occupancy flip. Dropping the transaction on any early
//! return rolls everything back.

use rust_decimal::Decimal;
use shared::models::{OrderCreated, TableStatus};
use sqlx::SqlitePool;

use super::cart::ValidatedCart;
use super::money::to_f64;
use super::pricing::{self, PricedLine, ResolvedOption};
use crate::db::{catalog, orders};
use crate::error::ServiceResult;
use crate::utils::{AppError, ErrorCode, time};

pub async fn create_order(pool: &SqlitePool, cart: ValidatedCart) -> ServiceResult<OrderCreated> {
    let mut tx = pool.begin().await?;

    // 1. Dine-in: resolve the table
    let table = match cart.fulfillment.table_number() {
        Some(number) => {
            let table = catalog::find_table_by_number(&mut *tx, number)
                .await?
                .ok_or_else(|| {
                    AppError::with_message(
                        ErrorCode::TableNotFound,
                        format!("Table {number} not found"),
                    )
                    .with_detail("table_number", number)
                })?;
            Some(table)
        }
        None => None,
    };

    // 2. Price every line
    let mut priced: Vec<PricedLine> = Vec::with_capacity(cart.lines.len());
    for line in &cart.lines {
        let product = catalog::find_product(&mut *tx, line.product_id)
            .await?
            .ok_or_else(|| {
                AppError::with_message(
                    ErrorCode::ProductNotFound,
                    format!("Product {} not found", line.product_id),
                )
                .with_detail("product_id", line.product_id)
            })?;
        if !product.is_available {
            return Err(AppError::with_message(
                ErrorCode::ProductUnavailable,
                format!("Product {} is not available", line.product_id),
            )
            .with_detail("product_id", line.product_id)
            .into());
        }

        let mut resolved = Vec::with_capacity(line.options.len());
        for (slot, option_id) in &line.options {
            let option = catalog::find_option(&mut *tx, product.id, *option_id).await?;
            resolved.push(ResolvedOption {
                slot: slot.clone(),
                option_id: *option_id,
                option,
            });
        }

        priced.push(pricing::price_line(
            &product,
            line.quantity,
            &resolved,
            cart.language,
        ));
    }

    let total: Decimal = priced.iter().map(|l| l.subtotal).sum();

    // 3. Identity and timestamp
    let order_no = time::generate_order_no();
    let created_at = time::now_local_string();

    // 4. Header, items, table
    let order_id = orders::insert_order(
        &mut *tx,
        &orders::NewOrder {
            order_no: &order_no,
            table_id: table.as_ref().map(|t| t.id),
            table_number: table.as_ref().map(|t| t.table_number.as_str()),
            service_type: cart.fulfillment.service_type(),
            total_amount: to_f64(total),
            remark: cart.fulfillment.remark(),
            language: cart.language,
            device_id: cart.device_id.as_deref(),
            created_at: &created_at,
        },
    )
    .await?;

    for line in &priced {
        let options = if line.selections.is_empty() {
            None
        } else {
            Some(serde_json::to_string(&line.selections)?)
        };
        orders::insert_item(
            &mut *tx,
            order_id,
            &orders::NewOrderItem {
                product_id: line.product_id,
                product_name: line.product_name.clone(),
                quantity: line.quantity,
                unit_price: to_f64(line.unit_price),
                options,
                subtotal: to_f64(line.subtotal),
            },
        )
        .await?;
    }

    if let Some(table) = &table {
        catalog::set_table_status(&mut *tx, table.id, TableStatus::Occupied).await?;
    }

    // 5. Commit
    tx.commit().await?;

    tracing::info!(
        order_id,
        order_no = %order_no,
        service_type = %cart.fulfillment.service_type(),
        lines = priced.len(),
        total = %total,
        "Order created"
    );

    Ok(OrderCreated {
        order_id,
        order_no,
        total_amount: to_f64(total),
    })
}
