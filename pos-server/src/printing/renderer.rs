//! Receipt renderer
//!
//! Pure projection of an order snapshot into one of three formats. Option
//! data that fails to parse is dropped from the output; rendering itself
//! cannot fail.

use std::fmt::Write as _;
use std::str::FromStr;

use serde::Serialize;
use shared::models::{Order, OrderItem, ServiceType};

use super::builder::TicketBuilder;
use crate::orders::money::format_amount;
use crate::utils::{AppError, ErrorCode, time};

const CURRENCY: &str = "MMK";

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ReceiptFormat {
    /// Customer / administrative receipt (plain text)
    #[default]
    Customer,
    /// Kitchen ticket: no prices
    Kitchen,
    /// 80mm browser print view
    Html,
}

impl ReceiptFormat {
    /// Formats that count as "printed"
    pub const fn marks_printed(&self) -> bool {
        !matches!(self, Self::Kitchen)
    }

    pub const fn content_type(&self) -> &'static str {
        match self {
            Self::Html => "text/html; charset=utf-8",
            _ => "text/plain; charset=utf-8",
        }
    }
}

impl FromStr for ReceiptFormat {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "text" | "customer" => Ok(Self::Customer),
            "kitchen" => Ok(Self::Kitchen),
            "html" => Ok(Self::Html),
            other => Err(AppError::with_message(
                ErrorCode::InvalidFormat,
                format!("Unknown receipt format: {other}"),
            )
            .with_detail("format", other)),
        }
    }
}

/// Receipt renderer
///
/// Common widths:
/// - 58mm paper: 32 characters
/// - 80mm paper: 48 characters
#[derive(Debug, Clone)]
pub struct ReceiptRenderer {
    width: usize,
    store_name: String,
}

impl ReceiptRenderer {
    pub fn new(width: usize, store_name: impl Into<String>) -> Self {
        Self {
            width,
            store_name: store_name.into(),
        }
    }

    pub fn render(&self, order: &Order, items: &[OrderItem], format: ReceiptFormat) -> String {
        match format {
            ReceiptFormat::Customer => self.render_customer(order, items),
            ReceiptFormat::Kitchen => self.render_kitchen(order, items),
            ReceiptFormat::Html => self.render_html(order, items),
        }
    }

    fn render_banner(&self, b: &mut TicketBuilder, title: &str) {
        b.sep_double();
        b.center(&format!("*** {} ***", self.store_name));
        b.sep_double();
        b.blank();
        b.center(title);
    }

    fn render_customer(&self, order: &Order, items: &[OrderItem]) -> String {
        let mut b = TicketBuilder::new(self.width);

        self.render_banner(&mut b, "订单小票 / ORDER RECEIPT");
        b.sep_single();

        b.line(&format!("订单号/Order: {}", order.order_no));
        b.line(&context_line(order));
        b.line(&format!(
            "时间/Time: {}",
            time::format_receipt_time(&order.created_at)
        ));
        b.sep_single();

        b.line("商品明细 / Items:");
        b.blank();
        for (idx, item) in items.iter().enumerate() {
            b.line(&format!("{}. {}", idx + 1, item.product_name));
            if let Some(options) = joined_options(item) {
                b.line(&format!("   ({options})"));
            }
            b.line_lr(
                &format!("   x{} @ {}", item.quantity, format_amount(item.unit_price)),
                &format!("{} {CURRENCY}", format_amount(item.subtotal)),
            );
        }
        b.sep_single();

        b.line_lr(
            "总计 / Total:",
            &format!("{} {CURRENCY}", format_amount(order.total_amount)),
        );
        b.sep_single();

        if let Some(remark) = remark(order) {
            b.line(&format!("{}: {remark}", remark_label(order.service_type)));
            b.sep_single();
        }

        b.blank();
        b.center("谢谢惠顾!");
        b.center("Thank You!");
        b.build()
    }

    fn render_kitchen(&self, order: &Order, items: &[OrderItem]) -> String {
        let mut b = TicketBuilder::new(self.width);

        self.render_banner(&mut b, "后厨订单 / KITCHEN ORDER");
        b.sep_double();

        b.blank();
        b.line_lr(
            &kitchen_context(order),
            &format!("时间: {}", time::format_clock(&order.created_at)),
        );
        b.line(&format!("订单: {}", order.order_no));
        b.blank();
        b.sep_double();

        for item in items {
            b.blank();
            b.line(&format!("▶ {} x{}", item.product_name, item.quantity));
            for name in item.selections().unwrap_or_default().iter().map(|s| &s.name) {
                b.line(&format!("  - {name}"));
            }
        }

        b.blank();
        b.sep_double();

        if let Some(remark) = remark(order) {
            b.blank();
            b.line("!!! 备注 !!!");
            b.line(remark);
            b.blank();
        }
        b.build()
    }

    fn render_html(&self, order: &Order, items: &[OrderItem]) -> String {
        let mut html = String::with_capacity(2048);
        html.push_str(HTML_HEAD);

        let _ = writeln!(
            html,
            r#"  <div class="store-name">*** {} ***</div>"#,
            escape(&self.store_name)
        );
        html.push_str("  <div class=\"center bold\">订单小票 / ORDER RECEIPT</div>\n");
        html.push_str("  <div class=\"line\"></div>\n");
        let _ = writeln!(html, "  <div>订单号/Order: {}</div>", escape(&order.order_no));
        let _ = writeln!(html, "  <div>{}</div>", escape(&context_line(order)));
        let _ = writeln!(
            html,
            "  <div>时间/Time: {}</div>",
            escape(&time::format_receipt_time(&order.created_at))
        );
        html.push_str("  <div class=\"line\"></div>\n");
        html.push_str("  <div class=\"bold\">商品明细 / Items:</div>\n");

        for (idx, item) in items.iter().enumerate() {
            html.push_str("  <div class=\"item\">\n");
            let _ = writeln!(
                html,
                "    <div class=\"item-name\">{}. {}</div>",
                idx + 1,
                escape(&item.product_name)
            );
            if let Some(options) = joined_options(item) {
                let _ = writeln!(html, "    <div class=\"item-options\">({})</div>", escape(&options));
            }
            let _ = writeln!(
                html,
                "    <div class=\"item-price\"><span>x{} @ {}</span><span>{} {CURRENCY}</span></div>",
                item.quantity,
                format_amount(item.unit_price),
                format_amount(item.subtotal)
            );
            html.push_str("  </div>\n");
        }

        html.push_str("  <div class=\"line\"></div>\n");
        let _ = writeln!(
            html,
            "  <div class=\"item-price total\"><span>总计 / Total:</span><span>{} {CURRENCY}</span></div>",
            format_amount(order.total_amount)
        );
        html.push_str("  <div class=\"line\"></div>\n");

        if let Some(remark) = remark(order) {
            let _ = writeln!(
                html,
                "  <div>{}: {}</div>",
                remark_label(order.service_type),
                escape(remark)
            );
            html.push_str("  <div class=\"line\"></div>\n");
        }

        html.push_str("  <div class=\"footer center\"><div>谢谢惠顾!</div><div>Thank You!</div></div>\n");
        html.push_str("</body>\n</html>\n");
        html
    }
}

const HTML_HEAD: &str = r#"<!DOCTYPE html>
<html>
<head>
  <meta charset="UTF-8">
  <style>
    @page { size: 80mm auto; margin: 0; }
    body { font-family: 'Courier New', monospace; font-size: 12px; width: 80mm; margin: 0; padding: 5mm; line-height: 1.4; }
    .center { text-align: center; }
    .bold { font-weight: bold; font-size: 14px; }
    .store-name { font-size: 18px; font-weight: bold; text-align: center; margin: 10px 0; border-top: 2px solid #000; border-bottom: 2px solid #000; padding: 8px 0; }
    .line { border-bottom: 1px dashed #000; margin: 5px 0; }
    .item { margin: 8px 0; }
    .item-name { font-weight: bold; }
    .item-options { font-size: 11px; color: #666; margin-left: 10px; }
    .item-price { display: flex; justify-content: space-between; margin-left: 10px; }
    .total { font-size: 16px; font-weight: bold; }
    .footer { margin-top: 10px; }
  </style>
</head>
<body>
"#;

fn context_line(order: &Order) -> String {
    match order.service_type {
        ServiceType::DineIn => format!(
            "桌号/Table: {}",
            order.table_number.as_deref().unwrap_or("-")
        ),
        ServiceType::Delivery => "外卖配送 / Delivery".to_string(),
        ServiceType::Takeaway => "自取 / Takeaway".to_string(),
    }
}

fn kitchen_context(order: &Order) -> String {
    match order.service_type {
        ServiceType::DineIn => format!("桌号: {}", order.table_number.as_deref().unwrap_or("-")),
        ServiceType::Delivery => "外卖 / Delivery".to_string(),
        ServiceType::Takeaway => "自取 / Takeaway".to_string(),
    }
}

fn remark_label(service_type: ServiceType) -> &'static str {
    match service_type {
        ServiceType::DineIn => "备注 / Note",
        ServiceType::Delivery => "地址 / Address",
        ServiceType::Takeaway => "取餐 / Pickup",
    }
}

fn remark(order: &Order) -> Option<&str> {
    order
        .remark
        .as_deref()
        .map(str::trim)
        .filter(|r| !r.is_empty())
}

/// `"Large, Hot"`; `None` when absent, empty or malformed
fn joined_options(item: &OrderItem) -> Option<String> {
    let selections = item.selections()?;
    if selections.is_empty() {
        return None;
    }
    Some(
        selections
            .iter()
            .map(|s| s.name.as_str())
            .collect::<Vec<_>>()
            .join(", "),
    )
}

fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
