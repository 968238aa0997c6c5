//! Order Model
//!
//! Orders are snapshots: product names and prices are copied into
//! [`OrderItem`] at creation time and never re-derived from the catalog.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, ErrorCode};

/// Fulfillment status
///
/// `pending` is initial; `completed` and `cancelled` are terminal.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "lowercase"))]
pub enum OrderStatus {
    #[default]
    Pending,
    Preparing,
    Completed,
    Cancelled,
}

impl OrderStatus {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Preparing => "preparing",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }

    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }
}

impl FromStr for OrderStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "preparing" => Ok(Self::Preparing),
            "completed" => Ok(Self::Completed),
            "cancelled" => Ok(Self::Cancelled),
            other => Err(AppError::with_message(
                ErrorCode::InvalidOrderStatus,
                format!("Invalid order status: {other}"),
            )
            .with_detail("status", other)),
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Payment status, independent of [`OrderStatus`]
///
/// The gateway's `success` token is accepted as an alias of `paid`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "lowercase"))]
pub enum PaymentStatus {
    #[default]
    Unpaid,
    #[serde(alias = "success")]
    Paid,
    Failed,
}

impl PaymentStatus {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Unpaid => "unpaid",
            Self::Paid => "paid",
            Self::Failed => "failed",
        }
    }
}

impl FromStr for PaymentStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "unpaid" => Ok(Self::Unpaid),
            "paid" | "success" => Ok(Self::Paid),
            "failed" => Ok(Self::Failed),
            other => Err(AppError::with_message(
                ErrorCode::InvalidPaymentStatus,
                format!("Invalid payment status: {other}"),
            )
            .with_detail("payment_status", other)),
        }
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fulfillment channel
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
pub enum ServiceType {
    #[serde(rename = "dine-in")]
    #[cfg_attr(feature = "db", sqlx(rename = "dine-in"))]
    DineIn,
    #[serde(rename = "delivery")]
    #[cfg_attr(feature = "db", sqlx(rename = "delivery"))]
    Delivery,
    #[serde(rename = "takeaway")]
    #[cfg_attr(feature = "db", sqlx(rename = "takeaway"))]
    Takeaway,
}

impl ServiceType {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::DineIn => "dine-in",
            Self::Delivery => "delivery",
            Self::Takeaway => "takeaway",
        }
    }
}

impl FromStr for ServiceType {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "dine-in" => Ok(Self::DineIn),
            "delivery" => Ok(Self::Delivery),
            "takeaway" => Ok(Self::Takeaway),
            other => Err(AppError::with_message(
                ErrorCode::InvalidServiceType,
                format!("Invalid service type: {other}"),
            )
            .with_detail("service_type", other)),
        }
    }
}

impl fmt::Display for ServiceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Display language used for name snapshots (zh / my / en)
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "lowercase"))]
pub enum Language {
    #[default]
    Zh,
    My,
    En,
}

impl Language {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Zh => "zh",
            Self::My => "my",
            Self::En => "en",
        }
    }
}

impl FromStr for Language {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "zh" => Ok(Self::Zh),
            "my" => Ok(Self::My),
            "en" => Ok(Self::En),
            other => Err(AppError::with_message(
                ErrorCode::InvalidLanguage,
                format!("Unsupported language: {other}"),
            )
            .with_detail("language", other)),
        }
    }
}

/// One chosen option, as snapshotted into `order_items.options`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OptionSelection {
    /// Option slot (size / temperature / sweetness ...)
    pub slot: String,
    pub option_id: i64,
    /// Localized option name at order time
    pub name: String,
    /// Surcharge in currency unit (0 when the id did not resolve)
    pub extra_price: f64,
}

/// Order header row
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Order {
    pub id: i64,
    pub order_no: String,
    pub table_id: Option<i64>,
    pub table_number: Option<String>,
    pub service_type: ServiceType,
    /// Total in currency unit, always the sum of item subtotals
    pub total_amount: f64,
    pub status: OrderStatus,
    pub payment_status: PaymentStatus,
    pub payment_method: Option<String>,
    pub kpay_transaction_id: Option<String>,
    /// Delivery address or pickup time
    pub remark: Option<String>,
    pub language: Language,
    pub device_id: Option<String>,
    pub is_printed: bool,
    /// Myanmar local time, `YYYY-MM-DD HH:MM:SS`
    pub created_at: String,
    pub paid_at: Option<String>,
    pub completed_at: Option<String>,
}

/// Order line row
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct OrderItem {
    pub id: i64,
    pub order_id: i64,
    pub product_id: i64,
    pub product_name: String,
    pub quantity: i64,
    pub unit_price: f64,
    /// Serialized `Vec<OptionSelection>`
    pub options: Option<String>,
    pub subtotal: f64,
}

impl OrderItem {
    /// Parse the option snapshot; `None` when absent or malformed.
    pub fn selections(&self) -> Option<Vec<OptionSelection>> {
        let raw = self.options.as_deref()?;
        serde_json::from_str(raw).ok()
    }
}

/// Order with its items, as returned by the read API
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderDetail {
    #[serde(flatten)]
    pub order: Order,
    pub items: Vec<OrderItem>,
}

/// Result of a successful materialization
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrderCreated {
    pub order_id: i64,
    pub order_no: String,
    pub total_amount: f64,
}
