//! Cart schema and validation boundary
//!
//! The storefront posts a [`CartRequest`]. It is checked here, before any
//! database access, and turned into a [`ValidatedCart`] that the
//! materializer can trust.

use std::collections::BTreeMap;

use serde::Deserialize;
use shared::models::{Language, ServiceType};

use crate::utils::validation::{
    MAX_CART_LINES, MAX_QUANTITY, MAX_REMARK_LEN, MAX_SHORT_TEXT_LEN, validate_optional_text,
    validate_required_text,
};
use crate::utils::{AppError, AppResult, ErrorCode};

/// Raw cart as posted by the client
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CartRequest {
    pub service_type: String,
    #[serde(default)]
    pub table_number: Option<String>,
    /// Delivery address, pickup time, or a free note for dine-in
    #[serde(default)]
    pub remark: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub device_id: Option<String>,
    pub items: Vec<CartLineRequest>,
}

/// One cart line
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CartLineRequest {
    pub product_id: i64,
    #[serde(default)]
    pub quantity: Option<i64>,
    /// Option slot → option id; `null` means nothing chosen for that slot
    #[serde(default)]
    pub options: BTreeMap<String, Option<i64>>,
}

/// Fulfillment context, one variant per service type
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fulfillment {
    DineIn {
        table_number: String,
        note: Option<String>,
    },
    Delivery {
        address: String,
    },
    Takeaway {
        pickup: String,
    },
}

impl Fulfillment {
    pub fn service_type(&self) -> ServiceType {
        match self {
            Self::DineIn { .. } => ServiceType::DineIn,
            Self::Delivery { .. } => ServiceType::Delivery,
            Self::Takeaway { .. } => ServiceType::Takeaway,
        }
    }

    pub fn table_number(&self) -> Option<&str> {
        match self {
            Self::DineIn { table_number, .. } => Some(table_number),
            _ => None,
        }
    }

    /// Value persisted in `orders.remark`
    pub fn remark(&self) -> Option<&str> {
        match self {
            Self::DineIn { note, .. } => note.as_deref(),
            Self::Delivery { address } => Some(address),
            Self::Takeaway { pickup } => Some(pickup),
        }
    }
}

/// A validated line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartLine {
    pub product_id: i64,
    pub quantity: i64,
    /// (slot, option id) for every non-null slot
    pub options: Vec<(String, i64)>,
}

/// A cart that passed every shape check
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedCart {
    pub fulfillment: Fulfillment,
    pub language: Language,
    pub device_id: Option<String>,
    pub lines: Vec<CartLine>,
}

impl CartRequest {
    pub fn validate(self) -> AppResult<ValidatedCart> {
        let service_type: ServiceType = self.service_type.trim().parse()?;

        let remark = trimmed(self.remark);
        validate_optional_text(remark.as_deref(), "remark", MAX_REMARK_LEN)?;

        let fulfillment = match service_type {
            ServiceType::DineIn => {
                let table_number = trimmed(self.table_number);
                validate_required_text(
                    table_number.as_deref(),
                    "table_number",
                    "Table number is required for dine-in orders",
                    MAX_SHORT_TEXT_LEN,
                )?;
                Fulfillment::DineIn {
                    table_number: table_number.unwrap_or_default(),
                    note: remark,
                }
            }
            ServiceType::Delivery => {
                validate_required_text(
                    remark.as_deref(),
                    "remark",
                    "Delivery address is required",
                    MAX_REMARK_LEN,
                )?;
                Fulfillment::Delivery {
                    address: remark.unwrap_or_default(),
                }
            }
            ServiceType::Takeaway => {
                validate_required_text(
                    remark.as_deref(),
                    "remark",
                    "Pickup time is required",
                    MAX_REMARK_LEN,
                )?;
                Fulfillment::Takeaway {
                    pickup: remark.unwrap_or_default(),
                }
            }
        };

        let language = match trimmed(self.language) {
            Some(tag) => tag.parse()?,
            None => Language::default(),
        };

        let device_id = trimmed(self.device_id);
        validate_optional_text(device_id.as_deref(), "device_id", MAX_SHORT_TEXT_LEN)?;

        if self.items.is_empty() {
            return Err(AppError::new(ErrorCode::OrderEmpty));
        }
        if self.items.len() > MAX_CART_LINES {
            return Err(AppError::with_message(
                ErrorCode::ValueOutOfRange,
                format!("Too many cart lines (max {MAX_CART_LINES})"),
            ));
        }

        let lines = self
            .items
            .into_iter()
            .map(CartLineRequest::validate)
            .collect::<AppResult<Vec<_>>>()?;

        Ok(ValidatedCart {
            fulfillment,
            language,
            device_id,
            lines,
        })
    }
}

impl CartLineRequest {
    fn validate(self) -> AppResult<CartLine> {
        if self.product_id <= 0 {
            return Err(AppError::validation(format!(
                "Invalid product id: {}",
                self.product_id
            ))
            .with_detail("product_id", self.product_id));
        }

        let quantity = self.quantity.unwrap_or(1);
        if !(1..=MAX_QUANTITY).contains(&quantity) {
            return Err(AppError::with_message(
                ErrorCode::ValueOutOfRange,
                format!("Quantity must be between 1 and {MAX_QUANTITY}"),
            )
            .with_detail("product_id", self.product_id)
            .with_detail("quantity", quantity));
        }

        let options = self
            .options
            .into_iter()
            .filter_map(|(slot, id)| id.map(|id| (slot, id)))
            .collect();

        Ok(CartLine {
            product_id: self.product_id,
            quantity,
            options,
        })
    }
}

fn trimmed(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
