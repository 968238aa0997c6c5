//! Product Model
//!
//! Read-only from the ordering core: prices and names are copied into
//! order items at creation time.

use serde::{Deserialize, Serialize};

use super::order::Language;

/// Product entity
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Product {
    pub id: i64,
    pub category_id: Option<i64>,
    pub name_zh: String,
    pub name_my: Option<String>,
    pub name_en: Option<String>,
    /// Base price in currency unit
    pub price: f64,
    pub is_available: bool,
    pub sort_order: i64,
}

impl Product {
    /// Name in `lang`, falling back to the Chinese name when empty
    pub fn localized_name(&self, lang: Language) -> &str {
        pick_name(&self.name_zh, &self.name_my, &self.name_en, lang)
    }
}

/// Product option (size / temperature / sweetness ...)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct ProductOption {
    pub id: i64,
    pub product_id: i64,
    pub option_type: String,
    pub name_zh: String,
    pub name_my: Option<String>,
    pub name_en: Option<String>,
    /// Surcharge in currency unit
    pub extra_price: f64,
    pub is_default: bool,
    pub sort_order: i64,
}

impl ProductOption {
    pub fn localized_name(&self, lang: Language) -> &str {
        pick_name(&self.name_zh, &self.name_my, &self.name_en, lang)
    }
}

fn pick_name<'a>(
    zh: &'a str,
    my: &'a Option<String>,
    en: &'a Option<String>,
    lang: Language,
) -> &'a str {
    let localized = match lang {
        Language::Zh => None,
        Language::My => my.as_deref(),
        Language::En => en.as_deref(),
    };
    match localized {
        Some(name) if !name.trim().is_empty() => name,
        _ => zh,
    }
}
