//! Pricing resolver
//!
//! `unit price = base price + Σ surcharge of every resolved option`, rounded
//! to 2 decimals before it is multiplied out, so the stored subtotal is
//! exactly `unit_price × quantity`.
//! An option id that does not resolve (unknown, or belonging to another
//! product) contributes zero and is left out of the snapshot; it never
//! blocks checkout.

use rust_decimal::Decimal;
use shared::models::{Language, OptionSelection, Product, ProductOption};

use super::money::{line_subtotal, round_money, to_decimal, to_f64};

/// A requested option after catalog lookup
#[derive(Debug, Clone)]
pub struct ResolvedOption {
    pub slot: String,
    pub option_id: i64,
    /// `None` when the id did not resolve for this product
    pub option: Option<ProductOption>,
}

/// A priced cart line, ready to be snapshotted
#[derive(Debug, Clone, PartialEq)]
pub struct PricedLine {
    pub product_id: i64,
    pub product_name: String,
    pub quantity: i64,
    pub unit_price: Decimal,
    pub subtotal: Decimal,
    pub selections: Vec<OptionSelection>,
}

/// Base price plus surcharges of the options that resolved
pub fn unit_price(product: &Product, options: &[ResolvedOption]) -> Decimal {
    let surcharge: Decimal = options
        .iter()
        .filter_map(|o| o.option.as_ref())
        .map(|o| to_decimal(o.extra_price))
        .sum();
    round_money((to_decimal(product.price) + surcharge).max(Decimal::ZERO))
}

/// Price one line and build its snapshot in `lang`
pub fn price_line(
    product: &Product,
    quantity: i64,
    options: &[ResolvedOption],
    lang: Language,
) -> PricedLine {
    let unit = unit_price(product, options);

    let selections = options
        .iter()
        .filter_map(|resolved| match &resolved.option {
            Some(opt) => Some(OptionSelection {
                slot: resolved.slot.clone(),
                option_id: opt.id,
                name: opt.localized_name(lang).to_string(),
                extra_price: to_f64(to_decimal(opt.extra_price)),
            }),
            None => {
                tracing::debug!(
                    product_id = product.id,
                    slot = %resolved.slot,
                    option_id = resolved.option_id,
                    "Option did not resolve, no surcharge applied"
                );
                None
            }
        })
        .collect();

    PricedLine {
        product_id: product.id,
        product_name: product.localized_name(lang).to_string(),
        quantity,
        unit_price: unit,
        subtotal: line_subtotal(unit, quantity),
        selections,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn latte() -> Product {
        Product {
            id: 1,
            category_id: None,
            name_zh: "拿铁".into(),
            name_my: None,
            name_en: Some("Latte".into()),
            price: 3500.0,
            is_available: true,
            sort_order: 0,
        }
    }

    fn option(id: i64, option_type: &str, name: &str, extra: f64) -> ProductOption {
        ProductOption {
            id,
            product_id: 1,
            option_type: option_type.into(),
            name_zh: name.into(),
            name_my: None,
            name_en: Some(name.into()),
            extra_price: extra,
            is_default: false,
            sort_order: 0,
        }
    }

    fn resolved(slot: &str, id: i64, opt: Option<ProductOption>) -> ResolvedOption {
        ResolvedOption {
            slot: slot.into(),
            option_id: id,
            option: opt,
        }
    }

    #[test]
    fn test_large_hot_latte() {
        let options = vec![
            resolved("size", 2, Some(option(2, "size", "Large", 1000.0))),
            resolved("temperature", 5, Some(option(5, "temperature", "Hot", 0.0))),
        ];
        let line = price_line(&latte(), 2, &options, Language::En);

        assert_eq!(to_f64(line.unit_price), 4500.0);
        assert_eq!(to_f64(line.subtotal), 9000.0);
        assert_eq!(line.product_name, "Latte");
        assert_eq!(line.selections.len(), 2);
        assert_eq!(line.selections[0].name, "Large");
        assert_eq!(line.selections[0].extra_price, 1000.0);
    }

    #[test]
    fn test_unresolved_option_is_free() {
        let options = vec![
            resolved("size", 99, None),
            resolved("sweetness", 7, Some(option(7, "sweetness", "Less sugar", 200.0))),
        ];
        let line = price_line(&latte(), 1, &options, Language::Zh);

        assert_eq!(to_f64(line.unit_price), 3700.0);
        assert_eq!(line.selections.len(), 1);
        assert_eq!(line.selections[0].slot, "sweetness");
        assert_eq!(line.product_name, "拿铁");
    }

    #[test]
    fn test_fractional_price_rounds_before_multiplying() {
        let mut product = latte();
        product.price = 10.125;
        let line = price_line(&product, 2, &[], Language::En);

        assert_eq!(line.unit_price, Decimal::new(1013, 2));
        assert_eq!(line.subtotal, Decimal::new(2026, 2));
        assert_eq!(line.subtotal, line.unit_price * Decimal::from(2));
    }

    #[test]
    fn test_no_options_is_base_price() {
        assert_eq!(to_f64(unit_price(&latte(), &[])), 3500.0);
    }
}
