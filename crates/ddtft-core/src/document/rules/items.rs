//! Line item rows.

use regex::Captures;
use rust_decimal::Decimal;
use tracing::trace;

use crate::models::document::LineItem;
use crate::models::token::Line;

use super::amounts::parse_italian_amount;
use super::patterns::{ITEM_GENERIC, ITEM_GIFT, ITEM_SKIP, ITEM_STANDARD, WEIGHT_SUFFIX};

fn amount(caps: &Captures<'_>, index: usize) -> Decimal {
    caps.get(index)
        .and_then(|m| parse_italian_amount(m.as_str()))
        .unwrap_or_default()
}

fn clean_description(raw: &str) -> String {
    WEIGHT_SUFFIX.replace(raw.trim(), "").trim().to_string()
}

/// Parse one line of text as a product row.
pub fn parse_item_line(text: &str) -> Option<LineItem> {
    let text = text.trim();
    if text.is_empty() || ITEM_SKIP.is_match(text) {
        return None;
    }

    // CODE DESCRIPTION UNIT QTY * PRICE LISTTOTAL VAT SM: free goods.
    if let Some(caps) = ITEM_GIFT.captures(text) {
        return Some(LineItem {
            code: caps[1].to_string(),
            description: clean_description(&caps[2]),
            unit: Some(caps[3].to_string()),
            quantity: amount(&caps, 4),
            unit_price: amount(&caps, 5),
            returned_quantity: amount(&caps, 8),
            discount_percent: Decimal::ONE_HUNDRED,
            total: Decimal::ZERO,
            vat_rate: Some(amount(&caps, 7)),
        });
    }

    // CODE DESCRIPTION UNIT QTY PRICE TOTAL VAT SM
    if let Some(caps) = ITEM_STANDARD.captures(text) {
        return Some(LineItem {
            code: caps[1].to_string(),
            description: clean_description(&caps[2]),
            unit: Some(caps[3].to_string()),
            quantity: amount(&caps, 4),
            unit_price: amount(&caps, 5),
            returned_quantity: amount(&caps, 8),
            discount_percent: Decimal::ZERO,
            total: amount(&caps, 6),
            vat_rate: Some(amount(&caps, 7)),
        });
    }

    // CODE DESCRIPTION QTY PRICE TOTAL
    ITEM_GENERIC.captures(text).map(|caps| LineItem {
        code: caps[1].to_string(),
        description: clean_description(&caps[2]),
        unit: None,
        quantity: amount(&caps, 3),
        unit_price: amount(&caps, 4),
        returned_quantity: Decimal::ZERO,
        discount_percent: Decimal::ZERO,
        total: amount(&caps, 5),
        vat_rate: None,
    })
}

/// All product rows of the document, in order.
pub fn extract_items(lines: &[Line]) -> Vec<LineItem> {
    lines
        .iter()
        .filter_map(|line| {
            let item = parse_item_line(&line.text())?;
            trace!("Item {} x {} = {}", item.code, item.quantity, item.total);
            Some(item)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_standard_row() {
        let item = parse_item_line("DL000301 TORCETTI AL BURRO 400 G PZ 80 2,30 184,00 10 0").unwrap();

        assert_eq!(
            item,
            LineItem {
                code: "DL000301".into(),
                description: "TORCETTI AL BURRO".into(),
                unit: Some("PZ".into()),
                quantity: dec("80"),
                unit_price: dec("2.30"),
                returned_quantity: dec("0"),
                discount_percent: dec("0"),
                total: dec("184.00"),
                vat_rate: Some(dec("10")),
            }
        );
    }

    #[test]
    fn test_gift_row() {
        let item = parse_item_line("070017 GRISSINI STIRATI PZ 10 * 1,50 15,00 10 0").unwrap();

        assert_eq!(item.code, "070017");
        assert_eq!(item.quantity, dec("10"));
        assert_eq!(item.unit_price, dec("1.50"));
        assert_eq!(item.discount_percent, dec("100"));
        assert_eq!(item.total, Decimal::ZERO);
    }

    #[test]
    fn test_generic_row() {
        let item = parse_item_line("VS000012 PANETTONE CLASSICO 1 KG 6 12,50 75,00").unwrap();

        assert_eq!(item.code, "VS000012");
        assert_eq!(item.description, "PANETTONE CLASSICO");
        assert_eq!(item.quantity, dec("6"));
        assert_eq!(item.total, dec("75.00"));
        assert_eq!(item.unit, None);
    }

    #[test]
    fn test_skipped_rows() {
        assert_eq!(parse_item_line("TOTALE MERCE 1.000,00"), None);
        assert_eq!(parse_item_line("BANCALI 2"), None);
        assert_eq!(parse_item_line("Spett.le ROSSI SRL"), None);
        assert_eq!(parse_item_line(""), None);
    }
}
