//! Italian amounts and declared document totals.

use rust_decimal::Decimal;
use std::str::FromStr;

use super::patterns::{SUBTOTAL_LABEL, TOTAL_LABEL, VAT_RATE_AMOUNT, VAT_TOTAL_LABEL};
use crate::totals::DeclaredTotals;

/// Integer digits above which a printed amount is taken as OCR noise.
pub const MAX_AMOUNT_DIGITS: usize = 12;

/// Parse an Italian-formatted amount (`1.234,56`, `184,00`, `2,3`).
///
/// Without a comma, a dot followed by exactly three digit groups is read
/// as a thousands separator and anything else as the decimal point.
/// Amounts with more than [`MAX_AMOUNT_DIGITS`] integer digits are rejected.
pub fn parse_italian_amount(s: &str) -> Option<Decimal> {
    let cleaned: String = s
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == ',' || *c == '.' || *c == '-')
        .collect();

    if cleaned.is_empty() {
        return None;
    }

    let normalized = if cleaned.contains(',') {
        cleaned.replace('.', "").replace(',', ".")
    } else if is_thousands_grouped(&cleaned) {
        cleaned.replace('.', "")
    } else {
        cleaned
    };

    let integer_digits = normalized
        .split('.')
        .next()
        .unwrap_or_default()
        .chars()
        .filter(|c| c.is_ascii_digit())
        .count();
    if integer_digits > MAX_AMOUNT_DIGITS {
        return None;
    }

    Decimal::from_str(&normalized).ok()
}

fn is_thousands_grouped(s: &str) -> bool {
    let mut groups = s.trim_start_matches('-').split('.');
    let head = groups.next().unwrap_or_default();
    let tail: Vec<&str> = groups.collect();

    !tail.is_empty()
        && (1..=3).contains(&head.len())
        && tail.iter().all(|g| g.len() == 3 && g.chars().all(|c| c.is_ascii_digit()))
}

/// Amounts printed in the totals block, if any.
pub fn extract_declared_totals(text: &str) -> DeclaredTotals {
    let first = |pattern: &regex::Regex| {
        pattern
            .captures(text)
            .and_then(|caps| parse_italian_amount(&caps[1]))
    };

    let vat = first(&VAT_TOTAL_LABEL).or_else(|| {
        let per_rate: Vec<Decimal> = VAT_RATE_AMOUNT
            .captures_iter(text)
            .filter_map(|caps| parse_italian_amount(&caps[1]))
            .collect();
        if per_rate.is_empty() {
            return None;
        }
        per_rate
            .iter()
            .try_fold(Decimal::ZERO, |sum, amount| sum.checked_add(*amount))
    });

    DeclaredTotals {
        subtotal: first(&SUBTOTAL_LABEL),
        vat,
        total: first(&TOTAL_LABEL),
    }
}
