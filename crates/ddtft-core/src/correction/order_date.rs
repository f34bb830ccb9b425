//! Order date completion.

use chrono::Datelike;

use crate::document::rules::patterns::{FT_ROW_LINE, ORDER_DATE_PATTERNS};
use crate::document::rules::ExtractionContext;
use crate::models::document::{DocumentType, StructuredDocument};

use super::Correction;

/// Complete a partially printed order date.
///
/// * `15/05` gets `year` appended.
/// * A one-digit year such as `12/03/2` is a transcription artifact and is
///   replaced with `year`.
/// * A two-digit year is read as `20yy`.
/// * A four-digit year is kept.
pub fn normalize_order_date(raw: &str, year: i32) -> String {
    let parts: Vec<&str> = raw.trim().split(['/', '-']).collect();
    match parts.as_slice() {
        [day, month] => format!("{}/{}/{}", day, month, year),
        [day, month, y] if y.len() == 1 => format!("{}/{}/{}", day, month, year),
        [day, month, y] if y.len() == 2 => format!("{}/{}/20{}", day, month, y),
        [day, month, y] => format!("{}/{}/{}", day, month, y),
        _ => raw.trim().to_string(),
    }
}

/// Date printed after the order reference on its own line.
fn find_order_date(document: &StructuredDocument, ctx: &ExtractionContext<'_>) -> Option<String> {
    let reference = document.order_reference.trim();
    if reference.is_empty() {
        return None;
    }

    ctx.lines.iter().find_map(|line| {
        let text = line.text();
        if document.document_type == DocumentType::Invoice && FT_ROW_LINE.is_match(&text) {
            return None;
        }
        let start = text.find(reference)?;
        let tail = &text[start..];
        ORDER_DATE_PATTERNS
            .iter()
            .find_map(|pattern| pattern.captures(tail))
            .map(|caps| caps[1].to_string())
    })
}

/// Fills the order date from the order reference line and completes its year.
#[derive(Debug, Clone, Default)]
pub struct OrderDateNormalization;

impl Correction for OrderDateNormalization {
    fn name(&self) -> &'static str {
        "order_date_normalization"
    }

    fn apply(&self, document: &mut StructuredDocument, ctx: &ExtractionContext<'_>) -> bool {
        let raw = match find_order_date(document, ctx) {
            Some(raw) => raw,
            None if !document.order_date.is_empty() => document.order_date.clone(),
            None => return false,
        };

        let normalized = normalize_order_date(&raw, ctx.import_date.year());
        if normalized == document.order_date {
            return false;
        }
        document.order_date = normalized;
        true
    }
}
