//! Document number cascade.
//!
//! Headers and footers carry registry numbers, share capital and postal
//! codes that look like document numbers. Every rule skips values in the
//! configured exclusion set.

use super::patterns::*;
use super::{ExtractionContext, FieldCascade, FieldRule};
use crate::layout::columns::value_below_header;
use crate::models::document::DocumentType;

/// Lines after the "Cliente Luogo di consegna" marker searched for a number.
const AFTER_HEADER_LINES: usize = 9;

/// Leading lines searched for a bare number.
const LEADING_LINES: usize = 10;

fn metadata_number(ctx: &ExtractionContext<'_>) -> Vec<String> {
    let mut candidates: Vec<String> = ctx.metadata.document_number.iter().cloned().collect();

    if let Some(file_name) = ctx.metadata.file_name.as_deref() {
        candidates.extend(
            FILE_NAME_NUMBERS
                .iter()
                .filter_map(|pattern| pattern.captures(file_name))
                .map(|caps| caps[1].to_string()),
        );
    }

    candidates
}

fn compact_record_number(ctx: &ExtractionContext<'_>) -> Vec<String> {
    ctx.layout
        .compact
        .iter()
        .map(|r| r.document_number.clone())
        .collect()
}

fn after_client_header(ctx: &ExtractionContext<'_>) -> Vec<String> {
    let Some(header) = ctx
        .lines
        .iter()
        .position(|line| CLIENT_DELIVERY_HEADER.is_match(&line.text()))
    else {
        return Vec::new();
    };

    ctx.lines
        .iter()
        .skip(header + 1)
        .take(AFTER_HEADER_LINES)
        .filter_map(|line| {
            LEADING_FOUR_DIGITS
                .captures(&line.text())
                .map(|caps| caps[1].to_string())
        })
        .collect()
}

fn number_header_column(ctx: &ExtractionContext<'_>) -> Vec<String> {
    ctx.layout
        .number_header
        .as_ref()
        .and_then(|h| {
            let x = h.number_x?;
            value_below_header(
                ctx.lines,
                h.line_index,
                x,
                ctx.config.layout.header_x_tolerance,
                |s| (4..=6).contains(&s.len()) && s.chars().all(|c| c.is_ascii_digit()),
            )
        })
        .into_iter()
        .collect()
}

fn leading_number(ctx: &ExtractionContext<'_>) -> Vec<String> {
    ctx.lines
        .iter()
        .take(LEADING_LINES)
        .filter_map(|line| {
            LEADING_NUMBER
                .captures(&line.text())
                .map(|caps| caps[1].to_string())
        })
        .collect()
}

fn is_document_number(value: &str, ctx: &ExtractionContext<'_>) -> bool {
    value.chars().any(|c| c.is_ascii_digit())
        && value.chars().all(|c| c.is_ascii_digit() || c == '/')
        && !ctx.config.is_excluded_number(value)
}

/// Rules for the document number, in the order they are tried.
pub fn document_number_cascade(document_type: DocumentType) -> FieldCascade {
    let cascade = FieldCascade::new("document_number", is_document_number)
        .rule(FieldRule::custom("METADATA", 1.0, metadata_number));

    match document_type {
        DocumentType::DeliveryNote => cascade
            .rule(FieldRule::custom("COMPACT_RECORD", 0.95, compact_record_number))
            .rule(FieldRule::pattern("COMPACT_LINE", 0.9, &COMPACT_NUMBER_LINE))
            .rule(FieldRule::pattern("COMPACT_ANYWHERE", 0.9, &COMPACT_NUMBER_ANYWHERE))
            .rule(FieldRule::pattern("COMPACT_LOOSE", 0.85, &COMPACT_NUMBER_LOOSE))
            .rule(FieldRule::custom("AFTER_CLIENT_HEADER", 0.85, after_client_header))
            .rule(FieldRule::pattern("DDT_DOTTED", 0.8, &DDT_DOTTED_NUMBER))
            .rule(FieldRule::pattern("DDT_LABEL", 0.8, &DDT_NUMBER))
            .rule(FieldRule::pattern("TRANSPORT_DOCUMENT", 0.8, &TRANSPORT_DOCUMENT_NUMBER))
            .rule(FieldRule::pattern("NUMBER_BEFORE_DATE", 0.75, &NUMBER_BEFORE_DATE))
            .rule(FieldRule::pattern("NUMBER_SIGN", 0.7, &NUMBER_SIGN))
            .rule(FieldRule::pattern("NUMERO_LABEL", 0.7, &NUMERO_LABEL))
            .rule(FieldRule::pattern("NUMERO_DEL", 0.7, &NUMERO_DEL))
            .rule(FieldRule::custom("NUMBER_HEADER_COLUMN", 0.7, number_header_column))
            .rule(FieldRule::custom("LEADING_NUMBER", 0.5, leading_number)),
        DocumentType::Invoice => cascade
            .rule(FieldRule::pattern("FT_ROW", 0.95, &FT_ROW_NUMBER))
            .rule(FieldRule::custom("COMPACT_RECORD", 0.9, compact_record_number))
            .rule(FieldRule::pattern("FATTURA_ACCOMPAGNATORIA", 0.85, &FATTURA_ACCOMPAGNATORIA_NUMBER))
            .rule(FieldRule::pattern("FATTURA_LABEL", 0.85, &FATTURA_NUMBER))
            .rule(FieldRule::pattern("FT_DOTTED", 0.8, &FT_DOTTED_NUMBER))
            .rule(FieldRule::pattern("FT_LABEL", 0.8, &FT_NUMBER))
            .rule(FieldRule::pattern("NUMBER_SIGN", 0.7, &INVOICE_NUMBER_SIGN))
            .rule(FieldRule::pattern("NUMERO_LABEL", 0.7, &INVOICE_NUMERO_LABEL))
            .rule(FieldRule::pattern("COMMERCIAL_DOCUMENT", 0.7, &COMMERCIAL_DOCUMENT_NUMBER))
            .rule(FieldRule::custom("NUMBER_HEADER_COLUMN", 0.7, number_header_column))
            .rule(FieldRule::custom("LEADING_NUMBER", 0.5, leading_number)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::rules::test_support::Fixture;
    use pretty_assertions::assert_eq;

    fn number_of(fixture: &Fixture) -> Option<(String, String)> {
        document_number_cascade(fixture.document_type)
            .extract(&fixture.ctx())
            .map(|c| (c.value, c.method))
    }

    #[test]
    fn test_metadata_first() {
        let mut fixture = Fixture::from_text("D.D.T. N. 5023");
        fixture.metadata = fixture.metadata.clone().with_document_number("703723");
        assert_eq!(number_of(&fixture), Some(("703723".into(), "METADATA".into())));

        let mut fixture = Fixture::from_text("D.D.T. N. 5023");
        fixture.metadata = fixture.metadata.clone().with_file_name("DDV_703723.pdf");
        assert_eq!(number_of(&fixture), Some(("703723".into(), "METADATA".into())));
    }

    #[test]
    fn test_compact_record() {
        let fixture = Fixture::new(vec![(
            700.0,
            vec![("5023", 20.0), ("3/06/25", 60.0), ("1", 110.0), ("20322", 130.0), ("DONAC", 180.0)],
        )]);
        assert_eq!(number_of(&fixture), Some(("5023".into(), "COMPACT_RECORD".into())));
    }

    #[test]
    fn test_excluded_number_never_returned() {
        let fixture = Fixture::from_text("R.E.A. CN\n275071 CAPITALE SOCIALE\nVIA ROMA 1");
        assert_eq!(number_of(&fixture), None);

        let fixture = Fixture::from_text("275071 REA\n4410 SEGUE");
        assert_eq!(number_of(&fixture), Some(("4410".into(), "LEADING_NUMBER".into())));
    }

    #[test]
    fn test_after_client_header() {
        let fixture = Fixture::from_text("Cliente Luogo di consegna\nROSSI SRL\n7012 ROSSI SRL");
        assert_eq!(number_of(&fixture), Some(("7012".into(), "AFTER_CLIENT_HEADER".into())));
    }

    #[test]
    fn test_labeled_patterns() {
        let fixture = Fixture::from_text("D.D.T. N. 703723 del 06/12/25");
        assert_eq!(number_of(&fixture), Some(("703723".into(), "DDT_DOTTED".into())));

        let fixture = Fixture::from_text("DOCUMENTO DI TRASPORTO N. 88123");
        assert_eq!(number_of(&fixture), Some(("88123".into(), "TRANSPORT_DOCUMENT".into())));

        let fixture = Fixture::from_text("Numero 703723 Del 06/12/25");
        assert_eq!(number_of(&fixture).unwrap().0, "703723");
    }

    #[test]
    fn test_invoice_patterns() {
        let fixture = Fixture::from_text("FT 4521 12/05/25 00123").invoice();
        assert_eq!(number_of(&fixture), Some(("4521".into(), "FT_ROW".into())));

        let fixture = Fixture::from_text("FATTURA N. 318/25").invoice();
        assert_eq!(number_of(&fixture).unwrap().0, "318/25");
    }
}
