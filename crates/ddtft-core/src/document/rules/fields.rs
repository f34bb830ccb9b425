//! Cascades for dates, client code, VAT number and order reference.

use crate::layout::columns::value_below_header;
use crate::models::document::DocumentType;

use super::patterns::*;
use super::{accept_any, ExtractionContext, FieldCascade, FieldRule};

const MONTHS: [&str; 12] = [
    "gennaio", "febbraio", "marzo", "aprile", "maggio", "giugno", "luglio", "agosto", "settembre",
    "ottobre", "novembre", "dicembre",
];

fn compact_date(ctx: &ExtractionContext<'_>) -> Vec<String> {
    ctx.layout.compact.iter().map(|r| r.date.clone()).collect()
}

fn compact_client_code(ctx: &ExtractionContext<'_>) -> Vec<String> {
    ctx.layout.compact.iter().map(|r| r.client_code.clone()).collect()
}

fn number_header_date(ctx: &ExtractionContext<'_>) -> Vec<String> {
    ctx.layout
        .number_header
        .as_ref()
        .and_then(|h| {
            let x = h.date_x?;
            value_below_header(
                ctx.lines,
                h.line_index,
                x,
                ctx.config.layout.header_x_tolerance,
                |s| DATE_ANY.is_match(s),
            )
        })
        .into_iter()
        .collect()
}

fn number_header_client_code(ctx: &ExtractionContext<'_>) -> Vec<String> {
    ctx.layout
        .number_header
        .as_ref()
        .and_then(|h| {
            let x = h.client_code_x?;
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

/// `15 gennaio 2025` as `15/01/2025`.
fn month_name_date(ctx: &ExtractionContext<'_>) -> Vec<String> {
    DATE_MONTH_NAME
        .captures_iter(ctx.text)
        .filter_map(|caps| {
            let day: u32 = caps[1].parse().ok()?;
            let name = caps[2].to_lowercase();
            let month = MONTHS.iter().position(|m| *m == name)? + 1;
            Some(format!("{:02}/{:02}/{}", day, month, &caps[3]))
        })
        .collect()
}

/// Eleven-digit numbers near the compact record row.
fn compact_neighbourhood_vat(ctx: &ExtractionContext<'_>) -> Vec<String> {
    let Some(anchor) = ctx.layout.compact.as_ref().map(|r| r.line_index) else {
        return Vec::new();
    };

    let start = anchor.saturating_sub(5);
    let end = (anchor + 15).min(ctx.lines.len());
    ctx.lines
        .get(start..end)
        .unwrap_or_default()
        .iter()
        .flat_map(|line| {
            ELEVEN_DIGITS
                .captures_iter(&line.text())
                .map(|caps| caps[1].to_string())
                .collect::<Vec<_>>()
        })
        .collect()
}

fn is_client_code(value: &str, _ctx: &ExtractionContext<'_>) -> bool {
    value.chars().all(|c| c.is_ascii_digit())
}

fn is_client_vat(value: &str, ctx: &ExtractionContext<'_>) -> bool {
    value.len() == 11 && value.chars().all(|c| c.is_ascii_digit()) && !ctx.config.is_issuer_vat(value)
}

/// Document date. Invoices look for the `FT <n> <date>` row first.
pub fn date_cascade(document_type: DocumentType) -> FieldCascade {
    let cascade = FieldCascade::new("date", accept_any);

    let cascade = match document_type {
        DocumentType::Invoice => cascade.rule(FieldRule::pattern("FT_ROW", 0.95, &FT_ROW_DATE)),
        DocumentType::DeliveryNote => cascade,
    };

    let cascade = cascade
        .rule(FieldRule::custom("COMPACT_RECORD", 0.95, compact_date))
        .rule(FieldRule::custom("NUMBER_HEADER_COLUMN", 0.9, number_header_date))
        .rule(FieldRule::pattern("DATA_LABEL", 0.85, &DATE_AFTER_DATA))
        .rule(FieldRule::pattern("DEL_LABEL", 0.8, &DATE_AFTER_DEL));

    let cascade = match document_type {
        DocumentType::Invoice => cascade.rule(FieldRule::custom("MONTH_NAME", 0.75, month_name_date)),
        DocumentType::DeliveryNote => cascade,
    };

    cascade.rule(FieldRule::pattern("FIRST_DATE", 0.5, &DATE_ANY))
}

pub fn delivery_date_cascade() -> FieldCascade {
    let methods = ["DATA_CONSEGNA", "CONSEGNA_LABEL", "DELIVERY_DATE", "CONSEGNA_IL"];
    DELIVERY_DATE_PATTERNS
        .iter()
        .zip(methods)
        .fold(FieldCascade::new("delivery_date", accept_any), |cascade, (pattern, method)| {
            cascade.rule(FieldRule::pattern(method, 0.85, pattern))
        })
}

pub fn client_code_cascade() -> FieldCascade {
    FieldCascade::new("client_code", is_client_code)
        .rule(FieldRule::custom("COMPACT_RECORD", 0.95, compact_client_code))
        .rule(FieldRule::custom("NUMBER_HEADER_COLUMN", 0.9, number_header_client_code))
        .rule(FieldRule::pattern("COD_CLIENTE", 0.85, &CLIENT_CODE_LABEL))
        .rule(FieldRule::pattern("CLIENTE_N", 0.8, &CLIENT_NUMBER_LABEL))
        .rule(FieldRule::pattern("COD_CLI", 0.75, &CLIENT_CODE_SHORT))
}

/// Client VAT number. The issuer's own number is never accepted.
pub fn vat_number_cascade() -> FieldCascade {
    FieldCascade::new("vat_number", is_client_vat)
        .rule(FieldRule::custom("COMPACT_NEIGHBOURHOOD", 0.9, compact_neighbourhood_vat))
        .rule(FieldRule::pattern("PIVA_LABEL", 0.9, &VAT_LABEL))
        .rule(FieldRule::pattern("CF_LABEL", 0.8, &FISCAL_CODE_LABEL))
        .rule(FieldRule::pattern("ELEVEN_DIGITS", 0.6, &ELEVEN_DIGITS))
}

pub fn order_reference_cascade() -> FieldCascade {
    let methods = ["RIF_ORDINE", "ORDINE_N", "ODV", "VS_ORDINE", "NS_ORDINE"];
    ORDER_REFERENCE_PATTERNS
        .iter()
        .zip(methods)
        .fold(FieldCascade::new("order_reference", accept_any), |cascade, (pattern, method)| {
            cascade.rule(FieldRule::pattern(method, 0.85, pattern))
        })
}

#[cfg(test)]
mod tests {
    use super::super::test_support::Fixture;
    use super::*;
    use pretty_assertions::assert_eq;

    fn compact_fixture() -> Fixture {
        Fixture::new(vec![
            (800.0, vec![("ALFIERI SPA", 20.0), ("P.IVA 03247720042", 300.0)]),
            (700.0, vec![("5023", 20.0), ("3/06/25", 60.0), ("1", 110.0), ("20322", 130.0), ("DONAC S.R.L.", 180.0)]),
            (690.0, vec![("P.IVA 01234567890", 20.0)]),
        ])
    }

    #[test]
    fn test_compact_date_and_code() {
        let fixture = compact_fixture();
        let ctx = fixture.ctx();

        let date = date_cascade(DocumentType::DeliveryNote).extract(&ctx).unwrap();
        assert_eq!((date.value.as_str(), date.method.as_str()), ("3/06/25", "COMPACT_RECORD"));

        let code = client_code_cascade().extract(&ctx).unwrap();
        assert_eq!(code.value, "20322");
    }

    #[test]
    fn test_vat_skips_issuer() {
        let fixture = compact_fixture();
        let vat = vat_number_cascade().extract(&fixture.ctx()).unwrap();

        assert_eq!(vat.value, "01234567890");
        assert_eq!(vat.method, "COMPACT_NEIGHBOURHOOD");
    }

    #[test]
    fn test_vat_never_issuer() {
        let fixture = Fixture::from_text("P.IVA 03247720042\nC.F. 03247720042");
        assert_eq!(vat_number_cascade().extract(&fixture.ctx()), None);
    }

    #[test]
    fn test_labeled_vat() {
        let fixture = Fixture::from_text("ROSSI SRL\nPartita IVA: 09876543210");
        let vat = vat_number_cascade().extract(&fixture.ctx()).unwrap();
        assert_eq!((vat.value.as_str(), vat.method.as_str()), ("09876543210", "PIVA_LABEL"));
    }

    #[test]
    fn test_number_header_columns() {
        let fixture = Fixture::new(vec![
            (800.0, vec![("Numero", 100.0), ("Del", 200.0), ("Cod. Cliente", 300.0)]),
            (790.0, vec![("703723", 102.0), ("06/12/25", 201.0), ("20322", 305.0)]),
        ]);
        let ctx = fixture.ctx();

        let date = date_cascade(DocumentType::DeliveryNote).extract(&ctx).unwrap();
        assert_eq!((date.value.as_str(), date.method.as_str()), ("06/12/25", "NUMBER_HEADER_COLUMN"));

        let code = client_code_cascade().extract(&ctx).unwrap();
        assert_eq!((code.value.as_str(), code.method.as_str()), ("20322", "NUMBER_HEADER_COLUMN"));
    }

    #[test]
    fn test_invoice_dates() {
        let fixture = Fixture::from_text("FT 4521 12/05/25 00123\nRIF. ORDINE 77 del 02/05/25").invoice();
        let date = date_cascade(DocumentType::Invoice).extract(&fixture.ctx()).unwrap();
        assert_eq!((date.value.as_str(), date.method.as_str()), ("12/05/25", "FT_ROW"));

        let fixture = Fixture::from_text("Fattura emessa il 15 Gennaio 2025").invoice();
        let date = date_cascade(DocumentType::Invoice).extract(&fixture.ctx()).unwrap();
        assert_eq!(date.value, "15/01/2025");
    }

    #[test]
    fn test_data_label_before_first_date() {
        let fixture = Fixture::from_text("Stampato 01/01/25\nDATA DOCUMENTO: 14/03/2025");
        let date = date_cascade(DocumentType::DeliveryNote).extract(&fixture.ctx()).unwrap();
        assert_eq!(date.value, "14/03/2025");
    }

    #[test]
    fn test_delivery_date_and_order_reference() {
        let fixture = Fixture::from_text("DATA CONSEGNA: 20/06/25\nRIF. ORDINE: 507XYZ del 15/05");
        let ctx = fixture.ctx();

        assert_eq!(delivery_date_cascade().extract(&ctx).unwrap().value, "20/06/25");
        let order = order_reference_cascade().extract(&ctx).unwrap();
        assert_eq!((order.value.as_str(), order.method.as_str()), ("507XYZ", "RIF_ORDINE"));
    }

    #[test]
    fn test_client_code_labels() {
        let fixture = Fixture::from_text("Codice Cliente: 4411");
        assert_eq!(client_code_cascade().extract(&fixture.ctx()).unwrap().value, "4411");

        let fixture = Fixture::from_text("Cod. Cli. 20322");
        assert_eq!(client_code_cascade().extract(&fixture.ctx()).unwrap().method, "COD_CLI");
    }
}
