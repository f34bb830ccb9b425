//! Address extraction strategies, one per document shape.

use lazy_static::lazy_static;
use regex::Regex;
use tracing::trace;

use crate::layout::columns::{split_by_gap, split_by_spaces, ColumnSplit};
use crate::models::config::{AddressOverride, LayoutConfig};
use crate::models::token::Line;

use super::parts::{is_city_line, is_street_address, parse_city, AddressParts, POSTAL_CODE};
use super::{AddressInput, AddressMethod, AddressStrategy};

lazy_static! {
    static ref DOUBLE_STREET_KEYWORD: Regex = Regex::new(
        r"(?i)(?:^|[^\p{L}])(?:VIA|V\.LE|VIALE|CORSO|C\.SO|PIAZZA|P\.ZA|STRADA)(?:\s|$)"
    ).unwrap();

    static ref DOUBLE_STREET_SPLIT: Regex = Regex::new(
        r"(?i)^(.*?(?:VIA|V\.LE|VIALE|CORSO|C\.SO|PIAZZA|P\.ZA|STRADA|LOC\.|LOCALITA)\s[^,]+(?:,\s*\d+)?.*?)\s+((?:VIA|V\.LE|VIALE|CORSO|C\.SO|PIAZZA|P\.ZA|STRADA|LOC\.|LOCALITA)\s.+)$"
    ).unwrap();

    static ref DELIVERY_LABEL: Vec<Regex> = vec![
        Regex::new(r"(?i)Luogo\s+di\s+consegna[:\s]+").unwrap(),
        Regex::new(r"(?i)Consegna\s+presso[:\s]+").unwrap(),
        Regex::new(r"(?i)Indirizzo\s+(?:di\s+)?consegna[:\s]+").unwrap(),
    ];

    static ref VAT_SECTION: Regex = Regex::new(r"(?i)^(?:Partita\s+IVA|P\.\s*IVA)").unwrap();

    static ref CARRIER_SECTION: Regex = Regex::new(r"(?i)vettore|trasporto\s+a\s+mezzo").unwrap();
}

/// Right column of a two-column line.
///
/// Falls back to the tokens past the delivery column when the line cannot
/// be split.
fn right_column(line: &Line, layout: &LayoutConfig) -> Option<String> {
    split_by_gap(line, layout.min_column_gap)
        .map(|ColumnSplit { right, .. }| right)
        .or_else(|| {
            let text = line.text_where(|t| t.x >= layout.delivery_column_x);
            (!text.is_empty()).then_some(text)
        })
        .filter(|s| !s.is_empty())
}

/// Street and city two and three lines below the compact record row.
#[derive(Debug, Clone)]
pub struct CompactFormatStrategy {
    layout: LayoutConfig,
}

impl CompactFormatStrategy {
    pub fn new(layout: LayoutConfig) -> Self {
        Self { layout }
    }
}

impl AddressStrategy for CompactFormatStrategy {
    fn method(&self) -> AddressMethod {
        AddressMethod::CompactFormat
    }

    fn extract(&self, input: &AddressInput<'_>) -> Option<String> {
        let anchor = input.layout.compact.as_ref()?.line_index;
        let mut parts = AddressParts::default();

        if let Some(street) = input.lines.get(anchor + 2).and_then(|l| right_column(l, &self.layout)) {
            trace!("Compact street column: {}", street);
            parts.street = street;
        }

        if let Some(city) = input.lines.get(anchor + 3).and_then(|l| right_column(l, &self.layout)) {
            trace!("Compact city column: {}", city);
            parts.set_city(parse_city(&city));
        }

        parts.combine()
    }
}

/// Values aligned under the "Luogo di consegna" header.
#[derive(Debug, Clone)]
pub struct HeaderColumnsStrategy {
    layout: LayoutConfig,
}

impl HeaderColumnsStrategy {
    const SCAN_LINES: usize = 10;

    pub fn new(layout: LayoutConfig) -> Self {
        Self { layout }
    }

    fn find_header(&self, lines: &[Line]) -> Option<(usize, f64)> {
        lines
            .iter()
            .take(self.layout.header_scan_lines)
            .enumerate()
            .find_map(|(index, line)| line.find_token("luogo di consegna").map(|t| (index, t.x)))
    }

    /// Text of the column starting at the first token aligned with `x`.
    fn column_text(&self, line: &Line, x: f64) -> Option<String> {
        let tolerance = self.layout.header_x_tolerance;
        let start = line.words().find(|t| (t.x - x).abs() <= tolerance)?.x;
        let text = line.text_where(|t| t.x >= start);
        (!text.is_empty()).then_some(text)
    }
}

impl AddressStrategy for HeaderColumnsStrategy {
    fn method(&self) -> AddressMethod {
        AddressMethod::HeaderColumns
    }

    fn extract(&self, input: &AddressInput<'_>) -> Option<String> {
        let (header, x) = self.find_header(input.lines)?;
        let mut parts = AddressParts::default();

        for line in input.lines.iter().skip(header + 1).take(Self::SCAN_LINES - 1) {
            if CARRIER_SECTION.is_match(&line.text()) {
                break;
            }

            let Some(text) = self.column_text(line, x) else {
                continue;
            };

            if parts.street.is_empty() && is_street_address(&text) {
                parts.street = text;
            } else if parts.postal_code.is_empty() && is_city_line(&text) {
                parts.set_city(parse_city(&text));
            } else if text.contains("INGR.") || text.contains("SCARICO") {
                parts.additional_info = text;
            }
        }

        parts.combine()
    }
}

/// Client and delivery street printed side by side on one line.
#[derive(Debug, Clone, Default)]
pub struct DoubleColumnStrategy;

impl DoubleColumnStrategy {
    fn street_count(text: &str) -> usize {
        // Consecutive keywords share a separator, so count on padded text.
        let padded = text.replace(' ', "  ");
        DOUBLE_STREET_KEYWORD.find_iter(&padded).count()
    }

    fn split_streets(text: &str) -> Option<String> {
        DOUBLE_STREET_SPLIT
            .captures(text)
            .map(|caps| caps[2].trim().to_string())
            .or_else(|| split_by_spaces(text).map(|s| s.right))
    }

    /// City after the last of two or more postal codes.
    fn split_cities(text: &str) -> Option<String> {
        let codes: Vec<_> = POSTAL_CODE.find_iter(text).collect();
        if codes.len() < 2 {
            return None;
        }
        codes.last().map(|m| text[m.start()..].trim().to_string())
    }
}

impl AddressStrategy for DoubleColumnStrategy {
    fn method(&self) -> AddressMethod {
        AddressMethod::DoubleColumn
    }

    fn extract(&self, input: &AddressInput<'_>) -> Option<String> {
        let (index, street) = input.lines.iter().enumerate().find_map(|(i, line)| {
            let text = line.text();
            if Self::street_count(&text) < 2 {
                return None;
            }
            Self::split_streets(&text).map(|street| (i, street))
        })?;

        let mut parts = AddressParts {
            street,
            ..Default::default()
        };

        if let Some(city) = input
            .lines
            .get(index + 1)
            .and_then(|l| Self::split_cities(&l.text()))
        {
            parts.set_city(parse_city(&city));
        }

        parts.combine()
    }
}

/// Explicit "Luogo di consegna:" style labels in the flattened text.
#[derive(Debug, Clone, Default)]
pub struct MarkersStrategy;

impl AddressStrategy for MarkersStrategy {
    fn method(&self) -> AddressMethod {
        AddressMethod::Markers
    }

    fn extract(&self, input: &AddressInput<'_>) -> Option<String> {
        let label = DELIVERY_LABEL.iter().find_map(|p| p.find(input.text))?;
        let block = &input.text[label.end()..];

        let mut parts = AddressParts::default();
        for line in block.lines().map(str::trim) {
            if VAT_SECTION.is_match(line) {
                break;
            }
            if parts.street.is_empty() && is_street_address(line) {
                parts.street = line.to_string();
            } else if is_city_line(line) {
                parts.set_city(parse_city(line));
            }
        }

        parts.combine()
    }
}

/// Configured address for clients whose name contains a known fragment.
#[derive(Debug, Clone)]
pub struct OverrideStrategy {
    overrides: Vec<AddressOverride>,
}

impl OverrideStrategy {
    pub fn new(overrides: Vec<AddressOverride>) -> Self {
        Self { overrides }
    }
}

impl AddressStrategy for OverrideStrategy {
    fn method(&self) -> AddressMethod {
        AddressMethod::Override
    }

    fn extract(&self, input: &AddressInput<'_>) -> Option<String> {
        let client = input.client_name?.to_uppercase();
        self.overrides
            .iter()
            .find(|o| !o.client_contains.trim().is_empty() && client.contains(&o.client_contains.to_uppercase()))
            .map(|o| o.address.clone())
    }
}
