//! Layout classification: compact record row vs. labeled two-column header.

use regex::Captures;
use serde::Serialize;
use tracing::debug;

use crate::document::rules::patterns::{
    COMPACT_CLIENT_CODE, COMPACT_DATE, COMPACT_NAME_STOP, COMPACT_NUMBER, COMPACT_PAGE,
    COMPACT_ROW_JOINED, COMPACT_ROW_LOOSE, COMPACT_ROW_SPACED, TRANSPORT_MARKER,
};
use crate::models::config::LayoutConfig;
use crate::models::token::Line;

use super::columns::{split_at, ColumnSplit};

/// Layout family of a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LayoutKind {
    /// One row carries number, date, page and client code.
    Compact,
    /// "Cliente" / "Luogo di consegna" header over two columns.
    Labeled,
    /// Neither; only whole-text patterns apply.
    Unknown,
}

/// How the compact row was recognized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CompactMatch {
    /// Pattern match on the space-joined line.
    Text,
    /// Pattern match on the line joined without spaces.
    NoSpaceText,
    /// Token-by-token match of the first four tokens.
    Structural,
}

/// Fields read from the compact record row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompactRecord {
    pub line_index: usize,
    pub document_number: String,
    pub date: String,
    pub page: String,
    pub client_code: String,
    /// Raw client name, possibly duplicated; cleaned later.
    pub client_name: Option<String>,
    pub matched_by: CompactMatch,
}

/// Position of the labeled "Cliente / Luogo di consegna" header.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LabeledHeader {
    pub line_index: usize,
    /// X of the "Luogo di consegna" header, when one was found.
    pub boundary_x: Option<f64>,
}

/// Column positions of the "Numero / Del / Cod. Cliente" header row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NumberHeader {
    pub line_index: usize,
    pub number_x: Option<f64>,
    pub date_x: Option<f64>,
    pub client_code_x: Option<f64>,
}

/// Result of layout classification.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LayoutAnalysis {
    pub kind: LayoutKind,
    /// Compact record row or labeled header row.
    pub anchor_index: Option<usize>,
    pub compact: Option<CompactRecord>,
    pub labeled: Option<LabeledHeader>,
    pub number_header: Option<NumberHeader>,
}

impl LayoutAnalysis {
    pub fn unknown() -> Self {
        Self {
            kind: LayoutKind::Unknown,
            anchor_index: None,
            compact: None,
            labeled: None,
            number_header: None,
        }
    }
}

/// Decides the layout family of grouped lines.
#[derive(Debug, Clone)]
pub struct LayoutClassifier {
    config: LayoutConfig,
}

impl LayoutClassifier {
    pub fn new(config: LayoutConfig) -> Self {
        Self { config }
    }

    /// Classify the document and locate its anchor rows.
    pub fn classify(&self, lines: &[Line]) -> LayoutAnalysis {
        let number_header = find_number_header(lines);

        if let Some(record) = self.find_compact_record(lines) {
            debug!(
                "Compact layout at line {} ({:?})",
                record.line_index, record.matched_by
            );
            return LayoutAnalysis {
                kind: LayoutKind::Compact,
                anchor_index: Some(record.line_index),
                compact: Some(record),
                labeled: None,
                number_header,
            };
        }

        if let Some(header) = self.find_labeled_header(lines) {
            debug!(
                "Labeled layout at line {} (boundary {:?})",
                header.line_index, header.boundary_x
            );
            return LayoutAnalysis {
                kind: LayoutKind::Labeled,
                anchor_index: Some(header.line_index),
                compact: None,
                labeled: Some(header),
                number_header,
            };
        }

        debug!("Layout not recognized");
        LayoutAnalysis {
            number_header,
            ..LayoutAnalysis::unknown()
        }
    }

    /// Split a line into the two labeled columns.
    pub fn split_columns(&self, line: &Line, boundary_x: Option<f64>) -> ColumnSplit {
        match boundary_x {
            Some(x) => split_at(line, x, self.config.column_margin),
            None => split_at(line, self.config.fallback_split_x, 0.0),
        }
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    fn find_compact_record(&self, lines: &[Line]) -> Option<CompactRecord> {
        lines
            .iter()
            .enumerate()
            .find_map(|(index, line)| self.match_compact_line(lines, index, line))
    }

    fn match_compact_line(&self, lines: &[Line], index: usize, line: &Line) -> Option<CompactRecord> {
        let text = line.text();
        if let Some(caps) = row_captures(text.trim()) {
            let name = caps[5].to_string();
            return Some(record_from(&caps, index, &name, CompactMatch::Text));
        }

        if line.word_count() > 3 {
            let joined = line.compact_text();
            if let Some(caps) = row_captures(&joined) {
                // The joined form has lost the spaces inside the name.
                let name = spaced_tail(line, caps.get(5).map_or(joined.len(), |m| m.start()));
                return Some(record_from(&caps, index, &name, CompactMatch::NoSpaceText));
            }
        }

        self.match_row_structure(lines, index, line)
    }

    fn match_row_structure(&self, lines: &[Line], index: usize, line: &Line) -> Option<CompactRecord> {
        let words: Vec<&str> = line.words().map(|t| t.text.trim()).collect();
        if words.len() < 4 {
            return None;
        }

        if !(COMPACT_NUMBER.is_match(words[0])
            && COMPACT_DATE.is_match(words[1])
            && COMPACT_PAGE.is_match(words[2])
            && COMPACT_CLIENT_CODE.is_match(words[3]))
        {
            return None;
        }

        let rest = words[4..].join(" ");
        let client_name = if rest.trim().is_empty() {
            self.name_from_following_lines(lines, index)
        } else {
            Some(rest)
        };

        Some(CompactRecord {
            line_index: index,
            document_number: words[0].to_string(),
            date: words[1].to_string(),
            page: words[2].to_string(),
            client_code: words[3].to_string(),
            client_name,
            matched_by: CompactMatch::Structural,
        })
    }

    /// Client name printed under a record row that carries none.
    ///
    /// Reads the client column of the next three lines and stops at the
    /// first address, postal code or VAT number.
    fn name_from_following_lines(&self, lines: &[Line], index: usize) -> Option<String> {
        let mut parts = Vec::new();

        for line in lines.iter().skip(index + 1).take(3) {
            let text = line.text_where(|t| t.x < self.config.fallback_split_x);
            if text.is_empty() {
                continue;
            }
            if COMPACT_NAME_STOP.is_match(&text) {
                break;
            }
            parts.push(text);
        }

        if parts.is_empty() {
            None
        } else {
            Some(parts.join(" "))
        }
    }

    fn find_labeled_header(&self, lines: &[Line]) -> Option<LabeledHeader> {
        let head = &lines[..lines.len().min(self.config.header_scan_lines)];

        let boundary = |line: &Line| line.find_token("luogo").map(|t| t.x);

        if let Some((index, line)) = head.iter().enumerate().find(|(_, line)| {
            line.contains_ignore_case("cliente") && line.contains_ignore_case("luogo di consegna")
        }) {
            return Some(LabeledHeader {
                line_index: index,
                boundary_x: boundary(line),
            });
        }

        if let Some((index, line)) = head
            .iter()
            .enumerate()
            .find(|(_, line)| line.contains_ignore_case("luogo di consegna"))
        {
            return Some(LabeledHeader {
                line_index: index,
                boundary_x: boundary(line),
            });
        }

        head.iter()
            .position(|line| TRANSPORT_MARKER.is_match(&line.text()))
            .map(|index| LabeledHeader {
                line_index: index,
                boundary_x: None,
            })
    }
}

impl Default for LayoutClassifier {
    fn default() -> Self {
        Self::new(LayoutConfig::default())
    }
}

fn row_captures(text: &str) -> Option<Captures<'_>> {
    [&*COMPACT_ROW_SPACED, &*COMPACT_ROW_JOINED, &*COMPACT_ROW_LOOSE]
        .iter()
        .find_map(|pattern| pattern.captures(text))
}

fn record_from(
    caps: &Captures<'_>,
    index: usize,
    client_name: &str,
    matched_by: CompactMatch,
) -> CompactRecord {
    let client_name = client_name.trim();
    CompactRecord {
        line_index: index,
        document_number: caps[1].to_string(),
        date: caps[2].to_string(),
        page: caps[3].to_string(),
        client_code: caps[4].to_string(),
        client_name: Some(client_name.to_string()).filter(|s| !s.is_empty()),
        matched_by,
    }
}

/// Space-joined words of `line` from byte `start` of its no-space text on.
fn spaced_tail(line: &Line, start: usize) -> String {
    let mut offset = 0;
    let mut parts = Vec::new();

    for word in line.words() {
        let text = word.text.trim();
        let end = offset + text.len();
        if end > start {
            parts.push(&text[start.saturating_sub(offset)..]);
        }
        offset = end;
    }

    parts.join(" ")
}

fn find_number_header(lines: &[Line]) -> Option<NumberHeader> {
    lines
        .iter()
        .enumerate()
        .find(|(_, line)| {
            let text = line.text();
            text.contains("Numero") && text.contains("Del")
        })
        .map(|(index, line)| {
            let x_of = |needle: &str| {
                line.words()
                    .find(|t| t.text.contains(needle))
                    .map(|t| t.x)
            };
            NumberHeader {
                line_index: index,
                number_x: x_of("Numero"),
                date_x: x_of("Del"),
                client_code_x: x_of("Cod. Cliente").or_else(|| x_of("Cod.Cliente")),
            }
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::group_lines;
    use crate::models::token::Token;
    use pretty_assertions::assert_eq;

    fn row(y: f64, tokens: &[(&str, f64)]) -> Vec<Token> {
        tokens
            .iter()
            .map(|(text, x)| Token::new(*text, *x, y, 10.0))
            .collect()
    }

    fn lines_of(rows: Vec<Vec<Token>>) -> Vec<Line> {
        group_lines(&rows.into_iter().flatten().collect::<Vec<_>>())
    }

    #[test]
    fn test_compact_text_match() {
        let lines = lines_of(vec![
            row(800.0, &[("ALFIERI SPA", 20.0)]),
            row(700.0, &[("5023", 20.0), ("3/06/25", 60.0), ("1", 110.0), ("20322", 130.0), ("DONAC S.R.L.", 180.0)]),
        ]);

        let analysis = LayoutClassifier::default().classify(&lines);

        assert_eq!(analysis.kind, LayoutKind::Compact);
        assert_eq!(analysis.anchor_index, Some(1));
        let record = analysis.compact.unwrap();
        assert_eq!(record.matched_by, CompactMatch::Text);
        assert_eq!(record.document_number, "5023");
        assert_eq!(record.date, "3/06/25");
        assert_eq!(record.page, "1");
        assert_eq!(record.client_code, "20322");
        assert_eq!(record.client_name.as_deref(), Some("DONAC S.R.L."));
    }

    #[test]
    fn test_compact_no_space_match() {
        // Date broken across glyph runs: only the joined form is a record row.
        let lines = lines_of(vec![row(
            700.0,
            &[("5023", 20.0), ("3/06/", 44.0), ("25", 62.0), ("1", 80.0), ("20322", 86.0), ("DONAC", 120.0)],
        )]);

        let record = LayoutClassifier::default().classify(&lines).compact.unwrap();

        assert_eq!(record.matched_by, CompactMatch::NoSpaceText);
        assert_eq!(record.document_number, "5023");
        assert_eq!(record.date, "3/06/25");
        assert_eq!(record.client_code, "20322");
        assert_eq!(record.client_name.as_deref(), Some("DONAC"));
    }

    #[test]
    fn test_compact_no_space_match_keeps_name_spacing() {
        let lines = lines_of(vec![row(
            700.0,
            &[
                ("5023", 20.0),
                ("3/06/", 44.0),
                ("25", 62.0),
                ("1", 80.0),
                ("20322", 86.0),
                ("DONAC", 120.0),
                ("S.R.L.", 150.0),
            ],
        )]);

        let record = LayoutClassifier::default().classify(&lines).compact.unwrap();
        assert_eq!(record.matched_by, CompactMatch::NoSpaceText);
        assert_eq!(record.client_code, "20322");
        assert_eq!(record.client_name.as_deref(), Some("DONAC S.R.L."));

        // Name glued to the client code token.
        let lines = lines_of(vec![row(
            700.0,
            &[("5023", 20.0), ("3/06/", 44.0), ("25", 62.0), ("1", 80.0), ("20322DONAC", 86.0), ("S.R.L.", 150.0)],
        )]);

        let record = LayoutClassifier::default().classify(&lines).compact.unwrap();
        assert_eq!(record.client_code, "20322");
        assert_eq!(record.client_name.as_deref(), Some("DONAC S.R.L."));
    }

    #[test]
    fn test_compact_structural_without_name() {
        let lines = lines_of(vec![
            row(700.0, &[("5023", 20.0), ("3/06/25", 60.0), ("1", 110.0), ("20322", 130.0)]),
            row(690.0, &[("DONAC S.R.L.", 20.0), ("DONAC S.R.L.", 300.0)]),
            row(680.0, &[("VIA SALUZZO, 65", 20.0), ("VIA SALUZZO, 65", 300.0)]),
        ]);

        let analysis = LayoutClassifier::default().classify(&lines);
        let record = analysis.compact.unwrap();

        assert_eq!(record.matched_by, CompactMatch::Structural);
        assert_eq!(record.document_number, "5023");
        assert_eq!(record.client_code, "20322");
        assert_eq!(record.client_name.as_deref(), Some("DONAC S.R.L."));
    }

    #[test]
    fn test_labeled_header_boundary() {
        let lines = lines_of(vec![
            row(800.0, &[("D.D.T.", 20.0)]),
            row(780.0, &[("Cliente", 20.0), ("Luogo di consegna", 310.0)]),
            row(770.0, &[("ROSSI SRL", 20.0), ("VIA ROMA 1", 310.0)]),
        ]);

        let classifier = LayoutClassifier::default();
        let analysis = classifier.classify(&lines);

        assert_eq!(analysis.kind, LayoutKind::Labeled);
        let header = analysis.labeled.unwrap();
        assert_eq!(header.line_index, 1);
        assert_eq!(header.boundary_x, Some(310.0));

        let split = classifier.split_columns(&lines[2], header.boundary_x);
        assert_eq!(split.left, "ROSSI SRL");
        assert_eq!(split.right, "VIA ROMA 1");
    }

    #[test]
    fn test_transport_marker_without_header() {
        let lines = lines_of(vec![
            row(800.0, &[("DOCUMENTO DI TRASPORTO", 20.0)]),
            row(780.0, &[("ROSSI SRL", 20.0), ("VIA ROMA 1", 300.0)]),
        ]);

        let classifier = LayoutClassifier::default();
        let analysis = classifier.classify(&lines);

        assert_eq!(analysis.kind, LayoutKind::Labeled);
        assert_eq!(analysis.labeled.as_ref().unwrap().boundary_x, None);

        let split = classifier.split_columns(&lines[1], None);
        assert_eq!(split.left, "ROSSI SRL");
        assert_eq!(split.right, "VIA ROMA 1");
    }

    #[test]
    fn test_header_outside_scan_window_is_ignored() {
        let mut rows: Vec<Vec<Token>> = (0..15)
            .map(|i| row(900.0 - i as f64 * 10.0, &[("filler", 20.0)]))
            .collect();
        rows.push(row(700.0, &[("Cliente", 20.0), ("Luogo di consegna", 300.0)]));

        let analysis = LayoutClassifier::default().classify(&lines_of(rows));
        assert_eq!(analysis.kind, LayoutKind::Unknown);
    }

    #[test]
    fn test_number_header_columns() {
        let lines = lines_of(vec![
            row(800.0, &[("Numero", 100.0), ("Del", 200.0), ("Cod. Cliente", 300.0)]),
            row(790.0, &[("703723", 102.0), ("06/12/25", 201.0), ("20322", 305.0)]),
        ]);

        let analysis = LayoutClassifier::default().classify(&lines);
        let header = analysis.number_header.unwrap();

        assert_eq!(header.line_index, 0);
        assert_eq!(header.number_x, Some(100.0));
        assert_eq!(header.date_x, Some(200.0));
        assert_eq!(header.client_code_x, Some(300.0));
    }

    #[test]
    fn test_unknown_layout() {
        let lines = lines_of(vec![row(800.0, &[("hello", 20.0)])]);

        let analysis = LayoutClassifier::default().classify(&lines);
        assert_eq!(analysis, LayoutAnalysis::unknown());
    }
}
