//! Line grouping and layout analysis.

mod classifier;
pub mod columns;

pub use classifier::{
    CompactMatch, CompactRecord, LabeledHeader, LayoutAnalysis, LayoutClassifier, LayoutKind,
    NumberHeader,
};

use crate::models::token::{Line, Token};

/// Default vertical tolerance between tokens of one line.
pub const DEFAULT_LINE_TOLERANCE: f64 = 5.0;

/// Group tokens into lines with the default tolerance.
pub fn group_lines(tokens: &[Token]) -> Vec<Line> {
    group_lines_with_tolerance(tokens, DEFAULT_LINE_TOLERANCE)
}

/// Group tokens into lines by vertical proximity.
///
/// Tokens are taken in the order the extractor emitted them. A token joins
/// the current line while its `y` is within `tolerance` of the previous
/// token's `y`, so a line may drift slowly across a skewed scan. Blank
/// tokens carry no text and are skipped.
pub fn group_lines_with_tolerance(tokens: &[Token], tolerance: f64) -> Vec<Line> {
    let mut lines = Vec::new();
    let mut current: Vec<Token> = Vec::new();
    let mut current_y: Option<f64> = None;

    for token in tokens.iter().filter(|t| !t.is_blank()) {
        match current_y {
            Some(y) if (token.y - y).abs() > tolerance => {
                lines.push(Line::new(std::mem::take(&mut current)));
            }
            _ => {}
        }
        current.push(token.clone());
        current_y = Some(token.y);
    }

    if !current.is_empty() {
        lines.push(Line::new(current));
    }

    lines
}

/// Newline-joined text of the lines, each line space-joined.
pub fn lines_to_text(lines: &[Line]) -> String {
    lines.iter().map(Line::text).collect::<Vec<_>>().join("\n")
}
