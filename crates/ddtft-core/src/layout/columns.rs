//! Splitting a physical line into its logical columns.

use lazy_static::lazy_static;
use regex::Regex;

use crate::models::token::Line;

lazy_static! {
    static ref MULTI_SPACE: Regex = Regex::new(r"\s{2,}").unwrap();
}

/// Left and right halves of a two-column line.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnSplit {
    pub left: String,
    pub right: String,
}

/// Split tokens at a fixed horizontal boundary.
///
/// Tokens starting before `boundary - margin` go to the left column.
pub fn split_at(line: &Line, boundary: f64, margin: f64) -> ColumnSplit {
    let limit = boundary - margin;
    ColumnSplit {
        left: line.text_where(|t| t.x < limit),
        right: line.text_where(|t| t.x >= limit),
    }
}

/// Split a line at the widest horizontal gap between consecutive tokens.
///
/// When the widest gap is not larger than `min_gap`, or the line has a
/// single token, fall back to [`split_by_spaces`] on the line text.
pub fn split_by_gap(line: &Line, min_gap: f64) -> Option<ColumnSplit> {
    let words: Vec<_> = line.words().collect();
    if words.len() < 2 {
        return split_by_spaces(&line.text());
    }

    let (gap_index, gap) = words
        .windows(2)
        .enumerate()
        .map(|(i, pair)| (i, pair[1].x - pair[0].x))
        .fold((0, f64::MIN), |best, cur| if cur.1 > best.1 { cur } else { best });

    if gap > min_gap {
        let join = |slice: &[&crate::models::token::Token]| {
            slice.iter().map(|t| t.text.trim()).collect::<Vec<_>>().join(" ")
        };
        return Some(ColumnSplit {
            left: join(&words[..=gap_index]),
            right: join(&words[gap_index + 1..]),
        });
    }

    split_by_spaces(&line.text())
}

/// Split flattened text on runs of two or more spaces.
///
/// The left column is the first run and the right column the last one.
pub fn split_by_spaces(text: &str) -> Option<ColumnSplit> {
    let parts: Vec<&str> = MULTI_SPACE.split(text).collect();
    if parts.len() < 2 {
        return None;
    }

    Some(ColumnSplit {
        left: parts[0].trim().to_string(),
        right: parts[parts.len() - 1].trim().to_string(),
    })
}

/// First token below a header row aligned with column `x`.
///
/// Looks at up to four lines after `header_index`.
pub fn value_below_header(
    lines: &[Line],
    header_index: usize,
    x: f64,
    tolerance: f64,
    accept: impl Fn(&str) -> bool,
) -> Option<String> {
    lines
        .iter()
        .skip(header_index + 1)
        .take(4)
        .flat_map(|line| line.words())
        .filter(|t| (t.x - x).abs() < tolerance)
        .map(|t| t.text.trim())
        .find(|text| accept(text))
        .map(str::to_string)
}
