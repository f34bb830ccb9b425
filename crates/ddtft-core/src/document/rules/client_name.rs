//! Client name cascade.

use crate::layout::columns::split_at;

use super::patterns::{
    LABELED_LEFT_SKIP, LABELED_SECTION_END, LEGAL_FORM_SUFFIX, LUOGO_PREFIX, NAME_LABEL,
    NAME_STOP_LINE, SPETT_MARKER,
};
use super::{ExtractionContext, FieldCascade, FieldRule};

/// Lines a name may span.
const MAX_NAME_LINES: usize = 4;

const TRAILING_CONJUNCTIONS: [&str; 6] = ["E", "DI", "DEI", "DEL", "DELLA", "FRUTTA"];

fn ends_with_conjunction(text: &str) -> bool {
    let text = text.trim_end();
    if text.ends_with('&') || text.ends_with('-') {
        return true;
    }
    text.split_whitespace()
        .last()
        .map(|w| TRAILING_CONJUNCTIONS.contains(&w.to_uppercase().as_str()))
        .unwrap_or(false)
}

/// Whether a name spanning `current` continues on the next line.
fn continues(current: &str) -> bool {
    ends_with_conjunction(current) || !LEGAL_FORM_SUFFIX.is_match(current.trim_end())
}

/// Join name fragments until a stop line or a closed legal form.
fn accumulate(first: Option<String>, following: impl Iterator<Item = String>) -> Option<String> {
    let mut parts: Vec<String> = first.into_iter().filter(|s| !s.is_empty()).collect();

    for next in following {
        if parts.len() >= MAX_NAME_LINES {
            break;
        }

        let next = LUOGO_PREFIX.replace(next.trim(), "").trim().to_string();
        if next.is_empty() {
            continue;
        }
        if NAME_STOP_LINE.is_match(&next) {
            break;
        }
        if !parts.is_empty() && !continues(&parts.join(" ")) {
            break;
        }
        parts.push(next);
    }

    (!parts.is_empty()).then(|| parts.join(" "))
}

fn compact_record_name(ctx: &ExtractionContext<'_>) -> Vec<String> {
    ctx.layout
        .compact
        .iter()
        .filter_map(|r| r.client_name.clone())
        .collect()
}

/// Left column under the "Cliente / Luogo di consegna" header.
fn labeled_column_name(ctx: &ExtractionContext<'_>) -> Vec<String> {
    let Some(header) = ctx.layout.labeled.as_ref() else {
        return Vec::new();
    };

    let layout = &ctx.config.layout;
    let left_of = |line: &crate::models::token::Line| match header.boundary_x {
        Some(x) => split_at(line, x, layout.column_margin).left,
        None => split_at(line, layout.fallback_split_x, 0.0).left,
    };

    let following = ctx
        .lines
        .iter()
        .skip(header.line_index + 1)
        .take(MAX_NAME_LINES + 2)
        .take_while(|line| !LABELED_SECTION_END.is_match(&line.text()))
        .map(left_of)
        .filter(|left| !LABELED_LEFT_SKIP.is_match(left));

    accumulate(None, following).into_iter().collect()
}

/// Name after a "Spett.le" or "Addressed to" marker.
fn spett_name(ctx: &ExtractionContext<'_>) -> Vec<String> {
    let Some((index, rest)) = ctx.lines.iter().enumerate().find_map(|(i, line)| {
        let text = line.text();
        SPETT_MARKER
            .find(&text)
            .map(|m| (i, text[m.end()..].trim().to_string()))
    }) else {
        return Vec::new();
    };

    let following = ctx.lines.iter().skip(index + 1).map(|line| line.text());
    accumulate(Some(rest), following).into_iter().collect()
}

fn is_plausible_name(value: &str, _ctx: &ExtractionContext<'_>) -> bool {
    value.chars().count() >= 2
        && value.chars().any(char::is_alphabetic)
        && !NAME_STOP_LINE.is_match(value)
}

pub fn client_name_cascade() -> FieldCascade {
    FieldCascade::new("client_name", is_plausible_name)
        .rule(FieldRule::custom("COMPACT_RECORD", 0.95, compact_record_name))
        .rule(FieldRule::custom("LABELED_COLUMN", 0.9, labeled_column_name))
        .rule(FieldRule::custom("SPETT_MARKER", 0.85, spett_name))
        .rule(FieldRule::pattern("NAME_LABEL", 0.7, &NAME_LABEL))
}
