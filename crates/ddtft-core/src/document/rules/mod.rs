//! Rule-based field extractors for DDT and FT documents.
//!
//! Every field has a [`FieldCascade`]: an ordered list of rules tried in
//! declaration order. The first non-empty candidate accepted by the field's
//! predicate wins; there is no scoring across rules.

pub mod amounts;
pub mod client_name;
pub mod fields;
pub mod items;
pub mod number;
pub mod patterns;

pub use amounts::{extract_declared_totals, parse_italian_amount};
pub use client_name::client_name_cascade;
pub use fields::{
    client_code_cascade, date_cascade, delivery_date_cascade, order_reference_cascade,
    vat_number_cascade,
};
pub use items::{extract_items, parse_item_line};
pub use number::document_number_cascade;

use chrono::NaiveDate;
use regex::Regex;
use tracing::trace;

use crate::layout::LayoutAnalysis;
use crate::models::config::ExtractorConfig;
use crate::models::document::{DocumentMetadata, DocumentType, FieldCandidate};
use crate::models::token::Line;

/// Everything a rule may read about the document being parsed.
#[derive(Debug, Clone, Copy)]
pub struct ExtractionContext<'a> {
    /// Newline-joined text of the grouped lines.
    pub text: &'a str,
    pub lines: &'a [Line],
    pub layout: &'a LayoutAnalysis,
    pub config: &'a ExtractorConfig,
    pub metadata: &'a DocumentMetadata,
    pub document_type: DocumentType,
    pub import_date: NaiveDate,
}

/// Candidate producer that needs more than one regex.
pub type CustomRule = fn(&ExtractionContext<'_>) -> Vec<String>;

/// How a rule produces candidates.
#[derive(Clone, Copy)]
pub enum RuleKind {
    /// Every first capture group of the pattern over the whole text.
    Pattern(&'static Regex),
    /// Lines, positions or layout anchors.
    Custom(CustomRule),
}

/// One extraction rule with its fixed confidence.
#[derive(Clone, Copy)]
pub struct FieldRule {
    pub method: &'static str,
    pub confidence: f32,
    pub kind: RuleKind,
}

impl FieldRule {
    pub fn pattern(method: &'static str, confidence: f32, pattern: &'static Regex) -> Self {
        Self {
            method,
            confidence,
            kind: RuleKind::Pattern(pattern),
        }
    }

    pub fn custom(method: &'static str, confidence: f32, rule: CustomRule) -> Self {
        Self {
            method,
            confidence,
            kind: RuleKind::Custom(rule),
        }
    }

    /// Candidates in document order.
    pub fn candidates(&self, ctx: &ExtractionContext<'_>) -> Vec<String> {
        match self.kind {
            RuleKind::Pattern(pattern) => pattern
                .captures_iter(ctx.text)
                .filter_map(|caps| caps.get(1).map(|m| m.as_str().to_string()))
                .collect(),
            RuleKind::Custom(rule) => rule(ctx),
        }
    }
}

impl std::fmt::Debug for FieldRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FieldRule")
            .field("method", &self.method)
            .field("confidence", &self.confidence)
            .finish()
    }
}

/// Acceptance predicate applied to every trimmed candidate.
pub type AcceptFn = fn(&str, &ExtractionContext<'_>) -> bool;

/// Accepts any non-empty value.
pub fn accept_any(_value: &str, _ctx: &ExtractionContext<'_>) -> bool {
    true
}

/// Ordered rules for one field.
#[derive(Clone)]
pub struct FieldCascade {
    field: &'static str,
    rules: Vec<FieldRule>,
    accept: AcceptFn,
}

impl FieldCascade {
    pub fn new(field: &'static str, accept: AcceptFn) -> Self {
        Self {
            field,
            rules: Vec::new(),
            accept,
        }
    }

    pub fn rule(mut self, rule: FieldRule) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn field(&self) -> &'static str {
        self.field
    }

    /// Rule methods in the order they are tried.
    pub fn methods(&self) -> Vec<&'static str> {
        self.rules.iter().map(|r| r.method).collect()
    }

    pub fn extract(&self, ctx: &ExtractionContext<'_>) -> Option<FieldCandidate> {
        for rule in &self.rules {
            for candidate in rule.candidates(ctx) {
                let value = candidate.trim();
                if value.is_empty() {
                    continue;
                }
                if (self.accept)(value, ctx) {
                    trace!("{}: {} -> \"{}\"", self.field, rule.method, value);
                    return Some(FieldCandidate::new(value, rule.method, rule.confidence));
                }
                trace!("{}: {} rejected \"{}\"", self.field, rule.method, value);
            }
        }

        trace!("{}: no rule matched", self.field);
        None
    }
}

impl std::fmt::Debug for FieldCascade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FieldCascade")
            .field("field", &self.field)
            .field("rules", &self.methods())
            .finish()
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::Fixture;
    use super::*;
    use lazy_static::lazy_static;
    use pretty_assertions::assert_eq;

    lazy_static! {
        static ref CODE: Regex = Regex::new(r"CODE (\d+)").unwrap();
    }

    fn only_even(value: &str, _ctx: &ExtractionContext<'_>) -> bool {
        value.parse::<u32>().map(|n| n % 2 == 0).unwrap_or(false)
    }

    fn from_lines(ctx: &ExtractionContext<'_>) -> Vec<String> {
        ctx.lines.iter().map(|l| l.text()).filter(|t| t.starts_with('4')).collect()
    }

    #[test]
    fn test_first_accepted_candidate_wins() {
        let fixture = Fixture::from_text("CODE 1\nCODE 2\n44");
        let cascade = FieldCascade::new("code", only_even)
            .rule(FieldRule::pattern("CODE", 0.9, &CODE))
            .rule(FieldRule::custom("LINE", 0.5, from_lines));

        let candidate = cascade.extract(&fixture.ctx()).unwrap();
        assert_eq!(candidate, FieldCandidate::new("2", "CODE", 0.9));
        assert_eq!(cascade.methods(), vec!["CODE", "LINE"]);
    }

    #[test]
    fn test_falls_through_to_later_rule() {
        let fixture = Fixture::from_text("CODE 1\n44");
        let cascade = FieldCascade::new("code", only_even)
            .rule(FieldRule::pattern("CODE", 0.9, &CODE))
            .rule(FieldRule::custom("LINE", 0.5, from_lines));

        assert_eq!(cascade.extract(&fixture.ctx()).unwrap().method, "LINE");
    }

    #[test]
    fn test_no_match_is_none() {
        let fixture = Fixture::from_text("nothing here");
        let cascade = FieldCascade::new("code", accept_any).rule(FieldRule::pattern("CODE", 0.9, &CODE));
        assert_eq!(cascade.extract(&fixture.ctx()), None);
    }
}
