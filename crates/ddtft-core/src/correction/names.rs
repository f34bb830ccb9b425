//! Client name repairs.

use std::collections::BTreeMap;

use lazy_static::lazy_static;
use regex::Regex;

use crate::document::rules::ExtractionContext;
use crate::models::document::StructuredDocument;

use super::Correction;

lazy_static! {
    static ref LEGAL_FORM: Regex = Regex::new(
        r"(?i)^(?:S\.R\.L\.?|SRL|S\.P\.A\.?|SPA|S\.N\.C\.?|SNC|S\.A\.S\.?|SAS|S\.S\.?|SS)$"
    ).unwrap();
}

/// One collapse pass: character halves, word halves, then repeated words.
fn collapse_step(name: &str) -> String {
    let name = name.trim();

    let chars: Vec<char> = name.chars().collect();
    if chars.len() >= 2 {
        let mid = chars.len() / 2;
        let first: String = chars[..mid].iter().collect();
        let second: String = chars[mid..].iter().collect();
        if !first.trim().is_empty() && first.trim() == second.trim() {
            return first.trim().to_string();
        }
    }

    let words: Vec<&str> = name.split_whitespace().collect();
    if words.len() >= 4 && words.len() % 2 == 0 {
        let (first, second) = words.split_at(words.len() / 2);
        if first == second {
            return first.join(" ");
        }
    }

    let mut kept: Vec<&str> = Vec::with_capacity(words.len());
    for word in words {
        if kept.last() == Some(&word) && !LEGAL_FORM.is_match(word) {
            continue;
        }
        kept.push(word);
    }
    kept.join(" ")
}

/// Collapse duplicated name fragments.
///
/// `DONAC S.R.L. DONAC S.R.L.` becomes `DONAC S.R.L.`. Passes repeat until
/// nothing changes, so the result is a fixpoint.
pub fn collapse_duplicate_name(name: &str) -> String {
    let mut current = name.trim().to_string();
    loop {
        let next = collapse_step(&current);
        if next == current {
            return current;
        }
        current = next;
    }
}

/// Removes duplicated client name fragments.
#[derive(Debug, Clone, Default)]
pub struct DuplicateNameCollapse;

impl Correction for DuplicateNameCollapse {
    fn name(&self) -> &'static str {
        "duplicate_name_collapse"
    }

    fn apply(&self, document: &mut StructuredDocument, _ctx: &ExtractionContext<'_>) -> bool {
        let collapsed = collapse_duplicate_name(&document.client_name);
        if collapsed == document.client_name {
            return false;
        }
        document.client_name = collapsed;
        true
    }
}

/// Replaces extracted client names with their canonical spelling.
#[derive(Debug, Clone, Default)]
pub struct ClientNameMapping {
    mapping: BTreeMap<String, String>,
}

impl ClientNameMapping {
    pub fn new(mapping: &BTreeMap<String, String>) -> Self {
        Self {
            mapping: mapping
                .iter()
                .map(|(from, to)| (from.trim().to_uppercase(), to.clone()))
                .collect(),
        }
    }
}

impl Correction for ClientNameMapping {
    fn name(&self) -> &'static str {
        "client_name_mapping"
    }

    fn apply(&self, document: &mut StructuredDocument, _ctx: &ExtractionContext<'_>) -> bool {
        let key = document.client_name.trim().to_uppercase();
        match self.mapping.get(&key) {
            Some(canonical) if *canonical != document.client_name => {
                document.client_name = canonical.clone();
                true
            }
            _ => false,
        }
    }
}
