//! Acceptance checks applied to every address candidate.

use regex::Regex;
use thiserror::Error;

use crate::models::config::ExtractorConfig;

use super::parts::{POSTAL_CODE, STREET_LINE, STREET_TOKEN};

/// Why an address candidate was rejected.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AddressRejection {
    #[error("too short ({length} < {min} characters)")]
    TooShort { length: usize, min: usize },

    #[error("contains carrier name {0}")]
    Carrier(String),

    #[error("matches issuer address ({0})")]
    IssuerAddress(String),

    #[error("no street-type token")]
    MissingStreet,

    #[error("does not start with a street-type token")]
    StreetNotLeading,

    #[error("no 5-digit postal code")]
    MissingPostalCode,
}

/// Case-insensitive keyword matched on word boundaries.
#[derive(Debug, Clone)]
struct Keyword {
    label: String,
    pattern: Regex,
}

impl Keyword {
    fn new(label: &str) -> Option<Self> {
        let pattern = format!(
            r"(?i)(?:^|[^\p{{L}}\p{{N}}]){}(?:[^\p{{L}}\p{{N}}]|$)",
            regex::escape(label.trim())
        );
        Regex::new(&pattern).ok().map(|pattern| Self {
            label: label.trim().to_string(),
            pattern,
        })
    }

    fn keywords(labels: &[String]) -> Vec<Self> {
        labels
            .iter()
            .filter(|l| !l.trim().is_empty())
            .filter_map(|l| Self::new(l))
            .collect()
    }
}

/// Rejects carrier addresses, the issuer's own address and fragments.
#[derive(Debug, Clone)]
pub struct AddressValidator {
    min_length: usize,
    strict: bool,
    carriers: Vec<Keyword>,
    issuer: Vec<Keyword>,
}

impl AddressValidator {
    pub fn new(config: &ExtractorConfig) -> Self {
        Self {
            min_length: config.extraction.min_address_length,
            strict: config.extraction.strict_address_validation,
            carriers: Keyword::keywords(&config.extraction.carrier_keywords),
            issuer: Keyword::keywords(&config.issuer.address_keywords),
        }
    }

    pub fn validate(&self, address: &str) -> Result<(), AddressRejection> {
        let address = address.trim();

        let length = address.chars().count();
        if length < self.min_length {
            return Err(AddressRejection::TooShort {
                length,
                min: self.min_length,
            });
        }

        if let Some(carrier) = self.carriers.iter().find(|k| k.pattern.is_match(address)) {
            return Err(AddressRejection::Carrier(carrier.label.clone()));
        }

        if let Some(issuer) = self.issuer.iter().find(|k| k.pattern.is_match(address)) {
            return Err(AddressRejection::IssuerAddress(issuer.label.clone()));
        }

        if !STREET_TOKEN.is_match(address) {
            return Err(AddressRejection::MissingStreet);
        }

        if self.strict {
            if !STREET_LINE.is_match(address) {
                return Err(AddressRejection::StreetNotLeading);
            }
            if !POSTAL_CODE.is_match(address) {
                return Err(AddressRejection::MissingPostalCode);
            }
        }

        Ok(())
    }
}
