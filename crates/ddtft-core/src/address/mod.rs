//! Delivery-address resolution.
//!
//! Strategies run in a fixed priority order. The first candidate that
//! passes [`AddressValidator`] wins; when every strategy fails the address
//! stays empty rather than guessed.

pub mod parts;
mod strategies;
mod validator;

pub use strategies::{
    CompactFormatStrategy, DoubleColumnStrategy, HeaderColumnsStrategy, MarkersStrategy,
    OverrideStrategy,
};
pub use validator::{AddressRejection, AddressValidator};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::layout::LayoutAnalysis;
use crate::models::config::ExtractorConfig;
use crate::models::document::FieldCandidate;
use crate::models::token::Line;

/// Strategy that produced an address, with its fixed confidence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AddressMethod {
    CompactFormat,
    HeaderColumns,
    DoubleColumn,
    Markers,
    Override,
}

impl AddressMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            AddressMethod::CompactFormat => "COMPACT_FORMAT",
            AddressMethod::HeaderColumns => "HEADER_COLUMNS",
            AddressMethod::DoubleColumn => "DOUBLE_COLUMN",
            AddressMethod::Markers => "MARKERS",
            AddressMethod::Override => "OVERRIDE",
        }
    }

    pub fn confidence(&self) -> f32 {
        match self {
            AddressMethod::CompactFormat => 0.95,
            AddressMethod::HeaderColumns => 0.90,
            AddressMethod::DoubleColumn => 0.85,
            AddressMethod::Markers => 0.80,
            AddressMethod::Override => 0.99,
        }
    }
}

impl std::fmt::Display for AddressMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a strategy may look at.
#[derive(Debug, Clone, Copy)]
pub struct AddressInput<'a> {
    pub lines: &'a [Line],
    pub text: &'a str,
    pub layout: &'a LayoutAnalysis,
    pub client_name: Option<&'a str>,
}

/// One way of reading a delivery address off a document.
pub trait AddressStrategy: Send + Sync {
    fn method(&self) -> AddressMethod;

    /// Raw candidate, before validation.
    fn extract(&self, input: &AddressInput<'_>) -> Option<String>;
}

/// Ordered strategy chain plus validator.
pub struct AddressResolver {
    strategies: Vec<Box<dyn AddressStrategy>>,
    validator: AddressValidator,
}

impl AddressResolver {
    /// Build the chain for `config`.
    ///
    /// The override table goes first, and only when enabled.
    pub fn new(config: &ExtractorConfig) -> Self {
        let mut strategies: Vec<Box<dyn AddressStrategy>> = Vec::new();

        if config.extraction.enable_address_overrides && !config.extraction.address_overrides.is_empty() {
            strategies.push(Box::new(OverrideStrategy::new(
                config.extraction.address_overrides.clone(),
            )));
        }

        strategies.push(Box::new(CompactFormatStrategy::new(config.layout.clone())));
        strategies.push(Box::new(HeaderColumnsStrategy::new(config.layout.clone())));
        strategies.push(Box::new(DoubleColumnStrategy));
        strategies.push(Box::new(MarkersStrategy));

        Self {
            strategies,
            validator: AddressValidator::new(config),
        }
    }

    /// Methods in the order they are tried.
    pub fn methods(&self) -> Vec<AddressMethod> {
        self.strategies.iter().map(|s| s.method()).collect()
    }

    pub fn resolve(&self, input: &AddressInput<'_>) -> Option<FieldCandidate> {
        for strategy in &self.strategies {
            let method = strategy.method();
            let Some(address) = strategy.extract(input) else {
                debug!("{}: no candidate", method);
                continue;
            };

            match self.validator.validate(&address) {
                Ok(()) => {
                    debug!("{}: accepted \"{}\"", method, address);
                    return Some(FieldCandidate::new(address, method.as_str(), method.confidence()));
                }
                Err(rejection) => {
                    debug!("{}: rejected \"{}\": {}", method, address, rejection);
                }
            }
        }

        debug!("No delivery address found");
        None
    }
}

impl std::fmt::Debug for AddressResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AddressResolver")
            .field("strategies", &self.methods())
            .field("validator", &self.validator)
            .finish()
    }
}
