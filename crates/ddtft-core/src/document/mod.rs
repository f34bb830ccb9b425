//! Document field extraction module.

mod parser;
pub mod rules;

pub use parser::{DdtFtParser, ExtractionResult};

use crate::error::ExtractionError;
use crate::models::document::DocumentMetadata;
use crate::models::token::Token;

/// Result type for extraction operations.
pub type Result<T> = std::result::Result<T, ExtractionError>;

/// Trait for document parsers.
pub trait DocumentParser {
    /// Parse one document from its positioned tokens.
    ///
    /// Only a broken input contract is an error. Missing or rejected fields
    /// are reported as warnings on the result.
    fn parse(&self, tokens: &[Token], metadata: &DocumentMetadata) -> Result<ExtractionResult>;
}
