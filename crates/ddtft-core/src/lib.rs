//! Core library for Italian delivery note (DDT) and invoice (FT) extraction.
//!
//! This crate provides:
//! - Line grouping of positioned text tokens
//! - Layout classification (compact record row vs. labeled two-column header)
//! - Ordered field-extraction cascades per document type
//! - A multi-strategy delivery-address resolver with confidence scores
//! - A correction chain for known systematic defects
//! - Totals reconciliation with decimal arithmetic

pub mod error;
pub mod models;
pub mod layout;
pub mod document;
pub mod address;
pub mod correction;
pub mod totals;

pub use error::{DdtftError, ExtractionError, Result};
pub use models::config::{AddressOverride, ExtractorConfig};
pub use models::document::{
    DocumentMetadata, DocumentType, ExportRow, FieldCandidate, LineItem, StructuredDocument,
    EXPORT_HEADERS,
};
pub use models::token::{Line, Token};
pub use layout::{group_lines, group_lines_with_tolerance, LayoutAnalysis, LayoutClassifier, LayoutKind};
pub use address::{AddressInput, AddressMethod, AddressResolver};
pub use correction::{Correction, CorrectionChain};
pub use totals::{reconcile, Totals, TotalsSource};
pub use document::{DdtFtParser, DocumentParser, ExtractionResult};
