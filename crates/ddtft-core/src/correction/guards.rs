//! Last-line checks on values that must never leave the pipeline.

use crate::document::rules::ExtractionContext;
use crate::models::document::StructuredDocument;

use super::Correction;

/// Clears a document number found in the exclusion set.
#[derive(Debug, Clone, Default)]
pub struct DocumentNumberGuard;

impl Correction for DocumentNumberGuard {
    fn name(&self) -> &'static str {
        "document_number_guard"
    }

    fn apply(&self, document: &mut StructuredDocument, ctx: &ExtractionContext<'_>) -> bool {
        if document.document_number.is_empty() || !ctx.config.is_excluded_number(&document.document_number) {
            return false;
        }
        document.document_number.clear();
        true
    }
}

/// Clears a VAT number equal to the issuer's own.
#[derive(Debug, Clone, Default)]
pub struct VatNumberGuard;

impl Correction for VatNumberGuard {
    fn name(&self) -> &'static str {
        "vat_number_guard"
    }

    fn apply(&self, document: &mut StructuredDocument, ctx: &ExtractionContext<'_>) -> bool {
        if !ctx.config.is_issuer_vat(&document.vat_number) {
            return false;
        }
        document.vat_number.clear();
        true
    }
}
