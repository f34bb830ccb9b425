//! Post-extraction corrections for known systematic defects.
//!
//! A [`CorrectionChain`] is built once from the configuration and applied to
//! every draft document in a fixed order.

mod guards;
mod names;
mod order_date;

pub use guards::{DocumentNumberGuard, VatNumberGuard};
pub use names::{collapse_duplicate_name, ClientNameMapping, DuplicateNameCollapse};
pub use order_date::{normalize_order_date, OrderDateNormalization};

use tracing::debug;

use crate::document::rules::ExtractionContext;
use crate::models::config::ExtractorConfig;
use crate::models::document::StructuredDocument;

/// A single fix applied to a draft document.
pub trait Correction: Send + Sync {
    /// Stable name, reported when the correction changes something.
    fn name(&self) -> &'static str;

    /// Apply the fix in place. Returns whether the document changed.
    fn apply(&self, document: &mut StructuredDocument, ctx: &ExtractionContext<'_>) -> bool;
}

/// Ordered list of corrections.
pub struct CorrectionChain {
    corrections: Vec<Box<dyn Correction>>,
}

impl CorrectionChain {
    /// An empty chain.
    pub fn new() -> Self {
        Self {
            corrections: Vec::new(),
        }
    }

    /// The chain used by the parser.
    ///
    /// Name fixes run before the guards so that a mapped name is never
    /// collapsed again, and the order date is completed last.
    pub fn default_chain(config: &ExtractorConfig) -> Self {
        Self::new()
            .with(DuplicateNameCollapse)
            .with(ClientNameMapping::new(&config.extraction.client_name_mapping))
            .with(DocumentNumberGuard)
            .with(VatNumberGuard)
            .with(OrderDateNormalization)
    }

    /// Append a correction.
    pub fn with(mut self, correction: impl Correction + 'static) -> Self {
        self.corrections.push(Box::new(correction));
        self
    }

    /// Correction names in application order.
    pub fn names(&self) -> Vec<&'static str> {
        self.corrections.iter().map(|c| c.name()).collect()
    }

    /// Apply every correction in order, returning the names of those that
    /// changed the document.
    pub fn apply(
        &self,
        document: &mut StructuredDocument,
        ctx: &ExtractionContext<'_>,
    ) -> Vec<&'static str> {
        let mut applied = Vec::new();
        for correction in &self.corrections {
            if correction.apply(document, ctx) {
                debug!("Correction {} applied", correction.name());
                applied.push(correction.name());
            }
        }
        applied
    }
}

impl Default for CorrectionChain {
    fn default() -> Self {
        Self::default_chain(&ExtractorConfig::default())
    }
}

impl std::fmt::Debug for CorrectionChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CorrectionChain")
            .field("corrections", &self.names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::rules::test_support::Fixture;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_default_order() {
        let chain = CorrectionChain::default();

        assert_eq!(
            chain.names(),
            vec![
                "duplicate_name_collapse",
                "client_name_mapping",
                "document_number_guard",
                "vat_number_guard",
                "order_date_normalization",
            ]
        );
    }

    #[test]
    fn test_collapse_runs_before_mapping() {
        let mut config = ExtractorConfig::default();
        config
            .extraction
            .client_name_mapping
            .insert("DONAC".to_string(), "DONAC S.R.L.".to_string());
        let chain = CorrectionChain::default_chain(&config);

        let fixture = Fixture::from_text("x");
        let mut document = StructuredDocument {
            client_name: "DONAC DONAC".into(),
            document_number: "275071".into(),
            ..Default::default()
        };

        let applied = chain.apply(&mut document, &fixture.ctx());
        assert_eq!(
            applied,
            vec!["duplicate_name_collapse", "client_name_mapping", "document_number_guard"]
        );
        assert_eq!(document.client_name, "DONAC S.R.L.");
        assert_eq!(document.document_number, "");
    }

    #[test]
    fn test_order_date_from_reference_line() {
        let fixture = Fixture::from_text("Rif. ordine 507XYZ del 15/05");
        let mut document = StructuredDocument {
            order_reference: "507XYZ".into(),
            ..Default::default()
        };

        let applied = CorrectionChain::default().apply(&mut document, &fixture.ctx());
        assert_eq!(applied, vec!["order_date_normalization"]);
        assert_eq!(document.order_date, "15/05/2025");
    }

    #[test]
    fn test_clean_document_untouched() {
        let fixture = Fixture::from_text("x");
        let mut document = StructuredDocument {
            client_name: "ROSSI SRL".into(),
            document_number: "5023".into(),
            ..Default::default()
        };
        let before = document.clone();

        assert!(CorrectionChain::default().apply(&mut document, &fixture.ctx()).is_empty());
        assert_eq!(document, before);
    }
}
