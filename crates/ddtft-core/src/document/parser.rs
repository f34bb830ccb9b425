//! Delivery note and invoice parser over positioned tokens.

use std::collections::BTreeMap;
use std::time::Instant;

use chrono::{Local, Utc};
use serde::Serialize;
use tracing::{debug, info};

use crate::address::{AddressInput, AddressResolver};
use crate::correction::CorrectionChain;
use crate::error::ExtractionError;
use crate::layout::{group_lines_with_tolerance, lines_to_text, LayoutClassifier, LayoutKind};
use crate::models::config::ExtractorConfig;
use crate::models::document::{DocumentMetadata, DocumentType, FieldCandidate, StructuredDocument};
use crate::models::token::Token;
use crate::totals::reconcile;

use super::rules::{
    client_code_cascade, client_name_cascade, date_cascade, delivery_date_cascade,
    document_number_cascade, extract_declared_totals, extract_items, order_reference_cascade,
    vat_number_cascade, ExtractionContext, FieldCascade,
};
use super::{DocumentParser, Result};

/// Result of document extraction.
#[derive(Debug, Clone, Serialize)]
pub struct ExtractionResult {
    /// Extracted document.
    pub document: StructuredDocument,
    /// Winning candidate per field, keyed by field name.
    pub fields: BTreeMap<String, FieldCandidate>,
    /// Layout family the document was classified as.
    pub layout: LayoutKind,
    /// Corrections that changed the draft, in application order.
    pub corrections: Vec<&'static str>,
    /// Extraction warnings.
    pub warnings: Vec<String>,
    /// Processing time in milliseconds.
    pub processing_time_ms: u64,
}

/// Field cascades for one document type.
#[derive(Debug, Clone)]
struct FieldCascades {
    document_number: FieldCascade,
    date: FieldCascade,
    delivery_date: FieldCascade,
    client_code: FieldCascade,
    client_name: FieldCascade,
    vat_number: FieldCascade,
    order_reference: FieldCascade,
}

impl FieldCascades {
    fn for_type(document_type: DocumentType) -> Self {
        Self {
            document_number: document_number_cascade(document_type),
            date: date_cascade(document_type),
            delivery_date: delivery_date_cascade(),
            client_code: client_code_cascade(),
            client_name: client_name_cascade(),
            vat_number: vat_number_cascade(),
            order_reference: order_reference_cascade(),
        }
    }
}

/// Parser for DDT and FT documents.
///
/// Every cascade, the address strategy chain and the correction chain are
/// built once here and shared read-only by all calls to `parse`, so one
/// parser can serve many documents concurrently.
#[derive(Debug)]
pub struct DdtFtParser {
    config: ExtractorConfig,
    classifier: LayoutClassifier,
    delivery_note: FieldCascades,
    invoice: FieldCascades,
    resolver: AddressResolver,
    corrections: CorrectionChain,
}

impl DdtFtParser {
    pub fn new(config: ExtractorConfig) -> Self {
        Self {
            classifier: LayoutClassifier::new(config.layout.clone()),
            delivery_note: FieldCascades::for_type(DocumentType::DeliveryNote),
            invoice: FieldCascades::for_type(DocumentType::Invoice),
            resolver: AddressResolver::new(&config),
            corrections: CorrectionChain::default_chain(&config),
            config,
        }
    }

    pub fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    pub fn resolver(&self) -> &AddressResolver {
        &self.resolver
    }

    pub fn corrections(&self) -> &CorrectionChain {
        &self.corrections
    }

    fn cascades(&self, document_type: DocumentType) -> &FieldCascades {
        match document_type {
            DocumentType::DeliveryNote => &self.delivery_note,
            DocumentType::Invoice => &self.invoice,
        }
    }

    fn check_tokens(tokens: &[Token]) -> Result<()> {
        match tokens.iter().position(|t| !t.has_finite_position()) {
            Some(index) => Err(ExtractionError::InvalidInput(format!(
                "token {} ({:?}) has a non-finite position",
                index, tokens[index].text
            ))),
            None => Ok(()),
        }
    }
}

impl Default for DdtFtParser {
    fn default() -> Self {
        Self::new(ExtractorConfig::default())
    }
}

/// Run a cascade, record its winner and return the value (empty when none).
fn run(
    cascade: &FieldCascade,
    ctx: &ExtractionContext<'_>,
    fields: &mut BTreeMap<String, FieldCandidate>,
) -> String {
    match cascade.extract(ctx) {
        Some(candidate) => {
            let value = candidate.value.clone();
            fields.insert(cascade.field().to_string(), candidate);
            value
        }
        None => String::new(),
    }
}

/// Make the recorded candidates agree with the corrected document.
///
/// A value cleared by a guard drops its candidate.
fn sync_corrected_fields(document: &StructuredDocument, fields: &mut BTreeMap<String, FieldCandidate>) {
    for (field, value) in [
        ("document_number", &document.document_number),
        ("client_name", &document.client_name),
        ("vat_number", &document.vat_number),
    ] {
        if value.is_empty() {
            fields.remove(field);
        } else if let Some(candidate) = fields.get_mut(field) {
            candidate.value.clone_from(value);
        }
    }
}

impl DocumentParser for DdtFtParser {
    fn parse(&self, tokens: &[Token], metadata: &DocumentMetadata) -> Result<ExtractionResult> {
        let start = Instant::now();
        Self::check_tokens(tokens)?;

        let lines = group_lines_with_tolerance(tokens, self.config.layout.line_tolerance);
        let text = lines_to_text(&lines);

        info!(
            "Parsing {} from {} tokens in {} lines",
            metadata.file_name.as_deref().unwrap_or("document"),
            tokens.len(),
            lines.len()
        );

        let layout = self.classifier.classify(&lines);
        let document_type = metadata
            .document_type
            .unwrap_or_else(|| DocumentType::detect(metadata.file_name.as_deref(), &text));
        let import_date = metadata
            .import_date
            .unwrap_or_else(|| Local::now().date_naive());

        debug!("Document type {:?}, layout {:?}", document_type, layout.kind);

        let ctx = ExtractionContext {
            text: &text,
            lines: &lines,
            layout: &layout,
            config: &self.config,
            metadata,
            document_type,
            import_date,
        };

        let cascades = self.cascades(document_type);
        let mut fields = BTreeMap::new();

        let document_number = run(&cascades.document_number, &ctx, &mut fields);
        let date = run(&cascades.date, &ctx, &mut fields);
        let delivery_date = run(&cascades.delivery_date, &ctx, &mut fields);
        let client_code = run(&cascades.client_code, &ctx, &mut fields);
        let client_name = run(&cascades.client_name, &ctx, &mut fields);
        let vat_number = run(&cascades.vat_number, &ctx, &mut fields);
        let order_reference = run(&cascades.order_reference, &ctx, &mut fields);

        let address = self.resolver.resolve(&AddressInput {
            lines: &lines,
            text: &text,
            layout: &layout,
            client_name: Some(client_name.as_str()).filter(|name| !name.is_empty()),
        });
        let delivery_address = address.as_ref().map(|candidate| candidate.value.clone());
        if let Some(candidate) = address {
            fields.insert("delivery_address".to_string(), candidate);
        }

        let mut document = StructuredDocument {
            file_name: metadata.file_name.clone().unwrap_or_default(),
            import_date,
            document_type,
            document_number,
            date,
            delivery_date,
            client_name,
            client_code,
            vat_number,
            delivery_address,
            order_reference,
            ..Default::default()
        };

        let corrections = self.corrections.apply(&mut document, &ctx);
        sync_corrected_fields(&document, &mut fields);

        document.items = extract_items(&lines);
        let totals = reconcile(
            &document.items,
            &extract_declared_totals(&text),
            self.config.extraction.default_vat_rate,
        );
        document.subtotal = totals.subtotal;
        document.vat = totals.vat;
        document.total = totals.total;
        document.totals_source = totals.source;

        document.id = format!(
            "{}_{}_{}",
            document_type.code(),
            document.document_number,
            Utc::now().timestamp_millis()
        );

        let warnings = document.validate();
        let processing_time_ms = start.elapsed().as_millis() as u64;

        info!(
            "Extracted {} {} ({} items, {} warnings) in {} ms",
            document_type.code(),
            document.document_number,
            document.items.len(),
            warnings.len(),
            processing_time_ms
        );

        Ok(ExtractionResult {
            document,
            fields,
            layout: layout.kind,
            corrections,
            warnings,
            processing_time_ms,
        })
    }
}
