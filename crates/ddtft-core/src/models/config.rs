//! Configuration structures for the extraction pipeline.
//!
//! Everything issuer-specific lives here as data so the pipeline itself stays
//! portable across issuers.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use crate::error::{DdtftError, Result};

/// Main configuration for the ddtft pipeline.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractorConfig {
    /// Data about the issuing company.
    pub issuer: IssuerConfig,

    /// Geometry used by line grouping and column splitting.
    pub layout: LayoutConfig,

    /// Field extraction and validation settings.
    pub extraction: ExtractionConfig,
}

/// The issuing company, excluded wherever a client value is expected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IssuerConfig {
    /// Issuer VAT registration number (P.IVA).
    pub vat_number: String,

    /// Fragments of the issuer's registered address.
    pub address_keywords: Vec<String>,
}

impl Default for IssuerConfig {
    fn default() -> Self {
        Self {
            vat_number: "03247720042".to_string(),
            address_keywords: vec![
                "MAGLIANO ALFIERI".to_string(),
                "G. MARCONI".to_string(),
                "C.SO G. MARCONI".to_string(),
            ],
        }
    }
}

/// Layout geometry, in page units.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Maximum vertical distance between tokens of the same line.
    pub line_tolerance: f64,

    /// Number of leading lines searched for the labeled header.
    pub header_scan_lines: usize,

    /// Tokens left of `boundary - column_margin` belong to the left column.
    pub column_margin: f64,

    /// Smallest horizontal gap that separates two columns.
    pub min_column_gap: f64,

    /// Allowed distance between a value and its header column.
    pub header_x_tolerance: f64,

    /// Left column split used when no header boundary is known.
    pub fallback_split_x: f64,

    /// Tokens right of this position belong to the compact delivery column.
    pub delivery_column_x: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            line_tolerance: 5.0,
            header_scan_lines: 15,
            column_margin: 20.0,
            min_column_gap: 100.0,
            header_x_tolerance: 50.0,
            fallback_split_x: 250.0,
            delivery_column_x: 280.0,
        }
    }
}

/// Delivery address known in advance for a client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddressOverride {
    /// Matched as a case-insensitive substring of the client name.
    pub client_contains: String,

    /// Address used for matching clients.
    pub address: String,
}

/// Field extraction configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Numbers printed in headers and footers that are never a document number.
    pub excluded_document_numbers: Vec<String>,

    /// Carrier and transporter names rejected as delivery addresses.
    pub carrier_keywords: Vec<String>,

    /// Require a leading street type and a postal code in addresses.
    pub strict_address_validation: bool,

    /// Shortest acceptable delivery address.
    pub min_address_length: usize,

    /// VAT rate applied when a document does not state its VAT.
    pub default_vat_rate: Decimal,

    /// Use `address_overrides` before reading the address from the document.
    pub enable_address_overrides: bool,

    /// Client to address table, consulted only when enabled.
    pub address_overrides: Vec<AddressOverride>,

    /// Extracted client name (upper case) to canonical name.
    pub client_name_mapping: BTreeMap<String, String>,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            excluded_document_numbers: ["275071", "100000", "03247720042", "10018", "15124", "12050"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            carrier_keywords: [
                "SAFIM", "S.A.F.I.M", "SUPEJA", "GALLINO", "NONE TO", "AUTOTRASPORTI",
                "TRASPORTI", "SPEDIZIONI", "CORRIERE", "BARTOLINI", "BRT", "GLS", "SDA", "TNT",
                "DHL", "UPS", "FEDEX",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            strict_address_validation: true,
            min_address_length: 10,
            default_vat_rate: Decimal::new(22, 2),
            enable_address_overrides: false,
            address_overrides: Vec::new(),
            client_name_mapping: BTreeMap::new(),
        }
    }
}

impl ExtractorConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        config.check()?;
        Ok(config)
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Reject values the pipeline cannot work with.
    pub fn check(&self) -> Result<()> {
        let layout = &self.layout;
        if !layout.line_tolerance.is_finite() || layout.line_tolerance < 0.0 {
            return Err(DdtftError::Config(format!(
                "layout.line_tolerance must be a non-negative number, got {}",
                layout.line_tolerance
            )));
        }
        if self.extraction.default_vat_rate.is_sign_negative() {
            return Err(DdtftError::Config(format!(
                "extraction.default_vat_rate must not be negative, got {}",
                self.extraction.default_vat_rate
            )));
        }
        for entry in &self.extraction.address_overrides {
            if entry.client_contains.trim().is_empty() {
                return Err(DdtftError::Config(
                    "extraction.address_overrides entries need a client_contains value".to_string(),
                ));
            }
        }
        Ok(())
    }

    /// Whether `value` is a known non-document number.
    pub fn is_excluded_number(&self, value: &str) -> bool {
        let value = value.trim();
        self.extraction
            .excluded_document_numbers
            .iter()
            .any(|excluded| excluded == value)
    }

    /// Whether `value` is the issuer's own VAT number.
    pub fn is_issuer_vat(&self, value: &str) -> bool {
        let digits: String = value.chars().filter(|c| c.is_ascii_digit()).collect();
        !digits.is_empty() && digits == self.issuer.vat_number
    }
}
