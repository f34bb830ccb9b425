//! Structured document record produced by the pipeline.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::document::rules::patterns::{
    DDT_FILE_NAME, DDT_TEXT_MARKER, FT_FILE_NAME, FT_STRONG_MARKER, FT_WEAK_MARKER,
};
use crate::totals::TotalsSource;

/// Kind of business document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum DocumentType {
    /// Delivery note (documento di trasporto, DDT/DDV).
    #[default]
    #[serde(rename = "DDT")]
    DeliveryNote,
    /// Invoice (fattura, FT/FTV).
    #[serde(rename = "FT")]
    Invoice,
}

impl DocumentType {
    /// Short code used in ids and exports.
    pub fn code(&self) -> &'static str {
        match self {
            Self::DeliveryNote => "DDT",
            Self::Invoice => "FT",
        }
    }

    /// Parse a user supplied code (`DDT`, `DDV`, `FT`, `FTV`).
    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim().to_uppercase().as_str() {
            "DDT" | "DDV" => Some(Self::DeliveryNote),
            "FT" | "FTV" => Some(Self::Invoice),
            _ => None,
        }
    }

    /// Guess the type from the source file name.
    pub fn from_file_name(file_name: &str) -> Option<Self> {
        let name = file_name.to_uppercase();
        if DDT_FILE_NAME.is_match(&name) {
            Some(Self::DeliveryNote)
        } else if FT_FILE_NAME.is_match(&name) {
            Some(Self::Invoice)
        } else {
            None
        }
    }

    /// Detect the type from the file name first, then from the text.
    pub fn detect(file_name: Option<&str>, text: &str) -> Self {
        if let Some(kind) = file_name.and_then(Self::from_file_name) {
            return kind;
        }

        if FT_STRONG_MARKER.is_match(text) {
            Self::Invoice
        } else if DDT_TEXT_MARKER.is_match(text) {
            Self::DeliveryNote
        } else if FT_WEAK_MARKER.is_match(text) {
            Self::Invoice
        } else {
            Self::DeliveryNote
        }
    }
}

/// Output of one extraction strategy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldCandidate {
    /// Extracted value.
    pub value: String,
    /// Name of the rule or strategy that produced the value.
    pub method: String,
    /// Fixed confidence of that rule (0.0 - 1.0).
    pub confidence: f32,
}

impl FieldCandidate {
    pub fn new(value: impl Into<String>, method: impl Into<String>, confidence: f32) -> Self {
        Self {
            value: value.into(),
            method: method.into(),
            confidence,
        }
    }
}

/// Caller-supplied context for one document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DocumentMetadata {
    /// Name of the source file.
    pub file_name: Option<String>,

    /// Document number already known to the caller.
    pub document_number: Option<String>,

    /// Forced document type; detected when absent.
    pub document_type: Option<DocumentType>,

    /// Import day; today when absent.
    pub import_date: Option<NaiveDate>,
}

impl DocumentMetadata {
    pub fn with_file_name(mut self, file_name: impl Into<String>) -> Self {
        self.file_name = Some(file_name.into());
        self
    }

    pub fn with_document_number(mut self, number: impl Into<String>) -> Self {
        self.document_number = Some(number.into());
        self
    }

    pub fn with_document_type(mut self, document_type: DocumentType) -> Self {
        self.document_type = Some(document_type);
        self
    }

    pub fn with_import_date(mut self, date: NaiveDate) -> Self {
        self.import_date = Some(date);
        self
    }
}

/// A product row of the document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    /// Product code.
    pub code: String,

    /// Product description.
    pub description: String,

    /// Unit of measure (PZ, KG, ...).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,

    /// Billed quantity.
    pub quantity: Decimal,

    /// Price per unit.
    pub unit_price: Decimal,

    /// Returned or missing quantity (S.M.).
    pub returned_quantity: Decimal,

    /// Discount percentage, 100 for free goods.
    pub discount_percent: Decimal,

    /// Line amount.
    pub total: Decimal,

    /// VAT percentage printed on the row.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vat_rate: Option<Decimal>,
}

/// Final record for one source document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StructuredDocument {
    pub id: String,
    pub file_name: String,
    pub import_date: NaiveDate,
    pub document_type: DocumentType,
    pub document_number: String,
    pub date: String,
    pub delivery_date: String,
    pub client_name: String,
    pub client_code: String,
    pub vat_number: String,
    /// `None` when no strategy produced a valid address.
    pub delivery_address: Option<String>,
    pub order_reference: String,
    /// Normalized to `d/m/yyyy`.
    pub order_date: String,
    pub items: Vec<LineItem>,
    pub subtotal: Decimal,
    pub vat: Decimal,
    pub total: Decimal,
    /// How the three totals were obtained.
    pub totals_source: TotalsSource,
}

impl StructuredDocument {
    /// Report missing data and inconsistencies.
    pub fn validate(&self) -> Vec<String> {
        let mut issues = Vec::new();

        if self.document_number.is_empty() {
            issues.push("Missing document number".to_string());
        }

        if self.date.is_empty() {
            issues.push("Missing document date".to_string());
        }

        if self.client_name.is_empty() {
            issues.push("Missing client name".to_string());
        }

        if self.delivery_address.is_none() {
            issues.push("Missing delivery address".to_string());
        }

        if self.items.is_empty() {
            issues.push("No line items".to_string());
        }

        let consistent = self
            .subtotal
            .checked_add(self.vat)
            .and_then(|sum| sum.checked_sub(self.total))
            .is_some_and(|diff| diff.abs() <= Decimal::new(1, 2));
        if !consistent {
            issues.push(format!(
                "Subtotal ({}) plus VAT ({}) differs from total ({})",
                self.subtotal, self.vat, self.total
            ));
        }

        issues
    }

    /// One spreadsheet row per line item.
    ///
    /// A document without items still yields one row so that it shows up in
    /// the export.
    pub fn export_rows(&self) -> Vec<ExportRow> {
        let base = ExportRow {
            order_number: self.order_reference.clone(),
            order_date: self.order_date.clone(),
            document_type: self.document_type.code().to_string(),
            document_number: self.document_number.clone(),
            document_date: self.date.clone(),
            delivery_date: self.delivery_date.clone(),
            client_code: self.client_code.clone(),
            client_name: self.client_name.clone(),
            delivery_address: self.delivery_address.clone().unwrap_or_default(),
            vat_number: self.vat_number.clone(),
            product_code: String::new(),
            product_description: String::new(),
            quantity: None,
            unit_price: None,
            discount_percent: None,
            returned_quantity: None,
            amount: None,
        };

        if self.items.is_empty() {
            return vec![ExportRow {
                amount: Some(self.subtotal),
                ..base
            }];
        }

        self.items
            .iter()
            .map(|item| ExportRow {
                product_code: item.code.clone(),
                product_description: item.description.clone(),
                quantity: Some(item.quantity),
                unit_price: Some(item.unit_price),
                discount_percent: Some(item.discount_percent),
                returned_quantity: Some(item.returned_quantity),
                amount: Some(item.total),
                ..base.clone()
            })
            .collect()
    }
}

/// Spreadsheet column headers, in export order.
pub const EXPORT_HEADERS: [&str; 17] = [
    "Numero Ordine",
    "Data Ordine",
    "Tipo Documento",
    "Numero documento",
    "Data Documento",
    "Data Consegna",
    "Codice Cliente",
    "Descrizione Cliente",
    "Indirizzo di Consegna",
    "P.Iva",
    "Codice Prodotto",
    "Descrizione Prodotto",
    "Pezzi",
    "Prezzo Unitario",
    "Sconto (%)",
    "S.M.",
    "Importo",
];

/// One flattened export row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExportRow {
    pub order_number: String,
    pub order_date: String,
    pub document_type: String,
    pub document_number: String,
    pub document_date: String,
    pub delivery_date: String,
    pub client_code: String,
    pub client_name: String,
    pub delivery_address: String,
    pub vat_number: String,
    pub product_code: String,
    pub product_description: String,
    pub quantity: Option<Decimal>,
    pub unit_price: Option<Decimal>,
    pub discount_percent: Option<Decimal>,
    pub returned_quantity: Option<Decimal>,
    pub amount: Option<Decimal>,
}

impl ExportRow {
    /// Values in [`EXPORT_HEADERS`] order.
    pub fn to_record(&self) -> Vec<String> {
        let number = |value: &Option<Decimal>| value.map(|d| d.to_string()).unwrap_or_default();

        vec![
            self.order_number.clone(),
            self.order_date.clone(),
            self.document_type.clone(),
            self.document_number.clone(),
            self.document_date.clone(),
            self.delivery_date.clone(),
            self.client_code.clone(),
            self.client_name.clone(),
            self.delivery_address.clone(),
            self.vat_number.clone(),
            self.product_code.clone(),
            self.product_description.clone(),
            number(&self.quantity),
            number(&self.unit_price),
            number(&self.discount_percent),
            number(&self.returned_quantity),
            number(&self.amount),
        ]
    }

    /// Composite key used to upsert the row remotely.
    pub fn sync_key(&self) -> String {
        format!("{}|{}", self.order_number, self.product_code)
    }
}
