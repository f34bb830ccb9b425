//! Subcommands and the helpers they share.

pub mod batch;
pub mod config;
pub mod process;

use std::fs;
use std::path::Path;

use serde::Deserialize;

use ddtft_core::models::document::EXPORT_HEADERS;
use ddtft_core::{StructuredDocument, Token};

/// Token dump as written by the text extractor.
///
/// Either a bare token array or an object carrying the source file name.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum TokenDumpFile {
    Tokens(Vec<Token>),
    Document {
        #[serde(default)]
        file_name: Option<String>,
        tokens: Vec<Token>,
    },
}

/// Tokens of one document with the name of the file they came from.
#[derive(Debug)]
pub struct TokenDump {
    pub file_name: Option<String>,
    pub tokens: Vec<Token>,
}

impl TokenDump {
    pub fn read(path: &Path) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path)?;
        let dump: TokenDumpFile = serde_json::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Invalid token dump {}: {}", path.display(), e))?;

        Ok(match dump {
            TokenDumpFile::Tokens(tokens) => Self {
                file_name: None,
                tokens,
            },
            TokenDumpFile::Document { file_name, tokens } => Self { file_name, tokens },
        })
    }
}

/// Output formats shared by `process` and `batch`.
#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output
    Json,
    /// CSV export rows
    Csv,
    /// Plain text summary
    Text,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Csv => "csv",
            Self::Text => "txt",
        }
    }
}

pub fn format_document(document: &StructuredDocument, format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(document)?),
        OutputFormat::Csv => format_csv(std::slice::from_ref(document)),
        OutputFormat::Text => Ok(format_text(document)),
    }
}

/// Export rows of every document under one header.
pub fn format_csv(documents: &[StructuredDocument]) -> anyhow::Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    wtr.write_record(EXPORT_HEADERS)?;
    for row in documents.iter().flat_map(StructuredDocument::export_rows) {
        wtr.write_record(row.to_record())?;
    }

    let data = String::from_utf8(wtr.into_inner()?)?;
    Ok(data)
}

pub fn format_text(document: &StructuredDocument) -> String {
    let mut output = String::new();

    output.push_str(&format!(
        "{} {} del {}\n",
        document.document_type.code(),
        document.document_number,
        document.date
    ));
    if !document.delivery_date.is_empty() {
        output.push_str(&format!("Consegna: {}\n", document.delivery_date));
    }
    output.push('\n');

    output.push_str("Cliente:\n");
    output.push_str(&format!("  {}", document.client_name));
    if !document.client_code.is_empty() {
        output.push_str(&format!(" ({})", document.client_code));
    }
    output.push('\n');
    if !document.vat_number.is_empty() {
        output.push_str(&format!("  P.IVA: {}\n", document.vat_number));
    }
    output.push_str(&format!(
        "  Consegna: {}\n",
        document.delivery_address.as_deref().unwrap_or("-")
    ));

    if !document.order_reference.is_empty() {
        output.push_str(&format!(
            "\nOrdine: {} {}\n",
            document.order_reference, document.order_date
        ));
    }

    output.push_str(&format!("\nRighe: {}\n", document.items.len()));
    for item in &document.items {
        output.push_str(&format!(
            "  {} {} x{} {}\n",
            item.code, item.description, item.quantity, item.total
        ));
    }

    output.push_str("\nTotali:\n");
    output.push_str(&format!("  Imponibile: {}\n", document.subtotal));
    output.push_str(&format!("  IVA:        {}\n", document.vat));
    output.push_str(&format!("  Totale:     {}\n", document.total));

    output
}
