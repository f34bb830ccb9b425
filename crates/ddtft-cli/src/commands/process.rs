//! Process command - extract data from a single token dump.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use chrono::NaiveDate;
use clap::Args;
use console::style;
use tracing::{debug, info};

use ddtft_core::{DdtFtParser, DocumentMetadata, DocumentParser, DocumentType, ExtractionResult};

use super::config::load_config;
use super::{format_document, OutputFormat, TokenDump};

/// Arguments for the process command.
#[derive(Args)]
pub struct ProcessArgs {
    /// Token dump (JSON)
    #[arg(required = true)]
    input: PathBuf,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Force the document type (DDT, DDV, FT, FTV)
    #[arg(long, value_parser = parse_doc_type)]
    doc_type: Option<DocumentType>,

    /// Name of the source file, used for type and number detection
    #[arg(long)]
    file_name: Option<String>,

    /// Import date (YYYY-MM-DD), defaults to today
    #[arg(long)]
    import_date: Option<NaiveDate>,

    /// Show the method and confidence of every extracted field
    #[arg(long)]
    show_fields: bool,

    /// Print validation warnings
    #[arg(long)]
    validate: bool,
}

pub fn parse_doc_type(value: &str) -> Result<DocumentType, String> {
    DocumentType::from_code(value)
        .ok_or_else(|| format!("unknown document type '{}', expected DDT, DDV, FT or FTV", value))
}

/// Metadata for a dump: explicit flags first, then the dump, then the input name.
pub fn build_metadata(
    input: &Path,
    dump: &TokenDump,
    file_name: Option<&str>,
    doc_type: Option<DocumentType>,
    import_date: Option<NaiveDate>,
) -> DocumentMetadata {
    let file_name = file_name
        .map(str::to_string)
        .or_else(|| dump.file_name.clone())
        .or_else(|| {
            input
                .file_stem()
                .and_then(|s| s.to_str())
                .map(str::to_string)
        });

    DocumentMetadata {
        file_name,
        document_number: None,
        document_type: doc_type,
        import_date,
    }
}

pub async fn run(args: ProcessArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();
    let config = load_config(config_path)?;

    if !args.input.exists() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }

    info!("Processing file: {}", args.input.display());

    let dump = TokenDump::read(&args.input)?;
    let metadata = build_metadata(
        &args.input,
        &dump,
        args.file_name.as_deref(),
        args.doc_type,
        args.import_date,
    );

    let parser = DdtFtParser::new(config);
    let result = parser.parse(&dump.tokens, &metadata)?;

    if args.validate && !result.warnings.is_empty() {
        eprintln!("{}", style("Validation issues:").yellow());
        for warning in &result.warnings {
            eprintln!("  - {}", warning);
        }
    }

    let output = format_document(&result.document, args.format)?;

    if let Some(output_path) = &args.output {
        fs::write(output_path, &output)?;
        eprintln!(
            "{} Output written to {}",
            style("✓").green(),
            output_path.display()
        );
    } else {
        println!("{}", output);
    }

    if args.show_fields {
        print_fields(&result);
    }

    debug!("Total processing time: {:?}", start.elapsed());

    Ok(())
}

fn print_fields(result: &ExtractionResult) {
    eprintln!();
    eprintln!("{} Layout: {:?}", style("ℹ").blue(), result.layout);
    for (field, candidate) in &result.fields {
        eprintln!(
            "  {:<18} {:<24} {:.2}  {}",
            field, candidate.method, candidate.confidence, candidate.value
        );
    }
    if !result.corrections.is_empty() {
        eprintln!("  corrections: {}", result.corrections.join(", "));
    }
    eprintln!(
        "{} Processing time: {}ms",
        style("ℹ").blue(),
        result.processing_time_ms
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_doc_type() {
        assert_eq!(parse_doc_type("ddv"), Ok(DocumentType::DeliveryNote));
        assert_eq!(parse_doc_type("FTV"), Ok(DocumentType::Invoice));
        assert!(parse_doc_type("XYZ").is_err());
    }

    #[test]
    fn test_metadata_precedence() {
        let dump = TokenDump {
            file_name: Some("DDV_5023.pdf".into()),
            tokens: Vec::new(),
        };
        let input = Path::new("/tmp/dumps/ddv_7000.json");

        let metadata = build_metadata(input, &dump, None, None, None);
        assert_eq!(metadata.file_name.as_deref(), Some("DDV_5023.pdf"));

        let metadata = build_metadata(input, &dump, Some("FT_12.pdf"), None, None);
        assert_eq!(metadata.file_name.as_deref(), Some("FT_12.pdf"));

        let bare = TokenDump {
            file_name: None,
            tokens: Vec::new(),
        };
        let metadata = build_metadata(input, &bare, None, Some(DocumentType::Invoice), None);
        assert_eq!(metadata.file_name.as_deref(), Some("ddv_7000"));
        assert_eq!(metadata.document_type, Some(DocumentType::Invoice));
    }
}
