//! Batch processing command for multiple token dumps.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use chrono::NaiveDate;
use clap::Args;
use console::style;
use glob::glob;
use indicatif::{ProgressBar, ProgressStyle};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, error, warn};

use ddtft_core::{DdtFtParser, DocumentParser, DocumentType, ExtractionResult};

use super::config::load_config;
use super::process::{build_metadata, parse_doc_type};
use super::{format_csv, format_document, OutputFormat, TokenDump};

/// Arguments for the batch command.
#[derive(Args)]
pub struct BatchArgs {
    /// Glob pattern matching token dumps
    #[arg(required = true)]
    input: String,

    /// Output directory
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Output format for each file
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Also generate a summary CSV
    #[arg(long)]
    summary: bool,

    /// Write one combined export CSV for all documents
    #[arg(long)]
    export: Option<PathBuf>,

    /// Number of parallel workers
    #[arg(short = 'j', long, default_value = "4")]
    jobs: usize,

    /// Continue on error
    #[arg(long)]
    continue_on_error: bool,

    /// Force the document type (DDT, DDV, FT, FTV)
    #[arg(long, value_parser = parse_doc_type)]
    doc_type: Option<DocumentType>,

    /// Import date (YYYY-MM-DD), defaults to today
    #[arg(long)]
    import_date: Option<NaiveDate>,
}

/// Result of processing a single file.
struct ProcessResult {
    path: PathBuf,
    extraction: Option<ExtractionResult>,
    error: Option<String>,
    processing_time_ms: u64,
}

fn process_single_file(
    path: &Path,
    parser: &DdtFtParser,
    doc_type: Option<DocumentType>,
    import_date: Option<NaiveDate>,
) -> anyhow::Result<ExtractionResult> {
    let dump = TokenDump::read(path)?;
    let metadata = build_metadata(path, &dump, None, doc_type, import_date);
    Ok(parser.parse(&dump.tokens, &metadata)?)
}

pub async fn run(args: BatchArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();
    let config = load_config(config_path)?;

    let mut files: Vec<PathBuf> = glob(&args.input)?
        .filter_map(|r| r.ok())
        .filter(|p| {
            p.extension()
                .and_then(|e| e.to_str())
                .is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
        })
        .collect();
    files.sort();

    if files.is_empty() {
        anyhow::bail!("No matching files found for pattern: {}", args.input);
    }

    eprintln!(
        "{} Found {} files to process",
        style("ℹ").blue(),
        files.len()
    );

    if let Some(ref output_dir) = args.output_dir {
        fs::create_dir_all(output_dir)?;
    }

    let progress = ProgressBar::new(files.len() as u64);
    progress.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files")?
            .progress_chars("=>-"),
    );

    let parser = Arc::new(DdtFtParser::new(config));
    let semaphore = Arc::new(Semaphore::new(args.jobs.max(1)));
    let mut tasks = JoinSet::new();

    for (index, path) in files.iter().cloned().enumerate() {
        let parser = Arc::clone(&parser);
        let semaphore = Arc::clone(&semaphore);
        let doc_type = args.doc_type;
        let import_date = args.import_date;

        tasks.spawn(async move {
            let _permit = semaphore.acquire_owned().await;
            let file_start = Instant::now();
            // File reads and parsing are blocking work.
            let result = tokio::task::spawn_blocking({
                let path = path.clone();
                move || process_single_file(&path, &parser, doc_type, import_date)
            })
            .await
            .unwrap_or_else(|e| Err(anyhow::anyhow!("Worker failed: {}", e)));
            (index, path, result, file_start.elapsed().as_millis() as u64)
        });
    }

    let mut results: Vec<(usize, ProcessResult)> = Vec::with_capacity(files.len());
    while let Some(joined) = tasks.join_next().await {
        let (index, path, result, processing_time_ms) = joined?;
        progress.inc(1);

        match result {
            Ok(extraction) => results.push((
                index,
                ProcessResult {
                    path,
                    extraction: Some(extraction),
                    error: None,
                    processing_time_ms,
                },
            )),
            Err(e) if args.continue_on_error => {
                warn!("Failed to process {}: {}", path.display(), e);
                results.push((
                    index,
                    ProcessResult {
                        path,
                        extraction: None,
                        error: Some(e.to_string()),
                        processing_time_ms,
                    },
                ));
            }
            Err(e) => {
                error!("Failed to process {}: {}", path.display(), e);
                tasks.abort_all();
                progress.abandon();
                anyhow::bail!("Processing failed for {}: {}", path.display(), e);
            }
        }
    }

    progress.finish_and_clear();

    // Completion order is arbitrary; report in input order.
    results.sort_by_key(|(index, _)| *index);
    let results: Vec<ProcessResult> = results.into_iter().map(|(_, r)| r).collect();

    if let Some(ref output_dir) = args.output_dir {
        for result in &results {
            let Some(extraction) = &result.extraction else {
                continue;
            };

            let output_name = result
                .path
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or("document");
            let output_path = output_dir.join(format!("{}.{}", output_name, args.format.extension()));

            fs::write(&output_path, format_document(&extraction.document, args.format)?)?;
            debug!("Wrote output to {}", output_path.display());
        }
    }

    if let Some(ref export_path) = args.export {
        let documents: Vec<_> = results
            .iter()
            .filter_map(|r| r.extraction.as_ref().map(|e| e.document.clone()))
            .collect();
        fs::write(export_path, format_csv(&documents)?)?;
        eprintln!(
            "{} Export written to {}",
            style("✓").green(),
            export_path.display()
        );
    }

    if args.summary {
        let summary_path = args
            .output_dir
            .as_ref()
            .map(|d| d.join("summary.csv"))
            .unwrap_or_else(|| PathBuf::from("summary.csv"));

        write_summary(&summary_path, &results)?;
        eprintln!(
            "{} Summary written to {}",
            style("✓").green(),
            summary_path.display()
        );
    }

    let failed: Vec<_> = results.iter().filter(|r| r.error.is_some()).collect();

    eprintln!();
    eprintln!(
        "{} Processed {} files in {:?}",
        style("✓").green(),
        results.len(),
        start.elapsed()
    );
    eprintln!(
        "   {} successful, {} failed",
        style(results.len() - failed.len()).green(),
        style(failed.len()).red()
    );

    if !failed.is_empty() {
        eprintln!();
        eprintln!("{}", style("Failed files:").red());
        for result in &failed {
            eprintln!(
                "  - {}: {}",
                result.path.display(),
                result.error.as_deref().unwrap_or("unknown error")
            );
        }
    }

    Ok(())
}

fn write_summary(path: &Path, results: &[ProcessResult]) -> anyhow::Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;

    wtr.write_record([
        "filename",
        "status",
        "document_type",
        "document_number",
        "date",
        "client_name",
        "delivery_address",
        "address_method",
        "items",
        "total",
        "warnings",
        "processing_time_ms",
        "error",
    ])?;

    for result in results {
        let filename = result
            .path
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or("");

        if let Some(extraction) = &result.extraction {
            let document = &extraction.document;
            wtr.write_record([
                filename,
                "success",
                document.document_type.code(),
                &document.document_number,
                &document.date,
                &document.client_name,
                document.delivery_address.as_deref().unwrap_or(""),
                extraction
                    .fields
                    .get("delivery_address")
                    .map(|c| c.method.as_str())
                    .unwrap_or(""),
                &document.items.len().to_string(),
                &document.total.to_string(),
                &extraction.warnings.join("; "),
                &result.processing_time_ms.to_string(),
                "",
            ])?;
        } else {
            wtr.write_record([
                filename,
                "error",
                "",
                "",
                "",
                "",
                "",
                "",
                "",
                "",
                "",
                &result.processing_time_ms.to_string(),
                result.error.as_deref().unwrap_or(""),
            ])?;
        }
    }

    wtr.flush()?;
    Ok(())
}
