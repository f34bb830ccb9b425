use std::fs;
use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const COMPACT_DUMP: &str = r#"{
  "file_name": "DDV_5023.pdf",
  "tokens": [
    {"str": "5023", "x": 20, "y": 700, "width": 10},
    {"str": "3/06/25", "x": 60, "y": 700, "width": 10},
    {"str": "1", "x": 110, "y": 700, "width": 10},
    {"str": "20322", "x": 130, "y": 700, "width": 10},
    {"str": "DONAC S.R.L.", "x": 180, "y": 700, "width": 10},
    {"str": "DONAC S.R.L.", "x": 20, "y": 690, "width": 10},
    {"str": "DONAC S.R.L.", "x": 300, "y": 690, "width": 10},
    {"str": "VIA MAZZINI, 2", "x": 20, "y": 680, "width": 10},
    {"str": "VIA SALUZZO, 65", "x": 300, "y": 680, "width": 10},
    {"str": "12037 SALUZZO CN", "x": 20, "y": 670, "width": 10},
    {"str": "12038 SAVIGLIANO CN", "x": 300, "y": 670, "width": 10},
    {"str": "DL000301 TORCETTI AL BURRO 400 G PZ 80 2,30 184,00 10 0", "x": 20, "y": 600, "width": 10}
  ]
}"#;

const BARE_DUMP: &str = r#"[
  {"text": "D.D.T. N. 703723 del 06/12/25", "x": 20, "y": 800},
  {"text": "Spett.le BOREALE SRL", "x": 20, "y": 790}
]"#;

fn ddtft(config: &Path) -> Command {
    let mut cmd = Command::cargo_bin("ddtft").unwrap();
    cmd.arg("--config").arg(config);
    cmd
}

/// Temp dir holding a default config file.
fn workspace() -> (TempDir, std::path::PathBuf) {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("config.json");
    ddtft(&config).args(["config", "init"]).assert().success();
    (dir, config)
}

#[test]
fn test_process_json_to_stdout() {
    let (dir, config) = workspace();
    let input = dir.path().join("ddv_5023.json");
    fs::write(&input, COMPACT_DUMP).unwrap();

    ddtft(&config)
        .args(["process", "--import-date", "2025-06-04"])
        .arg(&input)
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""document_number": "5023""#))
        .stdout(predicate::str::contains("VIA SALUZZO, 65 12038 SAVIGLIANO CN"));
}

#[test]
fn test_process_csv_to_file() {
    let (dir, config) = workspace();
    let input = dir.path().join("ddv_5023.json");
    let output = dir.path().join("out.csv");
    fs::write(&input, COMPACT_DUMP).unwrap();

    ddtft(&config)
        .args(["process", "--format", "csv", "--output"])
        .arg(&output)
        .arg(&input)
        .assert()
        .success();

    let csv = fs::read_to_string(&output).unwrap();
    assert!(csv.starts_with("Numero Ordine,Data Ordine,Tipo Documento"));
    assert!(csv.contains("DL000301"));
}

#[test]
fn test_process_text_with_fields() {
    let (dir, config) = workspace();
    let input = dir.path().join("bare.json");
    fs::write(&input, BARE_DUMP).unwrap();

    ddtft(&config)
        .args(["process", "--format", "text", "--show-fields", "--validate"])
        .arg(&input)
        .assert()
        .success()
        .stdout(predicate::str::contains("703723 del 06/12/25"))
        .stderr(predicate::str::contains("document_number"))
        .stderr(predicate::str::contains("Missing delivery address"));
}

#[test]
fn test_process_forced_invoice_type() {
    let (dir, config) = workspace();
    let input = dir.path().join("ddv_5023.json");
    fs::write(&input, COMPACT_DUMP).unwrap();

    ddtft(&config)
        .args(["process", "--doc-type", "FTV"])
        .arg(&input)
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""id": "FT_"#));
}

#[test]
fn test_process_rejects_unknown_doc_type() {
    let (dir, config) = workspace();
    let input = dir.path().join("ddv_5023.json");
    fs::write(&input, COMPACT_DUMP).unwrap();

    ddtft(&config)
        .args(["process", "--doc-type", "XYZ"])
        .arg(&input)
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown document type"));
}

#[test]
fn test_process_missing_input() {
    let (dir, config) = workspace();

    ddtft(&config)
        .arg("process")
        .arg(dir.path().join("missing.json"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("Input file not found"));
}

#[test]
fn test_missing_explicit_config() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("ddv_5023.json");
    fs::write(&input, COMPACT_DUMP).unwrap();

    ddtft(&dir.path().join("nope.json"))
        .arg("process")
        .arg(&input)
        .assert()
        .failure();
}

#[test]
fn test_batch_with_summary_and_export() {
    let (dir, config) = workspace();
    let inputs = dir.path().join("dumps");
    let out = dir.path().join("out");
    fs::create_dir_all(&inputs).unwrap();
    fs::write(inputs.join("a.json"), COMPACT_DUMP).unwrap();
    fs::write(inputs.join("b.json"), BARE_DUMP).unwrap();
    fs::write(inputs.join("c.json"), "not json").unwrap();
    fs::write(inputs.join("notes.txt"), "ignored").unwrap();

    let pattern = inputs.join("*").display().to_string();
    let export = dir.path().join("export.csv");

    ddtft(&config)
        .args(["batch", "-j", "2", "--summary", "--continue-on-error", "--output-dir"])
        .arg(&out)
        .arg("--export")
        .arg(&export)
        .arg(&pattern)
        .assert()
        .success()
        .stderr(predicate::str::contains("2 successful"));

    assert!(out.join("a.json").exists());
    assert!(out.join("b.json").exists());
    assert!(!out.join("c.json").exists());

    let summary = fs::read_to_string(out.join("summary.csv")).unwrap();
    let rows: Vec<&str> = summary.lines().collect();
    assert_eq!(rows.len(), 4);
    assert!(rows[0].starts_with("filename,status,document_type"));
    assert!(rows[1].starts_with("a.json,success,DDT,5023"));
    assert!(rows[3].starts_with("c.json,error"));

    let export = fs::read_to_string(&export).unwrap();
    assert!(export.contains("5023"));
    assert!(export.contains("703723"));
}

#[test]
fn test_batch_stops_on_first_error() {
    let (dir, config) = workspace();
    fs::write(dir.path().join("broken.json"), "{").unwrap();

    ddtft(&config)
        .args(["batch", "--output-dir"])
        .arg(dir.path().join("out"))
        .arg(dir.path().join("broken*.json").display().to_string())
        .assert()
        .failure()
        .stderr(predicate::str::contains("Processing failed"));
}

#[test]
fn test_batch_without_matches() {
    let (dir, config) = workspace();

    ddtft(&config)
        .arg("batch")
        .arg(dir.path().join("*.json").display().to_string())
        .assert()
        .failure()
        .stderr(predicate::str::contains("No matching files"));
}

#[test]
fn test_config_get_and_set() {
    let (_dir, config) = workspace();

    ddtft(&config)
        .args(["config", "get", "extraction.strict_address_validation"])
        .assert()
        .success()
        .stdout(predicate::str::contains("true"));

    ddtft(&config)
        .args(["config", "set", "extraction.strict_address_validation", "false"])
        .assert()
        .success();

    ddtft(&config)
        .args(["config", "get", "extraction.strict_address_validation"])
        .assert()
        .success()
        .stdout(predicate::str::contains("false"));

    ddtft(&config)
        .args(["config", "set", "extraction.unknown_key", "1"])
        .assert()
        .failure();

    ddtft(&config)
        .args(["config", "set", "extraction.min_address_length", "\"long\""])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid value"));
}

#[test]
fn test_config_init_refuses_overwrite() {
    let (_dir, config) = workspace();

    ddtft(&config).args(["config", "init"]).assert().failure();
    ddtft(&config)
        .args(["config", "init", "--force"])
        .assert()
        .success();
    ddtft(&config)
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("exists"));
}
