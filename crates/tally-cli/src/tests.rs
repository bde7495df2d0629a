//! CLI command tests
//!
//! This module contains all tests for the CLI commands.

use std::fs;
use std::path::PathBuf;

use tally_core::db::Database;
use tally_core::extract::UnavailableOcr;
use tally_core::models::IngestErrorKind;
use tally_core::TallyConfig;

use crate::commands::{self, truncate, IngestOptions};

const STATEMENT: &str = "Date,Narration,Debit,Credit\n\
                         01/02/2024,UPI-XYZ-STORE,250.00,\n\
                         02/02/2024,NEFT ACME SALARY,,50000.00\n\
                         03/02/2024,SWIGGY ORDER 1234,420.50,\n";

fn setup_test_db() -> (Database, TallyConfig) {
    let config = TallyConfig::embedded().unwrap();
    let db = Database::in_memory().unwrap();
    db.seed_categories(&config.vocabulary()).unwrap();
    (db, config)
}

fn write_file(dir: &tempfile::TempDir, name: &str, content: &[u8]) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, content).unwrap();
    path
}

fn quiet() -> IngestOptions<'static> {
    IngestOptions {
        reference_date: Some("2024-06-15"),
        json: true,
        ..Default::default()
    }
}

fn ingest_statement(db: &Database, config: &TallyConfig) {
    let dir = tempfile::tempdir().unwrap();
    let path = write_file(&dir, "statement.csv", STATEMENT.as_bytes());
    commands::cmd_ingest(db, config, &UnavailableOcr, &[path], &quiet()).unwrap();
}

// ========== Core Command Tests ==========

#[test]
fn test_open_db_seeds_categories() {
    let dir = tempfile::tempdir().unwrap();
    let config = TallyConfig::embedded().unwrap();
    let db_path = dir.path().join("tally.db");

    let db = commands::open_db(&db_path, &config).unwrap();
    let categories = db.list_categories().unwrap();
    assert_eq!(categories.len(), config.vocabulary().len());
    assert_eq!(categories.last().map(String::as_str), Some("Other"));
}

#[test]
fn test_open_db_keeps_added_categories() {
    let dir = tempfile::tempdir().unwrap();
    let config = TallyConfig::embedded().unwrap();
    let db_path = dir.path().join("tally.db");

    {
        let db = commands::open_db(&db_path, &config).unwrap();
        commands::cmd_categories_add(&db, "Rent").unwrap();
    }

    let db = commands::open_db(&db_path, &config).unwrap();
    assert!(db.load_vocabulary().unwrap().contains("Rent"));
}

#[test]
fn test_cmd_init() {
    let dir = tempfile::tempdir().unwrap();
    let config = TallyConfig::embedded().unwrap();
    let db_path = dir.path().join("tally.db");

    commands::cmd_init(&db_path, &config).unwrap();
    assert!(db_path.exists());
}

#[test]
fn test_load_config_defaults() {
    let config = commands::load_config(None).unwrap();
    assert!(config.vocabulary().contains("Other"));
}

#[test]
fn test_cmd_banks() {
    assert!(commands::cmd_banks().is_ok());
}

// ========== Ingest Command Tests ==========

#[test]
fn test_cmd_ingest_csv() {
    let (db, config) = setup_test_db();
    let dir = tempfile::tempdir().unwrap();
    let path = write_file(&dir, "statement.csv", STATEMENT.as_bytes());

    let results = commands::cmd_ingest(&db, &config, &UnavailableOcr, &[path], &quiet()).unwrap();

    assert_eq!(results.len(), 1);
    assert_eq!(results[0].document, "statement.csv");
    assert_eq!(results[0].admitted, 3);
    assert_eq!(db.count_transactions().unwrap(), 3);
}

#[test]
fn test_cmd_ingest_twice_reports_duplicates() {
    let (db, config) = setup_test_db();
    let dir = tempfile::tempdir().unwrap();
    let path = write_file(&dir, "statement.csv", STATEMENT.as_bytes());
    let files = vec![path.clone(), path];

    let results = commands::cmd_ingest(&db, &config, &UnavailableOcr, &files, &quiet()).unwrap();

    assert_eq!(results[0].admitted, 3);
    assert_eq!(results[1].admitted, 0);
    assert_eq!(results[1].duplicates, 3);
}

#[test]
fn test_cmd_ingest_bad_file_does_not_stop_batch() {
    let (db, config) = setup_test_db();
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("missing.csv");
    let unknown = write_file(&dir, "notes.docx", b"hello");
    let good = write_file(&dir, "statement.csv", STATEMENT.as_bytes());

    let results = commands::cmd_ingest(
        &db,
        &config,
        &UnavailableOcr,
        &[missing, unknown, good],
        &quiet(),
    )
    .unwrap();

    assert_eq!(results.len(), 3);
    assert_eq!(results[0].errors[0].kind, IngestErrorKind::Extraction);
    assert_eq!(results[1].errors[0].kind, IngestErrorKind::Extraction);
    assert_eq!(results[2].admitted, 3);
}

#[test]
fn test_cmd_ingest_screenshot_without_ocr_is_extraction_error() {
    let (db, config) = setup_test_db();
    let dir = tempfile::tempdir().unwrap();
    let png = write_file(&dir, "pay.png", b"\x89PNG\r\n\x1a\n\0\0\0\0");

    let results = commands::cmd_ingest(&db, &config, &UnavailableOcr, &[png], &quiet()).unwrap();

    assert_eq!(results[0].errors.len(), 1);
    assert_eq!(results[0].errors[0].kind, IngestErrorKind::Extraction);
    assert_eq!(db.count_transactions().unwrap(), 0);
}

#[test]
fn test_cmd_ingest_explicit_kind_and_bank() {
    let (db, config) = setup_test_db();
    let dir = tempfile::tempdir().unwrap();
    let path = write_file(
        &dir,
        "export.txt",
        b"Tran Date,Particulars,Dr,Cr,Bal\n05-03-2024,UPI/UBER TRIP,180.00,,9820.00\n",
    );
    let options = IngestOptions {
        kind: Some("csv"),
        bank: Some("axis"),
        ..quiet()
    };

    let results = commands::cmd_ingest(&db, &config, &UnavailableOcr, &[path], &options).unwrap();

    assert_eq!(results[0].admitted, 1);
    let tx = &db.list_transactions().unwrap()[0];
    assert_eq!(tx.bank, "Axis Bank");
    assert_eq!(tx.category, "Transportation");
}

#[test]
fn test_cmd_ingest_rejects_unknown_bank() {
    let (db, config) = setup_test_db();
    let options = IngestOptions {
        bank: Some("chase"),
        ..quiet()
    };
    let files: Vec<PathBuf> = Vec::new();

    let err = commands::cmd_ingest(&db, &config, &UnavailableOcr, &files, &options).unwrap_err();
    assert!(err.to_string().contains("Unknown bank"));
}

#[test]
fn test_cmd_ingest_rejects_bad_reference_date() {
    let (db, config) = setup_test_db();
    let options = IngestOptions {
        reference_date: Some("15/06/2024"),
        ..quiet()
    };
    let files: Vec<PathBuf> = Vec::new();

    let result = commands::cmd_ingest(&db, &config, &UnavailableOcr, &files, &options);
    assert!(result.is_err());
}

#[test]
fn test_cmd_ingest_rejects_unknown_kind() {
    let (db, config) = setup_test_db();
    let options = IngestOptions {
        kind: Some("docx"),
        ..quiet()
    };
    let files: Vec<PathBuf> = Vec::new();

    let result = commands::cmd_ingest(&db, &config, &UnavailableOcr, &files, &options);
    assert!(result.is_err());
}

// ========== Ledger Command Tests ==========

#[test]
fn test_cmd_transactions_list() {
    let (db, config) = setup_test_db();
    assert!(commands::cmd_transactions_list(&db, None, false).is_ok());

    ingest_statement(&db, &config);
    assert!(commands::cmd_transactions_list(&db, Some(2), false).is_ok());
    assert!(commands::cmd_transactions_list(&db, None, true).is_ok());
}

#[test]
fn test_cmd_categorize() {
    let (db, config) = setup_test_db();
    ingest_statement(&db, &config);
    let tx = db
        .list_transactions()
        .unwrap()
        .into_iter()
        .find(|t| t.description == "UPI-XYZ-STORE")
        .unwrap();
    assert_eq!(tx.category, "Other");

    commands::cmd_categorize(&db, tx.id, "Shopping").unwrap();

    let updated = db.get_transaction(tx.id).unwrap().unwrap();
    assert_eq!(updated.category, "Shopping");
}

#[test]
fn test_cmd_categorize_unknown_category() {
    let (db, config) = setup_test_db();
    ingest_statement(&db, &config);
    let id = db.list_transactions().unwrap()[0].id;

    let err = commands::cmd_categorize(&db, id, "Gadgets").unwrap_err();
    assert!(err.to_string().contains("Unknown category"));
}

#[test]
fn test_cmd_categorize_missing_transaction() {
    let (db, _config) = setup_test_db();
    let err = commands::cmd_categorize(&db, 42, "Shopping").unwrap_err();
    assert!(err.to_string().contains("not found"));
}

fn ids_by_description(db: &Database) -> Vec<(String, i64)> {
    db.list_transactions()
        .unwrap()
        .into_iter()
        .map(|t| (t.description, t.id))
        .collect()
}

#[test]
fn test_cmd_recategorize() {
    let (db, config) = setup_test_db();
    ingest_statement(&db, &config);
    let ids = ids_by_description(&db);
    let store = ids.iter().find(|(d, _)| d == "UPI-XYZ-STORE").unwrap().1;
    let salary = ids.iter().find(|(d, _)| d == "NEFT ACME SALARY").unwrap().1;

    let updates = vec![format!("{}=Shopping", store), format!("{} = Salary", salary)];
    assert_eq!(commands::cmd_recategorize(&db, &updates).unwrap(), 2);

    assert_eq!(db.get_transaction(store).unwrap().unwrap().category, "Shopping");
    assert_eq!(db.get_transaction(salary).unwrap().unwrap().category, "Salary");
}

#[test]
fn test_cmd_recategorize_is_all_or_nothing() {
    let (db, config) = setup_test_db();
    ingest_statement(&db, &config);
    let before = db.list_transactions().unwrap();
    let id = before[0].id;

    let err = commands::cmd_recategorize(&db, &[format!("{}=Shopping", id), "9999=Shopping".to_string()])
        .unwrap_err();
    assert!(err.to_string().contains("not found"));
    assert_eq!(db.list_transactions().unwrap(), before);

    let err = commands::cmd_recategorize(&db, &[format!("{}=Shopping", id), format!("{}=Gadgets", id)])
        .unwrap_err();
    assert!(err.to_string().contains("Unknown category"));
    assert_eq!(db.list_transactions().unwrap(), before);
}

#[test]
fn test_cmd_recategorize_rejects_malformed_pair() {
    let (db, _config) = setup_test_db();
    assert!(commands::cmd_recategorize(&db, &["Shopping".to_string()]).is_err());
    assert!(commands::cmd_recategorize(&db, &["abc=Shopping".to_string()]).is_err());
}

#[test]
fn test_cmd_categories_add_then_categorize() {
    let (db, config) = setup_test_db();
    ingest_statement(&db, &config);
    let id = db.list_transactions().unwrap()[0].id;

    commands::cmd_categories_add(&db, "Gadgets").unwrap();
    commands::cmd_categorize(&db, id, "Gadgets").unwrap();

    assert_eq!(db.get_transaction(id).unwrap().unwrap().category, "Gadgets");
    assert!(commands::cmd_categories_list(&db).is_ok());
}

#[test]
fn test_cmd_categories_add_empty_name() {
    let (db, _config) = setup_test_db();
    assert!(commands::cmd_categories_add(&db, "   ").is_err());
}

#[test]
fn test_cmd_summary() {
    let (db, config) = setup_test_db();
    ingest_statement(&db, &config);

    assert!(commands::cmd_summary(&db, false).is_ok());
    assert!(commands::cmd_summary(&db, true).is_ok());

    let summary = db.summary().unwrap();
    assert_eq!(summary.total_credit, 50000.00);
    assert_eq!(summary.total_debit, 670.50);
}

#[test]
fn test_cmd_clear() {
    let (db, config) = setup_test_db();
    ingest_statement(&db, &config);

    commands::cmd_clear(&db, true).unwrap();

    assert_eq!(db.count_transactions().unwrap(), 0);
    assert!(db.load_vocabulary().unwrap().contains("Food & Dining"));
}

// ========== Snapshot Command Tests ==========

#[test]
fn test_cmd_export_and_restore() {
    let (db, config) = setup_test_db();
    ingest_statement(&db, &config);
    let before = db.list_transactions().unwrap();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("ledger.json");
    commands::cmd_export(&db, Some(&path)).unwrap();
    assert!(path.exists());

    commands::cmd_clear(&db, true).unwrap();
    commands::cmd_restore(&db, &path, true).unwrap();

    assert_eq!(db.list_transactions().unwrap(), before);
}

#[test]
fn test_cmd_export_refuses_overwrite() {
    let (db, _config) = setup_test_db();
    let dir = tempfile::tempdir().unwrap();
    let path = write_file(&dir, "ledger.json", b"{}");

    let err = commands::cmd_export(&db, Some(&path)).unwrap_err();
    assert!(err.to_string().contains("already exists"));
}

#[test]
fn test_cmd_restore_missing_file() {
    let (db, _config) = setup_test_db();
    let result = commands::cmd_restore(&db, &PathBuf::from("/nonexistent/ledger.json"), true);
    assert!(result.is_err());
}

#[test]
fn test_cmd_restore_invalid_json_leaves_ledger() {
    let (db, config) = setup_test_db();
    ingest_statement(&db, &config);
    let dir = tempfile::tempdir().unwrap();
    let path = write_file(&dir, "ledger.json", b"not json");

    assert!(commands::cmd_restore(&db, &path, true).is_err());
    assert_eq!(db.count_transactions().unwrap(), 3);
}

// ========== Utility Tests ==========

#[test]
fn test_truncate() {
    assert_eq!(truncate("short", 10), "short");
    assert_eq!(truncate("exactly10!", 10), "exactly10!");
    assert_eq!(truncate("this is a long string", 10), "this is...");
    assert_eq!(truncate("₹₹₹₹₹₹", 5), "₹₹...");
}

#[test]
fn test_format_amount() {
    use tally_core::TransactionType;
    assert!(commands::format_amount(250.0, TransactionType::Debit).contains("-₹250.00"));
    assert!(commands::format_amount(1000.5, TransactionType::Credit).contains("+₹1000.50"));
}
