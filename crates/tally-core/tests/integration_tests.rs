//! Integration tests for tally-core
//!
//! These tests exercise the full extract → detect → parse → normalize →
//! admit workflow against a real (temporary) ledger.

use std::collections::HashSet;

use chrono::NaiveDate;
use tally_core::{
    dedup::normalize_description_key,
    extract::RecognizedText,
    models::{DocumentKind, RawDocument, TransactionType},
    Database, Error, IngestErrorKind, IngestResult, Ingestor, OcrEngine, TallyConfig,
};

/// OCR engine returning fixed text
struct ScriptedOcr(&'static str);

impl OcrEngine for ScriptedOcr {
    fn name(&self) -> &str {
        "scripted"
    }

    fn recognize(&self, _image: &[u8]) -> tally_core::Result<RecognizedText> {
        Ok(RecognizedText {
            text: self.0.to_string(),
            mean_confidence: Some(90.0),
        })
    }
}

const PNG: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 0];

fn reference_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, 15).unwrap()
}

fn csv(name: &str, content: &str) -> RawDocument {
    RawDocument::new(name, content.as_bytes().to_vec(), DocumentKind::Csv)
}

fn ingest_with(db: &Database, ocr: &dyn OcrEngine, doc: &RawDocument) -> IngestResult {
    let config = TallyConfig::embedded().expect("embedded config");
    db.seed_categories(&config.vocabulary()).expect("seed categories");
    let vocab = db.load_vocabulary().expect("load vocabulary");
    let ingestor = Ingestor::new(db, &config, &vocab, ocr, reference_date()).expect("ingestor");
    ingestor.ingest(doc)
}

fn ingest(db: &Database, doc: &RawDocument) -> IngestResult {
    ingest_with(db, &ScriptedOcr(""), doc)
}

/// HDFC export with account details above the table
fn hdfc_statement() -> &'static str {
    r#"HDFC BANK Ltd.,,,,,,
Account No : 50100012345678,,,,,,
Statement From : 01/02/2024 To : 29/02/2024,,,,,,
Date,Narration,Chq./Ref.No.,Value Dt,Withdrawal Amt.,Deposit Amt.,Closing Balance
01/02/24,UPI-SWIGGY-SWIGGY8@YBL-412345678901,0000412345678901,01/02/24,350.00,,49650.00
02/02/24,NEFT CR-ACME CORP SALARY FEB,N12345,02/02/24,,"85,000.00","1,34,650.00"
05/02/24,POS 4567XXXXXX1234 AMAZON PAY IN,000000000001,05/02/24,"2,499.00",,"1,32,151.00"
07/02/24,ATW-4567XXXXXX1234-S1ANHY01-BANGALORE,000000000002,07/02/24,"5,000.00",,"1,27,151.00"
10/02/24,UPI-NETFLIX-NETFLIX@ICICI-412300000000,0000412300000000,10/02/24,649.00,,"1,26,502.00"
"#
}

/// SBI export
fn sbi_statement() -> &'static str {
    "Txn Date,Value Date,Description,Ref No./Cheque No.,Debit,Credit,Balance\n\
     1 Mar 2024,1 Mar 2024,BY TRANSFER-UPI/CR/412399999999/RAVI KUMAR,412399999999,,\"1,000.00\",\"11,000.00\"\n\
     3 Mar 2024,3 Mar 2024,TO TRANSFER-UPI/DR/412388888888/UBER INDIA,412388888888,245.50,,\"10,754.50\"\n"
}

// =============================================================================
// Scenarios
// =============================================================================

#[test]
fn test_scenario_a_debit_row() {
    let db = Database::in_memory().expect("db");
    let result = ingest(&db, &csv("a.csv", "Date,Narration,Debit,Credit\n01/02/2024,UPI-XYZ-STORE,250.00,\n"));

    assert_eq!(result.admitted, 1);
    assert!(result.is_ok());

    let txs = db.list_transactions().expect("list");
    assert_eq!(txs.len(), 1);
    let tx = &txs[0];
    assert_eq!(tx.amount, 250.00);
    assert_eq!(tx.transaction_type, TransactionType::Debit);
    assert_eq!(tx.date, NaiveDate::from_ymd_opt(2024, 2, 1).unwrap());
    assert_eq!(tx.bank, "HDFC Bank");
    assert_eq!(tx.category, "Other");
}

#[test]
fn test_scenario_b_duplicate_row() {
    let db = Database::in_memory().expect("db");
    let doc = csv("b.csv", "Date,Narration,Debit,Credit\n01/02/2024,UPI-XYZ-STORE,250.00,\n");

    let first = ingest(&db, &doc);
    let second = ingest(&db, &doc);

    assert_eq!(first.admitted, 1);
    assert_eq!(second.admitted, 0);
    assert_eq!(second.duplicates, 1);
    assert_eq!(db.count_transactions().unwrap(), 1);
}

#[test]
fn test_scenario_c_ocr_payment() {
    let db = Database::in_memory().expect("db");
    let shot = RawDocument::new("pay.png", PNG.to_vec(), DocumentKind::Image);
    let result = ingest_with(&db, &ScriptedOcr("Paid ₹499 to Coffee Shop on 03 Mar 2024"), &shot);

    assert_eq!(result.admitted, 1);
    let tx = &db.list_transactions().unwrap()[0];
    assert_eq!(tx.amount, 499.0);
    assert_eq!(tx.transaction_type, TransactionType::Debit);
    assert!(tx.description.contains("Coffee Shop"));
    assert_eq!(tx.date, NaiveDate::from_ymd_opt(2024, 3, 3).unwrap());
}

#[test]
fn test_scenario_d_unparsable_date() {
    let db = Database::in_memory().expect("db");
    let result = ingest(
        &db,
        &csv("d.csv", "Date,Narration,Debit,Credit\nN/A,UPI-XYZ-STORE,250.00,\n"),
    );

    assert_eq!(result.unparsed, 1);
    assert_eq!(result.admitted, 0);
    assert!(result.is_ok());
    assert_eq!(db.count_transactions().unwrap(), 0);
}

#[test]
fn test_scenario_e_set_category_unknown_id() {
    let db = Database::in_memory().expect("db");
    ingest(&db, &csv("e.csv", hdfc_statement()));
    let before = db.list_transactions().unwrap();
    let vocab = db.load_vocabulary().unwrap();

    let err = db.set_category(987654, "Shopping", &vocab).unwrap_err();
    assert!(matches!(err, Error::NotFound(_)));
    assert_eq!(db.list_transactions().unwrap(), before);
}

// =============================================================================
// Ledger properties
// =============================================================================

#[test]
fn test_idempotent_reingest() {
    let db = Database::in_memory().expect("db");
    let doc = csv("hdfc.csv", hdfc_statement());

    let first = ingest(&db, &doc);
    let after_first = db.list_transactions().unwrap();
    let second = ingest(&db, &doc);

    assert_eq!(first.admitted, 5);
    assert_eq!(second.duplicates, first.admitted);
    assert_eq!(second.admitted, 0);
    assert_eq!(db.list_transactions().unwrap(), after_first);
}

#[test]
fn test_fingerprint_and_amount_invariants() {
    let db = Database::in_memory().expect("db");
    ingest(&db, &csv("hdfc.csv", hdfc_statement()));
    ingest(&db, &csv("sbi.csv", sbi_statement()));

    let txs = db.list_transactions().unwrap();
    assert_eq!(txs.len(), 7);

    let fingerprints: HashSet<&str> = txs.iter().map(|t| t.fingerprint.as_str()).collect();
    assert_eq!(fingerprints.len(), txs.len());

    let keys: HashSet<(NaiveDate, String, TransactionType, String, String)> = txs
        .iter()
        .map(|t| {
            (
                t.date,
                format!("{:.2}", t.amount),
                t.transaction_type,
                normalize_description_key(&t.description),
                t.bank.clone(),
            )
        })
        .collect();
    assert_eq!(keys.len(), txs.len());

    assert!(txs.iter().all(|t| t.amount >= 0.0));
}

#[test]
fn test_summary_matches_signed_sum() {
    let db = Database::in_memory().expect("db");
    ingest(&db, &csv("hdfc.csv", hdfc_statement()));
    ingest(&db, &csv("sbi.csv", sbi_statement()));

    let summary = db.summary().unwrap();
    let signed: f64 = db.list_transactions().unwrap().iter().map(|t| t.signed_amount()).sum();

    assert!((summary.total_credit - summary.total_debit - signed).abs() < 0.005);
    assert_eq!(summary.total_credit, 86000.00);
    assert_eq!(summary.total_debit, 8743.50);
}

// =============================================================================
// End-to-end details
// =============================================================================

#[test]
fn test_hdfc_statement_details() {
    let db = Database::in_memory().expect("db");
    ingest(&db, &csv("hdfc.csv", hdfc_statement()));

    let txs = db.list_transactions().unwrap();
    assert!(txs.iter().all(|t| t.bank == "HDFC Bank"));

    let salary = txs.iter().find(|t| t.description.contains("SALARY")).unwrap();
    assert_eq!(salary.transaction_type, TransactionType::Credit);
    assert_eq!(salary.amount, 85000.0);
    assert_eq!(salary.category, "Salary");

    let netflix = txs.iter().find(|t| t.description.contains("NETFLIX")).unwrap();
    assert_eq!(netflix.category, "Entertainment");
    assert_eq!(netflix.date, NaiveDate::from_ymd_opt(2024, 2, 10).unwrap());
}

#[test]
fn test_sbi_statement_details() {
    let db = Database::in_memory().expect("db");
    let result = ingest(&db, &csv("sbi.csv", sbi_statement()));
    assert_eq!(result.admitted, 2);

    let txs = db.list_transactions().unwrap();
    let uber = txs.iter().find(|t| t.description.contains("UBER")).unwrap();
    assert_eq!(uber.bank, "State Bank of India");
    assert_eq!(uber.amount, 245.5);
    assert_eq!(uber.category, "Transportation");
}

#[test]
fn test_bank_hint_selects_layout() {
    let db = Database::in_memory().expect("db");
    let doc = csv("export.csv", "Date,Particulars,Amount\n01/03/2024,IMPS-RENT,-15000\n").with_bank_hint("axis");
    let result = ingest(&db, &doc);

    assert_eq!(result.admitted, 1);
    let tx = &db.list_transactions().unwrap()[0];
    assert_eq!(tx.bank, "Axis Bank");
    assert_eq!(tx.transaction_type, TransactionType::Debit);
    assert_eq!(tx.amount, 15000.0);
}

#[test]
fn test_generic_csv_with_unknown_bank() {
    let db = Database::in_memory().expect("db");
    let result = ingest(
        &db,
        &csv("wallet.csv", "Posting Date,Description,Amount\n2024-03-01,Cashback,+25.00\n2024-03-02,Zomato order,-412.00\n"),
    );

    assert_eq!(result.admitted, 2);
    let txs = db.list_transactions().unwrap();
    assert!(txs.iter().all(|t| t.bank == "N/A"));
    let zomato = txs.iter().find(|t| t.description == "Zomato order").unwrap();
    assert_eq!(zomato.transaction_type, TransactionType::Debit);
    assert_eq!(zomato.category, "Food & Dining");
}

#[test]
fn test_unsupported_layout_reported() {
    let db = Database::in_memory().expect("db");
    let result = ingest(&db, &csv("notes.csv", "Name,Phone\nRavi,98450\n"));
    assert_eq!(result.errors.len(), 1);
    assert_eq!(result.errors[0].kind, IngestErrorKind::UnsupportedLayout);
    assert_eq!(db.count_transactions().unwrap(), 0);
}

#[test]
fn test_corrupt_pdf_reported() {
    let db = Database::in_memory().expect("db");
    let doc = RawDocument::new("statement.pdf", b"%PDF-1.4 truncated".to_vec(), DocumentKind::Pdf);
    let result = ingest(&db, &doc);
    assert_eq!(result.errors.len(), 1);
    assert_eq!(result.errors[0].kind, IngestErrorKind::Extraction);
}

#[test]
fn test_screenshot_history_with_failed_entry() {
    let db = Database::in_memory().expect("db");
    let text = "Search transactions\n\
                Paid to Swiggy\n\
                ₹349\n\
                04 Mar 2024, 8:30 PM\n\
                Paid to Metro Recharge\n\
                ₹200\n\
                04 Mar 2024\n\
                Payment failed\n\
                Received from Ravi Kumar\n\
                +₹1,000\n\
                05 Mar 2024\n";
    let shot = RawDocument::new("history.png", PNG.to_vec(), DocumentKind::Image);
    let result = ingest_with(&db, &ScriptedOcr(text), &shot);

    assert_eq!(result.admitted, 2);
    let txs = db.list_transactions().unwrap();
    let ravi = txs.iter().find(|t| t.description == "Ravi Kumar").unwrap();
    assert_eq!(ravi.transaction_type, TransactionType::Credit);
    let swiggy = txs.iter().find(|t| t.description == "Swiggy").unwrap();
    assert_eq!(swiggy.category, "Food & Dining");
    assert!(txs.iter().all(|t| !t.description.contains("Metro")));
}

#[test]
fn test_snapshot_restore_into_fresh_ledger() {
    let db = Database::in_memory().expect("db");
    ingest(&db, &csv("hdfc.csv", hdfc_statement()));
    let snapshot = db.export_snapshot().unwrap();

    let json = serde_json::to_string_pretty(&snapshot).unwrap();
    let parsed = serde_json::from_str(&json).unwrap();

    let fresh = Database::in_memory().expect("db");
    fresh.restore_snapshot(&parsed).unwrap();
    assert_eq!(fresh.list_transactions().unwrap(), db.list_transactions().unwrap());

    // Restored ledger still rejects the same statement as duplicates
    let again = ingest(&fresh, &csv("hdfc.csv", hdfc_statement()));
    assert_eq!(again.duplicates, 5);
}
