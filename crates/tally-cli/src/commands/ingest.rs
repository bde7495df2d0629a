//! Ingestion command implementation

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use tally_core::{
    db::Database,
    models::{IngestError, IngestErrorKind},
    Bank, DocumentKind, IngestResult, Ingestor, OcrEngine, RawDocument, TallyConfig,
};

/// Options shared by every file of one `tally ingest` run
#[derive(Debug, Default)]
pub struct IngestOptions<'a> {
    pub kind: Option<&'a str>,
    pub bank: Option<&'a str>,
    pub reference_date: Option<&'a str>,
    pub json: bool,
}

pub fn cmd_ingest(
    db: &Database,
    config: &TallyConfig,
    ocr: &dyn OcrEngine,
    files: &[impl AsRef<Path>],
    options: &IngestOptions<'_>,
) -> Result<Vec<IngestResult>> {
    let kind: Option<DocumentKind> = options
        .kind
        .map(|k| k.parse::<DocumentKind>().map_err(|e| anyhow::anyhow!(e)))
        .transpose()?;

    if let Some(bank) = options.bank {
        bank.parse::<Bank>().map_err(|_| {
            anyhow::anyhow!(
                "Unknown bank: {}\nSpecify --bank with one of: hdfc, sbi, icici, axis, kotak",
                bank
            )
        })?;
    }

    let reference_date = match options.reference_date {
        Some(s) => NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .context("Invalid --reference-date format (use YYYY-MM-DD)")?,
        None => Local::now().date_naive(),
    };

    let vocab = db.load_vocabulary()?;
    let ingestor = Ingestor::new(db, config, &vocab, ocr, reference_date)?;

    if !options.json {
        println!("📥 Ingesting {} file(s)...", files.len());
    }

    let mut results = Vec::with_capacity(files.len());
    for file in files {
        let file = file.as_ref();
        let result = match load_document(file, kind, options.bank) {
            Ok(document) => ingestor.ingest(&document),
            Err(e) => {
                let mut result = IngestResult::new(file.display().to_string());
                result.errors.push(IngestError {
                    kind: IngestErrorKind::Extraction,
                    message: format!("{:#}", e),
                });
                result
            }
        };
        if !options.json {
            print_result(&result);
        }
        results.push(result);
    }

    if options.json {
        println!("{}", serde_json::to_string_pretty(&results)?);
    } else {
        let admitted: usize = results.iter().map(|r| r.admitted).sum();
        let duplicates: usize = results.iter().map(|r| r.duplicates).sum();
        let unparsed: usize = results.iter().map(|r| r.unparsed).sum();
        let failed = results.iter().filter(|r| !r.is_ok()).count();

        println!();
        println!("✅ Ingestion complete!");
        println!("   Admitted: {}", admitted);
        println!("   Skipped (duplicates): {}", duplicates);
        if unparsed > 0 {
            println!("   Unreadable rows: {}", unparsed);
        }
        if failed > 0 {
            println!("   ⚠️  Files with errors: {}", failed);
        }
    }

    Ok(results)
}

/// Read a file into a document, inferring its kind from the extension
fn load_document(path: &Path, kind: Option<DocumentKind>, bank: Option<&str>) -> Result<RawDocument> {
    let kind = match kind {
        Some(kind) => kind,
        None => path
            .extension()
            .and_then(|e| e.to_str())
            .and_then(DocumentKind::from_extension)
            .with_context(|| {
                format!(
                    "Cannot tell the document kind of {}; pass --kind csv|pdf|image",
                    path.display()
                )
            })?,
    };

    let bytes =
        fs::read(path).with_context(|| format!("Failed to read file: {}", path.display()))?;
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    let document = RawDocument::new(name, bytes, kind);
    Ok(match bank {
        Some(bank) => document.with_bank_hint(bank),
        None => document,
    })
}

fn print_result(result: &IngestResult) {
    println!();
    println!("📄 {}", result.document);
    println!(
        "   Admitted: {} │ Duplicates: {} │ Unparsed: {}",
        result.admitted, result.duplicates, result.unparsed
    );
    for error in &result.errors {
        let label = match error.kind {
            IngestErrorKind::Extraction => "could not read",
            IngestErrorKind::UnsupportedLayout => "unsupported layout",
            IngestErrorKind::Storage => "storage error",
        };
        println!("   ❌ {}: {}", label, error.message);
    }
}
