//! Directory batch driver.
//!
//! Every `*.pdf` in the input directory produces exactly one `<stem>.json`
//! in the output directory. A document that fails to parse or classify is
//! written as the empty result and recorded in the [`BatchSummary`]; it
//! never stops the rest of the batch.

use std::any::Any;
use std::fs;
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};

use crossbeam_channel::Sender;
use rayon::prelude::*;

use crate::classify::Models;
use crate::error::Result;
use crate::model::ExtractionResult;
use crate::parser::{ParseOptions, PdfSpanSource, SpanSource};
use crate::pipeline::{extract_outline, ExtractOptions};
use crate::render::{to_json, JsonFormat};

/// Options for a batch run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BatchOptions {
    /// Process documents on the rayon thread pool
    pub parallel: bool,
    /// Output JSON format
    pub format: JsonFormat,
    /// Options for the default PDF span source
    pub parse: ParseOptions,
    /// Extraction options
    pub extract: ExtractOptions,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            parallel: true,
            format: JsonFormat::Pretty,
            parse: ParseOptions::default(),
            extract: ExtractOptions::default(),
        }
    }
}

impl BatchOptions {
    /// Create new batch options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Process one document at a time.
    pub fn sequential(mut self) -> Self {
        self.parallel = false;
        self
    }

    /// Set the output format.
    pub fn with_format(mut self, format: JsonFormat) -> Self {
        self.format = format;
        self
    }

    /// Set parse options.
    pub fn with_parse(mut self, parse: ParseOptions) -> Self {
        self.parse = parse;
        self
    }

    /// Set extraction options.
    pub fn with_extract(mut self, extract: ExtractOptions) -> Self {
        self.extract = extract;
        self
    }

    /// A PDF span source configured with [`BatchOptions::parse`].
    pub fn span_source(&self) -> PdfSpanSource {
        PdfSpanSource::with_options(self.parse)
    }
}

/// A document that degraded to the empty result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentFailure {
    /// Input document
    pub path: PathBuf,
    /// Error message
    pub reason: String,
}

/// Outcome of a batch run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchSummary {
    /// Documents found in the input directory
    pub total: usize,
    /// Documents extracted without error
    pub succeeded: usize,
    /// Documents written as the empty result, in input order
    pub failures: Vec<DocumentFailure>,
}

impl BatchSummary {
    /// Number of failed documents.
    pub fn failed(&self) -> usize {
        self.failures.len()
    }

    /// True if every document succeeded.
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Progress events emitted while a batch runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchEvent {
    /// The input directory was scanned.
    Started {
        /// Number of documents to process
        total: usize,
    },
    /// A document was extracted and written.
    Completed {
        /// Input document
        path: PathBuf,
        /// Number of outline entries written
        entries: usize,
    },
    /// A document failed and the empty result was written.
    Failed {
        /// Input document
        path: PathBuf,
        /// Error message
        reason: String,
    },
}

/// Extract one document from disk.
pub fn process_document(
    path: &Path,
    models: &Models,
    source: &dyn SpanSource,
    options: &ExtractOptions,
) -> Result<ExtractionResult> {
    let doc = source.load(path)?;
    extract_outline(&doc, models, options)
}

/// List the `*.pdf` files of a directory, sorted by name.
pub fn collect_pdfs(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() && is_pdf_path(&path) {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

fn is_pdf_path(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("pdf"))
}

/// Output path for an input document: `<output_dir>/<stem>.json`.
pub fn output_path(output_dir: &Path, input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "output".to_string());
    output_dir.join(format!("{}.json", stem))
}

/// Process every PDF in `input_dir`, writing results into `output_dir`.
///
/// Fails only when a directory cannot be read or created; document-level
/// failures are reported through the returned summary.
pub fn process_directory(
    input_dir: &Path,
    output_dir: &Path,
    models: &Models,
    source: &dyn SpanSource,
    options: &BatchOptions,
) -> Result<BatchSummary> {
    run(input_dir, output_dir, models, source, options, None)
}

/// Like [`process_directory`], sending a [`BatchEvent`] per document.
///
/// A disconnected receiver does not interrupt the batch.
pub fn process_directory_with_events(
    input_dir: &Path,
    output_dir: &Path,
    models: &Models,
    source: &dyn SpanSource,
    options: &BatchOptions,
    events: &Sender<BatchEvent>,
) -> Result<BatchSummary> {
    run(input_dir, output_dir, models, source, options, Some(events))
}

fn run(
    input_dir: &Path,
    output_dir: &Path,
    models: &Models,
    source: &dyn SpanSource,
    options: &BatchOptions,
    events: Option<&Sender<BatchEvent>>,
) -> Result<BatchSummary> {
    let files = collect_pdfs(input_dir)?;
    fs::create_dir_all(output_dir)?;

    log::info!(
        "Processing {} documents from {} ({})",
        files.len(),
        input_dir.display(),
        if options.parallel { "parallel" } else { "sequential" }
    );
    notify(events, BatchEvent::Started { total: files.len() });

    let process = |path: &PathBuf| -> Option<DocumentFailure> {
        let outcome = process_one(path, output_dir, models, source, options);
        let event = match &outcome {
            Ok(entries) => BatchEvent::Completed {
                path: path.clone(),
                entries: *entries,
            },
            Err(reason) => BatchEvent::Failed {
                path: path.clone(),
                reason: reason.clone(),
            },
        };
        notify(events, event);
        outcome.err().map(|reason| DocumentFailure {
            path: path.clone(),
            reason,
        })
    };

    let outcomes: Vec<Option<DocumentFailure>> = if options.parallel {
        files.par_iter().map(process).collect()
    } else {
        files.iter().map(process).collect()
    };

    let failures: Vec<DocumentFailure> = outcomes.into_iter().flatten().collect();
    let summary = BatchSummary {
        total: files.len(),
        succeeded: files.len() - failures.len(),
        failures,
    };

    log::info!(
        "Batch finished: {} succeeded, {} failed",
        summary.succeeded,
        summary.failed()
    );

    Ok(summary)
}

/// Extract and write one document. Returns the entry count or a failure reason.
///
/// The output file is written even when extraction fails or panics.
fn process_one(
    path: &Path,
    output_dir: &Path,
    models: &Models,
    source: &dyn SpanSource,
    options: &BatchOptions,
) -> std::result::Result<usize, String> {
    // Malformed PDFs can panic inside lopdf; contain it to this document.
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
        process_document(path, models, source, &options.extract)
    }));
    let (result, failure) = match outcome {
        Ok(Ok(result)) => (result, None),
        Ok(Err(e)) => {
            log::warn!("Failed to process {}: {}", path.display(), e);
            (ExtractionResult::empty(), Some(e.to_string()))
        }
        Err(payload) => {
            let reason = format!("panicked: {}", panic_message(payload.as_ref()));
            log::warn!("Failed to process {}: {}", path.display(), reason);
            (ExtractionResult::empty(), Some(reason))
        }
    };

    let target = output_path(output_dir, path);
    let written = to_json(&result, options.format)
        .and_then(|json| fs::write(&target, json).map_err(Into::into));
    if let Err(e) = written {
        log::warn!("Failed to write {}: {}", target.display(), e);
        return Err(failure.unwrap_or_else(|| e.to_string()));
    }

    match failure {
        Some(reason) => Err(reason),
        None => {
            log::debug!(
                "Wrote {} ({} entries)",
                target.display(),
                result.outline.len()
            );
            Ok(result.outline.len())
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message
    } else {
        "unknown panic"
    }
}

fn notify(events: Option<&Sender<BatchEvent>>, event: BatchEvent) {
    if let Some(tx) = events {
        let _ = tx.send(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_path() {
        let out = output_path(Path::new("/out"), Path::new("/in/report.final.PDF"));
        assert_eq!(out, PathBuf::from("/out/report.final.json"));
    }

    #[test]
    fn test_collect_pdfs_sorted_and_filtered() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["b.pdf", "A.PDF", "c.txt", "d.pdf.bak"] {
            fs::write(dir.path().join(name), b"x").unwrap();
        }
        fs::create_dir(dir.path().join("nested.pdf")).unwrap();

        let files = collect_pdfs(dir.path()).unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["A.PDF", "b.pdf"]);
    }

    #[test]
    fn test_batch_options_builder() {
        let options = BatchOptions::new()
            .sequential()
            .with_format(JsonFormat::Compact);
        assert!(!options.parallel);
        assert_eq!(options.format, JsonFormat::Compact);
        assert!(BatchOptions::default().parallel);
    }

    #[test]
    fn test_panic_message() {
        let payload: Box<dyn Any + Send> = Box::new("bad xref");
        assert_eq!(panic_message(payload.as_ref()), "bad xref");
        let payload: Box<dyn Any + Send> = Box::new(String::from("bad trailer"));
        assert_eq!(panic_message(payload.as_ref()), "bad trailer");
        let payload: Box<dyn Any + Send> = Box::new(7u8);
        assert_eq!(panic_message(payload.as_ref()), "unknown panic");
    }

    #[test]
    fn test_summary_counts() {
        let summary = BatchSummary {
            total: 2,
            succeeded: 1,
            failures: vec![DocumentFailure {
                path: PathBuf::from("bad.pdf"),
                reason: "Invalid PDF structure".to_string(),
            }],
        };
        assert_eq!(summary.failed(), 1);
        assert!(!summary.is_success());
    }
}
