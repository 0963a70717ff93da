//! Batch extraction over many PDF files.
//!
//! Every file gets its own pipeline run and its own output file. A failure
//! in one file is recorded in its [`FileOutcome`] and never stops the batch.

use std::fs;
use std::path::{Path, PathBuf};

use rayon::prelude::*;

use crate::error::Result;
use crate::heading::{DocumentStatus, OutlineConfig};
use crate::parser::ParseOptions;
use crate::render::{write_json, JsonFormat};
use crate::OutlineExtractor;

/// Options for a batch run.
#[derive(Debug, Clone)]
pub struct BatchOptions {
    /// Directory receiving `<stem>.json` files; `None` writes
    /// `<stem>_outline.json` into the working directory
    pub output_dir: Option<PathBuf>,
    /// Process files in parallel
    pub parallel: bool,
    pub format: JsonFormat,
    pub parse: ParseOptions,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            output_dir: None,
            parallel: true,
            format: JsonFormat::Pretty,
            parse: ParseOptions::default(),
        }
    }
}

impl BatchOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Write outputs into `dir`.
    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = Some(dir.into());
        self
    }

    /// Process files one at a time.
    pub fn sequential(mut self) -> Self {
        self.parallel = false;
        self
    }

    pub fn with_format(mut self, format: JsonFormat) -> Self {
        self.format = format;
        self
    }

    pub fn with_parse_options(mut self, parse: ParseOptions) -> Self {
        self.parse = parse;
        self
    }
}

/// What happened to one input file.
#[derive(Debug, Clone)]
pub struct FileOutcome {
    pub input: PathBuf,
    /// Written JSON file, when writing succeeded
    pub output: Option<PathBuf>,
    pub title: Option<String>,
    pub heading_count: usize,
    pub status: Option<DocumentStatus>,
    pub error: Option<String>,
}

impl FileOutcome {
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

/// Aggregated result of a batch run.
#[derive(Debug, Clone, Default)]
pub struct BatchSummary {
    /// Outcomes in input order
    pub outcomes: Vec<FileOutcome>,
}

impl BatchSummary {
    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_success()).count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.succeeded()
    }

    pub fn total_headings(&self) -> usize {
        self.outcomes.iter().map(|o| o.heading_count).sum()
    }

    /// Outcomes that ended in an error.
    pub fn failures(&self) -> impl Iterator<Item = &FileOutcome> {
        self.outcomes.iter().filter(|o| !o.is_success())
    }
}

/// Runs outline extraction over a list of files.
pub struct BatchProcessor {
    options: BatchOptions,
    extractor: OutlineExtractor,
}

impl BatchProcessor {
    pub fn new(options: BatchOptions) -> Self {
        let extractor = OutlineExtractor::new().with_parse_options(options.parse.clone());
        Self { options, extractor }
    }

    /// Use a custom heading configuration.
    pub fn with_config(mut self, config: OutlineConfig) -> Self {
        self.extractor = self.extractor.with_config(config);
        self
    }

    pub fn options(&self) -> &BatchOptions {
        &self.options
    }

    /// Output file for an input path.
    pub fn output_path_for(&self, input: &Path) -> PathBuf {
        let stem = input
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "output".to_string());
        match &self.options.output_dir {
            Some(dir) => dir.join(format!("{}.json", stem)),
            None => PathBuf::from(format!("{}_outline.json", stem)),
        }
    }

    /// Process every input, isolating failures per file.
    pub fn process(&self, inputs: &[PathBuf]) -> BatchSummary {
        self.process_with(inputs, |_| {})
    }

    /// Like [`process`](Self::process), calling `on_done` after each file.
    ///
    /// `on_done` may run on several threads at once.
    pub fn process_with<F>(&self, inputs: &[PathBuf], on_done: F) -> BatchSummary
    where
        F: Fn(&FileOutcome) + Sync,
    {
        let run = |input: &PathBuf| {
            let outcome = self.process_one(input);
            on_done(&outcome);
            outcome
        };

        let outcomes: Vec<FileOutcome> = if self.options.parallel {
            inputs.par_iter().map(run).collect()
        } else {
            inputs.iter().map(run).collect()
        };

        let summary = BatchSummary { outcomes };
        log::info!(
            "Batch done: {} succeeded, {} failed, {} headings",
            summary.succeeded(),
            summary.failed(),
            summary.total_headings()
        );
        summary
    }

    /// Process a single file.
    pub fn process_one(&self, input: &Path) -> FileOutcome {
        let mut outcome = FileOutcome {
            input: input.to_path_buf(),
            output: None,
            title: None,
            heading_count: 0,
            status: None,
            error: None,
        };

        if !input.is_file() {
            log::warn!("{}: file not found", input.display());
            outcome.error = Some("file not found".to_string());
            return outcome;
        }

        let report = match self.extractor.extract_file(input) {
            Ok(report) => report,
            Err(e) => {
                log::warn!("{}: {}", input.display(), e);
                outcome.error = Some(e.to_string());
                return outcome;
            }
        };

        outcome.title = Some(report.outline.title.clone());
        outcome.heading_count = report.outline.len();
        outcome.status = Some(report.status);

        let output = self.output_path_for(input);
        match write_json(&report.outline, &output, self.options.format) {
            Ok(()) => outcome.output = Some(output),
            Err(e) => {
                log::warn!("{}: failed to write {}: {}", input.display(), output.display(), e);
                outcome.error = Some(e.to_string());
            }
        }
        outcome
    }
}

/// List the PDF files directly inside `dir`, sorted by path.
pub fn collect_pdfs<P: AsRef<Path>>(dir: P) -> Result<Vec<PathBuf>> {
    let mut files: Vec<PathBuf> = fs::read_dir(dir.as_ref())?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.is_file() && crate::detect::has_pdf_extension(p))
        .collect();
    files.sort();
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_paths() {
        let batch = BatchProcessor::new(BatchOptions::new().with_output_dir("out"));
        assert_eq!(
            batch.output_path_for(Path::new("in/report.pdf")),
            PathBuf::from("out/report.json")
        );

        let single = BatchProcessor::new(BatchOptions::new());
        assert_eq!(
            single.output_path_for(Path::new("/tmp/report.pdf")),
            PathBuf::from("report_outline.json")
        );
    }

    #[test]
    fn test_summary_counts() {
        let ok = FileOutcome {
            input: "a.pdf".into(),
            output: Some("a.json".into()),
            title: Some("A".into()),
            heading_count: 4,
            status: Some(DocumentStatus::Ok),
            error: None,
        };
        let failed = FileOutcome {
            input: "b.pdf".into(),
            output: None,
            title: None,
            heading_count: 0,
            status: None,
            error: Some("file not found".into()),
        };
        let summary = BatchSummary {
            outcomes: vec![ok, failed],
        };
        assert_eq!(summary.succeeded(), 1);
        assert_eq!(summary.failed(), 1);
        assert_eq!(summary.total_headings(), 4);
        assert_eq!(summary.failures().count(), 1);
    }

    #[test]
    fn test_missing_file_isolated() {
        let dir = tempfile::tempdir().unwrap();
        let batch = BatchProcessor::new(BatchOptions::new().with_output_dir(dir.path()).sequential());
        let summary = batch.process(&[dir.path().join("missing.pdf")]);
        assert_eq!(summary.failed(), 1);
        assert!(summary.outcomes[0].output.is_none());
    }
}
