//! # pdf-outline
//!
//! Heuristic outline extraction for PDF documents.
//!
//! Reads the text and layout of each page, classifies lines as headings with
//! pattern families and weighted layout signals, and produces a title plus
//! an H1/H2/H3 outline with 1-based page numbers.
//!
//! ## Quick Start
//!
//! ```no_run
//! use pdf_outline::{extract_outline_from_file, render};
//!
//! fn main() -> pdf_outline::Result<()> {
//!     let outline = extract_outline_from_file("document.pdf")?;
//!     println!("{}", render::to_json(&outline, render::JsonFormat::Pretty)?);
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **Pattern families**: numbered, semantic, question and font-only headings
//! - **Adaptive threshold**: per-document acceptance computed in closed form
//! - **Form detection**: fillable forms produce an empty outline
//! - **Batch processing**: directories of PDFs in parallel with Rayon
//! - **Tunable**: every weight and threshold is JSON configuration

pub mod batch;
pub mod detect;
pub mod error;
pub mod heading;
pub mod model;
pub mod parser;
pub mod render;

// Re-export commonly used types
pub use batch::{BatchOptions, BatchProcessor, BatchSummary, FileOutcome};
pub use detect::{is_pdf_bytes, sniff_bytes, sniff_path, PdfHeader};
pub use error::{Error, Result};
pub use heading::{DocumentStatus, Inspection, OutlineConfig, OutlinePipeline, OutlineReport};
pub use model::{HeadingLevel, Line, Outline, OutlineEntry, PageSpans, Span};
pub use parser::{
    ErrorMode, LopdfProvider, MemoryProvider, PageSelection, PageTextProvider, ParseOptions,
};
pub use render::JsonFormat;

use std::io::Read;
use std::path::Path;

/// Extract the outline of a PDF file.
///
/// Unreadable files yield an empty outline titled with the file name.
///
/// # Example
///
/// ```no_run
/// use pdf_outline::extract_outline_from_file;
///
/// let outline = extract_outline_from_file("report.pdf").unwrap();
/// for entry in &outline.entries {
///     println!("{} {} (p. {})", entry.level, entry.text, entry.page);
/// }
/// ```
pub fn extract_outline_from_file<P: AsRef<Path>>(path: P) -> Result<Outline> {
    OutlineExtractor::new()
        .extract_file(path)
        .map(|r| r.outline)
}

/// Extract the outline of a PDF held in memory.
pub fn extract_outline_from_bytes(data: &[u8]) -> Result<Outline> {
    OutlineExtractor::new()
        .extract_bytes(data)
        .map(|r| r.outline)
}

/// Extract the outline of a PDF read from a reader.
pub fn extract_outline_from_reader<R: Read>(reader: R) -> Result<Outline> {
    OutlineExtractor::new()
        .extract_reader(reader)
        .map(|r| r.outline)
}

/// Extract the outline of a PDF file as JSON.
///
/// # Example
///
/// ```no_run
/// use pdf_outline::{to_json, JsonFormat};
///
/// let json = to_json("report.pdf", JsonFormat::Pretty).unwrap();
/// std::fs::write("report.json", json).unwrap();
/// ```
pub fn to_json<P: AsRef<Path>>(path: P, format: JsonFormat) -> Result<String> {
    let outline = extract_outline_from_file(path)?;
    render::to_json(&outline, format)
}

/// Builder for extracting outlines.
///
/// # Example
///
/// ```no_run
/// use pdf_outline::{OutlineConfig, OutlineExtractor, PageSelection};
///
/// let report = OutlineExtractor::new()
///     .strict()
///     .with_pages(PageSelection::Range(1..=10))
///     .with_config(OutlineConfig::from_file("weights.json")?)
///     .extract_file("document.pdf")?;
/// println!("{} headings", report.outline.len());
/// # Ok::<(), pdf_outline::Error>(())
/// ```
pub struct OutlineExtractor {
    parse_options: ParseOptions,
    pipeline: OutlinePipeline,
}

impl OutlineExtractor {
    /// Create a lenient extractor with the default configuration.
    pub fn new() -> Self {
        Self {
            parse_options: ParseOptions::default(),
            pipeline: OutlinePipeline::default(),
        }
    }

    /// Return an empty outline for unreadable documents (default).
    pub fn lenient(mut self) -> Self {
        self.parse_options = self.parse_options.lenient();
        self
    }

    /// Fail with [`Error::DocumentUnreadable`] for unreadable documents.
    pub fn strict(mut self) -> Self {
        self.parse_options = self.parse_options.strict();
        self
    }

    /// Replace the heading configuration.
    pub fn with_config(mut self, config: OutlineConfig) -> Self {
        self.pipeline = OutlinePipeline::new(config);
        self
    }

    /// Only read the selected pages.
    pub fn with_pages(mut self, pages: PageSelection) -> Self {
        self.parse_options = self.parse_options.with_pages(pages);
        self
    }

    /// Replace the parse options.
    pub fn with_parse_options(mut self, options: ParseOptions) -> Self {
        self.parse_options = options;
        self
    }

    pub fn parse_options(&self) -> &ParseOptions {
        &self.parse_options
    }

    pub fn config(&self) -> &OutlineConfig {
        self.pipeline.config()
    }

    /// Extract the outline of a PDF file.
    pub fn extract_file<P: AsRef<Path>>(&self, path: P) -> Result<OutlineReport> {
        let path = path.as_ref();
        let result = LopdfProvider::open_with_options(path, self.parse_options.clone())
            .and_then(|provider| self.pipeline.run(&provider, Some(path)));
        self.settle(result, Some(path))
    }

    /// Extract the outline of a PDF held in memory.
    pub fn extract_bytes(&self, data: &[u8]) -> Result<OutlineReport> {
        let result = LopdfProvider::from_bytes_with_options(data, self.parse_options.clone())
            .and_then(|provider| self.pipeline.run(&provider, None));
        self.settle(result, None)
    }

    /// Extract the outline of a PDF read from a reader.
    pub fn extract_reader<R: Read>(&self, reader: R) -> Result<OutlineReport> {
        let result = LopdfProvider::from_reader(reader, self.parse_options.clone())
            .and_then(|provider| self.pipeline.run(&provider, None));
        self.settle(result, None)
    }

    /// Extract the outline from any page text provider.
    ///
    /// `source` names the document for the fallback title.
    pub fn extract_provider<P: PageTextProvider + ?Sized>(
        &self,
        provider: &P,
        source: Option<&Path>,
    ) -> Result<OutlineReport> {
        let result = self.pipeline.run(provider, source);
        self.settle(result, source)
    }

    /// Show the heading decisions for every line of a PDF file.
    pub fn inspect_file<P: AsRef<Path>>(&self, path: P) -> Result<Inspection> {
        let provider = LopdfProvider::open_with_options(path, self.parse_options.clone())
            .map_err(Error::into_unreadable)?;
        self.pipeline
            .inspect(&provider)
            .map_err(Error::into_unreadable)
    }

    fn settle(&self, result: Result<OutlineReport>, source: Option<&Path>) -> Result<OutlineReport> {
        match result {
            Err(e) if e.is_source_error() => {
                if self.parse_options.is_lenient() {
                    let name = source
                        .map(|p| p.display().to_string())
                        .unwrap_or_else(|| "<memory>".to_string());
                    log::warn!("{}: unreadable, emitting empty outline: {}", name, e);
                    Ok(OutlineReport::unreadable(source))
                } else {
                    Err(e.into_unreadable())
                }
            }
            other => other,
        }
    }
}

impl Default for OutlineExtractor {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_garbage_bytes_lenient() {
        let report = OutlineExtractor::new()
            .extract_bytes(b"this is not a pdf")
            .unwrap();
        assert_eq!(report.status, DocumentStatus::Unreadable);
        assert_eq!(report.outline.title, heading::UNTITLED);
        assert!(report.outline.is_empty());
    }

    #[test]
    fn test_garbage_bytes_strict() {
        let result = OutlineExtractor::new()
            .strict()
            .extract_bytes(b"this is not a pdf");
        assert!(matches!(result, Err(Error::DocumentUnreadable(_))));
    }

    #[test]
    fn test_missing_file_uses_stem() {
        let report = OutlineExtractor::new()
            .extract_file("/nonexistent/dir/annual-report.pdf")
            .unwrap();
        assert_eq!(report.status, DocumentStatus::Unreadable);
        assert_eq!(report.outline.title, "annual-report");
    }

    #[test]
    fn test_memory_provider() {
        let mut page = PageSpans::letter(0);
        page.push(Span::new(
            "1. Introduction",
            18.0,
            "Helvetica-Bold",
            model::BBox::new(72.0, 72.0, 207.0, 90.0),
            0,
        ));
        let report = OutlineExtractor::new()
            .extract_provider(&MemoryProvider::new(vec![page]), None)
            .unwrap();
        assert_eq!(report.status, DocumentStatus::Ok);
    }
}
