//! Error types for pdf-outline.

use std::io;
use thiserror::Error;

/// Result type alias for pdf-outline operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while extracting an outline.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error when reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The file format is not recognized as PDF.
    #[error("Unknown file format: not a valid PDF")]
    UnknownFormat,

    /// The PDF version is not supported.
    #[error("Unsupported PDF version: {0}")]
    UnsupportedVersion(String),

    /// Error parsing PDF structure.
    #[error("PDF parsing error: {0}")]
    PdfParse(String),

    /// The PDF document is encrypted.
    #[error("Document is encrypted")]
    Encrypted,

    /// Page number is out of range.
    #[error("Page {0} is out of range (document has {1} pages)")]
    PageOutOfRange(u32, u32),

    /// The source could not be opened or decoded by the page text provider.
    #[error("Document unreadable: {0}")]
    DocumentUnreadable(String),

    /// A heading candidate violated its invariants after scoring.
    #[error("Malformed heading candidate: {0}")]
    MalformedCandidate(String),

    /// Outline configuration could not be loaded or is out of range.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Error while rendering the outline.
    #[error("Rendering error: {0}")]
    Render(String),
}

impl Error {
    /// Whether this error comes from the page text provider rather than the
    /// heading pipeline itself.
    pub fn is_source_error(&self) -> bool {
        matches!(
            self,
            Error::Io(_)
                | Error::UnknownFormat
                | Error::UnsupportedVersion(_)
                | Error::PdfParse(_)
                | Error::Encrypted
                | Error::PageOutOfRange(..)
                | Error::DocumentUnreadable(_)
        )
    }

    /// Fold provider-level failures into [`Error::DocumentUnreadable`].
    pub fn into_unreadable(self) -> Self {
        match self {
            Error::DocumentUnreadable(_) => self,
            e if e.is_source_error() => Error::DocumentUnreadable(e.to_string()),
            e => e,
        }
    }
}

impl From<lopdf::Error> for Error {
    fn from(err: lopdf::Error) -> Self {
        match err {
            lopdf::Error::IO(e) => Error::Io(e),
            lopdf::Error::Decryption(_) => Error::Encrypted,
            _ => Error::PdfParse(err.to_string()),
        }
    }
}
