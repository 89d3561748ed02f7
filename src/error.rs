//! Error types for pdf-outline.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for pdf-outline operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur during outline extraction.
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

    /// A classification artifact could not be loaded.
    ///
    /// This is fatal: no document may be processed without both models.
    #[error("Failed to load model artifact {}: {reason}", path.display())]
    ModelLoad {
        /// Artifact path
        path: PathBuf,
        /// What went wrong
        reason: String,
    },

    /// A caller handed the pipeline input it must never see (e.g. an empty unit).
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// A classifier returned output that does not fit its vocabulary.
    #[error("Classification error: {0}")]
    Classification(String),

    /// Error during rendering (JSON).
    #[error("Rendering error: {0}")]
    Render(String),
}

impl Error {
    /// Build a model loading error for `path`.
    pub fn model_load(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Error::ModelLoad {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Whether this error stops the whole run rather than a single document.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Error::ModelLoad { .. })
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
