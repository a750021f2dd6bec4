//! Error types for wrextract.

use std::io;
use thiserror::Error;

/// Result type alias for wrextract operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while extracting and organizing reports.
///
/// Only extraction failures are fatal. A report that does not match the
/// expected template never produces an error; the organizer returns a
/// partially populated structure instead.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error when reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The input is not recognized as PDF.
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

    /// Error extracting the text layer of a page.
    #[error("Text extraction error: {0}")]
    TextExtract(String),

    /// Error during JSON rendering.
    #[error("Rendering error: {0}")]
    Render(String),

    /// A stored JSON document could not be read back.
    #[error("Invalid document: {0}")]
    InvalidDocument(String),

    /// The file name collides with a name reserved in the output folder.
    #[error("'{0}' uses a reserved file name")]
    ReservedName(String),

    /// Generic error with message.
    #[error("{0}")]
    Other(String),
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
