//! Error types for pen2pdf.

use std::io;
use thiserror::Error;

/// Result type alias for pen2pdf operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while exporting or rendering notebooks.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error when reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The notebook archive could not be read.
    #[error("Archive error: {0}")]
    Archive(String),

    /// A background image could not be decoded.
    #[error("Image error: {0}")]
    Image(String),

    /// The output PDF could not be assembled or written.
    #[error("PDF error: {0}")]
    Pdf(String),

    /// Device metadata is not well-formed XML.
    #[error("XML error: {0}")]
    Xml(String),

    /// A stroke event stream could not be decoded.
    #[error("Stroke decoding error at line {line}: {message}")]
    Decode {
        /// 1-indexed line of the event stream (0 when not line-based)
        line: usize,
        /// Description of the failure
        message: String,
    },

    /// No candidate product id produced a device session.
    #[error("No smartpen found (tried {}): {source}", format_product_ids(.tried))]
    DeviceNotFound {
        /// Product ids tried, in order
        tried: Vec<u16>,
        /// Failure reported for the last candidate
        source: Box<Error>,
    },

    /// The device session reported a failure.
    #[error("Device error: {0}")]
    Device(String),

    /// A page has no background image at its paired index.
    #[error("Page {page} has no background image at index {index}")]
    MissingBackground {
        /// 1-indexed page number
        page: usize,
        /// Background index the page was paired with
        index: usize,
    },

    /// The input is not a zip archive.
    #[error("Unknown format: not a notebook archive")]
    UnknownFormat,

    /// The archive contains no page entries.
    #[error("Notebook contains no pages")]
    EmptyNotebook,

    /// An option value is out of range or malformed.
    #[error("Invalid option: {0}")]
    InvalidOption(String),

    /// Generic error with message.
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Build a decode error that is not tied to a line.
    pub fn decode(message: impl Into<String>) -> Self {
        Error::Decode {
            line: 0,
            message: message.into(),
        }
    }
}

fn format_product_ids(ids: &[u16]) -> String {
    ids.iter()
        .map(|id| format!("{:#06x}", id))
        .collect::<Vec<_>>()
        .join(", ")
}

impl From<zip::result::ZipError> for Error {
    fn from(err: zip::result::ZipError) -> Self {
        match err {
            zip::result::ZipError::Io(e) => Error::Io(e),
            _ => Error::Archive(err.to_string()),
        }
    }
}

impl From<image::ImageError> for Error {
    fn from(err: image::ImageError) -> Self {
        match err {
            image::ImageError::IoError(e) => Error::Io(e),
            _ => Error::Image(err.to_string()),
        }
    }
}

impl From<lopdf::Error> for Error {
    fn from(err: lopdf::Error) -> Self {
        match err {
            lopdf::Error::IO(e) => Error::Io(e),
            _ => Error::Pdf(err.to_string()),
        }
    }
}

impl From<roxmltree::Error> for Error {
    fn from(err: roxmltree::Error) -> Self {
        Error::Xml(err.to_string())
    }
}
