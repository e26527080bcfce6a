//! Notebook archive detection.

use crate::error::{Error, Result};
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Kind of zip container found at the start of a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveKind {
    /// Archive with at least one local file header
    Zip,
    /// Archive holding only an end-of-central-directory record
    EmptyZip,
}

impl std::fmt::Display for ArchiveKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ArchiveKind::Zip => write!(f, "zip archive"),
            ArchiveKind::EmptyZip => write!(f, "empty zip archive"),
        }
    }
}

const LOCAL_HEADER_MAGIC: &[u8] = b"PK\x03\x04";
const END_OF_DIRECTORY_MAGIC: &[u8] = b"PK\x05\x06";
const MAGIC_LEN: usize = 4;

/// Detect the archive kind of a file.
///
/// # Example
/// ```no_run
/// use pen2pdf::detect::detect_archive_from_path;
///
/// let kind = detect_archive_from_path("Notebook.zip").unwrap();
/// println!("{}", kind);
/// ```
pub fn detect_archive_from_path<P: AsRef<Path>>(path: P) -> Result<ArchiveKind> {
    let mut file = File::open(path)?;
    let mut header = [0u8; MAGIC_LEN];
    let mut read = 0;
    while read < MAGIC_LEN {
        let n = file.read(&mut header[read..])?;
        if n == 0 {
            break;
        }
        read += n;
    }
    detect_archive_from_bytes(&header[..read])
}

/// Detect the archive kind from the leading bytes of a file.
///
/// Returns [`Error::UnknownFormat`] when the data does not start with a zip
/// signature.
pub fn detect_archive_from_bytes(data: &[u8]) -> Result<ArchiveKind> {
    if data.len() < MAGIC_LEN {
        return Err(Error::UnknownFormat);
    }
    if data.starts_with(LOCAL_HEADER_MAGIC) {
        Ok(ArchiveKind::Zip)
    } else if data.starts_with(END_OF_DIRECTORY_MAGIC) {
        Ok(ArchiveKind::EmptyZip)
    } else {
        Err(Error::UnknownFormat)
    }
}

/// Check whether a file looks like a notebook archive.
pub fn is_notebook_archive<P: AsRef<Path>>(path: P) -> bool {
    detect_archive_from_path(path).is_ok()
}
