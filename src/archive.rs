//! Notebook archive access.
//!
//! A notebook arrives from the device as a zip archive. Stroke pages and
//! background images are told apart by entry name; every other entry is
//! ignored.

use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::Path;

use regex::Regex;

use crate::error::{Error, Result};

/// Default pattern for stroke page entries: `data/<a>/<b>/<page>.stf`.
pub const DEFAULT_PAGE_PATTERN: &str = r"^data/[^/]+/[^/]+/[^/]+\.stf$";

/// Default pattern for background page images.
pub const DEFAULT_BACKGROUND_PATTERN: &str = r"^userdata/lsac_data/[^/]+\.png$";

/// Name patterns selecting page and background entries.
#[derive(Debug, Clone)]
pub struct EntryPatterns {
    page: Regex,
    background: Regex,
}

impl EntryPatterns {
    /// Build patterns from regular expressions.
    pub fn new(page: &str, background: &str) -> Result<Self> {
        let page = Regex::new(page)
            .map_err(|e| Error::InvalidOption(format!("page pattern: {}", e)))?;
        let background = Regex::new(background)
            .map_err(|e| Error::InvalidOption(format!("background pattern: {}", e)))?;
        Ok(Self { page, background })
    }

    /// Whether `name` is a stroke page entry.
    pub fn is_page(&self, name: &str) -> bool {
        self.page.is_match(name)
    }

    /// Whether `name` is a background image entry.
    pub fn is_background(&self, name: &str) -> bool {
        self.background.is_match(name)
    }

    /// Split a listing into page and background entries, sorted by name.
    pub fn classify<'a, I>(&self, names: I) -> ArchiveLayout
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut names: Vec<&str> = names.into_iter().collect();
        names.sort_unstable();

        let mut layout = ArchiveLayout::default();
        for name in names {
            if self.is_page(name) {
                layout.pages.push(name.to_string());
            } else if self.is_background(name) {
                layout.backgrounds.push(name.to_string());
            }
        }
        layout
    }
}

impl Default for EntryPatterns {
    fn default() -> Self {
        Self {
            page: Regex::new(DEFAULT_PAGE_PATTERN).expect("valid page pattern"),
            background: Regex::new(DEFAULT_BACKGROUND_PATTERN).expect("valid background pattern"),
        }
    }
}

/// Page period of background images: recto and verso alternate.
pub const BACKGROUND_PERIOD: usize = 2;

/// Sorted page and background entries of one archive.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArchiveLayout {
    /// Stroke page entry names
    pub pages: Vec<String>,
    /// Background image entry names
    pub backgrounds: Vec<String>,
}

impl ArchiveLayout {
    /// Number of pages.
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Background index paired with the 0-based page index.
    pub fn background_index(page_index: usize) -> usize {
        page_index % BACKGROUND_PERIOD
    }

    /// Background entry paired with the 0-based page index, if present.
    pub fn background_for(&self, page_index: usize) -> Option<&str> {
        self.backgrounds
            .get(Self::background_index(page_index))
            .map(String::as_str)
    }
}

/// A read-only notebook archive.
pub struct NotebookArchive<R> {
    zip: zip::ZipArchive<R>,
}

impl NotebookArchive<BufReader<File>> {
    /// Open an archive file.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        Self::from_reader(BufReader::new(file))
    }
}

impl<R: Read + Seek> NotebookArchive<R> {
    /// Read an archive from any seekable reader.
    pub fn from_reader(reader: R) -> Result<Self> {
        let zip = zip::ZipArchive::new(reader)?;
        Ok(Self { zip })
    }

    /// Number of entries, including ones that are neither pages nor backgrounds.
    pub fn len(&self) -> usize {
        self.zip.len()
    }

    /// Whether the archive has no entries.
    pub fn is_empty(&self) -> bool {
        self.zip.len() == 0
    }

    /// All entry names, sorted.
    pub fn entry_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.zip.file_names().map(str::to_string).collect();
        names.sort_unstable();
        names
    }

    /// Page and background entries selected by `patterns`.
    pub fn layout(&self, patterns: &EntryPatterns) -> ArchiveLayout {
        patterns.classify(self.zip.file_names())
    }

    /// Open an entry for streaming.
    pub fn open_entry(&mut self, name: &str) -> Result<impl Read + '_> {
        Ok(self.zip.by_name(name)?)
    }

    /// Read an entry into memory.
    pub fn read_entry(&mut self, name: &str) -> Result<Vec<u8>> {
        let mut entry = self.zip.by_name(name)?;
        let mut data = Vec::with_capacity(entry.size() as usize);
        entry.read_to_end(&mut data)?;
        Ok(data)
    }
}
