//! # pen2pdf
//!
//! Turns smartpen notebook archives into PDF documents.
//!
//! A notebook archive is a zip file holding one stroke data entry per page
//! plus the background images of the notebook paper. Each page is drawn on
//! its background with one stroked path per pen stroke, and captioned with
//! the time range during which it was written.
//!
//! ## Quick Start
//!
//! ```no_run
//! use pen2pdf::{convert_archive, JsonLinesDecoder, RenderOptions};
//!
//! fn main() -> pen2pdf::Result<()> {
//!     let decoder = JsonLinesDecoder::new();
//!     let pdf = convert_archive("Notebook.zip", &decoder, RenderOptions::default())?;
//!     println!("wrote {}", pdf.display());
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **Pluggable stroke decoding**: JSON-lines events or any external decoder program
//! - **Pressure-weighted strokes**: line width follows pen pressure per segment
//! - **Shared backgrounds**: each background image is embedded once per document
//! - **Time captions**: pages are stamped with their writing time range
//! - **Device export**: fetch and convert every notebook of a pen session

pub mod archive;
pub mod detect;
pub mod device;
pub mod error;
pub mod model;
pub mod render;
pub mod stroke;

// Re-export commonly used types
pub use archive::{ArchiveLayout, EntryPatterns, NotebookArchive};
pub use detect::{detect_archive_from_bytes, detect_archive_from_path, ArchiveKind};
pub use device::{
    connect_any, export_notebooks, Connector, DeviceSession, ExportOptions, ExportedNotebook,
    MirrorConnector, PRODUCT_IDS,
};
pub use error::{Error, Result};
pub use model::{DeviceInfo, NotebookEntry, Path, Point, TimeOrigin, TimeRange};
pub use render::{
    output_path_for, BackgroundPolicy, CanvasSize, CaptionOptions, CaptionTimezone, JsonFormat,
    NotebookRenderer, PageSummary, PressureCurve, RenderEvent, RenderOptions, RenderedNotebook,
    Rgb,
};
pub use stroke::{
    ExternalDecoder, JsonLinesDecoder, StrokeDecoder, StrokeEvent, StrokeHandler,
};

use std::path::PathBuf;

/// Render a notebook archive file without a time origin.
///
/// Captions carry page labels only.
///
/// # Example
///
/// ```no_run
/// use pen2pdf::{render_file, JsonLinesDecoder, RenderOptions};
///
/// let decoder = JsonLinesDecoder::new();
/// let notebook = render_file("Notebook.zip", &decoder, RenderOptions::default()).unwrap();
/// println!("Pages: {}", notebook.page_count());
/// ```
pub fn render_file<P: AsRef<std::path::Path>>(
    path: P,
    decoder: &dyn StrokeDecoder,
    options: RenderOptions,
) -> Result<RenderedNotebook> {
    NotebookRenderer::new(decoder, options).render_file(path, None, None)
}

/// Render a notebook archive from bytes.
pub fn render_bytes(
    data: &[u8],
    decoder: &dyn StrokeDecoder,
    options: RenderOptions,
) -> Result<RenderedNotebook> {
    detect_archive_from_bytes(data)?;
    let mut archive = NotebookArchive::from_reader(std::io::Cursor::new(data))?;
    NotebookRenderer::new(decoder, options).render(&mut archive, None, None)
}

/// Render an archive and write the PDF next to it.
///
/// `Title.zip` becomes `Title.pdf`. Returns the path written.
pub fn convert_archive<P: AsRef<std::path::Path>>(
    path: P,
    decoder: &dyn StrokeDecoder,
    options: RenderOptions,
) -> Result<PathBuf> {
    Pen2Pdf::new(decoder).with_options(options).convert(path)
}

/// Builder for converting notebook archives.
///
/// # Example
///
/// ```no_run
/// use pen2pdf::{Pen2Pdf, JsonLinesDecoder, TimeOrigin};
///
/// let decoder = JsonLinesDecoder::new();
/// let pdf = Pen2Pdf::new(&decoder)
///     .with_title("Lecture Notes")
///     .with_origin(TimeOrigin::from_device_clock(3_600_000, chrono::Utc::now()))
///     .without_captions()
///     .convert("Lecture Notes.zip")?;
/// # Ok::<(), pen2pdf::Error>(())
/// ```
pub struct Pen2Pdf<'a> {
    decoder: &'a dyn StrokeDecoder,
    options: RenderOptions,
    origin: Option<TimeOrigin>,
    title: Option<String>,
    output: Option<PathBuf>,
}

impl<'a> Pen2Pdf<'a> {
    /// Create a builder decoding pages with `decoder`.
    pub fn new(decoder: &'a dyn StrokeDecoder) -> Self {
        Self {
            decoder,
            options: RenderOptions::default(),
            origin: None,
            title: None,
            output: None,
        }
    }

    /// Replace the rendering options.
    pub fn with_options(mut self, options: RenderOptions) -> Self {
        self.options = options;
        self
    }

    /// Anchor caption times to a device time origin.
    pub fn with_origin(mut self, origin: TimeOrigin) -> Self {
        self.origin = Some(origin);
        self
    }

    /// Set the document title used for page labels and PDF metadata.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Write the PDF to `path` instead of next to the archive.
    pub fn with_output(mut self, path: impl Into<PathBuf>) -> Self {
        self.output = Some(path.into());
        self
    }

    /// Disable page captions.
    pub fn without_captions(mut self) -> Self {
        self.options = self.options.with_captions(false);
        self
    }

    /// Fail on pages whose background is missing.
    pub fn strict_backgrounds(mut self) -> Self {
        self.options = self
            .options
            .with_background_policy(BackgroundPolicy::Fail);
        self
    }

    /// Render an archive file.
    pub fn render<P: AsRef<std::path::Path>>(&self, path: P) -> Result<RenderedNotebook> {
        NotebookRenderer::new(self.decoder, self.options.clone()).render_file(
            path,
            self.origin.as_ref(),
            self.title.as_deref(),
        )
    }

    /// Render an archive file and save the PDF. Returns the path written.
    pub fn convert<P: AsRef<std::path::Path>>(&self, path: P) -> Result<PathBuf> {
        let path = path.as_ref();
        let mut notebook = self.render(path)?;
        let output = self
            .output
            .clone()
            .unwrap_or_else(|| output_path_for(path));
        notebook.save(&output)?;
        log::info!(
            "wrote {} ({} pages)",
            output.display(),
            notebook.page_count()
        );
        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ==================== Builder Pattern Tests ====================

    #[test]
    fn test_builder_defaults() {
        let decoder = JsonLinesDecoder::new();
        let builder = Pen2Pdf::new(&decoder);
        assert!(builder.origin.is_none());
        assert!(builder.title.is_none());
        assert!(builder.options.caption.enabled);
    }

    #[test]
    fn test_builder_chained() {
        let decoder = JsonLinesDecoder::new();
        let builder = Pen2Pdf::new(&decoder)
            .with_title("Notes")
            .with_output("out.pdf")
            .without_captions()
            .strict_backgrounds();

        assert_eq!(builder.title.as_deref(), Some("Notes"));
        assert_eq!(builder.output, Some(PathBuf::from("out.pdf")));
        assert!(!builder.options.caption.enabled);
        assert_eq!(builder.options.background_policy, BackgroundPolicy::Fail);
    }

    // ==================== Edge Case Tests ====================

    #[test]
    fn test_render_bytes_empty_data() {
        let decoder = JsonLinesDecoder::new();
        let result = render_bytes(&[], &decoder, RenderOptions::default());
        assert!(matches!(result, Err(Error::UnknownFormat)));
    }

    #[test]
    fn test_render_bytes_not_zip() {
        let decoder = JsonLinesDecoder::new();
        let result = render_bytes(b"%PDF-1.5\n", &decoder, RenderOptions::default());
        assert!(matches!(result, Err(Error::UnknownFormat)));
    }

    #[test]
    fn test_render_bytes_truncated_zip() {
        let decoder = JsonLinesDecoder::new();
        let result = render_bytes(b"PK\x03\x04garbage", &decoder, RenderOptions::default());
        assert!(result.is_err());
    }

    #[test]
    fn test_render_file_missing() {
        let decoder = JsonLinesDecoder::new();
        let result = render_file("/nonexistent/notebook.zip", &decoder, RenderOptions::default());
        assert!(matches!(result, Err(Error::Io(_))));
    }
}
