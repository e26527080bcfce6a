//! Renders a whole notebook archive to one PDF document.

use std::collections::HashMap;
use std::io::{Read, Seek};
use std::path::{Path, PathBuf};

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use super::background::BackgroundImage;
use super::caption::page_label;
use super::compositor::PageCompositor;
use super::writer::{ImageRef, PdfWriter};
use super::{BackgroundPolicy, RenderOptions};
use crate::archive::{ArchiveLayout, NotebookArchive, BACKGROUND_PERIOD};
use crate::error::{Error, Result};
use crate::model::{TimeOrigin, TimeRange};
use crate::stroke::StrokeDecoder;

/// Summary of one rendered page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageSummary {
    /// 1-indexed page number
    pub number: usize,
    /// Archive entry holding the page's strokes
    pub entry: String,
    /// Archive entry of the background drawn, if any
    pub background: Option<String>,
    /// Number of paths painted
    pub paths: usize,
    /// Recorded time range
    pub time_range: Option<TimeRange>,
    /// Caption drawn, if any
    pub caption: Option<String>,
}

/// Progress events emitted while rendering a notebook.
#[derive(Debug, Clone)]
pub enum RenderEvent {
    /// Rendering has started.
    NotebookStart {
        /// Number of pages to render
        page_count: usize,
    },

    /// A page has been appended to the document.
    PageRendered(PageSummary),

    /// All pages have been rendered.
    NotebookEnd,
}

/// A rendered notebook.
pub struct RenderedNotebook {
    /// The output PDF
    pub document: lopdf::Document,
    /// One summary per page, in document order
    pub pages: Vec<PageSummary>,
}

impl RenderedNotebook {
    /// Number of pages in the document.
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Write the PDF to `path`.
    pub fn save<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        self.document.save(path)?;
        Ok(())
    }

    /// Serialize the PDF to memory.
    pub fn to_bytes(&mut self) -> Result<Vec<u8>> {
        let mut buffer = Vec::new();
        self.document.save_to(&mut buffer)?;
        Ok(buffer)
    }
}

/// Output path for an archive: same location, `.pdf` extension.
pub fn output_path_for<P: AsRef<Path>>(archive: P) -> PathBuf {
    archive.as_ref().with_extension("pdf")
}

/// Drives page composition over a notebook archive.
pub struct NotebookRenderer<'a> {
    decoder: &'a dyn StrokeDecoder,
    options: RenderOptions,
}

impl<'a> NotebookRenderer<'a> {
    /// Create a renderer using `decoder` for page stroke data.
    pub fn new(decoder: &'a dyn StrokeDecoder, options: RenderOptions) -> Self {
        Self { decoder, options }
    }

    /// Rendering options in use.
    pub fn options(&self) -> &RenderOptions {
        &self.options
    }

    /// Render an archive.
    pub fn render<R: Read + Seek>(
        &self,
        archive: &mut NotebookArchive<R>,
        origin: Option<&TimeOrigin>,
        title: Option<&str>,
    ) -> Result<RenderedNotebook> {
        self.render_with_progress(archive, origin, title, |_| {})
    }

    /// Render an archive file.
    pub fn render_file<P: AsRef<Path>>(
        &self,
        path: P,
        origin: Option<&TimeOrigin>,
        title: Option<&str>,
    ) -> Result<RenderedNotebook> {
        let mut archive = NotebookArchive::open(path)?;
        self.render(&mut archive, origin, title)
    }

    /// Render an archive, reporting progress to `observer`.
    pub fn render_with_progress<R, F>(
        &self,
        archive: &mut NotebookArchive<R>,
        origin: Option<&TimeOrigin>,
        title: Option<&str>,
        mut observer: F,
    ) -> Result<RenderedNotebook>
    where
        R: Read + Seek,
        F: FnMut(&RenderEvent),
    {
        self.options.validate()?;

        let layout = archive.layout(&self.options.patterns);
        if layout.pages.is_empty() {
            return Err(Error::EmptyNotebook);
        }
        self.check_backgrounds(&layout)?;

        let total = layout.page_count();
        info!(
            "rendering {} pages with {} backgrounds using {} decoder",
            total,
            layout.backgrounds.len(),
            self.decoder.name()
        );
        observer(&RenderEvent::NotebookStart { page_count: total });

        let mut writer = PdfWriter::new(&self.options);
        let compositor = PageCompositor::new(&self.options, origin);
        let mut embedded: HashMap<usize, ImageRef> = HashMap::new();
        let mut pages = Vec::with_capacity(total);

        for (index, entry) in layout.pages.iter().enumerate() {
            let number = index + 1;
            let background = self.background(archive, &layout, index, &mut writer, &mut embedded)?;

            let label = page_label(title, number, total);
            let mut stream = archive.open_entry(entry)?;
            let composed =
                compositor.compose(&mut writer, background, self.decoder, &mut stream, Some(&label))?;
            drop(stream);

            debug!("page {}/{} from {}", number, total, entry);
            let summary = PageSummary {
                number,
                entry: entry.clone(),
                background: layout.background_for(index).map(str::to_string),
                paths: composed.strokes.painted,
                time_range: composed.strokes.time_range(),
                caption: composed.caption,
            };
            observer(&RenderEvent::PageRendered(summary.clone()));
            pages.push(summary);
        }

        let document = writer.finish(title);
        observer(&RenderEvent::NotebookEnd);
        Ok(RenderedNotebook { document, pages })
    }

    fn check_backgrounds(&self, layout: &ArchiveLayout) -> Result<()> {
        if layout.backgrounds.len() > BACKGROUND_PERIOD {
            warn!(
                "notebook has {} background images; only the first {} are used",
                layout.backgrounds.len(),
                BACKGROUND_PERIOD
            );
        }

        for index in 0..layout.page_count().min(BACKGROUND_PERIOD) {
            if layout.background_for(index).is_none() {
                let bg_index = ArchiveLayout::background_index(index);
                match self.options.background_policy {
                    BackgroundPolicy::Fail => {
                        return Err(Error::MissingBackground {
                            page: index + 1,
                            index: bg_index,
                        })
                    }
                    BackgroundPolicy::Blank => warn!(
                        "no background image at index {}; affected pages render blank",
                        bg_index
                    ),
                }
            }
        }
        Ok(())
    }

    /// Background for the page at `index`, embedding it on first use.
    fn background<'w, R: Read + Seek>(
        &self,
        archive: &mut NotebookArchive<R>,
        layout: &ArchiveLayout,
        index: usize,
        writer: &mut PdfWriter,
        embedded: &'w mut HashMap<usize, ImageRef>,
    ) -> Result<Option<&'w ImageRef>> {
        let bg_index = ArchiveLayout::background_index(index);
        let Some(entry) = layout.background_for(index) else {
            return Ok(None);
        };

        if !embedded.contains_key(&bg_index) {
            let data = archive.read_entry(entry)?;
            let image = BackgroundImage::decode(&data)?;
            debug!("embedding background {} ({}x{})", entry, image.width, image.height);
            embedded.insert(bg_index, writer.add_image(image));
        }
        Ok(embedded.get(&bg_index))
    }
}
