//! Composes one PDF page from background art, strokes and a caption.

use std::io::Read;

use log::debug;

use super::caption::compose_caption;
use super::canvas::PageCanvas;
use super::path::{PageStrokes, PathBuilder};
use super::writer::{ImageRef, PdfWriter};
use super::RenderOptions;
use crate::error::Result;
use crate::model::TimeOrigin;
use crate::stroke::StrokeDecoder;

/// Result of composing one page.
#[derive(Debug, Clone, Default)]
pub struct ComposedPage {
    /// Stroke report of the page
    pub strokes: PageStrokes,
    /// Caption text drawn, if any
    pub caption: Option<String>,
}

/// Draws pages onto a [`PdfWriter`].
pub struct PageCompositor<'a> {
    options: &'a RenderOptions,
    origin: Option<&'a TimeOrigin>,
}

impl<'a> PageCompositor<'a> {
    /// Create a compositor. `origin` enables caption time ranges.
    pub fn new(options: &'a RenderOptions, origin: Option<&'a TimeOrigin>) -> Self {
        Self { options, origin }
    }

    /// Compose one page and append it to `writer`.
    ///
    /// The background is scaled to the canvas width, strokes decoded from
    /// `strokes` are painted over it and `label` (when captions are enabled)
    /// is set with the page's time range.
    pub fn compose(
        &self,
        writer: &mut PdfWriter,
        background: Option<&ImageRef>,
        decoder: &dyn StrokeDecoder,
        strokes: &mut dyn Read,
        label: Option<&str>,
    ) -> Result<ComposedPage> {
        let mut canvas = PageCanvas::new(self.options);

        if let Some(image) = background {
            canvas.draw_background(&image.name, image.width, image.height);
        }

        canvas.set_ink(self.options.ink);
        let mut builder = PathBuilder::new(&mut canvas, self.options.pressure);
        decoder.decode(strokes, &mut builder)?;
        let (_, page_strokes) = builder.finish();

        let caption = if self.options.caption.enabled {
            compose_caption(
                label,
                page_strokes.time_range(),
                self.origin,
                self.options.caption.timezone,
            )
        } else {
            None
        };

        if let Some(ref text) = caption {
            canvas.draw_caption(
                text,
                self.options.caption.font_size_pt,
                self.options.caption.margin_pt,
            );
        }

        debug!(
            "composed page: {} paths, {} inked points",
            page_strokes.painted, page_strokes.inked_points
        );

        writer.add_page(canvas.finish()?, background);
        Ok(ComposedPage {
            strokes: page_strokes,
            caption,
        })
    }
}
