//! Rendering module turning notebook archives into PDF documents.

mod background;
mod canvas;
mod caption;
mod compositor;
mod notebook;
mod options;
mod path;
mod report;
mod writer;

pub use background::BackgroundImage;
pub use canvas::{encode_win_ansi, PageCanvas, CAPTION_FONT};
pub use caption::{compose_caption, format_span, page_label};
pub use compositor::{ComposedPage, PageCompositor};
pub use notebook::{
    output_path_for, NotebookRenderer, PageSummary, RenderEvent, RenderedNotebook,
};
pub use options::{
    BackgroundPolicy, CanvasSize, CaptionOptions, CaptionTimezone, PressureCurve, RenderOptions,
    Rgb,
};
pub use path::{PageStrokes, PathBuilder, PathSink};
pub use report::{to_json, JsonFormat};
pub use writer::{ImageRef, PdfWriter};
