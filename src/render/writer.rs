//! Output PDF assembly.

use chrono::Utc;
use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, Stream, StringFormat};

use super::background::BackgroundImage;
use super::canvas::CAPTION_FONT;
use super::RenderOptions;

/// An embedded background image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRef {
    /// Object id of the XObject
    pub id: ObjectId,
    /// Resource name used in content streams
    pub name: String,
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
}

/// Accumulates pages of one notebook PDF.
pub struct PdfWriter {
    doc: Document,
    pages_id: ObjectId,
    font_id: ObjectId,
    page_ids: Vec<Object>,
    image_count: usize,
    media_box: (f32, f32),
    compress: bool,
}

impl PdfWriter {
    /// Start a new document sized for `options`.
    pub fn new(options: &RenderOptions) -> Self {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
            "Encoding" => "WinAnsiEncoding",
        });

        Self {
            doc,
            pages_id,
            font_id,
            page_ids: Vec::new(),
            image_count: 0,
            media_box: options.page_size_pt(),
            compress: options.compress,
        }
    }

    /// Embed an image once; reference it from any number of pages.
    pub fn add_image(&mut self, image: BackgroundImage) -> ImageRef {
        let name = format!("Bg{}", self.image_count);
        self.image_count += 1;
        let (width, height) = (image.width, image.height);
        let (mut stream, soft_mask) = image.into_parts();
        if let Some(mask) = soft_mask {
            let mask_id = self.doc.add_object(mask);
            stream.dict.set("SMask", mask_id);
        }
        let id = self.doc.add_object(stream);
        ImageRef {
            id,
            name,
            width,
            height,
        }
    }

    /// Append a page with the given content stream.
    pub fn add_page(&mut self, content: Vec<u8>, background: Option<&ImageRef>) -> ObjectId {
        let content_id = self.doc.add_object(Stream::new(Dictionary::new(), content));

        let mut resources = dictionary! {
            "Font" => dictionary! {
                CAPTION_FONT => self.font_id,
            },
        };
        if let Some(image) = background {
            let mut xobjects = Dictionary::new();
            xobjects.set(image.name.as_bytes().to_vec(), image.id);
            resources.set("XObject", xobjects);
        }

        let page_id = self.doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => self.pages_id,
            "Contents" => content_id,
            "Resources" => resources,
        });
        self.page_ids.push(page_id.into());
        page_id
    }

    /// Number of pages added so far.
    pub fn page_count(&self) -> usize {
        self.page_ids.len()
    }

    /// Close the page tree and return the finished document.
    pub fn finish(mut self, title: Option<&str>) -> Document {
        let (width, height) = self.media_box;
        let count = self.page_ids.len() as i64;
        let pages = dictionary! {
            "Type" => "Pages",
            "Count" => count,
            "Kids" => self.page_ids,
            "MediaBox" => vec![0.into(), 0.into(), width.into(), height.into()],
        };
        self.doc.objects.insert(self.pages_id, Object::Dictionary(pages));

        let catalog_id = self.doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => self.pages_id,
        });
        self.doc.trailer.set("Root", catalog_id);

        let date = Utc::now().format("D:%Y%m%d%H%M%SZ").to_string();
        let mut info = dictionary! {
            "Producer" => Object::string_literal(concat!("pen2pdf ", env!("CARGO_PKG_VERSION"))),
            "CreationDate" => Object::string_literal(date),
        };
        if let Some(title) = title {
            info.set("Title", text_string(title));
        }
        let info_id = self.doc.add_object(info);
        self.doc.trailer.set("Info", info_id);

        if self.compress {
            self.doc.compress();
        }
        self.doc
    }
}

/// PDF text string: literal when ASCII, UTF-16BE with a byte order mark otherwise.
fn text_string(text: &str) -> Object {
    if text.is_ascii() {
        return Object::string_literal(text);
    }
    let mut bytes = vec![0xfe, 0xff];
    for unit in text.encode_utf16() {
        bytes.extend_from_slice(&unit.to_be_bytes());
    }
    Object::String(bytes, StringFormat::Hexadecimal)
}
