//! Background images as PDF image XObjects.

use std::io::Write;

use flate2::write::ZlibEncoder;
use flate2::Compression;
use image::{GenericImageView, ImageFormat};
use lopdf::{dictionary, Stream};

use crate::error::Result;

/// A decoded background image ready to embed.
#[derive(Debug, Clone)]
pub struct BackgroundImage {
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    stream: Stream,
    soft_mask: Option<Stream>,
}

impl BackgroundImage {
    /// Decode PNG or JPEG bytes.
    ///
    /// JPEG data is embedded as-is. Everything else is split into deflated
    /// RGB samples and, when any pixel is not fully opaque, a deflated
    /// grayscale soft mask.
    pub fn decode(data: &[u8]) -> Result<Self> {
        let format = image::guess_format(data).ok();
        let decoded = image::load_from_memory(data)?;
        let (width, height) = decoded.dimensions();

        if format == Some(ImageFormat::Jpeg) {
            let color_space = match decoded.color() {
                image::ColorType::L8 | image::ColorType::La8 => "DeviceGray",
                _ => "DeviceRGB",
            };
            return Ok(Self {
                width,
                height,
                stream: image_stream(width, height, color_space, "DCTDecode", data.to_vec()),
                soft_mask: None,
            });
        }

        let rgba = decoded.to_rgba8();
        let pixels = (width as usize) * (height as usize);
        let mut rgb = Vec::with_capacity(pixels * 3);
        let mut alpha = Vec::with_capacity(pixels);
        let mut translucent = false;
        for pixel in rgba.pixels() {
            let [r, g, b, a] = pixel.0;
            translucent |= a != u8::MAX;
            rgb.extend_from_slice(&[r, g, b]);
            alpha.push(a);
        }

        let soft_mask = if translucent {
            Some(image_stream(
                width,
                height,
                "DeviceGray",
                "FlateDecode",
                deflate(&alpha)?,
            ))
        } else {
            None
        };

        Ok(Self {
            width,
            height,
            stream: image_stream(width, height, "DeviceRGB", "FlateDecode", deflate(&rgb)?),
            soft_mask,
        })
    }

    /// Image XObject stream.
    pub fn stream(&self) -> &Stream {
        &self.stream
    }

    /// Soft mask carrying the alpha channel, if the image has transparency.
    pub fn soft_mask(&self) -> Option<&Stream> {
        self.soft_mask.as_ref()
    }

    /// Consume the image, returning its XObject stream and soft mask.
    pub fn into_parts(self) -> (Stream, Option<Stream>) {
        (self.stream, self.soft_mask)
    }
}

fn image_stream(
    width: u32,
    height: u32,
    color_space: &str,
    filter: &str,
    data: Vec<u8>,
) -> Stream {
    let dict = dictionary! {
        "Type" => "XObject",
        "Subtype" => "Image",
        "Width" => width as i64,
        "Height" => height as i64,
        "ColorSpace" => color_space,
        "BitsPerComponent" => 8,
        "Filter" => filter,
    };
    // Already encoded; must not be compressed again on save.
    Stream::new(dict, data).with_compression(false)
}

fn deflate(data: &[u8]) -> Result<Vec<u8>> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data)?;
    Ok(encoder.finish()?)
}
