//! Shared fixtures for integration tests.

#![allow(dead_code)]

use std::io::{Cursor, Write};

use pen2pdf::StrokeEvent;
use zip::write::SimpleFileOptions;

/// A PNG background of the given size.
pub fn png(width: u32, height: u32) -> Vec<u8> {
    let img = image::RgbImage::from_pixel(width, height, image::Rgb([250, 250, 240]));
    let mut out = Cursor::new(Vec::new());
    image::DynamicImage::ImageRgb8(img)
        .write_to(&mut out, image::ImageFormat::Png)
        .unwrap();
    out.into_inner()
}

/// JSON-lines page data for a list of events.
pub fn page(events: &[StrokeEvent]) -> Vec<u8> {
    let mut out = Vec::new();
    for event in events {
        serde_json::to_writer(&mut out, event).unwrap();
        out.push(b'\n');
    }
    out
}

/// One stroke of `points` inked samples starting at `time`.
pub fn stroke(points: usize, time: u64) -> Vec<StrokeEvent> {
    let mut events: Vec<StrokeEvent> = (0..points)
        .map(|i| StrokeEvent::point(100.0 + i as f32 * 10.0, 200.0, 400, time + i as u64))
        .collect();
    events.push(StrokeEvent::stroke_end(time + points as u64));
    events
}

/// Zip archive with the given `(name, data)` entries, stored uncompressed.
pub fn archive(entries: &[(&str, Vec<u8>)]) -> Vec<u8> {
    let mut zip = zip::ZipWriter::new(Cursor::new(Vec::new()));
    let options =
        SimpleFileOptions::default().compression_method(zip::CompressionMethod::Stored);
    for (name, data) in entries {
        zip.start_file(*name, options).unwrap();
        zip.write_all(data).unwrap();
    }
    zip.finish().unwrap().into_inner()
}

/// Page entry name in the layout the default patterns select.
pub fn page_name(n: usize) -> String {
    format!("data/0x0bf11a726d11f3f3/0.0.0/page{:03}.stf", n)
}

/// Background entry name in the layout the default patterns select.
pub fn background_name(n: usize) -> String {
    format!("userdata/lsac_data/bg{}.png", n)
}

/// A notebook with `pages` one-stroke pages and `backgrounds` backgrounds.
pub fn notebook(pages: usize, backgrounds: usize) -> Vec<u8> {
    let mut entries: Vec<(String, Vec<u8>)> = Vec::new();
    for n in 0..pages {
        entries.push((page_name(n), page(&stroke(3, 1_000 * (n as u64 + 1)))));
    }
    for n in 0..backgrounds {
        entries.push((background_name(n), png(8, 10)));
    }
    let borrowed: Vec<(&str, Vec<u8>)> = entries
        .iter()
        .map(|(name, data)| (name.as_str(), data.clone()))
        .collect();
    archive(&borrowed)
}

/// Number of image XObjects in a PDF.
pub fn image_count(pdf: &lopdf::Document) -> usize {
    pdf.objects
        .values()
        .filter(|object| match object.as_stream() {
            Ok(stream) => stream
                .dict
                .get(b"Subtype")
                .and_then(|s| s.as_name())
                .map(|name| name == b"Image")
                .unwrap_or(false),
            Err(_) => false,
        })
        .count()
}
