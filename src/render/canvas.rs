//! PDF content stream builder for one page.
//!
//! Drawing happens in canvas units with a top-left origin. A single `cm`
//! maps canvas units to PDF points and flips the y axis; captions are set
//! after the transform is popped, directly in points.

use lopdf::content::{Content, Operation};
use lopdf::{Object, StringFormat};

use super::path::PathSink;
use super::{RenderOptions, Rgb};
use crate::error::Result;
use crate::model::{Path, Subpath};

/// Resource name of the caption font.
pub const CAPTION_FONT: &str = "F1";

/// Line cap / join style 1: round.
const ROUND: i64 = 1;

fn op(operator: &str, operands: Vec<Object>) -> Operation {
    Operation::new(operator, operands)
}

/// Records drawing operations for one page.
pub struct PageCanvas {
    ops: Vec<Operation>,
    canvas_width: f32,
    page_height_pt: f32,
    line_width: Option<f32>,
    in_canvas_space: bool,
}

impl PageCanvas {
    /// Start a page and enter canvas space.
    pub fn new(options: &RenderOptions) -> Self {
        let scale = options.scale();
        let (_, page_height_pt) = options.page_size_pt();
        let mut canvas = Self {
            ops: Vec::new(),
            canvas_width: options.canvas.width,
            page_height_pt,
            line_width: None,
            in_canvas_space: true,
        };
        canvas.ops.push(op("q", vec![]));
        canvas.ops.push(op(
            "cm",
            vec![
                scale.into(),
                0.into(),
                0.into(),
                (-scale).into(),
                0.into(),
                page_height_pt.into(),
            ],
        ));
        canvas
    }

    /// Draw an image XObject scaled to the canvas width at the top-left corner.
    pub fn draw_background(&mut self, name: &str, pixel_width: u32, pixel_height: u32) {
        if pixel_width == 0 || pixel_height == 0 {
            return;
        }
        let width = self.canvas_width;
        let height = width * pixel_height as f32 / pixel_width as f32;

        // Image space has its origin at the bottom-left; flip it back upright.
        self.ops.push(op("q", vec![]));
        self.ops.push(op(
            "cm",
            vec![
                width.into(),
                0.into(),
                0.into(),
                (-height).into(),
                0.into(),
                height.into(),
            ],
        ));
        self.ops.push(op("Do", vec![Object::Name(name.as_bytes().to_vec())]));
        self.ops.push(op("Q", vec![]));
    }

    /// Set the ink style used by subsequent paths.
    pub fn set_ink(&mut self, ink: Rgb) {
        self.ops.push(op("J", vec![ROUND.into()]));
        self.ops.push(op("j", vec![ROUND.into()]));
        self.ops
            .push(op("RG", vec![ink.0.into(), ink.1.into(), ink.2.into()]));
    }

    fn set_line_width(&mut self, width: f32) {
        if self.line_width != Some(width) {
            self.ops.push(op("w", vec![width.into()]));
            self.line_width = Some(width);
        }
    }

    /// Paint one sub-path, splitting it wherever the segment width changes.
    fn stroke_subpath(&mut self, subpath: &Subpath) {
        let mut open = false;
        for (from, segment) in subpath.edges() {
            if open && self.line_width != Some(segment.width) {
                self.ops.push(op("S", vec![]));
                open = false;
            }
            if !open {
                self.set_line_width(segment.width);
                self.ops.push(op("m", vec![from.x.into(), from.y.into()]));
                open = true;
            }
            self.ops
                .push(op("l", vec![segment.to.x.into(), segment.to.y.into()]));
        }
        if open {
            self.ops.push(op("S", vec![]));
        }
    }

    /// Leave canvas space.
    pub fn end_drawing(&mut self) {
        if self.in_canvas_space {
            self.ops.push(op("Q", vec![]));
            self.in_canvas_space = false;
            self.line_width = None;
        }
    }

    /// Set a caption line near the top-left margin.
    pub fn draw_caption(&mut self, text: &str, font_size_pt: f32, margin_pt: f32) {
        self.end_drawing();
        let baseline = self.page_height_pt - margin_pt;
        self.ops.push(op("BT", vec![]));
        self.ops.push(op("rg", vec![0.into(), 0.into(), 0.into()]));
        self.ops
            .push(op("Tf", vec![CAPTION_FONT.into(), font_size_pt.into()]));
        self.ops
            .push(op("Td", vec![margin_pt.into(), baseline.into()]));
        self.ops.push(op(
            "Tj",
            vec![Object::String(encode_win_ansi(text), StringFormat::Literal)],
        ));
        self.ops.push(op("ET", vec![]));
    }

    /// Recorded operations.
    pub fn operations(&self) -> &[Operation] {
        &self.ops
    }

    /// Close the page and encode its content stream.
    pub fn finish(mut self) -> Result<Vec<u8>> {
        self.end_drawing();
        let content = Content {
            operations: self.ops,
        };
        Ok(content.encode()?)
    }
}

impl PathSink for PageCanvas {
    fn paint(&mut self, path: &Path) {
        for subpath in &path.subpaths {
            self.stroke_subpath(subpath);
        }
    }
}

/// Encode text for a WinAnsi standard font; unmappable characters become `?`.
pub fn encode_win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| match c as u32 {
            0x20..=0x7e | 0xa0..=0xff => c as u32 as u8,
            _ => b'?',
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Point;

    fn operators(canvas: &PageCanvas) -> Vec<&str> {
        canvas
            .operations()
            .iter()
            .map(|o| o.operator.as_str())
            .collect()
    }

    fn path(points: &[(f32, f32, f32)]) -> Path {
        let mut path = Path::new();
        let (x, y, _) = points[0];
        path.move_to(Point::new(x, y));
        for &(x, y, w) in &points[1..] {
            path.line_to(Point::new(x, y), w);
        }
        path
    }

    #[test]
    fn test_new_canvas_enters_flipped_space() {
        let canvas = PageCanvas::new(&RenderOptions::default());
        assert_eq!(operators(&canvas), vec!["q", "cm"]);
    }

    #[test]
    fn test_uniform_width_strokes_once() {
        let mut canvas = PageCanvas::new(&RenderOptions::default());
        canvas.paint(&path(&[(0.0, 0.0, 0.0), (1.0, 0.0, 2.0), (2.0, 0.0, 2.0)]));
        assert_eq!(
            operators(&canvas)[2..],
            ["w", "m", "l", "l", "S"]
        );
    }

    #[test]
    fn test_width_change_splits_run() {
        let mut canvas = PageCanvas::new(&RenderOptions::default());
        canvas.paint(&path(&[(0.0, 0.0, 0.0), (1.0, 0.0, 2.0), (2.0, 0.0, 3.0)]));
        assert_eq!(
            operators(&canvas)[2..],
            ["w", "m", "l", "S", "w", "m", "l", "S"]
        );
    }

    #[test]
    fn test_empty_path_draws_nothing() {
        let mut canvas = PageCanvas::new(&RenderOptions::default());
        canvas.paint(&Path::new());
        assert_eq!(operators(&canvas).len(), 2);
    }

    #[test]
    fn test_background_keeps_aspect_ratio() {
        let options = RenderOptions::default();
        let mut canvas = PageCanvas::new(&options);
        canvas.draw_background("Bg0", 100, 200);
        let cm = &canvas.operations()[3];
        assert_eq!(cm.operator, "cm");
        assert_eq!(cm.operands[0].as_float().unwrap(), options.canvas.width);
        assert_eq!(cm.operands[3].as_float().unwrap(), -2.0 * options.canvas.width);
    }

    #[test]
    fn test_caption_after_canvas_space() {
        let mut canvas = PageCanvas::new(&RenderOptions::default());
        canvas.set_ink(Rgb::INK_BLUE);
        canvas.draw_caption("page 1 of 2", 8.0, 18.0);
        let ops = operators(&canvas);
        assert_eq!(
            ops[5..],
            ["Q", "BT", "rg", "Tf", "Td", "Tj", "ET"]
        );
        assert!(canvas.finish().is_ok());
    }

    #[test]
    fn test_encode_win_ansi() {
        assert_eq!(encode_win_ansi("Notes é"), b"Notes \xe9".to_vec());
        assert_eq!(encode_win_ansi("日記"), b"??".to_vec());
    }
}
