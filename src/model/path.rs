//! Vector path types built from pen strokes.

/// A position in canvas units (top-left origin).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    /// Horizontal position
    pub x: f32,
    /// Vertical position, growing downwards
    pub y: f32,
}

impl Point {
    /// Create a new point.
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// A straight segment ending at `to`, drawn with `width`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    /// End point of the segment
    pub to: Point,
    /// Line width in canvas units
    pub width: f32,
}

/// A connected run of segments starting at `start`.
#[derive(Debug, Clone, PartialEq)]
pub struct Subpath {
    /// Where the pen touched down
    pub start: Point,
    /// Segments in drawing order
    pub segments: Vec<Segment>,
}

impl Subpath {
    /// Start a new sub-path without any segments.
    pub fn new(start: Point) -> Self {
        Self {
            start,
            segments: Vec::new(),
        }
    }

    /// Iterate `(from, segment)` pairs.
    pub fn edges(&self) -> impl Iterator<Item = (Point, &Segment)> + '_ {
        let froms = std::iter::once(self.start).chain(self.segments.iter().map(|s| s.to));
        froms.zip(self.segments.iter())
    }
}

/// One stroke's worth of sub-paths, painted together at stroke end.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Path {
    /// Sub-paths; a new one starts whenever the pen touches down again
    pub subpaths: Vec<Subpath>,
}

impl Path {
    /// Create an empty path.
    pub fn new() -> Self {
        Self::default()
    }

    /// Begin a new sub-path at `point`.
    pub fn move_to(&mut self, point: Point) {
        self.subpaths.push(Subpath::new(point));
    }

    /// Extend the current sub-path. Starts one at `point` if none is open.
    pub fn line_to(&mut self, point: Point, width: f32) {
        match self.subpaths.last_mut() {
            Some(subpath) => subpath.segments.push(Segment { to: point, width }),
            None => self.move_to(point),
        }
    }

    /// Total number of segments.
    pub fn segment_count(&self) -> usize {
        self.subpaths.iter().map(|s| s.segments.len()).sum()
    }

    /// Whether painting this path would draw anything.
    pub fn is_empty(&self) -> bool {
        self.segment_count() == 0
    }

    /// Remove all sub-paths.
    pub fn clear(&mut self) {
        self.subpaths.clear();
    }
}
