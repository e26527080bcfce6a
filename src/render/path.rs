//! Turns stroke callbacks into painted vector paths.

use log::{debug, trace};

use super::PressureCurve;
use crate::model::{Path, Point, TimeRange};
use crate::stroke::StrokeHandler;

/// Receives finished paths.
pub trait PathSink {
    /// Paint one finished path.
    fn paint(&mut self, path: &Path);
}

impl<S: PathSink + ?Sized> PathSink for &mut S {
    fn paint(&mut self, path: &Path) {
        (**self).paint(path);
    }
}

impl PathSink for Vec<Path> {
    fn paint(&mut self, path: &Path) {
        self.push(path.clone());
    }
}

/// What a page's stroke recording produced.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageStrokes {
    /// Number of paths painted
    pub painted: usize,
    /// Number of points recorded with pressure
    pub inked_points: usize,
    /// Timestamps of every non-hover point, in arrival order
    pub timestamps: Vec<u64>,
}

impl PageStrokes {
    /// First and last recorded timestamps, if any point was inked.
    pub fn time_range(&self) -> Option<TimeRange> {
        TimeRange::from_timestamps(&self.timestamps)
    }
}

/// Per-page path builder.
///
/// Holds the pressure of the previous point so it can tell a pen-down
/// continuation from a fresh touch-down. Create one per page.
pub struct PathBuilder<S> {
    sink: S,
    curve: PressureCurve,
    last_pressure: u32,
    current: Path,
    strokes: PageStrokes,
}

impl<S: PathSink> PathBuilder<S> {
    /// Create a builder painting into `sink`.
    pub fn new(sink: S, curve: PressureCurve) -> Self {
        Self {
            sink,
            curve,
            last_pressure: 0,
            current: Path::new(),
            strokes: PageStrokes::default(),
        }
    }

    /// Pressure of the most recent point (0 after a stroke end).
    pub fn last_pressure(&self) -> u32 {
        self.last_pressure
    }

    /// The path accumulated since the last stroke end.
    pub fn pending(&self) -> &Path {
        &self.current
    }

    /// Finish the page, returning the sink and the page report.
    ///
    /// A path still pending has no stroke end and is dropped unpainted.
    pub fn finish(self) -> (S, PageStrokes) {
        if !self.current.is_empty() {
            debug!(
                "dropping unterminated stroke with {} segments",
                self.current.segment_count()
            );
        }
        (self.sink, self.strokes)
    }
}

impl<S: PathSink> StrokeHandler for PathBuilder<S> {
    fn on_point(&mut self, x: f32, y: f32, pressure: u32, time: u64) {
        if pressure > 0 {
            let point = Point::new(x, y);
            if self.last_pressure > 0 {
                self.current.line_to(point, self.curve.width(pressure));
            } else {
                self.current.move_to(point);
            }
            self.strokes.inked_points += 1;
            self.strokes.timestamps.push(time);
        }
        self.last_pressure = pressure;
    }

    fn on_stroke_end(&mut self, time: u64) {
        if !self.current.is_empty() {
            trace!(
                "stroke end at {}: painting {} segments",
                time,
                self.current.segment_count()
            );
            self.sink.paint(&self.current);
            self.strokes.painted += 1;
        }
        self.current.clear();
        self.last_pressure = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stroke::{replay, StrokeEvent};

    fn build(events: Vec<StrokeEvent>) -> (Vec<Path>, PageStrokes) {
        let mut builder = PathBuilder::new(Vec::new(), PressureCurve::default());
        replay(events, &mut builder);
        builder.finish()
    }

    #[test]
    fn test_stroke_end_without_ink_paints_nothing() {
        let (paths, strokes) = build(vec![
            StrokeEvent::point(1.0, 1.0, 0, 0),
            StrokeEvent::point(2.0, 2.0, 0, 1),
            StrokeEvent::stroke_end(2),
        ]);
        assert!(paths.is_empty());
        assert_eq!(strokes.painted, 0);
        assert!(strokes.time_range().is_none());
    }

    #[test]
    fn test_single_touch_paints_nothing() {
        let (paths, strokes) = build(vec![
            StrokeEvent::point(1.0, 1.0, 40, 0),
            StrokeEvent::stroke_end(1),
        ]);
        assert!(paths.is_empty());
        assert_eq!(strokes.inked_points, 1);
    }

    #[test]
    fn test_continuous_stroke() {
        let curve = PressureCurve::default();
        let (paths, strokes) = build(vec![
            StrokeEvent::point(0.0, 0.0, 25, 100),
            StrokeEvent::point(10.0, 0.0, 36, 110),
            StrokeEvent::point(20.0, 0.0, 49, 120),
            StrokeEvent::stroke_end(121),
        ]);

        assert_eq!(paths.len(), 1);
        let subpath = &paths[0].subpaths[0];
        assert_eq!(subpath.start, Point::new(0.0, 0.0));
        assert_eq!(subpath.segments.len(), 2);
        assert_eq!(subpath.segments[0].width, curve.width(36));
        assert_eq!(subpath.segments[1].width, curve.width(49));
        assert_eq!(strokes.timestamps, vec![100, 110, 120]);
        assert_eq!(
            strokes.time_range(),
            Some(TimeRange {
                start: 100,
                end: 120
            })
        );
    }

    #[test]
    fn test_hover_splits_subpaths() {
        let (paths, strokes) = build(vec![
            StrokeEvent::point(0.0, 0.0, 10, 0),
            StrokeEvent::point(1.0, 0.0, 10, 1),
            StrokeEvent::point(2.0, 0.0, 0, 2),
            StrokeEvent::point(3.0, 0.0, 10, 3),
            StrokeEvent::point(4.0, 0.0, 10, 4),
            StrokeEvent::stroke_end(5),
        ]);

        assert_eq!(paths.len(), 1);
        let subpaths = &paths[0].subpaths;
        assert_eq!(subpaths.len(), 2);
        assert_eq!(subpaths[1].start, Point::new(3.0, 0.0));
        // The hover point is neither drawn nor timed.
        assert_eq!(strokes.timestamps, vec![0, 1, 3, 4]);
    }

    #[test]
    fn test_zero_pressure_never_extends() {
        let (paths, _) = build(vec![
            StrokeEvent::point(0.0, 0.0, 10, 0),
            StrokeEvent::point(5.0, 5.0, 0, 1),
            StrokeEvent::point(6.0, 6.0, 0, 2),
            StrokeEvent::stroke_end(3),
        ]);
        assert!(paths.is_empty());
    }

    #[test]
    fn test_stroke_end_resets_pressure() {
        let mut builder = PathBuilder::new(Vec::new(), PressureCurve::default());
        builder.on_point(0.0, 0.0, 10, 0);
        builder.on_point(1.0, 0.0, 10, 1);
        builder.on_stroke_end(2);
        assert_eq!(builder.last_pressure(), 0);

        // Next stroke starts fresh instead of joining the previous one.
        builder.on_point(50.0, 50.0, 10, 3);
        assert_eq!(builder.pending().subpaths.len(), 1);
        assert_eq!(builder.pending().subpaths[0].start, Point::new(50.0, 50.0));
        assert!(builder.pending().is_empty());
    }

    #[test]
    fn test_unterminated_stroke_is_dropped() {
        let (paths, strokes) = build(vec![
            StrokeEvent::point(0.0, 0.0, 10, 0),
            StrokeEvent::point(1.0, 0.0, 10, 1),
            StrokeEvent::stroke_end(2),
            StrokeEvent::point(5.0, 0.0, 10, 3),
            StrokeEvent::point(6.0, 0.0, 10, 4),
        ]);
        assert_eq!(paths.len(), 1);
        assert_eq!(strokes.painted, 1);
        assert_eq!(strokes.time_range().map(|r| r.end), Some(4));
    }
}
