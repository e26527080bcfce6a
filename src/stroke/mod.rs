//! Stroke events and the decoder seam.
//!
//! A page's stroke recording is turned into a sequence of [`StrokeEvent`]s by a
//! [`StrokeDecoder`]. The binary recording grammar belongs to the decoder; this
//! module only defines the callback contract ([`StrokeHandler`]) that the rest
//! of the crate implements, plus decoders for pre-decoded event streams.
//!
//! # Example
//!
//! ```
//! use pen2pdf::stroke::{replay, StrokeEvent, StrokeHandler};
//!
//! #[derive(Default)]
//! struct Counter(usize);
//!
//! impl StrokeHandler for Counter {
//!     fn on_point(&mut self, _x: f32, _y: f32, _pressure: u32, _time: u64) {
//!         self.0 += 1;
//!     }
//!     fn on_stroke_end(&mut self, _time: u64) {}
//! }
//!
//! let events = vec![
//!     StrokeEvent::point(10.0, 10.0, 80, 0),
//!     StrokeEvent::point(20.0, 12.0, 90, 8),
//!     StrokeEvent::stroke_end(9),
//! ];
//! let mut counter = Counter::default();
//! replay(events, &mut counter);
//! assert_eq!(counter.0, 2);
//! ```

mod decoder;

pub use decoder::{EventStream, ExternalDecoder, JsonLinesDecoder};

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::io::Read;

/// One event of a page's stroke recording.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StrokeEvent {
    /// A sampled pen position. Zero pressure means the pen is hovering.
    Point {
        /// Horizontal position in canvas units
        x: f32,
        /// Vertical position in canvas units (top-left origin)
        y: f32,
        /// Pen pressure (0 = not touching)
        pressure: u32,
        /// Device-relative timestamp in milliseconds
        time: u64,
    },

    /// The end of a stroke.
    StrokeEnd {
        /// Device-relative timestamp in milliseconds
        time: u64,
    },
}

impl StrokeEvent {
    /// Create a point event.
    pub fn point(x: f32, y: f32, pressure: u32, time: u64) -> Self {
        StrokeEvent::Point {
            x,
            y,
            pressure,
            time,
        }
    }

    /// Create a stroke-end event.
    pub fn stroke_end(time: u64) -> Self {
        StrokeEvent::StrokeEnd { time }
    }

    /// Timestamp of the event.
    pub fn time(&self) -> u64 {
        match *self {
            StrokeEvent::Point { time, .. } | StrokeEvent::StrokeEnd { time } => time,
        }
    }

    /// Deliver this event to a handler.
    pub fn dispatch<H: StrokeHandler + ?Sized>(&self, handler: &mut H) {
        match *self {
            StrokeEvent::Point {
                x,
                y,
                pressure,
                time,
            } => handler.on_point(x, y, pressure, time),
            StrokeEvent::StrokeEnd { time } => handler.on_stroke_end(time),
        }
    }
}

/// Callback contract driven by a [`StrokeDecoder`].
pub trait StrokeHandler {
    /// Called for every sampled point, hovering points included.
    fn on_point(&mut self, x: f32, y: f32, pressure: u32, time: u64);

    /// Called once per completed stroke.
    fn on_stroke_end(&mut self, time: u64);
}

/// Decodes one page's stroke recording into handler callbacks.
///
/// Implementations must call the handler in temporal order and must not
/// restart the sequence.
pub trait StrokeDecoder {
    /// Short name used in log messages.
    fn name(&self) -> &str;

    /// Decode `reader` and deliver its events to `handler`.
    fn decode(&self, reader: &mut dyn Read, handler: &mut dyn StrokeHandler) -> Result<()>;
}

/// Deliver a sequence of events to a handler, in order.
pub fn replay<I, H>(events: I, handler: &mut H)
where
    I: IntoIterator<Item = StrokeEvent>,
    H: StrokeHandler + ?Sized,
{
    for event in events {
        event.dispatch(handler);
    }
}

/// Handler that records every event it receives.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventLog {
    /// Received events, in order
    pub events: Vec<StrokeEvent>,
}

impl StrokeHandler for EventLog {
    fn on_point(&mut self, x: f32, y: f32, pressure: u32, time: u64) {
        self.events.push(StrokeEvent::point(x, y, pressure, time));
    }

    fn on_stroke_end(&mut self, time: u64) {
        self.events.push(StrokeEvent::stroke_end(time));
    }
}
