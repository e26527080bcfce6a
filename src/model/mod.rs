//! Model types shared by the stroke, render and device layers.

mod notebook;
mod path;
mod time;

pub use notebook::{DeviceInfo, NotebookEntry};
pub use path::{Path, Point, Segment, Subpath};
pub use time::{TimeOrigin, TimeRange};
