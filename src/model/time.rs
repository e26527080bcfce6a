//! Device-relative time and its wall-clock anchor.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// First and last recorded timestamps of a page, in device milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeRange {
    /// Earliest recorded timestamp
    pub start: u64,
    /// Latest recorded timestamp
    pub end: u64,
}

impl TimeRange {
    /// Range spanning the given timestamps, or `None` if there are none.
    pub fn from_timestamps(timestamps: &[u64]) -> Option<Self> {
        let start = *timestamps.iter().min()?;
        let end = *timestamps.iter().max()?;
        Some(Self { start, end })
    }

    /// Length of the range in milliseconds.
    pub fn duration_ms(&self) -> u64 {
        self.end - self.start
    }
}

/// Wall-clock instant that corresponds to device time zero.
///
/// Computed once per device session and shared by every page of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeOrigin {
    epoch: DateTime<Utc>,
}

impl TimeOrigin {
    /// Anchor device time zero at `epoch`.
    pub fn new(epoch: DateTime<Utc>) -> Self {
        Self { epoch }
    }

    /// Derive the origin from the device clock reading taken at `now`.
    pub fn from_device_clock(device_ms: u64, now: DateTime<Utc>) -> Self {
        let offset = i64::try_from(device_ms).unwrap_or(i64::MAX);
        let epoch = now
            .checked_sub_signed(Duration::milliseconds(offset))
            .unwrap_or(DateTime::<Utc>::MIN_UTC);
        Self { epoch }
    }

    /// Wall-clock instant of device time zero.
    pub fn epoch(&self) -> DateTime<Utc> {
        self.epoch
    }

    /// Convert a device timestamp to wall-clock time.
    pub fn resolve(&self, device_ms: u64) -> DateTime<Utc> {
        let offset = i64::try_from(device_ms).unwrap_or(i64::MAX);
        self.epoch
            .checked_add_signed(Duration::milliseconds(offset))
            .unwrap_or(DateTime::<Utc>::MAX_UTC)
    }

    /// Convert both ends of a range.
    pub fn resolve_range(&self, range: TimeRange) -> (DateTime<Utc>, DateTime<Utc>) {
        (self.resolve(range.start), self.resolve(range.end))
    }
}
