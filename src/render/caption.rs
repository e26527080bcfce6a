//! Page caption text.

use chrono::{DateTime, Local, TimeZone, Utc};

use super::CaptionTimezone;
use crate::model::{TimeOrigin, TimeRange};

const DATE_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
const TIME_FORMAT: &str = "%H:%M:%S";

/// Caption for one page: "`label`  `start` to `end`".
///
/// The time range is appended only when both an origin and a range are
/// available. Returns `None` when there is nothing to show.
pub fn compose_caption(
    label: Option<&str>,
    range: Option<TimeRange>,
    origin: Option<&TimeOrigin>,
    timezone: CaptionTimezone,
) -> Option<String> {
    let span = match (origin, range) {
        (Some(origin), Some(range)) => {
            let (start, end) = origin.resolve_range(range);
            Some(format_span(start, end, timezone))
        }
        _ => None,
    };

    match (label, span) {
        (Some(label), Some(span)) => Some(format!("{}  {}", label, span)),
        (Some(label), None) => Some(label.to_string()),
        (None, Some(span)) => Some(span),
        (None, None) => None,
    }
}

/// Format a wall-clock span; the end omits the date when it is the same day.
pub fn format_span(start: DateTime<Utc>, end: DateTime<Utc>, timezone: CaptionTimezone) -> String {
    match timezone {
        CaptionTimezone::Utc => format_in(&Utc, start, end),
        CaptionTimezone::Local => format_in(&Local, start, end),
    }
}

fn format_in<Tz: TimeZone>(tz: &Tz, start: DateTime<Utc>, end: DateTime<Utc>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    let start = start.with_timezone(tz);
    let end = end.with_timezone(tz);
    let end_format = if start.date_naive() == end.date_naive() {
        TIME_FORMAT
    } else {
        DATE_TIME_FORMAT
    };
    format!(
        "{} to {}",
        start.format(DATE_TIME_FORMAT),
        end.format(end_format)
    )
}

/// Label for page `number` (1-indexed) of `total`.
pub fn page_label(title: Option<&str>, number: usize, total: usize) -> String {
    match title {
        Some(title) if !title.trim().is_empty() => {
            format!("{} - page {} of {}", title.trim(), number, total)
        }
        _ => format!("page {} of {}", number, total),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn origin() -> TimeOrigin {
        TimeOrigin::new(Utc.with_ymd_and_hms(2024, 5, 6, 9, 0, 0).unwrap())
    }

    #[test]
    fn test_caption_with_range() {
        let caption = compose_caption(
            Some("page 1 of 3"),
            Some(TimeRange {
                start: 0,
                end: 90_000,
            }),
            Some(&origin()),
            CaptionTimezone::Utc,
        );
        assert_eq!(
            caption.as_deref(),
            Some("page 1 of 3  2024-05-06 09:00:00 to 09:01:30")
        );
    }

    #[test]
    fn test_caption_without_origin_omits_range() {
        let caption = compose_caption(
            Some("page 2 of 3"),
            Some(TimeRange { start: 0, end: 10 }),
            None,
            CaptionTimezone::Utc,
        );
        assert_eq!(caption.as_deref(), Some("page 2 of 3"));
    }

    #[test]
    fn test_caption_without_points_omits_range() {
        let caption = compose_caption(Some("page 3 of 3"), None, Some(&origin()), CaptionTimezone::Utc);
        assert_eq!(caption.as_deref(), Some("page 3 of 3"));
        assert_eq!(compose_caption(None, None, None, CaptionTimezone::Utc), None);
    }

    #[test]
    fn test_span_across_days() {
        let start = Utc.with_ymd_and_hms(2024, 5, 6, 23, 59, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2024, 5, 7, 0, 1, 0).unwrap();
        assert_eq!(
            format_span(start, end, CaptionTimezone::Utc),
            "2024-05-06 23:59:00 to 2024-05-07 00:01:00"
        );
    }

    #[test]
    fn test_page_label() {
        assert_eq!(page_label(None, 1, 4), "page 1 of 4");
        assert_eq!(page_label(Some("Lectures"), 2, 4), "Lectures - page 2 of 4");
        assert_eq!(page_label(Some("  "), 3, 4), "page 3 of 4");
    }
}
