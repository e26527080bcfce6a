//! Device metadata: notebook changelist and pen info.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::TimeOrigin;
use crate::error::{Error, Result};

fn parse_xml(data: &[u8]) -> Result<(String, roxmltree::Document<'_>)> {
    let text = std::str::from_utf8(data).map_err(|e| Error::Xml(e.to_string()))?;
    let doc = roxmltree::Document::parse(text)?;
    Ok((text.to_string(), doc))
}

/// One notebook listed in the device changelist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotebookEntry {
    /// Unique notebook identifier
    pub guid: String,
    /// Human-readable title
    pub title: String,
}

impl NotebookEntry {
    /// Parse the `changelist/lsp` records of a changelist document.
    ///
    /// Records without a `guid` cannot be fetched and are skipped. A missing
    /// title falls back to the guid.
    pub fn parse_changelist(data: &[u8]) -> Result<Vec<NotebookEntry>> {
        let (_, doc) = parse_xml(data)?;
        let entries = doc
            .root_element()
            .children()
            .filter(|n| n.has_tag_name("changelist"))
            .flat_map(|list| list.children().filter(|n| n.has_tag_name("lsp")))
            .filter_map(|lsp| {
                let guid = lsp.attribute("guid").filter(|g| !g.is_empty())?;
                let title = lsp
                    .attribute("title")
                    .filter(|t| !t.trim().is_empty())
                    .unwrap_or(guid);
                Some(NotebookEntry {
                    guid: guid.to_string(),
                    title: title.to_string(),
                })
            })
            .collect();
        Ok(entries)
    }

    /// Title made safe for use as a file stem.
    pub fn file_stem(&self) -> String {
        sanitize_stem(&self.title).unwrap_or_else(|| self.guid.clone())
    }

    /// File stem that also carries the guid, for titles shared by several
    /// notebooks.
    pub fn qualified_file_stem(&self) -> String {
        let name = format!("{}-{}", self.title.trim(), self.guid);
        sanitize_stem(&name).unwrap_or_else(|| self.guid.clone())
    }
}

fn sanitize_stem(name: &str) -> Option<String> {
    let stem: String = name
        .trim()
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();
    let stem = stem.trim_matches('.').trim();
    if stem.is_empty() {
        None
    } else {
        Some(stem.to_string())
    }
}

/// Parsed pen info document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceInfo {
    /// The info document as received
    pub raw: String,
    /// Pen identifier, when reported
    pub pen_id: Option<String>,
    /// Device clock in milliseconds at the time of the query
    pub clock_ms: Option<u64>,
}

impl DeviceInfo {
    /// Parse the pen info XML.
    pub fn parse(data: &[u8]) -> Result<Self> {
        let (raw, doc) = parse_xml(data)?;

        let pen_id = doc
            .descendants()
            .find(|n| n.has_tag_name("peninfo"))
            .and_then(|n| n.attribute("penid"))
            .map(str::to_string);

        let clock_ms = match doc
            .descendants()
            .find(|n| n.has_tag_name("time") && n.has_attribute("absolute"))
            .and_then(|n| n.attribute("absolute"))
        {
            Some(value) => Some(value.trim().parse::<u64>().map_err(|e| {
                Error::Xml(format!("invalid device clock {:?}: {}", value, e))
            })?),
            None => None,
        };

        Ok(Self {
            raw,
            pen_id,
            clock_ms,
        })
    }

    /// Time origin relative to `now`, if the device reported its clock.
    pub fn time_origin(&self, now: DateTime<Utc>) -> Option<TimeOrigin> {
        self.clock_ms
            .map(|clock| TimeOrigin::from_device_clock(clock, now))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    const CHANGELIST: &str = r#"<xml>
  <changelist start_time="0" end_time="1">
    <lsp guid="0x0bf11a726d11f3f3" title="Lecture Notes" />
    <lsp title="No guid" />
    <lsp guid="0x0bf11a726d11f3f4" />
    <lsp guid="" title="Empty guid" />
  </changelist>
</xml>"#;

    const INFO: &str = r#"<xml>
  <peninfo penid="0x1234abcd">
    <battery level="90" />
    <time absolute="3600000" />
  </peninfo>
</xml>"#;

    #[test]
    fn test_parse_changelist() {
        let entries = NotebookEntry::parse_changelist(CHANGELIST.as_bytes()).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].guid, "0x0bf11a726d11f3f3");
        assert_eq!(entries[0].title, "Lecture Notes");
        assert_eq!(entries[1].title, "0x0bf11a726d11f3f4");
    }

    #[test]
    fn test_parse_changelist_malformed() {
        let result = NotebookEntry::parse_changelist(b"<xml><changelist>");
        assert!(matches!(result, Err(Error::Xml(_))));
    }

    #[test]
    fn test_file_stem() {
        let entry = NotebookEntry {
            guid: "g1".to_string(),
            title: "Math: Week 1/2".to_string(),
        };
        assert_eq!(entry.file_stem(), "Math_ Week 1_2");

        let entry = NotebookEntry {
            guid: "g2".to_string(),
            title: "..".to_string(),
        };
        assert_eq!(entry.file_stem(), "g2");
    }

    #[test]
    fn test_qualified_file_stem() {
        let entry = NotebookEntry {
            guid: "0x0b/1".to_string(),
            title: " Notes ".to_string(),
        };
        assert_eq!(entry.qualified_file_stem(), "Notes-0x0b_1");
    }

    #[test]
    fn test_parse_info() {
        let info = DeviceInfo::parse(INFO.as_bytes()).unwrap();
        assert_eq!(info.pen_id.as_deref(), Some("0x1234abcd"));
        assert_eq!(info.clock_ms, Some(3_600_000));

        let now = Utc.with_ymd_and_hms(2024, 6, 1, 10, 0, 0).unwrap();
        let origin = info.time_origin(now).unwrap();
        assert_eq!(
            origin.epoch(),
            Utc.with_ymd_and_hms(2024, 6, 1, 9, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_parse_info_without_clock() {
        let info = DeviceInfo::parse(b"<xml><peninfo penid=\"p\"/></xml>").unwrap();
        assert_eq!(info.clock_ms, None);
        assert!(info.time_origin(Utc::now()).is_none());
    }

    #[test]
    fn test_parse_info_bad_clock() {
        let result = DeviceInfo::parse(b"<xml><time absolute=\"soon\"/></xml>");
        assert!(matches!(result, Err(Error::Xml(_))));
    }
}
