//! Smartpen device sessions.
//!
//! The transport that talks to a pen lives outside this crate; it plugs in
//! through [`Connector`] and [`DeviceSession`]. [`connect_any`] walks the
//! known product ids in order, and [`export_notebooks`] turns every notebook
//! of a session into a PDF.

mod export;
mod mirror;

pub use export::{export_notebooks, ExportOptions, ExportedNotebook};
pub use mirror::{MirrorConnector, MirrorSession};

use std::io::Write;

use log::{debug, info};

use crate::error::{Error, Result};
use crate::model::{DeviceInfo, NotebookEntry};

/// USB product ids of supported smartpens, in connection order.
pub const PRODUCT_IDS: [u16; 4] = [0x1010, 0x1020, 0x1030, 0x1032];

/// An open connection to a smartpen.
pub trait DeviceSession {
    /// Pen info document (XML).
    fn info(&mut self) -> Result<Vec<u8>>;

    /// Notebook changelist document (XML).
    fn changelist(&mut self) -> Result<Vec<u8>>;

    /// Write the full archive of notebook `guid` to `dest`.
    fn fetch_notebook(&mut self, guid: &str, dest: &mut dyn Write) -> Result<()>;

    /// Close the session.
    fn disconnect(&mut self) -> Result<()>;

    /// Parsed pen info.
    fn device_info(&mut self) -> Result<DeviceInfo> {
        let data = self.info()?;
        DeviceInfo::parse(&data)
    }

    /// Notebooks that can be fetched.
    fn notebooks(&mut self) -> Result<Vec<NotebookEntry>> {
        let data = self.changelist()?;
        NotebookEntry::parse_changelist(&data)
    }
}

/// Opens sessions for a given USB product id.
pub trait Connector {
    /// Session type produced.
    type Session: DeviceSession;

    /// Connect to the pen with `product_id`.
    fn connect(&self, product_id: u16) -> Result<Self::Session>;
}

/// Try each candidate product id in order.
///
/// Returns the first session that opens. When every candidate fails the
/// error lists the ids tried and carries the last failure.
pub fn connect_any<C: Connector>(connector: &C, candidates: &[u16]) -> Result<C::Session> {
    let mut last_error = None;
    for &product_id in candidates {
        match connector.connect(product_id) {
            Ok(session) => {
                info!("connected to smartpen {:#06x}", product_id);
                return Ok(session);
            }
            Err(e) => {
                debug!("product {:#06x} unavailable: {}", product_id, e);
                last_error = Some(e);
            }
        }
    }

    let source = last_error.unwrap_or_else(|| Error::Device("no product ids to try".to_string()));
    Err(Error::DeviceNotFound {
        tried: candidates.to_vec(),
        source: Box::new(source),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    struct NullSession(u16);

    impl DeviceSession for NullSession {
        fn info(&mut self) -> Result<Vec<u8>> {
            Ok(b"<xml/>".to_vec())
        }
        fn changelist(&mut self) -> Result<Vec<u8>> {
            Ok(b"<xml><changelist/></xml>".to_vec())
        }
        fn fetch_notebook(&mut self, _guid: &str, _dest: &mut dyn Write) -> Result<()> {
            Ok(())
        }
        fn disconnect(&mut self) -> Result<()> {
            Ok(())
        }
    }

    /// Connects only to `available`, recording every attempt.
    struct FakeConnector {
        available: Option<u16>,
        attempts: RefCell<Vec<u16>>,
    }

    impl Connector for FakeConnector {
        type Session = NullSession;

        fn connect(&self, product_id: u16) -> Result<NullSession> {
            self.attempts.borrow_mut().push(product_id);
            if Some(product_id) == self.available {
                Ok(NullSession(product_id))
            } else {
                Err(Error::Device(format!("{:#06x} not present", product_id)))
            }
        }
    }

    #[test]
    fn test_connect_any_first_success() {
        let connector = FakeConnector {
            available: Some(0x1030),
            attempts: RefCell::new(Vec::new()),
        };
        let session = connect_any(&connector, &PRODUCT_IDS).unwrap();
        assert_eq!(session.0, 0x1030);
        assert_eq!(*connector.attempts.borrow(), vec![0x1010, 0x1020, 0x1030]);
    }

    #[test]
    fn test_connect_any_reports_last_failure() {
        let connector = FakeConnector {
            available: None,
            attempts: RefCell::new(Vec::new()),
        };
        match connect_any(&connector, &PRODUCT_IDS) {
            Err(Error::DeviceNotFound { tried, source }) => {
                assert_eq!(tried, PRODUCT_IDS.to_vec());
                assert_eq!(source.to_string(), "Device error: 0x1032 not present");
            }
            _ => panic!("Expected DeviceNotFound"),
        }
    }

    #[test]
    fn test_connect_any_no_candidates() {
        let connector = FakeConnector {
            available: Some(0x1010),
            attempts: RefCell::new(Vec::new()),
        };
        assert!(matches!(
            connect_any(&connector, &[]),
            Err(Error::DeviceNotFound { .. })
        ));
    }

    #[test]
    fn test_default_notebooks_parses_changelist() {
        let mut session = NullSession(0);
        assert!(session.notebooks().unwrap().is_empty());
        assert_eq!(session.device_info().unwrap().clock_ms, None);
    }
}
