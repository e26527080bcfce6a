//! Directory-backed device sessions.
//!
//! A mirror directory holds what a pen would report:
//!
//! ```text
//! mirror/
//!   info.xml
//!   changelist.xml
//!   notebooks/<guid>.zip
//! ```

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use log::debug;

use super::{Connector, DeviceSession};
use crate::error::{Error, Result};

const INFO_FILE: &str = "info.xml";
const CHANGELIST_FILE: &str = "changelist.xml";
const NOTEBOOK_DIR: &str = "notebooks";

/// Connects to a device mirror directory.
#[derive(Debug, Clone)]
pub struct MirrorConnector {
    root: PathBuf,
}

impl MirrorConnector {
    /// Create a connector for the mirror at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl Connector for MirrorConnector {
    type Session = MirrorSession;

    fn connect(&self, product_id: u16) -> Result<MirrorSession> {
        if !self.root.join(INFO_FILE).is_file() {
            return Err(Error::Device(format!(
                "no device mirror at {}",
                self.root.display()
            )));
        }
        Ok(MirrorSession {
            root: self.root.clone(),
            product_id,
            connected: true,
        })
    }
}

/// Session reading from a mirror directory.
#[derive(Debug)]
pub struct MirrorSession {
    root: PathBuf,
    product_id: u16,
    connected: bool,
}

impl MirrorSession {
    /// Product id the session was opened with.
    pub fn product_id(&self) -> u16 {
        self.product_id
    }

    /// Mirror directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn ensure_connected(&self) -> Result<()> {
        if self.connected {
            Ok(())
        } else {
            Err(Error::Device("session is disconnected".to_string()))
        }
    }

    fn read(&self, name: &str) -> Result<Vec<u8>> {
        self.ensure_connected()?;
        Ok(fs::read(self.root.join(name))?)
    }
}

impl DeviceSession for MirrorSession {
    fn info(&mut self) -> Result<Vec<u8>> {
        self.read(INFO_FILE)
    }

    fn changelist(&mut self) -> Result<Vec<u8>> {
        self.read(CHANGELIST_FILE)
    }

    fn fetch_notebook(&mut self, guid: &str, dest: &mut dyn Write) -> Result<()> {
        self.ensure_connected()?;
        if guid.contains(['/', '\\']) || guid.starts_with('.') {
            return Err(Error::Device(format!("invalid notebook id {:?}", guid)));
        }
        let path = self.root.join(NOTEBOOK_DIR).join(format!("{}.zip", guid));
        let mut file = File::open(&path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => Error::Device(format!("notebook {} not found", guid)),
            _ => Error::Io(e),
        })?;
        let copied = io::copy(&mut file, dest)?;
        debug!("fetched notebook {} ({} bytes)", guid, copied);
        Ok(())
    }

    fn disconnect(&mut self) -> Result<()> {
        self.connected = false;
        Ok(())
    }
}
