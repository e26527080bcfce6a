//! Decoders for pre-decoded stroke event streams.

use std::ffi::OsString;
use std::io::{self, BufRead, BufReader, Read, Write};
use std::path::PathBuf;
use std::process::{Command, Stdio};

use log::debug;

use super::{StrokeDecoder, StrokeEvent, StrokeHandler};
use crate::error::{Error, Result};

/// Lazy iterator over a JSON-lines stroke event stream.
///
/// Each non-blank line holds one [`StrokeEvent`]. The stream is consumed as
/// it is iterated and cannot be restarted.
pub struct EventStream<R> {
    reader: R,
    line: usize,
    buf: String,
    failed: bool,
}

impl<R: BufRead> EventStream<R> {
    /// Create a stream over a buffered reader.
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            line: 0,
            buf: String::new(),
            failed: false,
        }
    }

    /// Number of lines read so far.
    pub fn lines_read(&self) -> usize {
        self.line
    }
}

impl<R: BufRead> Iterator for EventStream<R> {
    type Item = Result<StrokeEvent>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }

        loop {
            self.buf.clear();
            match self.reader.read_line(&mut self.buf) {
                Ok(0) => return None,
                Ok(_) => {
                    self.line += 1;
                    let text = self.buf.trim();
                    if text.is_empty() {
                        continue;
                    }
                    let parsed = serde_json::from_str(text).map_err(|e| Error::Decode {
                        line: self.line,
                        message: e.to_string(),
                    });
                    if parsed.is_err() {
                        self.failed = true;
                    }
                    return Some(parsed);
                }
                Err(e) => {
                    self.failed = true;
                    return Some(Err(Error::Io(e)));
                }
            }
        }
    }
}

/// Decoder for pages that already hold JSON-lines stroke events.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonLinesDecoder;

impl JsonLinesDecoder {
    /// Create a new JSON-lines decoder.
    pub fn new() -> Self {
        Self
    }
}

impl StrokeDecoder for JsonLinesDecoder {
    fn name(&self) -> &str {
        "json-lines"
    }

    fn decode(&self, reader: &mut dyn Read, handler: &mut dyn StrokeHandler) -> Result<()> {
        let mut stream = EventStream::new(BufReader::new(reader));
        for event in stream.by_ref() {
            event?.dispatch(handler);
        }
        debug!("decoded {} lines", stream.lines_read());
        Ok(())
    }
}

/// Decoder that delegates to an external program.
///
/// The page bytes are staged in a temporary file whose path is appended to
/// the program arguments. The program must write JSON-lines events to its
/// standard output and exit successfully.
#[derive(Debug, Clone)]
pub struct ExternalDecoder {
    program: PathBuf,
    args: Vec<OsString>,
}

impl ExternalDecoder {
    /// Create a decoder running `program`.
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    /// Add an argument placed before the staged file path.
    pub fn with_arg(mut self, arg: impl Into<OsString>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Add several arguments placed before the staged file path.
    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Program being run.
    pub fn program(&self) -> &std::path::Path {
        &self.program
    }
}

impl StrokeDecoder for ExternalDecoder {
    fn name(&self) -> &str {
        self.program
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("external")
    }

    fn decode(&self, reader: &mut dyn Read, handler: &mut dyn StrokeHandler) -> Result<()> {
        let mut staged = tempfile::Builder::new()
            .prefix("pen2pdf-page-")
            .suffix(".stf")
            .tempfile()?;
        io::copy(reader, &mut staged)?;
        staged.flush()?;

        debug!(
            "running {} on {}",
            self.program.display(),
            staged.path().display()
        );

        let mut child = Command::new(&self.program)
            .args(&self.args)
            .arg(staged.path())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .spawn()
            .map_err(|e| Error::decode(format!("cannot run {}: {}", self.program.display(), e)))?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| Error::decode("decoder output is not captured"))?;

        let mut stream = EventStream::new(BufReader::new(stdout));
        for event in stream.by_ref() {
            match event {
                Ok(event) => event.dispatch(handler),
                Err(e) => {
                    let _ = child.kill();
                    let _ = child.wait();
                    return Err(e);
                }
            }
        }

        let status = child.wait()?;
        debug!("{} wrote {} lines", self.name(), stream.lines_read());
        if !status.success() {
            return Err(Error::decode(format!(
                "{} exited with {}",
                self.program.display(),
                status
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stroke::EventLog;

    #[test]
    fn test_event_stream_skips_blank_lines() {
        let input = "\n{\"type\":\"point\",\"x\":1,\"y\":2,\"pressure\":5,\"time\":0}\n\n{\"type\":\"stroke_end\",\"time\":1}\n";
        let events: Vec<_> = EventStream::new(input.as_bytes())
            .collect::<Result<_>>()
            .unwrap();
        assert_eq!(
            events,
            vec![StrokeEvent::point(1.0, 2.0, 5, 0), StrokeEvent::stroke_end(1)]
        );
    }

    #[test]
    fn test_event_stream_counts_blank_lines() {
        let input = "\n{\"type\":\"stroke_end\",\"time\":1}\n\n";
        let mut stream = EventStream::new(input.as_bytes());
        assert_eq!(stream.lines_read(), 0);
        assert!(stream.next().unwrap().is_ok());
        assert_eq!(stream.lines_read(), 2);
        assert!(stream.next().is_none());
        assert_eq!(stream.lines_read(), 3);
    }

    #[test]
    fn test_event_stream_reports_line() {
        let input = "{\"type\":\"stroke_end\",\"time\":1}\nnot json\n{\"type\":\"stroke_end\",\"time\":2}\n";
        let mut stream = EventStream::new(input.as_bytes());
        assert!(stream.next().unwrap().is_ok());
        match stream.next() {
            Some(Err(Error::Decode { line, .. })) => assert_eq!(line, 2),
            other => panic!("Expected decode error, got {:?}", other),
        }
        assert!(stream.next().is_none());
    }

    #[test]
    fn test_json_lines_decoder_dispatches() {
        let input = b"{\"type\":\"point\",\"x\":1,\"y\":2,\"pressure\":5,\"time\":3}\n";
        let mut log = EventLog::default();
        JsonLinesDecoder::new()
            .decode(&mut &input[..], &mut log)
            .unwrap();
        assert_eq!(log.events, vec![StrokeEvent::point(1.0, 2.0, 5, 3)]);
    }

    #[test]
    fn test_external_decoder_missing_program() {
        let decoder = ExternalDecoder::new("/nonexistent/pen2pdf-decoder");
        let mut log = EventLog::default();
        let result = decoder.decode(&mut &b"data"[..], &mut log);
        assert!(matches!(result, Err(Error::Decode { .. })));
        assert!(log.events.is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn test_external_decoder_reads_program_output() {
        // `cat` echoes the staged file, so JSON-lines input passes straight through.
        let decoder = ExternalDecoder::new("cat");
        let input = b"{\"type\":\"stroke_end\",\"time\":11}\n";
        let mut log = EventLog::default();
        decoder.decode(&mut &input[..], &mut log).unwrap();
        assert_eq!(log.events, vec![StrokeEvent::stroke_end(11)]);
    }

    #[cfg(unix)]
    #[test]
    fn test_external_decoder_failure_status() {
        let decoder = ExternalDecoder::new("false");
        let mut log = EventLog::default();
        let result = decoder.decode(&mut &b""[..], &mut log);
        assert!(matches!(result, Err(Error::Decode { .. })));
    }
}
