//! Line reader
//!
//! Yields trimmed, non-empty lines from a text file. Trailing `\r` and
//! `\n` are stripped, lines that are empty after stripping are skipped,
//! and one line of lookahead keeps the `at_end` flag accurate. The file
//! handle is owned by the reader and released on every exit path when
//! the reader drops.

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

/// Buffered reader over the non-empty lines of a text file.
#[derive(Debug)]
pub struct LineReader {
    reader: BufReader<File>,
    current: Option<String>,
    source_eof: bool,
}

impl LineReader {
    /// Open a text file and buffer its first non-empty line.
    pub fn open(path: impl AsRef<Path>) -> io::Result<Self> {
        let file = File::open(path)?;
        let mut reader = LineReader {
            reader: BufReader::new(file),
            current: None,
            source_eof: false,
        };
        reader.advance()?;
        Ok(reader)
    }

    /// Hand out the buffered line and fetch the next one. Returns
    /// `None` once the file is exhausted.
    pub fn read_line(&mut self) -> io::Result<Option<String>> {
        let line = self.current.take();
        if line.is_some() {
            self.advance()?;
        }
        Ok(line)
    }

    /// True once the source reported end-of-file and the buffered line
    /// has been drained.
    pub fn at_end(&self) -> bool {
        self.source_eof && self.current.is_none()
    }

    /// Pull the next non-empty line into the buffer.
    fn advance(&mut self) -> io::Result<()> {
        self.current = None;
        while !self.source_eof {
            let mut raw = String::new();
            let bytes = self.reader.read_line(&mut raw)?;
            if bytes == 0 {
                self.source_eof = true;
                break;
            }
            while raw.ends_with('\n') || raw.ends_with('\r') {
                raw.pop();
            }
            if !raw.is_empty() {
                self.current = Some(raw);
                break;
            }
        }
        Ok(())
    }
}
