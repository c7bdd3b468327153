//! Line codec: one JSON array per line.

use crate::core::{DbError, Result, Value};
use std::io::BufRead;
use std::path::{Path, PathBuf};

/// Serializes values as a JSON array terminated by a single `\n`.
/// Non-ASCII text is written as-is, not `\u` escaped.
pub fn encode_line<T: serde::Serialize + ?Sized>(values: &T) -> Result<String> {
    let mut line = serde_json::to_string(values)
        .map_err(|e| DbError::InvalidRow(format!("value cannot be encoded: {}", e)))?;
    line.push('\n');
    Ok(line)
}

/// Parses one encoded line. A trailing newline is allowed.
pub fn decode_line(line: &str) -> std::result::Result<Vec<Value>, serde_json::Error> {
    serde_json::from_str(line.trim_end_matches(['\n', '\r']))
}

/// Reads encoded lines one at a time and tracks the line number for errors.
pub struct LineReader<R> {
    inner: R,
    path: PathBuf,
    line_no: usize,
    buf: String,
}

impl<R: BufRead> LineReader<R> {
    pub fn new(inner: R, path: impl AsRef<Path>) -> Self {
        Self {
            inner,
            path: path.as_ref().to_path_buf(),
            line_no: 0,
            buf: String::new(),
        }
    }

    /// 1-based number of the last line returned.
    pub fn line_no(&self) -> usize {
        self.line_no
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Next decoded line, or `None` at end of data. Blank lines are skipped.
    pub fn next_values(&mut self) -> Result<Option<Vec<Value>>> {
        self.next_decoded()
    }

    /// Like `next_values` but decodes into any deserializable type.
    pub fn next_decoded<T: serde::de::DeserializeOwned>(&mut self) -> Result<Option<T>> {
        loop {
            self.buf.clear();
            let read = self
                .inner
                .read_line(&mut self.buf)
                .map_err(|e| DbError::io(&self.path, e))?;
            if read == 0 {
                return Ok(None);
            }
            self.line_no += 1;

            if self.buf.trim().is_empty() {
                continue;
            }
            if !self.buf.ends_with('\n') {
                log::debug!(
                    "{}: line {} has no terminator",
                    self.path.display(),
                    self.line_no
                );
            }

            return serde_json::from_str(self.buf.trim_end_matches(['\n', '\r']))
                .map(Some)
                .map_err(|e| DbError::decode(&self.path, self.line_no, e.to_string()));
        }
    }
}
