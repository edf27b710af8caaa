//! Rows of loaded text.
//!
//! A `Buffer` is an ordered sequence of [`Row`]s with stable indices. Rows
//! are raw bytes: no encoding is assumed, so any file can be shown, and the
//! compositor truncates by byte count.
//!
//! Loading strips the line terminator (`\n`, `\r\n`, or a stray `\r`) from
//! every line. An empty file gives an empty buffer, which is what makes the
//! welcome banner appear.

use std::fs;
use std::io::{self, BufRead};
use std::path::{Path, PathBuf};

use thiserror::Error;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Failure to load a buffer.
#[derive(Debug, Error)]
pub enum BufferError {
    /// The file couldn't be opened or read.
    #[error("{}: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

// ---------------------------------------------------------------------------
// Row
// ---------------------------------------------------------------------------

/// One line of text, without its line terminator.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Row {
    content: Vec<u8>,
}

impl Row {
    /// Create a row from raw bytes.
    #[must_use]
    pub fn new(content: impl Into<Vec<u8>>) -> Self {
        Self {
            content: content.into(),
        }
    }

    /// The row's bytes.
    #[inline]
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.content
    }

    /// Length in bytes.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.content.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    /// The first `width` bytes, or the whole row if it is shorter.
    #[inline]
    #[must_use]
    pub fn truncated(&self, width: usize) -> &[u8] {
        &self.content[..self.content.len().min(width)]
    }
}

// ---------------------------------------------------------------------------
// Buffer
// ---------------------------------------------------------------------------

/// The loaded document: zero or more rows, plus where they came from.
#[derive(Debug, Clone, Default)]
pub struct Buffer {
    rows: Vec<Row>,
    path: Option<PathBuf>,
}

impl Buffer {
    /// An empty buffer with no file behind it.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            rows: Vec::new(),
            path: None,
        }
    }

    /// Build a buffer from in-memory text, one row per line.
    #[must_use]
    pub fn from_bytes(text: &[u8]) -> Self {
        Self {
            rows: split_rows(text),
            path: None,
        }
    }

    /// Load every line of the file at `path`.
    ///
    /// # Errors
    ///
    /// [`BufferError::Open`] if the file can't be opened or read.
    pub fn from_file(path: &Path) -> Result<Self, BufferError> {
        let open_err = |source| BufferError::Open {
            path: path.to_path_buf(),
            source,
        };

        let file = fs::File::open(path).map_err(open_err)?;
        let rows = read_rows(io::BufReader::new(file)).map_err(open_err)?;

        log::info!("loaded {} rows from {}", rows.len(), path.display());
        Ok(Self {
            rows,
            path: Some(path.to_path_buf()),
        })
    }

    /// Number of rows.
    #[inline]
    #[must_use]
    pub fn num_rows(&self) -> usize {
        self.rows.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Row `index`, if it exists.
    #[inline]
    #[must_use]
    pub fn row(&self, index: usize) -> Option<&Row> {
        self.rows.get(index)
    }

    /// All rows in order.
    #[inline]
    #[must_use]
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// Append a row at the end.
    pub fn push_row(&mut self, row: Row) {
        self.rows.push(row);
    }

    /// The file this buffer was loaded from.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }
}

/// Read lines until EOF, stripping terminators.
fn read_rows(mut reader: impl BufRead) -> io::Result<Vec<Row>> {
    let mut rows = Vec::new();
    let mut line = Vec::new();

    while reader.read_until(b'\n', &mut line)? > 0 {
        rows.push(Row::new(strip_terminator(&line)));
        line.clear();
    }

    Ok(rows)
}

fn split_rows(text: &[u8]) -> Vec<Row> {
    if text.is_empty() {
        return Vec::new();
    }
    let body = text.strip_suffix(b"\n").unwrap_or(text);
    body.split(|&b| b == b'\n')
        .map(|line| Row::new(strip_terminator(line)))
        .collect()
}

/// Drop trailing `\n` / `\r` bytes.
fn strip_terminator(line: &[u8]) -> &[u8] {
    let end = line
        .iter()
        .rposition(|&b| b != b'\n' && b != b'\r')
        .map_or(0, |i| i + 1);
    &line[..end]
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
