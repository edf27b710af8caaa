// SPDX-License-Identifier: MIT
//
// Output buffering.
//
// `OutputBuffer` accumulates every byte of a frame in memory so the whole
// frame can be written in a single write() call. The terminal never sees a
// half-drawn screen: either the full frame lands or nothing does.
//
// Appends are all-or-nothing. If growing the buffer fails, that one append
// is dropped and everything already in the buffer stays intact, so a frame
// degrades by a missing fragment instead of being corrupted.

use std::io::{self, Write};

/// Default capacity: 16 KB, many full 80×24 frames.
const DEFAULT_CAPACITY: usize = 16_384;

/// A byte buffer that accumulates ANSI output for a single `write()` call.
///
/// Built fresh for every refresh, written once, then discarded or cleared.
pub struct OutputBuffer {
    buf: Vec<u8>,
}

impl OutputBuffer {
    /// Create an empty buffer with default capacity (16 KB).
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// Create an empty buffer with room for `capacity` bytes.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: Vec::with_capacity(capacity),
        }
    }

    /// Number of bytes accumulated.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// Whether the buffer is empty.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// The accumulated bytes.
    #[inline]
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Append `bytes`, or nothing at all if the buffer cannot grow.
    ///
    /// Returns `false` when the append was dropped.
    pub fn append(&mut self, bytes: &[u8]) -> bool {
        if let Err(e) = self.buf.try_reserve(bytes.len()) {
            log::warn!("dropping {} byte append: {e}", bytes.len());
            return false;
        }
        self.buf.extend_from_slice(bytes);
        true
    }

    /// Append `byte` repeated `count` times, all or nothing.
    pub fn append_repeated(&mut self, byte: u8, count: usize) -> bool {
        if let Err(e) = self.buf.try_reserve(count) {
            log::warn!("dropping {count} byte fill: {e}");
            return false;
        }
        self.buf.resize(self.buf.len() + count, byte);
        true
    }

    /// Clear the buffer for reuse (keeps allocated capacity).
    #[inline]
    pub fn clear(&mut self) {
        self.buf.clear();
    }

    /// Write accumulated output to `w` in one call and clear the buffer.
    ///
    /// # Errors
    ///
    /// Returns an error if writing to `w` fails.
    pub fn flush_to(&mut self, w: &mut impl Write) -> io::Result<()> {
        if !self.buf.is_empty() {
            w.write_all(&self.buf)?;
            w.flush()?;
            self.buf.clear();
        }
        Ok(())
    }

    /// Consume the buffer, returning its bytes.
    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }
}

impl Write for OutputBuffer {
    #[inline]
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.append(buf) {
            Ok(buf.len())
        } else {
            Err(io::ErrorKind::OutOfMemory.into())
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        // Intentionally a no-op. Real flushing via flush_to().
        Ok(())
    }
}

impl Default for OutputBuffer {
    fn default() -> Self {
        Self::new()
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
