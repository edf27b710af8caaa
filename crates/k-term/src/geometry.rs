// SPDX-License-Identifier: MIT
//
// Window geometry: how big is the screen?
//
// Safety: `window_size` uses `unsafe` for the TIOCGWINSZ ioctl, the
// standard POSIX interface for this question.
#![allow(unsafe_code)]
//
// Two ways to find out, tried in order:
//
//   1. Ask the driver: `ioctl(TIOCGWINSZ)`. Trusted whenever it answers
//      with a non-zero row and column count.
//
//   2. Ask the terminal: push the cursor as far right and down as it will
//      go (CUF/CUD saturate at the screen edge), then request a cursor
//      position report and read the `ESC [ row ; col R` reply. The cursor
//      now sits on the last cell, so its position is the screen size.
//
// The reply is read one byte at a time into a bounded buffer, stopping at
// `R`, at a read timeout, or when the buffer is full. Anything that does
// not parse as `ESC [ <rows> ; <cols>` fails the fallback.

use std::io::Write;

use crate::ansi::{self, ESC};
use crate::error::{Error, Result};
use crate::reader::{ByteSource, ReadByte};

// ─── Size ───────────────────────────────────────────────────────────────────

/// Terminal dimensions in character cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Size {
    /// Number of rows (height in character cells).
    pub rows: u16,
    /// Number of columns (width in character cells).
    pub cols: u16,
}

impl Size {
    /// Create a size.
    #[inline]
    #[must_use]
    pub const fn new(rows: u16, cols: u16) -> Self {
        Self { rows, cols }
    }

    /// Whether either dimension is zero.
    #[inline]
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.rows == 0 || self.cols == 0
    }
}

// ─── Configuration ──────────────────────────────────────────────────────────

/// Tuning for the cursor-query fallback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolveConfig {
    /// Maximum bytes of cursor-position reply to read (terminator excluded).
    pub reply_capacity: usize,
    /// Distance passed to CUF/CUD when parking the cursor in the corner.
    pub far_corner: u16,
}

impl Default for ResolveConfig {
    fn default() -> Self {
        Self {
            reply_capacity: 32,
            far_corner: 999,
        }
    }
}

// ─── Primary path ───────────────────────────────────────────────────────────

/// Query the terminal size via `ioctl(TIOCGWINSZ)` on stdout.
///
/// Returns `None` if stdout is not a terminal, the query fails, or it
/// reports a zero dimension.
#[cfg(unix)]
#[must_use]
pub fn window_size() -> Option<Size> {
    let mut ws: libc::winsize = unsafe { std::mem::zeroed() };
    let result = unsafe { libc::ioctl(libc::STDOUT_FILENO, libc::TIOCGWINSZ, &raw mut ws) };

    if result == 0 && ws.ws_col > 0 && ws.ws_row > 0 {
        Some(Size::new(ws.ws_row, ws.ws_col))
    } else {
        None
    }
}

#[cfg(not(unix))]
#[must_use]
pub fn window_size() -> Option<Size> {
    None
}

// ─── Fallback path ──────────────────────────────────────────────────────────

/// Read a cursor-position reply, without its `R` terminator.
///
/// Stops at `R`, at a timeout or end of input, or after `capacity` bytes.
///
/// # Errors
///
/// Propagates read errors from `src`.
pub fn read_cursor_reply(src: &mut impl ByteSource, capacity: usize) -> Result<Vec<u8>> {
    let mut reply = Vec::with_capacity(capacity);

    while reply.len() < capacity {
        match src.read_byte()? {
            ReadByte::Byte(b'R') | ReadByte::Timeout | ReadByte::Closed => break,
            ReadByte::Byte(b) => reply.push(b),
        }
    }

    Ok(reply)
}

/// Parse `ESC [ <rows> ; <cols>` into a size.
///
/// # Errors
///
/// [`Error::CursorReply`] if the prefix is missing or either number fails
/// to parse.
pub fn parse_cursor_reply(reply: &[u8]) -> Result<Size> {
    let malformed = || Error::CursorReply(reply.to_vec());

    let body = reply.strip_prefix(&[ESC, b'['][..]).ok_or_else(malformed)?;
    let sep = body.iter().position(|&b| b == b';').ok_or_else(malformed)?;
    let rows = parse_u16(&body[..sep]).ok_or_else(malformed)?;
    let cols = parse_u16(&body[sep + 1..]).ok_or_else(malformed)?;

    Ok(Size::new(rows, cols))
}

/// Parse a non-empty run of ASCII digits.
fn parse_u16(digits: &[u8]) -> Option<u16> {
    if digits.is_empty() || !digits.iter().all(u8::is_ascii_digit) {
        return None;
    }
    std::str::from_utf8(digits).ok()?.parse().ok()
}

/// Ask the terminal where the cursor is.
///
/// Writes the DSR 6 request to `out`, then reads and parses the reply from
/// `src`.
///
/// # Errors
///
/// [`Error::Write`] if the request can't be sent, [`Error::CursorReply`]
/// if the reply is malformed, or any read error from `src`.
pub fn query_cursor_position(
    src: &mut impl ByteSource,
    out: &mut impl Write,
    capacity: usize,
) -> Result<Size> {
    ansi::query_cursor_position(out).map_err(Error::Write)?;
    out.flush().map_err(Error::Write)?;

    let reply = read_cursor_reply(src, capacity)?;
    parse_cursor_reply(&reply)
}

// ─── Resolver ───────────────────────────────────────────────────────────────

/// Settle on a screen size: `primary` if it's usable, otherwise the
/// cursor-query fallback through `src` / `out`.
///
/// # Errors
///
/// [`Error::WindowSize`] if neither path yields a non-zero size. Read and
/// write failures on the terminal are propagated as they are.
pub fn resolve(
    primary: Option<Size>,
    src: &mut impl ByteSource,
    out: &mut impl Write,
    config: ResolveConfig,
) -> Result<Size> {
    if let Some(size) = primary.filter(|s| !s.is_empty()) {
        return Ok(size);
    }

    log::debug!("window size ioctl unavailable, falling back to cursor query");

    ansi::cursor_far_corner(out, config.far_corner).map_err(Error::Write)?;
    let size = match query_cursor_position(src, out, config.reply_capacity) {
        Ok(size) => size,
        Err(Error::CursorReply(reply)) => {
            log::warn!("cursor position reply unusable: {reply:?}");
            return Err(Error::WindowSize);
        }
        Err(e) => return Err(e),
    };

    if size.is_empty() {
        log::warn!("terminal reported a zero-sized screen: {size:?}");
        return Err(Error::WindowSize);
    }
    Ok(size)
}

/// Resolve the size of the terminal this process is attached to.
///
/// # Errors
///
/// As [`resolve`].
pub fn resolve_terminal(src: &mut impl ByteSource, config: ResolveConfig) -> Result<Size> {
    resolve(window_size(), src, &mut std::io::stdout().lock(), config)
}

// ─── Tests ───────────────────────────────────────────────────────────────────
