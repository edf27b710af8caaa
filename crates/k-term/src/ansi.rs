// SPDX-License-Identifier: MIT
//
// ANSI escape sequence generation.
//
// Pure functions that write escape sequences to any `impl Write`. No state,
// no decisions about when to emit; the compositor makes those. This module
// just knows the byte-level encoding of every terminal command we need, and
// those bytes must match exactly for terminal compatibility.
//
// All cursor positions are 0-indexed in our API and converted to 1-indexed
// for the terminal (ANSI standard uses 1-based coordinates).
//
// All functions return `io::Result` propagated from the underlying writer.
// Every sequence reaches the writer in one `write_all`, including the ones
// with numeric parameters, so an `OutputBuffer` that can't grow drops the
// whole sequence instead of keeping a dangling `ESC[`.

use std::io::{self, Cursor, Write};

/// The escape byte that introduces every sequence.
pub const ESC: u8 = 0x1B;

/// Cursor position report request (DSR 6).
pub const QUERY_CURSOR_POSITION: &[u8] = b"\x1b[6n";

/// Longest parameterised sequence: `ESC[65535C ESC[65535B`.
const MAX_SEQUENCE: usize = 32;

/// Format a sequence on the stack, then hand it to `w` in one piece.
fn write_sequence(w: &mut impl Write, args: std::fmt::Arguments<'_>) -> io::Result<()> {
    let mut seq = [0u8; MAX_SEQUENCE];
    let mut cursor = Cursor::new(&mut seq[..]);
    cursor.write_fmt(args)?;
    let len = usize::try_from(cursor.position()).map_err(io::Error::other)?;
    w.write_all(&seq[..len])
}

// ─── Cursor ──────────────────────────────────────────────────────────────────

/// Move the cursor to `(x, y)` using the CUP (Cursor Position) sequence.
///
/// Our coordinates are 0-indexed; ANSI CUP is 1-indexed.
#[inline]
pub fn cursor_to(w: &mut impl Write, x: u16, y: u16) -> io::Result<()> {
    write_sequence(w, format_args!("\x1b[{};{}H", u32::from(y) + 1, u32::from(x) + 1))
}

/// Move the cursor to the top-left cell (CUP with no parameters).
#[inline]
pub fn cursor_home(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[H")
}

/// Push the cursor towards the bottom-right corner.
///
/// CUF and CUD both stop at the screen edge, so a large `n` saturates at the
/// real last column and row. Used by the geometry fallback before querying
/// the cursor position.
#[inline]
pub fn cursor_far_corner(w: &mut impl Write, n: u16) -> io::Result<()> {
    write_sequence(w, format_args!("\x1b[{n}C\x1b[{n}B"))
}

/// Hide the cursor (DECTCEM reset).
#[inline]
pub fn cursor_hide(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[?25l")
}

/// Show the cursor (DECTCEM set).
#[inline]
pub fn cursor_show(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[?25h")
}

/// Ask the terminal to report the cursor position.
///
/// The reply arrives on stdin as `ESC [ row ; col R`.
#[inline]
pub fn query_cursor_position(w: &mut impl Write) -> io::Result<()> {
    w.write_all(QUERY_CURSOR_POSITION)
}

// ─── Screen ──────────────────────────────────────────────────────────────────

/// Clear the entire screen (ED 2).
#[inline]
pub fn clear_screen(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[2J")
}

/// Erase from the cursor to the end of the current line (EL 0).
#[inline]
pub fn clear_line(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[K")
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn emit(f: impl FnOnce(&mut Vec<u8>) -> io::Result<()>) -> Vec<u8> {
        let mut out = Vec::new();
        f(&mut out).unwrap();
        out
    }

    // ── Cursor ──────────────────────────────────────────────────────

    #[test]
    fn cursor_to_is_one_based() {
        assert_eq!(emit(|w| cursor_to(w, 0, 0)), b"\x1b[1;1H");
        assert_eq!(emit(|w| cursor_to(w, 4, 2)), b"\x1b[3;5H");
    }

    #[test]
    fn cursor_to_max_coordinate_does_not_overflow() {
        assert_eq!(emit(|w| cursor_to(w, u16::MAX, u16::MAX)), b"\x1b[65536;65536H");
    }

    #[test]
    fn cursor_home_sequence() {
        assert_eq!(emit(cursor_home), b"\x1b[H");
    }

    #[test]
    fn far_corner_sequence() {
        assert_eq!(emit(|w| cursor_far_corner(w, 999)), b"\x1b[999C\x1b[999B");
    }

    #[test]
    fn hide_and_show() {
        assert_eq!(emit(cursor_hide), b"\x1b[?25l");
        assert_eq!(emit(cursor_show), b"\x1b[?25h");
    }

    #[test]
    fn cursor_query_sequence() {
        assert_eq!(emit(query_cursor_position), b"\x1b[6n");
    }

    // ── Screen ──────────────────────────────────────────────────────

    #[test]
    fn clear_screen_sequence() {
        assert_eq!(emit(clear_screen), b"\x1b[2J");
    }

    #[test]
    fn clear_line_sequence() {
        assert_eq!(emit(clear_line), b"\x1b[K");
    }

    /// Records each `write` call separately.
    #[derive(Default)]
    struct Calls(Vec<Vec<u8>>);

    impl Write for Calls {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.push(buf.to_vec());
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn parameterised_sequences_are_one_write() {
        let mut calls = Calls::default();
        cursor_to(&mut calls, u16::MAX, u16::MAX).unwrap();
        cursor_far_corner(&mut calls, u16::MAX).unwrap();
        assert_eq!(
            calls.0,
            [b"\x1b[65536;65536H".to_vec(), b"\x1b[65535C\x1b[65535B".to_vec()]
        );
    }

    #[test]
    fn refused_cursor_move_leaves_buffer_untouched() {
        /// Accepts `room` bytes, then refuses every write.
        struct Full {
            bytes: Vec<u8>,
            room: usize,
        }

        impl Write for Full {
            fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
                if buf.len() > self.room {
                    return Err(io::ErrorKind::OutOfMemory.into());
                }
                self.room -= buf.len();
                self.bytes.extend_from_slice(buf);
                Ok(buf.len())
            }

            fn flush(&mut self) -> io::Result<()> {
                Ok(())
            }
        }

        let mut out = Full {
            bytes: b"row".to_vec(),
            room: 4,
        };
        assert!(cursor_to(&mut out, 9, 9).is_err());
        assert_eq!(out.bytes, b"row");
    }

    #[test]
    fn every_sequence_starts_with_esc() {
        let all: [Vec<u8>; 6] = [
            emit(cursor_home),
            emit(cursor_hide),
            emit(cursor_show),
            emit(clear_screen),
            emit(clear_line),
            emit(query_cursor_position),
        ];
        for seq in &all {
            assert_eq!(seq[0], ESC);
            assert_eq!(seq[1], b'[');
        }
    }
}
