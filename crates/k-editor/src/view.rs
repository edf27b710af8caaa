//! Screen compositor: editor state in, one complete terminal frame out.
//!
//! A frame is built in memory and written in one go:
//!
//! ```text
//! ESC[?25l  ESC[H              hide cursor, go home
//! <row 0>   ESC[K  \r\n         content or "~", clear the rest of the line
//! ...
//! <row n-1> ESC[K              no line break after the last row
//! ESC[y;xH  ESC[?25h           place and show the cursor
//! ```
//!
//! The screen is never cleared. Each row is redrawn from column 0 and then
//! erased to end of line, so whatever a longer previous frame left behind is
//! wiped row by row and nothing flickers. There is no dirty tracking: every
//! row is drawn every time.
//!
//! Composition is a pure function of its inputs. It never reads from the
//! terminal.

use k_term::ansi;
use k_term::geometry::Size;
use k_term::output::OutputBuffer;

use crate::buffer::Buffer;
use crate::cursor::Cursor;

/// Marker drawn on screen rows past the end of the document.
pub const EMPTY_ROW: u8 = b'~';

/// Everything a frame depends on.
#[derive(Debug, Clone, Copy)]
pub struct Frame<'a> {
    pub buffer: &'a Buffer,
    pub size: Size,
    pub cursor: Cursor,
    pub banner: &'a str,
}

impl Frame<'_> {
    /// Compose this frame into a fresh buffer.
    #[must_use]
    pub fn render(&self) -> OutputBuffer {
        let mut out = OutputBuffer::new();
        self.draw(&mut out);
        out
    }

    /// Compose this frame, appending to `out`.
    pub fn draw(&self, out: &mut OutputBuffer) {
        ansi::cursor_hide(out).ok();
        ansi::cursor_home(out).ok();

        self.draw_rows(out);

        ansi::cursor_to(out, self.cursor.x, self.cursor.y).ok();
        ansi::cursor_show(out).ok();
    }

    fn draw_rows(&self, out: &mut OutputBuffer) {
        let rows = usize::from(self.size.rows);
        let cols = usize::from(self.size.cols);
        let banner_row = rows / 3;

        for y in 0..rows {
            match self.buffer.row(y) {
                Some(row) => {
                    out.append(row.truncated(cols));
                }
                None if self.buffer.is_empty() && y == banner_row => {
                    draw_banner(out, self.banner.as_bytes(), cols);
                }
                None => {
                    out.append(&[EMPTY_ROW]);
                }
            }

            ansi::clear_line(out).ok();
            if y + 1 < rows {
                out.append(b"\r\n");
            }
        }
    }
}

/// Centre `banner` in `cols` columns, truncating it if it doesn't fit.
///
/// The left padding starts with the empty-row marker so the `~` column
/// stays unbroken down the screen.
fn draw_banner(out: &mut OutputBuffer, banner: &[u8], cols: usize) {
    let text = &banner[..banner.len().min(cols)];
    let mut padding = (cols - text.len()) / 2;

    if padding > 0 {
        out.append(&[EMPTY_ROW]);
        padding -= 1;
    }
    out.append_repeated(b' ', padding);
    out.append(text);
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::Row;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    const BANNER: &str = "k-edit -- version 0.1.0";

    fn render(buffer: &Buffer, size: Size, cursor: Cursor) -> String {
        let frame = Frame {
            buffer,
            size,
            cursor,
            banner: BANNER,
        };
        String::from_utf8(frame.render().into_bytes()).unwrap()
    }

    /// The row segments between the home prefix and the cursor suffix.
    fn body(frame: &str) -> Vec<String> {
        let start = "\x1b[?25l\x1b[H".len();
        let end = frame.rfind("\x1b[").unwrap();
        let end = frame[..end].rfind("\x1b[").unwrap();
        frame[start..end]
            .split("\r\n")
            .map(|row| row.trim_end_matches("\x1b[K").to_owned())
            .collect()
    }

    // -- Frame shape --------------------------------------------------------

    #[test]
    fn frame_prefix_and_suffix() {
        let out = render(&Buffer::new(), Size::new(5, 20), Cursor::new(3, 2));
        assert!(out.starts_with("\x1b[?25l\x1b[H"));
        assert!(out.ends_with("\x1b[3;4H\x1b[?25h"));
    }

    #[test]
    fn no_trailing_line_break() {
        let out = render(&Buffer::new(), Size::new(3, 10), Cursor::ORIGIN);
        assert_eq!(out.matches("\r\n").count(), 2);
        assert!(out.contains("~\x1b[K\x1b[1;1H"));
    }

    #[test]
    fn every_row_clears_to_eol() {
        let out = render(&Buffer::new(), Size::new(7, 40), Cursor::ORIGIN);
        assert_eq!(out.matches("\x1b[K").count(), 7);
    }

    #[test]
    fn never_clears_whole_screen() {
        let buf = Buffer::from_bytes(b"text");
        let out = render(&buf, Size::new(4, 10), Cursor::ORIGIN);
        assert!(!out.contains("\x1b[2J"));
    }

    // -- Empty document -----------------------------------------------------

    #[test]
    fn empty_document_24x80() {
        let out = render(&Buffer::new(), Size::new(24, 80), Cursor::ORIGIN);
        let rows = body(&out);
        assert_eq!(rows.len(), 24);

        let padding = (80 - BANNER.len()) / 2;
        let expected_banner = format!("~{}{BANNER}", " ".repeat(padding - 1));
        for (y, row) in rows.iter().enumerate() {
            if y == 8 {
                assert_eq!(row, &expected_banner);
            } else {
                assert_eq!(row, "~", "row {y}");
            }
        }
    }

    #[test]
    fn banner_truncated_to_width() {
        let out = render(&Buffer::new(), Size::new(3, 6), Cursor::ORIGIN);
        assert_eq!(body(&out)[1], "k-edit");
    }

    #[test]
    fn banner_with_one_column_of_padding() {
        let mut out = OutputBuffer::new();
        draw_banner(&mut out, b"abc", 5);
        assert_eq!(out.as_bytes(), b"~abc");
    }

    #[test]
    fn banner_exact_fit_has_no_marker() {
        let mut out = OutputBuffer::new();
        draw_banner(&mut out, b"abcde", 5);
        assert_eq!(out.as_bytes(), b"abcde");
    }

    #[test]
    fn banner_on_first_row_of_short_screen() {
        let out = render(&Buffer::new(), Size::new(2, 40), Cursor::ORIGIN);
        assert!(body(&out)[0].ends_with(BANNER));
        assert_eq!(body(&out)[1], "~");
    }

    // -- Content ------------------------------------------------------------

    #[test]
    fn content_rows_then_markers() {
        let mut buf = Buffer::new();
        buf.push_row(Row::new("first line"));
        buf.push_row(Row::new("second"));
        let out = render(&buf, Size::new(4, 80), Cursor::ORIGIN);
        assert_eq!(body(&out), ["first line", "second", "~", "~"]);
    }

    #[test]
    fn loaded_document_has_no_banner() {
        let buf = Buffer::from_bytes(b"only");
        let out = render(&buf, Size::new(24, 80), Cursor::ORIGIN);
        assert!(!out.contains(BANNER));
    }

    #[test]
    fn long_rows_truncated() {
        let buf = Buffer::from_bytes(b"abcdefghijklmnop");
        let out = render(&buf, Size::new(1, 5), Cursor::ORIGIN);
        assert_eq!(body(&out), ["abcde"]);
    }

    #[test]
    fn rows_beyond_screen_not_drawn() {
        let buf = Buffer::from_bytes(b"1\n2\n3\n4\n5");
        let out = render(&buf, Size::new(3, 10), Cursor::ORIGIN);
        assert_eq!(body(&out), ["1", "2", "3"]);
    }

    #[test]
    fn draw_appends_to_existing_content() {
        let mut out = OutputBuffer::new();
        out.append(b"prefix");
        Frame {
            buffer: &Buffer::new(),
            size: Size::new(1, 1),
            cursor: Cursor::ORIGIN,
            banner: "",
        }
        .draw(&mut out);
        assert!(out.as_bytes().starts_with(b"prefix\x1b[?25l"));
    }

    // -- Properties ---------------------------------------------------------

    proptest! {
        #[test]
        fn frame_has_one_segment_per_row(
            rows in 1u16..120,
            cols in 1u16..200,
            lines in proptest::collection::vec("[a-z ]{0,250}", 0..150),
        ) {
            let buf = Buffer::from_bytes(lines.join("\n").as_bytes());
            let buf = if lines.is_empty() { Buffer::new() } else { buf };
            let out = render(&buf, Size::new(rows, cols), Cursor::ORIGIN);

            prop_assert!(out.starts_with("\x1b[?25l\x1b[H"));
            prop_assert!(out.ends_with("\x1b[?25h"));
            prop_assert_eq!(out.matches("\r\n").count(), usize::from(rows) - 1);
            for row in body(&out) {
                prop_assert!(row.len() <= usize::from(cols));
            }
        }
    }
}
