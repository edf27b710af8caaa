// SPDX-License-Identifier: MIT
//
// Error taxonomy for terminal control.
//
// Every variant that reaches the binary is fatal: the terminal's control
// channel is suspect, so the caller restores the saved mode, clears the
// screen, reports, and exits. `CursorReply` comes from
// `geometry::parse_cursor_reply` and `geometry::query_cursor_position`.
// The cursor query is the resolver's last path after the ioctl, so
// `geometry::resolve` turns a bad reply into `WindowSize` and only that
// ever leaves the resolver. Timeouts are not errors at all; they surface
// as `ReadByte::Timeout` from the byte source.

use std::io;

use thiserror::Error;

/// Errors raised by the terminal protocol layer.
#[derive(Debug, Error)]
pub enum Error {
    /// `tcgetattr` failed: the original mode could not be captured.
    #[error("tcgetattr: {0}")]
    GetAttr(#[source] io::Error),

    /// `tcsetattr` failed while entering or leaving raw mode.
    #[error("tcsetattr: {0}")]
    SetAttr(#[source] io::Error),

    /// A read failed for a reason other than timeout or would-block.
    #[error("read: {0}")]
    Read(#[source] io::Error),

    /// Writing to the terminal failed.
    #[error("write: {0}")]
    Write(#[source] io::Error),

    /// The cursor-position reply did not have the `ESC [ row ; col` shape.
    ///
    /// Returned by the cursor query helpers. The resolver reports it as
    /// [`Error::WindowSize`].
    #[error("malformed cursor position reply: {0:?}")]
    CursorReply(Vec<u8>),

    /// Neither the window-size ioctl nor the cursor query produced a size.
    #[error("unable to determine window size")]
    WindowSize,

    /// The input source reached end of input.
    #[error("input closed")]
    InputClosed,
}

/// Result alias used throughout `k-term`.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Whether this error only ends the session rather than signalling failure.
    ///
    /// End of input is a clean shutdown; everything else exits non-zero.
    #[must_use]
    pub const fn is_clean_exit(&self) -> bool {
        matches!(self, Self::InputClosed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_names_the_failed_call() {
        let err = Error::GetAttr(io::Error::other("not a tty"));
        assert!(err.to_string().starts_with("tcgetattr: "));
    }

    #[test]
    fn cursor_reply_shows_bytes() {
        let err = Error::CursorReply(b"\x1b[24".to_vec());
        assert!(err.to_string().contains("malformed cursor position reply"));
    }

    #[test]
    fn only_closed_input_is_clean() {
        assert!(Error::InputClosed.is_clean_exit());
        assert!(!Error::WindowSize.is_clean_exit());
        assert!(!Error::Read(io::Error::other("boom")).is_clean_exit());
    }

    #[test]
    fn source_is_preserved() {
        use std::error::Error as _;
        let err = Error::SetAttr(io::Error::other("denied"));
        assert_eq!(err.source().unwrap().to_string(), "denied");
    }
}
