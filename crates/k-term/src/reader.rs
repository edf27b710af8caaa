// SPDX-License-Identifier: MIT
#![allow(unsafe_code)]
//
// Byte sources: the single suspension point of the editor.
//
// Everything that waits on the user funnels through one operation: read
// one byte with a bounded wait. The answer is either a byte, a timeout
// (nothing arrived within the raw-mode VTIME window), or end of input.
// Timeouts are not errors; the control loop treats them as an idle poll
// and asks again.
//
// `StdinSource` is the real terminal. In raw mode with VMIN=0 a read()
// that returns 0 is a timeout, and EAGAIN / EINTR are folded into the
// same answer. `ScriptedSource` replays a fixed script of bytes and
// timeouts so the decoder, the geometry fallback, and the control loop
// can be exercised without a TTY.

use std::collections::VecDeque;
#[cfg(unix)]
use std::io;

use crate::error::{Error, Result};

/// Outcome of a single bounded-wait read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadByte {
    /// One byte of input.
    Byte(u8),
    /// Nothing arrived before the read timeout expired.
    Timeout,
    /// The source has no more input, ever.
    Closed,
}

/// Anything that can hand out input one byte at a time with a bounded wait.
pub trait ByteSource {
    /// Read at most one byte, waiting no longer than the source's timeout.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Read`] for failures other than timeout / would-block.
    fn read_byte(&mut self) -> Result<ReadByte>;
}

impl<S: ByteSource + ?Sized> ByteSource for &mut S {
    fn read_byte(&mut self) -> Result<ReadByte> {
        (**self).read_byte()
    }
}

// ─── StdinSource ─────────────────────────────────────────────────────────────

/// The process's standard input, read one byte per call.
///
/// Relies on the raw-mode read policy (VMIN=0, VTIME>0) for its timeout:
/// read() returns 0 when the window closes with no input.
#[derive(Debug, Default, Clone, Copy)]
pub struct StdinSource;

impl StdinSource {
    /// Create a source over stdin.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

#[cfg(unix)]
impl ByteSource for StdinSource {
    fn read_byte(&mut self) -> Result<ReadByte> {
        let mut byte = 0u8;
        let n = unsafe { libc::read(libc::STDIN_FILENO, (&raw mut byte).cast(), 1) };

        match n {
            1 => Ok(ReadByte::Byte(byte)),
            0 => Ok(ReadByte::Timeout),
            _ => {
                let err = io::Error::last_os_error();
                match err.kind() {
                    io::ErrorKind::WouldBlock | io::ErrorKind::Interrupted => Ok(ReadByte::Timeout),
                    _ => Err(Error::Read(err)),
                }
            }
        }
    }
}

#[cfg(not(unix))]
impl ByteSource for StdinSource {
    fn read_byte(&mut self) -> Result<ReadByte> {
        use std::io::Read;

        let mut byte = [0u8; 1];
        match std::io::stdin().lock().read(&mut byte) {
            Ok(0) => Ok(ReadByte::Closed),
            Ok(_) => Ok(ReadByte::Byte(byte[0])),
            Err(e) => Err(Error::Read(e)),
        }
    }
}

// ─── ScriptedSource ──────────────────────────────────────────────────────────

/// An in-memory byte source that replays a script.
///
/// Once the script runs out the source reports [`ReadByte::Closed`].
///
/// ```
/// use k_term::reader::{ByteSource, ReadByte, ScriptedSource};
///
/// let mut src = ScriptedSource::new(b"\x1b").then_timeout();
/// assert_eq!(src.read_byte().unwrap(), ReadByte::Byte(0x1b));
/// assert_eq!(src.read_byte().unwrap(), ReadByte::Timeout);
/// assert_eq!(src.read_byte().unwrap(), ReadByte::Closed);
/// ```
#[derive(Debug, Default, Clone)]
pub struct ScriptedSource {
    script: VecDeque<ReadByte>,
}

impl ScriptedSource {
    /// A source that yields `bytes` in order.
    #[must_use]
    pub fn new(bytes: &[u8]) -> Self {
        Self {
            script: bytes.iter().copied().map(ReadByte::Byte).collect(),
        }
    }

    /// Append more bytes to the script.
    #[must_use]
    pub fn then_bytes(mut self, bytes: &[u8]) -> Self {
        self.script.extend(bytes.iter().copied().map(ReadByte::Byte));
        self
    }

    /// Append one read timeout to the script.
    #[must_use]
    pub fn then_timeout(mut self) -> Self {
        self.script.push_back(ReadByte::Timeout);
        self
    }

    /// Number of scripted reads not yet consumed.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.script.len()
    }
}

impl ByteSource for ScriptedSource {
    fn read_byte(&mut self) -> Result<ReadByte> {
        Ok(self.script.pop_front().unwrap_or(ReadByte::Closed))
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
