// SPDX-License-Identifier: MIT
//
// k-term: the terminal protocol layer of k-edit.
//
// Everything between the editor model and the character terminal lives
// here: raw mode entry and guaranteed restore, window geometry discovery
// (ioctl first, cursor-position query as the fallback), a finite-state
// decoder that turns raw key bytes into logical keys, and an append
// buffer that lets every frame reach the terminal in a single write.
//
// No TUI framework sits underneath. The crate speaks termios and ANSI
// directly, and every I/O seam (`ByteSource` for input, `io::Write` for
// output) is a trait so the whole protocol can be driven by a simulated
// terminal in tests.

pub mod ansi;
pub mod error;
pub mod event_loop;
pub mod geometry;
pub mod input;
pub mod output;
pub mod reader;
pub mod terminal;

pub use error::{Error, Result};
