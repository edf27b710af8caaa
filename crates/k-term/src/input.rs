// SPDX-License-Identifier: MIT
//
// Key decoder.
//
// Turns raw stdin bytes into logical keys: either a literal byte or one of
// a small set of named keys (arrows, paging, home/end, delete, escape).
//
// # Design
//
// Decoding is an explicit finite-state machine. `step` is the entire
// transition function: given a state and the next byte it either emits a
// key or moves to another state. The escape-sequence vocabulary lives in
// three lookup tables next to it, so every recognised sequence and every
// dead end is enumerable and testable on its own.
//
//   Start ──ESC──▶ Escape ──'['──▶ Csi ──digit──▶ CsiDigit ──'~'──▶ key
//     │               │              └──letter──▶ key
//     └─other─▶ Char  └──'O'──▶ Ss3 ──letter──▶ key
//
// Every call to [`read_key`] starts at `Start` and decodes exactly one
// key; nothing carries over between calls. A timeout or end of input in
// the middle of a sequence, or a byte the tables don't know, degrades to
// a bare `Escape`. The decoder never fails on input it doesn't like.

use crate::ansi::ESC;
use crate::error::{Error, Result};
use crate::reader::{ByteSource, ReadByte};

// ─── Keys ───────────────────────────────────────────────────────────────────

/// A decoded logical keypress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    /// A literal input byte (printable or control character).
    Char(u8),
    /// Up arrow, `ESC [ A`.
    Up,
    /// Down arrow, `ESC [ B`.
    Down,
    /// Left arrow, `ESC [ D`.
    Left,
    /// Right arrow, `ESC [ C`.
    Right,
    /// Page Up, `ESC [ 5 ~`.
    PageUp,
    /// Page Down, `ESC [ 6 ~`.
    PageDown,
    /// Home: `ESC [ H`, `ESC O H`, `ESC [ 1 ~` or `ESC [ 7 ~`.
    Home,
    /// End: `ESC [ F`, `ESC O F`, `ESC [ 4 ~` or `ESC [ 8 ~`.
    End,
    /// Forward delete, `ESC [ 3 ~`. Not Backspace, which arrives as a `Char`.
    Delete,
    /// A bare Escape press, or any sequence the decoder didn't recognise.
    Escape,
}

impl Key {
    /// Whether this is `Ctrl` + `letter` (e.g. `Key::Char(0x11)` for `b'q'`).
    #[inline]
    #[must_use]
    pub const fn is_ctrl(self, letter: u8) -> bool {
        matches!(self, Self::Char(b) if b == ctrl(letter))
    }
}

/// The byte a terminal sends for `Ctrl` + `letter`.
///
/// Control keys strip bits 5 and 6, so `Ctrl+Q` is `b'q' & 0x1F == 0x11`.
#[inline]
#[must_use]
pub const fn ctrl(letter: u8) -> u8 {
    letter & 0x1F
}

// ─── Transition tables ──────────────────────────────────────────────────────

/// `ESC [ <letter>` sequences.
const CSI_LETTERS: &[(u8, Key)] = &[
    (b'A', Key::Up),
    (b'B', Key::Down),
    (b'C', Key::Right),
    (b'D', Key::Left),
    (b'H', Key::Home),
    (b'F', Key::End),
];

/// `ESC [ <digit> ~` sequences. Home and End each have two encodings
/// depending on the terminal (vt220 vs. rxvt).
const CSI_TILDE: &[(u8, Key)] = &[
    (b'1', Key::Home),
    (b'3', Key::Delete),
    (b'4', Key::End),
    (b'5', Key::PageUp),
    (b'6', Key::PageDown),
    (b'7', Key::Home),
    (b'8', Key::End),
];

/// `ESC O <letter>` sequences.
const SS3_LETTERS: &[(u8, Key)] = &[(b'H', Key::Home), (b'F', Key::End)];

fn lookup(table: &[(u8, Key)], byte: u8) -> Key {
    table
        .iter()
        .find(|&&(b, _)| b == byte)
        .map_or(Key::Escape, |&(_, key)| key)
}

// ─── State machine ──────────────────────────────────────────────────────────

/// Decoder state between bytes of a single key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    /// Nothing read yet.
    Start,
    /// Read `ESC`.
    Escape,
    /// Read `ESC [`.
    Csi,
    /// Read `ESC [ <digit>`.
    CsiDigit(u8),
    /// Read `ESC O`.
    Ss3,
}

/// What the machine does with one byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    /// The key is complete.
    Emit(Key),
    /// Need another byte.
    Next(State),
}

/// The transition function.
fn step(state: State, byte: u8) -> Step {
    match state {
        State::Start if byte == ESC => Step::Next(State::Escape),
        State::Start => Step::Emit(Key::Char(byte)),
        State::Escape => match byte {
            b'[' => Step::Next(State::Csi),
            b'O' => Step::Next(State::Ss3),
            _ => Step::Emit(Key::Escape),
        },
        State::Csi if byte.is_ascii_digit() => Step::Next(State::CsiDigit(byte)),
        State::Csi => Step::Emit(lookup(CSI_LETTERS, byte)),
        State::CsiDigit(digit) if byte == b'~' => Step::Emit(lookup(CSI_TILDE, digit)),
        State::CsiDigit(_) => Step::Emit(Key::Escape),
        State::Ss3 => Step::Emit(lookup(SS3_LETTERS, byte)),
    }
}

// ─── Reading ────────────────────────────────────────────────────────────────

/// Decode one key from `src`.
///
/// Returns `Ok(None)` when no byte arrived before the read timeout (an idle
/// poll, not an error). Once the first byte is in, the rest of the sequence
/// gets one bounded read per byte; a timeout there yields [`Key::Escape`].
///
/// # Errors
///
/// [`Error::InputClosed`] if the source is exhausted before a key starts,
/// or any read error from the source.
pub fn read_key(src: &mut impl ByteSource) -> Result<Option<Key>> {
    let mut state = State::Start;

    loop {
        let byte = match src.read_byte()? {
            ReadByte::Byte(b) => b,
            ReadByte::Timeout if state == State::Start => return Ok(None),
            ReadByte::Closed if state == State::Start => return Err(Error::InputClosed),
            ReadByte::Timeout | ReadByte::Closed => {
                log::trace!("escape sequence cut short in {state:?}");
                return Ok(Some(Key::Escape));
            }
        };

        match step(state, byte) {
            Step::Emit(key) => {
                if key == Key::Escape && state != State::Escape {
                    log::trace!("unrecognised escape sequence ending {byte:#04x} in {state:?}");
                }
                return Ok(Some(key));
            }
            Step::Next(next) => state = next,
        }
    }
}

/// Block until a key arrives, retrying through idle polls.
///
/// # Errors
///
/// Same as [`read_key`]; timeouts are absorbed.
pub fn wait_key(src: &mut impl ByteSource) -> Result<Key> {
    loop {
        if let Some(key) = read_key(src)? {
            return Ok(key);
        }
    }
}

/// A lazy sequence of keys decoded from a byte source.
///
/// Each `next()` blocks (through idle polls) for exactly one key. The
/// iterator ends when the source closes; a read error is yielded once and
/// then ends it.
///
/// ```
/// use k_term::input::{Key, Keys};
/// use k_term::reader::ScriptedSource;
///
/// let keys: Vec<Key> = Keys::new(ScriptedSource::new(b"a\x1b[5~\x1b[A"))
///     .collect::<Result<_, _>>()
///     .unwrap();
/// assert_eq!(keys, [Key::Char(b'a'), Key::PageUp, Key::Up]);
/// ```
pub struct Keys<S> {
    src: S,
    done: bool,
}

impl<S: ByteSource> Keys<S> {
    /// Decode keys from `src`.
    pub const fn new(src: S) -> Self {
        Self { src, done: false }
    }

    /// Give back the underlying source.
    pub fn into_inner(self) -> S {
        self.src
    }
}

impl<S: ByteSource> Iterator for Keys<S> {
    type Item = Result<Key>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match wait_key(&mut self.src) {
            Ok(key) => Some(Ok(key)),
            Err(Error::InputClosed) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
