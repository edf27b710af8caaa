// SPDX-License-Identifier: MIT
//
// Event loop: the heartbeat of the editor.
//
// One iteration is strictly: paint a full frame, write it in one call,
// block for one key, hand the key to the application. Nothing overlaps:
// a key's effect is always applied before the next frame is painted, and
// a frame is always on screen before the next key is read.
//
// # Idle polls
//
// Raw mode reads give up after VTIME. A read that comes back empty is
// not input, so the loop simply reads again without repainting. There is
// no timer-driven refresh and no background redraw.
//
// # Exit paths
//
// `Action::Quit` clears the screen and homes the cursor before `run`
// returns, so the shell prompt reappears on a clean screen. End of input
// ends the loop the same way. Every other error propagates to the caller,
// which owns the raw-mode guard and restores the terminal.

use std::io::Write;

use crate::ansi;
use crate::error::{Error, Result};
use crate::input::{self, Key};
use crate::output::OutputBuffer;
use crate::reader::ByteSource;

// ─── App Trait ───────────────────────────────────────────────────────────────

/// What the application tells the event loop to do after handling a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Continue running.
    Continue,
    /// Exit the event loop cleanly.
    Quit,
}

/// Application interface for the event loop.
///
/// Each iteration calls [`paint`](App::paint) once, then
/// [`on_key`](App::on_key) once.
pub trait App {
    /// Handle one decoded key. Return [`Action::Quit`] to exit the loop.
    fn on_key(&mut self, key: Key) -> Action;

    /// Compose the complete frame for the current state into `out`.
    ///
    /// `out` is empty on entry. Whatever is in it afterwards is written to
    /// the terminal in a single call.
    fn paint(&mut self, out: &mut OutputBuffer);
}

// ─── EventLoop ───────────────────────────────────────────────────────────────

/// The render/read/dispatch loop over a byte source and an output sink.
///
/// # Example
///
/// ```
/// use k_term::event_loop::{Action, App, EventLoop};
/// use k_term::input::Key;
/// use k_term::output::OutputBuffer;
/// use k_term::reader::ScriptedSource;
///
/// struct Counter(usize);
///
/// impl App for Counter {
///     fn on_key(&mut self, key: Key) -> Action {
///         self.0 += 1;
///         if key == Key::Char(b'q') { Action::Quit } else { Action::Continue }
///     }
///
///     fn paint(&mut self, out: &mut OutputBuffer) {
///         out.append(b"frame");
///     }
/// }
///
/// let mut app = Counter(0);
/// let mut event_loop = EventLoop::new(ScriptedSource::new(b"abq"), Vec::new());
/// event_loop.run(&mut app)?;
/// assert_eq!(app.0, 3);
/// # Ok::<(), k_term::Error>(())
/// ```
pub struct EventLoop<R, W> {
    input: R,
    output: W,
    frame: OutputBuffer,
}

impl<R: ByteSource, W: Write> EventLoop<R, W> {
    /// Create a loop reading keys from `input` and writing frames to `output`.
    pub fn new(input: R, output: W) -> Self {
        Self {
            input,
            output,
            frame: OutputBuffer::new(),
        }
    }

    /// Run until the application quits or input ends.
    ///
    /// # Errors
    ///
    /// Returns the first read or write failure. The terminal mode is not
    /// touched here; the caller restores it.
    pub fn run(&mut self, app: &mut impl App) -> Result<()> {
        loop {
            self.refresh(app)?;

            let key = match input::wait_key(&mut self.input) {
                Ok(key) => key,
                Err(e) if e.is_clean_exit() => {
                    log::info!("{e}, leaving");
                    return self.goodbye();
                }
                Err(e) => return Err(e),
            };

            if app.on_key(key) == Action::Quit {
                return self.goodbye();
            }
        }
    }

    /// Paint one frame and write it in a single call.
    ///
    /// # Errors
    ///
    /// [`Error::Write`] if the terminal rejects the frame.
    pub fn refresh(&mut self, app: &mut impl App) -> Result<()> {
        self.frame.clear();
        app.paint(&mut self.frame);
        self.frame.flush_to(&mut self.output).map_err(Error::Write)
    }

    /// Leave a clean screen behind: clear it and home the cursor.
    fn goodbye(&mut self) -> Result<()> {
        self.frame.clear();
        ansi::clear_screen(&mut self.frame).map_err(Error::Write)?;
        ansi::cursor_home(&mut self.frame).map_err(Error::Write)?;
        self.frame.flush_to(&mut self.output).map_err(Error::Write)
    }

    /// The output sink, for inspection.
    pub const fn output(&self) -> &W {
        &self.output
    }

    /// Take the loop apart.
    pub fn into_parts(self) -> (R, W) {
        (self.input, self.output)
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reader::ScriptedSource;
    use std::io;

    /// Records every key and tags every frame with its sequence number.
    struct Recorder {
        keys: Vec<Key>,
        frames: usize,
    }

    impl Recorder {
        const fn new() -> Self {
            Self {
                keys: Vec::new(),
                frames: 0,
            }
        }
    }

    impl App for Recorder {
        fn on_key(&mut self, key: Key) -> Action {
            self.keys.push(key);
            if key.is_ctrl(b'q') {
                Action::Quit
            } else {
                Action::Continue
            }
        }

        fn paint(&mut self, out: &mut OutputBuffer) {
            self.frames += 1;
            write!(out, "[{}]", self.frames).unwrap();
        }
    }

    // ── Action ──────────────────────────────────────────────────

    #[test]
    fn action_equality() {
        assert_eq!(Action::Continue, Action::Continue);
        assert_ne!(Action::Continue, Action::Quit);
    }

    // ── Loop ────────────────────────────────────────────────────

    #[test]
    fn paints_before_every_key() {
        let mut app = Recorder::new();
        let mut ev = EventLoop::new(ScriptedSource::new(b"ab\x11"), Vec::new());
        ev.run(&mut app).unwrap();

        assert_eq!(app.keys, [Key::Char(b'a'), Key::Char(b'b'), Key::Char(0x11)]);
        assert_eq!(app.frames, 3);
        assert_eq!(ev.output().as_slice(), b"[1][2][3]\x1b[2J\x1b[H");
    }

    #[test]
    fn idle_polls_do_not_repaint() {
        let mut app = Recorder::new();
        let src = ScriptedSource::default()
            .then_timeout()
            .then_timeout()
            .then_bytes(b"\x11");
        let mut ev = EventLoop::new(src, Vec::new());
        ev.run(&mut app).unwrap();

        assert_eq!(app.frames, 1);
    }

    #[test]
    fn closed_input_leaves_clean_screen() {
        let mut app = Recorder::new();
        let mut ev = EventLoop::new(ScriptedSource::new(b"x"), Vec::new());
        ev.run(&mut app).unwrap();

        assert_eq!(app.keys, [Key::Char(b'x')]);
        assert!(ev.output().ends_with(b"\x1b[2J\x1b[H"));
    }

    #[test]
    fn keys_after_quit_are_not_read() {
        let mut app = Recorder::new();
        let ev = {
            let mut ev = EventLoop::new(ScriptedSource::new(b"\x11rest"), Vec::new());
            ev.run(&mut app).unwrap();
            ev
        };
        let (src, _) = ev.into_parts();
        assert_eq!(src.remaining(), 4);
    }

    #[test]
    fn write_failure_propagates() {
        struct Broken;
        impl Write for Broken {
            fn write(&mut self, _: &[u8]) -> io::Result<usize> {
                Err(io::Error::other("tty gone"))
            }
            fn flush(&mut self) -> io::Result<()> {
                Ok(())
            }
        }

        let mut app = Recorder::new();
        let mut ev = EventLoop::new(ScriptedSource::new(b"a"), Broken);
        assert!(matches!(ev.run(&mut app), Err(Error::Write(_))));
        assert!(app.keys.is_empty());
    }
}
