//! Editor state and key dispatch.
//!
//! [`Editor`] owns the document, the cursor, the screen size and the
//! options. It implements [`App`] so k-term's event loop can drive it: the
//! loop asks it to paint, hands it one key, and repeats until it answers
//! [`Action::Quit`].
//!
//! | Key                | Effect                                   |
//! |--------------------|------------------------------------------|
//! | `Ctrl` + quit key  | terminate                                |
//! | arrows             | move one cell, clamped to the screen     |
//! | `Home` / `End`     | first / last column                      |
//! | `PageUp` / `PageDown` | move `rows` cells vertically, clamped |
//! | anything else      | ignored                                  |

use k_term::event_loop::{Action, App};
use k_term::geometry::Size;
use k_term::input::Key;
use k_term::output::OutputBuffer;

use crate::buffer::Buffer;
use crate::cursor::Cursor;
use crate::options::Options;
use crate::view::Frame;

/// Whether the editor is still accepting keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Running,
    Terminated,
}

/// The whole editor state.
#[derive(Debug)]
pub struct Editor {
    buffer: Buffer,
    cursor: Cursor,
    size: Size,
    options: Options,
    status: Status,
}

impl Editor {
    /// A running editor over `buffer` on a `size` screen, cursor at the origin.
    #[must_use]
    pub fn new(buffer: Buffer, size: Size, options: Options) -> Self {
        log::debug!(
            "editor: {} rows from {} on a {}x{} screen",
            buffer.num_rows(),
            buffer.path().map_or_else(|| "no file".into(), |p| p.display().to_string()),
            size.cols,
            size.rows
        );
        Self {
            buffer,
            cursor: Cursor::ORIGIN,
            size,
            options,
            status: Status::Running,
        }
    }

    /// Apply one key to the state.
    ///
    /// Keys arriving after termination are ignored.
    pub fn process_key(&mut self, key: Key) -> Action {
        if self.status == Status::Terminated {
            return Action::Quit;
        }

        if key.is_ctrl(self.options.quit_key) {
            log::info!("quit requested");
            self.status = Status::Terminated;
            return Action::Quit;
        }

        let size = self.size;
        let c = &mut self.cursor;
        match key {
            Key::Left => c.move_left(),
            Key::Right => c.move_right(size),
            Key::Up => c.move_up(),
            Key::Down => c.move_down(size),
            Key::Home => c.move_to_line_start(),
            Key::End => c.move_to_line_end(size),
            Key::PageUp => c.page_up(size),
            Key::PageDown => c.page_down(size),
            Key::Char(_) | Key::Delete | Key::Escape => {
                log::trace!("ignored {key:?}");
            }
        }

        Action::Continue
    }

    /// The frame for the current state.
    #[must_use]
    pub fn frame(&self) -> Frame<'_> {
        Frame {
            buffer: &self.buffer,
            size: self.size,
            cursor: self.cursor,
            banner: &self.options.banner,
        }
    }

    // -- Accessors ----------------------------------------------------------

    #[must_use]
    pub const fn cursor(&self) -> Cursor {
        self.cursor
    }

    #[must_use]
    pub const fn size(&self) -> Size {
        self.size
    }

    #[must_use]
    pub const fn status(&self) -> Status {
        self.status
    }

    #[must_use]
    pub const fn buffer(&self) -> &Buffer {
        &self.buffer
    }
}

impl App for Editor {
    fn on_key(&mut self, key: Key) -> Action {
        self.process_key(key)
    }

    fn paint(&mut self, out: &mut OutputBuffer) {
        self.frame().draw(out);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
