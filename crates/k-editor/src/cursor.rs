//! Cursor position and movement.
//!
//! The cursor lives in screen coordinates: `x` is the column, `y` the row,
//! both 0-indexed. Every movement clamps to the screen, so a cursor that
//! starts inside `[0, cols) × [0, rows)` never leaves it. Hitting an edge is
//! a no-op, not an error.
//!
//! The terminal wants 1-indexed coordinates; that conversion happens in
//! `k_term::ansi::cursor_to` and never here.

use k_term::geometry::Size;

/// A cursor on the screen: (x, y), both 0-indexed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Cursor {
    pub x: u16,
    pub y: u16,
}

impl Cursor {
    /// Column 0, row 0.
    pub const ORIGIN: Self = Self { x: 0, y: 0 };

    /// Create a cursor at `(x, y)`.
    #[inline]
    #[must_use]
    pub const fn new(x: u16, y: u16) -> Self {
        Self { x, y }
    }

    /// Whether the cursor is inside `size`.
    #[inline]
    #[must_use]
    pub const fn is_within(self, size: Size) -> bool {
        self.x < size.cols && self.y < size.rows
    }

    // -- Single-cell motions ------------------------------------------------

    pub const fn move_left(&mut self) {
        self.x = self.x.saturating_sub(1);
    }

    pub const fn move_right(&mut self, size: Size) {
        if self.x.saturating_add(1) < size.cols {
            self.x += 1;
        }
    }

    pub const fn move_up(&mut self) {
        self.y = self.y.saturating_sub(1);
    }

    pub const fn move_down(&mut self, size: Size) {
        if self.y.saturating_add(1) < size.rows {
            self.y += 1;
        }
    }

    // -- Line and page motions ----------------------------------------------

    /// First column.
    pub const fn move_to_line_start(&mut self) {
        self.x = 0;
    }

    /// Last column of the screen.
    pub const fn move_to_line_end(&mut self, size: Size) {
        self.x = size.cols.saturating_sub(1);
    }

    /// One screenful up: `rows` single steps, each clamped.
    pub fn page_up(&mut self, size: Size) {
        for _ in 0..size.rows {
            self.move_up();
        }
    }

    /// One screenful down: `rows` single steps, each clamped.
    pub fn page_down(&mut self, size: Size) {
        for _ in 0..size.rows {
            self.move_down(size);
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
