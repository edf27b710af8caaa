//! # k-editor: editor core for k-edit
//!
//! The model that sits behind the terminal layer:
//!
//! - **[`buffer`]**: `Row` and the ordered `Buffer` of rows, loaded from a file
//! - **[`cursor`]**: `Cursor` (x, y), 0-indexed, clamped to the screen
//! - **[`view`]**: the screen compositor, one complete frame per refresh
//! - **[`editor`]**: `Editor` state and key dispatch, driven by k-term's event loop
//! - **[`options`]**: quit key and welcome banner

pub mod buffer;
pub mod cursor;
pub mod editor;
pub mod options;
pub mod view;
