// SPDX-License-Identifier: MIT
//
// Terminal control: raw mode with RAII restore.
//
// Safety: This module necessarily uses `unsafe` for termios (tcgetattr,
// tcsetattr) and raw fd writes. These are the standard POSIX interfaces
// for terminal control; there is no safe alternative. Each unsafe block
// is minimal.
#![allow(unsafe_code)]
//
// `RawMode` is the only thing in the process allowed to change terminal
// attributes. `RawMode::enable` captures the original termios, switches
// the terminal into raw mode, and hands back a guard. The original
// settings come back exactly once, whichever exit path gets there first:
//
//   - an explicit `restore()` (normal quit, or the fatal-error path, so a
//     failure to restore can itself be reported),
//   - the guard's `Drop` (early return, `?` propagation),
//   - the panic hook, which restores from a global backup because it
//     cannot reach the guard.
//
// The guard and the hook share one global slot holding the terminal's fd
// and its saved termios. Only the path that takes the slot applies the
// saved mode; a second path finds nothing left to do.

#[cfg(unix)]
use std::os::fd::RawFd;
#[cfg(unix)]
use std::sync::{Mutex, PoisonError};
use std::sync::Once;

use crate::error::{Error, Result};

// ─── Configuration ──────────────────────────────────────────────────────────

/// Read policy applied while in raw mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawConfig {
    /// Maximum wait for a single read, in tenths of a second (VTIME).
    ///
    /// VMIN is always 0: a read returns as soon as one byte is available,
    /// or with nothing once this window closes.
    pub read_timeout_ds: u8,
}

impl Default for RawConfig {
    fn default() -> Self {
        Self { read_timeout_ds: 1 }
    }
}

// ─── Panic-Safe Terminal Restore ────────────────────────────────────────────

/// The terminal in raw mode and the termios to give back to it.
///
/// The [`RawMode`] guard owns its own copy, but the panic hook can't
/// access it. Whoever takes this slot first is the one that restores.
#[cfg(unix)]
static TERMIOS_BACKUP: Mutex<Option<(RawFd, libc::termios)>> = Mutex::new(None);

#[cfg(unix)]
fn set_backup(saved: Option<(RawFd, libc::termios)>) {
    *TERMIOS_BACKUP.lock().unwrap_or_else(PoisonError::into_inner) = saved;
}

/// Take the backup, but only if it belongs to `fd`.
#[cfg(unix)]
fn claim_backup(fd: RawFd) -> bool {
    let mut slot = TERMIOS_BACKUP.lock().unwrap_or_else(PoisonError::into_inner);
    if slot.as_ref().is_some_and(|&(saved_fd, _)| saved_fd == fd) {
        *slot = None;
        true
    } else {
        false
    }
}

/// Restore sequence written before the panic message: clear the screen,
/// home the cursor, and make it visible again.
const EMERGENCY_RESTORE: &[u8] = b"\x1b[2J\x1b[H\x1b[?25h";

static PANIC_HOOK_INSTALLED: Once = Once::new();

/// Install a panic hook that restores the terminal before printing the error.
///
/// Without this, a panic in raw mode leaves the user's terminal with no
/// echo and no line editing, and the panic message itself is mangled by
/// the disabled output processing.
fn install_panic_hook() {
    PANIC_HOOK_INSTALLED.call_once(|| {
        let original = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            restore_for_panic();
            original(info);
        }));
    });
}

/// Undo raw mode if a guard is still live. No-op otherwise.
#[cfg(unix)]
fn restore_for_panic() {
    let saved = TERMIOS_BACKUP
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .take();

    if let Some((fd, original)) = saved {
        emergency_restore(fd);
        unsafe {
            let _ = libc::tcsetattr(fd, libc::TCSAFLUSH, &raw const original);
        }
    }
}

#[cfg(not(unix))]
fn restore_for_panic() {}

/// Write the restore sequence straight to the terminal's file descriptor.
///
/// Bypasses Rust's `io::stdout()` lock in case the panic happened while a
/// frame was being written.
#[cfg(unix)]
fn emergency_restore(fd: RawFd) {
    unsafe {
        let _ = libc::write(
            fd,
            EMERGENCY_RESTORE.as_ptr().cast::<libc::c_void>(),
            EMERGENCY_RESTORE.len(),
        );
    }
}

// ─── RawMode ────────────────────────────────────────────────────────────────

/// Raw-mode guard. The terminal is restored when this is dropped.
///
/// # Example
///
/// ```no_run
/// use k_term::terminal::{RawConfig, RawMode};
///
/// let raw = RawMode::enable(RawConfig::default())?;
/// // ... render frames, read keys ...
/// raw.restore()?;
/// # Ok::<(), k_term::Error>(())
/// ```
pub struct RawMode {
    /// The terminal whose mode was changed.
    #[cfg(unix)]
    fd: RawFd,
    /// Original termios captured before entering raw mode.
    #[cfg(unix)]
    original: Option<libc::termios>,
}

impl RawMode {
    /// Put the terminal on stdin into raw mode.
    ///
    /// # Errors
    ///
    /// As [`RawMode::enable_on`].
    #[cfg(unix)]
    pub fn enable(config: RawConfig) -> Result<Self> {
        Self::enable_on(libc::STDIN_FILENO, config)
    }

    /// Capture the attributes of the terminal on `fd` and switch it to raw
    /// mode.
    ///
    /// Disables, on the input side: break signals, CR→NL translation,
    /// parity checking, 8th-bit stripping and XON/XOFF flow control.
    /// Output post-processing is turned off. Locally: echo, canonical
    /// line buffering, signal keys (Ctrl-C / Ctrl-Z) and literal-next
    /// (Ctrl-V). Characters are 8 bits. Reads return after at most
    /// `config.read_timeout_ds` tenths of a second.
    ///
    /// # Errors
    ///
    /// [`Error::GetAttr`] if the current attributes can't be read (`fd` is
    /// not a terminal, for instance); [`Error::SetAttr`] if raw mode can't
    /// be applied.
    #[cfg(unix)]
    pub fn enable_on(fd: RawFd, config: RawConfig) -> Result<Self> {
        use std::io;

        let mut original: libc::termios = unsafe { std::mem::zeroed() };

        if unsafe { libc::tcgetattr(fd, &raw mut original) } != 0 {
            return Err(Error::GetAttr(io::Error::last_os_error()));
        }

        install_panic_hook();
        set_backup(Some((fd, original)));

        let raw = raw_termios(original, config);
        if unsafe { libc::tcsetattr(fd, libc::TCSAFLUSH, &raw const raw) } != 0 {
            let err = io::Error::last_os_error();
            set_backup(None);
            return Err(Error::SetAttr(err));
        }

        log::debug!("raw mode on fd {fd} (VTIME={})", config.read_timeout_ds);
        Ok(Self {
            fd,
            original: Some(original),
        })
    }

    #[cfg(not(unix))]
    pub fn enable(_config: RawConfig) -> Result<Self> {
        install_panic_hook();
        Ok(Self {})
    }

    /// Whether this guard still holds settings to restore.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        #[cfg(unix)]
        {
            self.original.is_some()
        }
        #[cfg(not(unix))]
        {
            false
        }
    }

    /// Reapply the captured attributes now.
    ///
    /// # Errors
    ///
    /// [`Error::SetAttr`] if the attributes can't be reapplied. The terminal
    /// is then still raw, so callers treat this as fatal.
    pub fn restore(mut self) -> Result<()> {
        self.restore_inner()
    }

    #[cfg(unix)]
    fn restore_inner(&mut self) -> Result<()> {
        let Some(original) = self.original.take() else {
            return Ok(());
        };

        // The panic hook got there first.
        if !claim_backup(self.fd) {
            log::debug!("raw mode on fd {} already restored", self.fd);
            return Ok(());
        }

        if unsafe { libc::tcsetattr(self.fd, libc::TCSAFLUSH, &raw const original) } != 0 {
            return Err(Error::SetAttr(std::io::Error::last_os_error()));
        }

        log::debug!("raw mode off fd {}", self.fd);
        Ok(())
    }

    #[cfg(not(unix))]
    fn restore_inner(&mut self) -> Result<()> {
        Ok(())
    }
}

impl Drop for RawMode {
    fn drop(&mut self) {
        if let Err(e) = self.restore_inner() {
            log::error!("failed to restore terminal: {e}");
        }
    }
}

/// The raw-mode variant of `original`.
#[cfg(unix)]
fn raw_termios(original: libc::termios, config: RawConfig) -> libc::termios {
    let mut raw = original;
    raw.c_iflag &= !(libc::BRKINT | libc::ICRNL | libc::INPCK | libc::ISTRIP | libc::IXON);
    raw.c_oflag &= !libc::OPOST;
    raw.c_cflag |= libc::CS8;
    raw.c_lflag &= !(libc::ECHO | libc::ICANON | libc::IEXTEN | libc::ISIG);
    raw.c_cc[libc::VMIN] = 0;
    raw.c_cc[libc::VTIME] = config.read_timeout_ds;
    raw
}

// ─── Tests ───────────────────────────────────────────────────────────────────
