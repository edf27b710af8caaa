//! Editor options.
//!
//! Values the editor consults while running. The defaults reproduce the
//! classic behaviour; the binary may override them from the environment.
//!
//! | Option     | Type   | Default                          |
//! |------------|--------|----------------------------------|
//! | `quit_key` | letter | `q` (the binding is `Ctrl` + it) |
//! | `banner`   | string | `k-edit -- version <version>`    |

/// Editor options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Options {
    /// Letter whose `Ctrl` combination quits the editor.
    pub quit_key: u8,

    /// Welcome message centred on an empty document.
    pub banner: String,
}

impl Options {
    /// The welcome banner for this build.
    #[must_use]
    pub fn default_banner() -> String {
        format!("k-edit -- version {}", env!("CARGO_PKG_VERSION"))
    }
}

impl Default for Options {
    fn default() -> Self {
        Self {
            quit_key: b'q',
            banner: Self::default_banner(),
        }
    }
}
