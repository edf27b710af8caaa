// SPDX-License-Identifier: MIT
//
// Startup configuration.
//
// Defaults come from the library crates. The environment may override a
// small set of them:
//
//   K_EDIT_READ_TIMEOUT   raw-mode read wait in deciseconds, 1..=255
//   K_EDIT_LOG            write logs to this file (off when unset)
//
// Overrides are validated here, before the terminal is touched, so a bad
// value is reported on a normal screen.

use std::env;
use std::path::PathBuf;

use k_editor::options::Options;
use k_term::geometry::ResolveConfig;
use k_term::terminal::RawConfig;
use thiserror::Error;

pub const READ_TIMEOUT_VAR: &str = "K_EDIT_READ_TIMEOUT";
pub const LOG_VAR: &str = "K_EDIT_LOG";

/// An environment override that can't be used.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("K_EDIT_READ_TIMEOUT: expected deciseconds in 1..=255, got {0:?}")]
    ReadTimeout(String),

    #[error("K_EDIT_LOG: empty path")]
    EmptyLogPath,
}

/// Everything the binary needs before it enters raw mode.
#[derive(Debug, Clone, Default)]
pub struct Config {
    pub raw: RawConfig,
    pub resolve: ResolveConfig,
    pub options: Options,
    pub log_path: Option<PathBuf>,
}

impl Config {
    /// Defaults plus overrides from the process environment.
    ///
    /// # Errors
    ///
    /// [`ConfigError`] if an override is set but unusable.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Defaults plus overrides from `lookup`.
    ///
    /// # Errors
    ///
    /// As [`Config::from_env`].
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(val) = lookup(READ_TIMEOUT_VAR) {
            config.raw.read_timeout_ds = parse_read_timeout(&val)?;
        }

        if let Some(val) = lookup(LOG_VAR) {
            if val.is_empty() {
                return Err(ConfigError::EmptyLogPath);
            }
            config.log_path = Some(PathBuf::from(val));
        }

        Ok(config)
    }
}

fn parse_read_timeout(val: &str) -> Result<u8, ConfigError> {
    match val.trim().parse::<u8>() {
        Ok(ds) if ds > 0 => Ok(ds),
        _ => Err(ConfigError::ReadTimeout(val.to_owned())),
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn lookup<'a>(vars: &'a [(&'a str, &'a str)]) -> impl Fn(&str) -> Option<String> + 'a {
        move |name: &str| {
            vars.iter()
                .find(|(k, _)| *k == name)
                .map(|(_, v)| (*v).to_owned())
        }
    }

    #[test]
    fn defaults_without_overrides() {
        let config = Config::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.raw, RawConfig::default());
        assert_eq!(config.resolve, ResolveConfig::default());
        assert_eq!(config.options, Options::default());
        assert!(config.log_path.is_none());
    }

    #[test]
    fn read_timeout_override() {
        let config = Config::from_lookup(lookup(&[(READ_TIMEOUT_VAR, "5")])).unwrap();
        assert_eq!(config.raw.read_timeout_ds, 5);
    }

    #[test]
    fn read_timeout_rejects_out_of_range() {
        for bad in ["0", "256", "-1", "soon", ""] {
            let err = Config::from_lookup(lookup(&[(READ_TIMEOUT_VAR, bad)])).unwrap_err();
            assert_eq!(err, ConfigError::ReadTimeout(bad.to_owned()));
        }
    }

    #[test]
    fn log_path_override() {
        let config = Config::from_lookup(lookup(&[(LOG_VAR, "/tmp/k-edit.log")])).unwrap();
        assert_eq!(config.log_path, Some(PathBuf::from("/tmp/k-edit.log")));
    }

    #[test]
    fn empty_log_path_rejected() {
        let err = Config::from_lookup(lookup(&[(LOG_VAR, "")])).unwrap_err();
        assert_eq!(err, ConfigError::EmptyLogPath);
    }

    #[test]
    fn error_messages_name_the_variable() {
        let err = ConfigError::ReadTimeout("x".into());
        assert!(err.to_string().starts_with("K_EDIT_READ_TIMEOUT: "));
    }
}
