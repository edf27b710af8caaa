// SPDX-License-Identifier: MIT
//
// k-edit: a minimal terminal screen editor.
//
// This binary wires the two library crates together:
//
//   k-term   → raw mode, window geometry, key decoding, framed output, loop
//   k-editor → rows, cursor, compositor, key dispatch
//
// Startup order:
//
//   environment → Config → logging → raw mode → window size → load file
//   → event loop until Ctrl+Q or end of input → restore terminal
//
// Any failure after raw mode is entered takes the same exit path: restore
// the terminal, clear the screen, print `k-edit: <error>` on stderr and
// exit with status 1.

mod config;

use std::env;
use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process;

use k_editor::buffer::{Buffer, BufferError};
use k_editor::editor::Editor;
use k_term::ansi;
use k_term::event_loop::EventLoop;
use k_term::geometry;
use k_term::reader::StdinSource;
use k_term::terminal::RawMode;
use thiserror::Error;

use crate::config::Config;

/// Anything that ends the editor with a non-zero status.
#[derive(Debug, Error)]
enum Fatal {
    #[error(transparent)]
    Term(#[from] k_term::Error),

    #[error(transparent)]
    Load(#[from] BufferError),

    #[error("{}: {source}", path.display())]
    LogFile {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Send `log` records to `path`. The terminal itself is off limits while
/// the editor owns it.
fn init_logging(path: &Path) -> Result<(), Fatal> {
    let file = File::create(path).map_err(|source| Fatal::LogFile {
        path: path.to_path_buf(),
        source,
    })?;

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Pipe(Box::new(file)))
        .init();
    Ok(())
}

/// Size the screen, load the document and run until the user quits.
fn run(config: &Config, path: Option<&Path>) -> Result<(), Fatal> {
    let size = geometry::resolve_terminal(&mut StdinSource::new(), config.resolve)?;

    let buffer = match path {
        Some(path) => Buffer::from_file(path)?,
        None => Buffer::new(),
    };

    let mut editor = Editor::new(buffer, size, config.options.clone());
    let mut event_loop = EventLoop::new(StdinSource::new(), io::stdout().lock());
    event_loop.run(&mut editor)?;
    Ok(())
}

/// Report `err` on a clean screen and exit.
fn die(raw: Option<RawMode>, err: &Fatal) -> ! {
    if let Some(Err(e)) = raw.map(RawMode::restore) {
        log::error!("restore failed: {e}");
    }

    let mut stdout = io::stdout().lock();
    let _ = ansi::clear_screen(&mut stdout);
    let _ = ansi::cursor_home(&mut stdout);
    let _ = stdout.flush();

    log::error!("{err}");
    eprintln!("k-edit: {err}");
    process::exit(1);
}

fn main() {
    let config = Config::from_env().unwrap_or_else(|e| {
        eprintln!("k-edit: {e}");
        process::exit(1);
    });

    if let Some(Err(e)) = config.log_path.as_deref().map(init_logging) {
        eprintln!("k-edit: {e}");
        process::exit(1);
    }

    let path = env::args_os().nth(1).map(PathBuf::from);
    log::info!("k-edit {} starting", env!("CARGO_PKG_VERSION"));

    let raw = match RawMode::enable(config.raw) {
        Ok(raw) => raw,
        Err(e) => die(None, &Fatal::from(e)),
    };

    if let Err(e) = run(&config, path.as_deref()) {
        die(Some(raw), &e);
    }

    if let Err(e) = raw.restore() {
        eprintln!("k-edit: {e}");
        process::exit(1);
    }
    log::info!("k-edit exiting");
}
