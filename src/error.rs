use std::io;

use thiserror::Error;

/// Errors reported by [`Progress`](crate::Progress) operations.
///
/// None of these are fatal to the display: a bad index or a busy terminal is reported
/// to the caller and the bars keep rendering as before.
#[derive(Error, Debug)]
pub enum Error {
    #[error("no progress bar at index {index} (there are {len} bars)")]
    InvalidBar { index: usize, len: usize },

    #[error("{target} is already used by another running progress display")]
    TerminalReserved { target: &'static str },

    #[error("progress display is already running")]
    AlreadyRunning,

    #[error("progress refresh thread panicked")]
    RefreshThreadPanicked,

    #[error("failed to write progress output: {0}")]
    Io(#[from] io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
