use std::{
    fmt,
    io::{self, Write},
    sync::Arc,
    time::Duration,
};

use parking_lot::Mutex;

use crate::{
    render::BarStyle,
    terminal::{Stream, Width},
};

/// Options controlling how progress bars are displayed.
#[derive(Clone, Debug)]
pub struct Options {
    /// How long to wait between subsequent refreshes.
    /// Defaults to 100 ms on interactive terminals and 1 s otherwise.
    pub refresh_period: Duration,
    /// Width of the rendered lines. [`Width::Auto`] re-reads the terminal size every frame.
    pub width: Width,
    /// Number of counter updates the speed is averaged over.
    pub speed_calc_cycles: usize,
    /// Number of resets the reset rate is averaged over (counter mode only).
    pub reset_calc_cycles: usize,
    pub style: BarStyle,
    /// Prefix every bar with the time since creation, the reset rate and the reset count.
    pub show_counter: bool,
    /// Repaint in place using ANSI escape codes. If disabled, every refresh prints
    /// the bars on new lines instead. `None` enables them when the target is a TTY.
    pub enable_ansi_escapes: Option<bool>,
    /// Colorize labels and bars. `None` follows `enable_ansi_escapes`.
    pub colors: Option<bool>,
    /// Keep the last frame on screen after stopping, instead of erasing it.
    pub leave_on_stop: bool,
}

impl Default for Options {
    fn default() -> Self {
        let is_tty = Stream::Stdout.is_tty();
        let refresh_period_ms = if is_tty { 100 } else { 1000 };
        Options {
            refresh_period: Duration::from_millis(refresh_period_ms),
            width: Width::Auto,
            speed_calc_cycles: 10,
            reset_calc_cycles: 5,
            style: BarStyle::Simple,
            show_counter: false,
            enable_ansi_escapes: None,
            colors: None,
            leave_on_stop: true,
        }
    }
}

/// Where the progress display is written.
#[derive(Clone)]
pub enum Target {
    Stream(Stream),
    Writer(Arc<Mutex<dyn Write + Send>>),
}

impl Target {
    pub fn stdout() -> Self {
        Target::Stream(Stream::Stdout)
    }

    pub fn stderr() -> Self {
        Target::Stream(Stream::Stderr)
    }

    /// Any writer, e.g. a file or an in-memory buffer. Never treated as a TTY.
    pub fn writer(writer: impl Write + Send + 'static) -> Self {
        Target::Writer(Arc::new(Mutex::new(writer)))
    }

    pub(crate) fn is_tty(&self) -> bool {
        self.stream().is_some_and(Stream::is_tty)
    }

    /// The standard stream behind this target, if any.
    pub(crate) fn stream(&self) -> Option<Stream> {
        match self {
            Target::Stream(stream) => Some(*stream),
            Target::Writer(_) => None,
        }
    }

    /// Runs `f` with exclusive access to the underlying output.
    pub(crate) fn with_output<R>(
        &self,
        f: impl FnOnce(&mut dyn Write) -> io::Result<R>,
    ) -> io::Result<R> {
        match self {
            Target::Stream(Stream::Stdout) => f(&mut io::stdout().lock()),
            Target::Stream(Stream::Stderr) => f(&mut io::stderr().lock()),
            Target::Writer(writer) => f(&mut *writer.lock()),
        }
    }
}

impl Default for Target {
    fn default() -> Self {
        Self::stdout()
    }
}

impl fmt::Debug for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Target::Stream(stream) => f.write_str(stream.name()),
            Target::Writer(_) => f.write_str("writer"),
        }
    }
}
