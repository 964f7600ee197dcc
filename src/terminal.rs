//! Terminal width detection, ANSI-aware line fitting and stream reservation.

use std::sync::atomic::{AtomicBool, Ordering};

use console::Term;
use tracing::{debug, trace};

/// Width used when the terminal size cannot be determined.
pub const DEFAULT_WIDTH: usize = 80;

/// How wide rendered lines may be.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Width {
    /// Ask the terminal before every frame, so resizes are picked up.
    #[default]
    Auto,
    /// Always use this many columns.
    Fixed(usize),
}

impl Width {
    /// Resolves the width for the next frame on `stream`.
    ///
    /// Custom writers (`None`) have no terminal of their own and use the fallback chain
    /// of [`width_from`].
    pub fn resolve(self, stream: Option<Stream>) -> usize {
        match self {
            Width::Auto => terminal_width(stream),
            Width::Fixed(w) => w,
        }
    }
}

/// Current width of the terminal attached to `stream`.
///
/// Falls back to `$COLUMNS` and then to [`DEFAULT_WIDTH`].
pub fn terminal_width(stream: Option<Stream>) -> usize {
    let size = stream.and_then(|stream| stream.term().size_checked());
    width_from(size, std::env::var("COLUMNS").ok())
}

/// Picks the width from a measured `(rows, cols)` size, then from the value of
/// `$COLUMNS`, then [`DEFAULT_WIDTH`].
pub fn width_from(size: Option<(u16, u16)>, columns: Option<String>) -> usize {
    if let Some((_rows, cols)) = size.filter(|&(_, c)| c > 0) {
        return usize::from(cols);
    }
    if let Some(cols) = columns
        .and_then(|c| c.trim().parse::<usize>().ok())
        .filter(|&c| c > 0)
    {
        trace!(cols, "terminal width taken from $COLUMNS");
        return cols;
    }
    trace!(default = DEFAULT_WIDTH, "terminal width unavailable");
    DEFAULT_WIDTH
}

/// Number of columns `s` occupies, ignoring ANSI escape sequences.
pub fn visible_width(s: &str) -> usize {
    console::measure_text_width(s)
}

/// Cuts `line` so that it occupies at most `width` columns.
pub fn fit(line: String, width: usize) -> String {
    if visible_width(&line) <= width {
        line
    } else {
        console::truncate_str(&line, width, "").into_owned()
    }
}

/// Standard streams a display can own exclusively.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Stream {
    Stdout,
    Stderr,
}

impl Stream {
    pub fn name(self) -> &'static str {
        match self {
            Stream::Stdout => "stdout",
            Stream::Stderr => "stderr",
        }
    }

    pub fn is_tty(self) -> bool {
        match self {
            Stream::Stdout => atty::is(atty::Stream::Stdout),
            Stream::Stderr => atty::is(atty::Stream::Stderr),
        }
    }

    fn term(self) -> Term {
        match self {
            Stream::Stdout => Term::stdout(),
            Stream::Stderr => Term::stderr(),
        }
    }

    fn flag(self) -> &'static AtomicBool {
        static STDOUT: AtomicBool = AtomicBool::new(false);
        static STDERR: AtomicBool = AtomicBool::new(false);
        match self {
            Stream::Stdout => &STDOUT,
            Stream::Stderr => &STDERR,
        }
    }
}

/// Exclusive right to paint on a standard stream; released on drop.
///
/// Two displays repainting the same terminal region would overwrite each other,
/// so only one may run per stream.
#[derive(Debug)]
pub struct Reservation {
    stream: Stream,
}

impl Reservation {
    /// Reserves `stream`, or returns `None` if another display holds it.
    pub fn acquire(stream: Stream) -> Option<Reservation> {
        let flag = stream.flag();
        if flag
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
        {
            debug!(stream = stream.name(), "terminal reserved");
            Some(Reservation { stream })
        } else {
            None
        }
    }
}

impl Drop for Reservation {
    fn drop(&mut self) {
        self.stream.flag().store(false, Ordering::Release);
        debug!(stream = self.stream.name(), "terminal released");
    }
}
