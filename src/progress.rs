//! The multi-bar display and its background refresh loop.

use std::{
    io::{self, Write},
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    thread::{self, JoinHandle},
    time::Instant,
};

use ansi_escapes::{CursorLeft, CursorPrevLine, EraseDown};
use chrono::{DateTime, Local};
use parking_lot::{Condvar, Mutex, RwLock};
use tracing::{debug, trace, warn};

use crate::{
    bar::Bar,
    builder::ProgressBuilder,
    counter::Counter,
    error::{Error, Result},
    options::{Options, Target},
    render::{LineContext, LineFormatter},
    terminal::{fit, Reservation, Stream},
};

pub(crate) struct State {
    bars: RwLock<Vec<Arc<Bar>>>,
    info_line: RwLock<Option<String>>,
    visible: AtomicBool,
    running: Mutex<bool>,
    wake: Condvar,
    formatter: LineFormatter,
    target: Target,
    ansi: bool,
    options: Options,
}

impl State {
    pub(crate) fn new(
        bars: Vec<Bar>,
        info_line: Option<String>,
        formatter: LineFormatter,
        target: Target,
        ansi: bool,
        options: Options,
    ) -> State {
        State {
            bars: RwLock::new(bars.into_iter().map(Arc::new).collect()),
            info_line: RwLock::new(info_line),
            visible: AtomicBool::new(true),
            running: Mutex::new(false),
            wake: Condvar::new(),
            formatter,
            target,
            ansi,
            options,
        }
    }

    fn render(&self, now: Instant, wall: DateTime<Local>) -> Vec<String> {
        let width = self.options.width.resolve(self.target.stream());
        // Clone the handles so the list lock is not held while formatting.
        let bars = self.bars.read().clone();
        let mut lines: Vec<String> = bars
            .iter()
            .map(|bar| {
                let prepend = bar.prepend();
                let estimate = bar.estimate_at(now);
                let resets = self
                    .options
                    .show_counter
                    .then(|| bar.reset_stats_at(now));
                self.formatter.format(&LineContext {
                    prepend: &prepend,
                    estimate: &estimate,
                    width,
                    now: wall,
                    resets,
                })
            })
            .collect();
        if let Some(info) = self.info_line.read().as_deref() {
            lines.extend(info.lines().map(|line| fit(line.to_string(), width)));
        }
        lines
    }

    /// Paints the current frame. The cursor is left at the top of the block unless this
    /// is the last frame, in which case it moves below it.
    fn redraw(&self, last: bool) -> io::Result<()> {
        let lines = self.render(Instant::now(), Local::now());
        trace!(lines = lines.len(), last, "redraw");
        let ansi = self.ansi;
        self.target.with_output(|out| {
            if ansi {
                write!(out, "{}{}{}", CursorLeft, EraseDown, lines.join("\n"))?;
                if last {
                    writeln!(out)?;
                } else {
                    write!(out, "{}", CursorLeft)?;
                    for _ in 1..lines.len() {
                        write!(out, "{}", CursorPrevLine)?;
                    }
                }
            } else {
                for line in &lines {
                    writeln!(out, "{line}")?;
                }
            }
            out.flush()
        })
    }

    fn clear(&self) -> io::Result<()> {
        if !self.ansi {
            return Ok(());
        }
        self.target.with_output(|out| {
            write!(out, "{}{}", CursorLeft, EraseDown)?;
            out.flush()
        })
    }

    fn refresh_loop(&self) {
        loop {
            if self.visible.load(Ordering::Acquire) {
                if let Err(e) = self.redraw(false) {
                    debug!(error = %e, "failed to redraw progress");
                }
            }
            let mut running = self.running.lock();
            if !*running {
                break;
            }
            self.wake.wait_for(&mut running, self.options.refresh_period);
            if !*running {
                break;
            }
        }
    }
}

/// Displays one or more progress bars and refreshes them periodically.
///
/// Bars are painted as a block of stacked lines which is overwritten in place on every
/// refresh. The block is repainted by a background thread started with
/// [`start`](Progress::start); workers only touch their [`Counter`]s.
///
/// The refresh thread is stopped and joined when the `Progress` is dropped, so the
/// display lives exactly as long as the scope holding it.
pub struct Progress {
    state: Arc<State>,
    refresh: Option<JoinHandle<()>>,
    reservation: Option<Reservation>,
}

impl Progress {
    pub(crate) fn from_state(state: State) -> Progress {
        Progress {
            state: Arc::new(state),
            refresh: None,
            reservation: None,
        }
    }

    /// A single bar for `counter` with default options, written to stdout.
    pub fn new(counter: Counter) -> Progress {
        Self::builder().bar(counter).build()
    }

    /// One bar per counter, stacked in the given order.
    pub fn multi(counters: impl IntoIterator<Item = Counter>) -> Progress {
        Self::builder().bars(counters).build()
    }

    pub fn builder() -> ProgressBuilder {
        ProgressBuilder::new()
    }

    /// Starts the background refresh thread.
    ///
    /// Fails if the display is already running, or if its standard stream is owned by
    /// another running display.
    pub fn start(&mut self) -> Result<()> {
        if self.refresh.is_some() {
            warn!("progress display is already running");
            return Err(Error::AlreadyRunning);
        }
        let reservation = match self.state.target.stream() {
            Some(stream) => Some(reserve(stream)?),
            None => None,
        };

        *self.state.running.lock() = true;
        let state = self.state.clone();
        let spawned = thread::Builder::new()
            .name("progress-refresh".to_string())
            .spawn(move || state.refresh_loop());
        let handle = match spawned {
            Ok(handle) => handle,
            Err(e) => {
                *self.state.running.lock() = false;
                return Err(e.into());
            }
        };

        self.refresh = Some(handle);
        self.reservation = reservation;
        debug!(
            bars = self.len(),
            target = ?self.state.target,
            period = ?self.state.options.refresh_period,
            "progress display started"
        );
        Ok(())
    }

    /// Stops the refresh thread and paints the final state.
    ///
    /// Does nothing if the display is not running.
    pub fn stop(&mut self) -> Result<()> {
        let Some(handle) = self.refresh.take() else {
            return Ok(());
        };
        *self.state.running.lock() = false;
        self.state.wake.notify_all();
        let joined = handle.join();

        let painted = if self.state.visible.load(Ordering::Acquire) {
            if self.state.options.leave_on_stop {
                self.state.redraw(true)
            } else {
                self.state.clear()
            }
        } else {
            Ok(())
        };
        self.reservation = None;
        debug!("progress display stopped");

        joined.map_err(|_| Error::RefreshThreadPanicked)?;
        painted?;
        Ok(())
    }

    /// Starts the display, runs `f` and stops the display again.
    ///
    /// If the terminal is owned by another running display, `f` still runs, just
    /// without bars.
    pub fn run<R>(mut self, f: impl FnOnce(&Progress) -> R) -> Result<R> {
        match self.start() {
            Ok(()) => {}
            Err(Error::TerminalReserved { .. }) => return Ok(f(&self)),
            Err(e) => return Err(e),
        }
        let result = f(&self);
        self.stop()?;
        Ok(result)
    }

    /// Returns true while the refresh thread is running.
    pub fn is_running(&self) -> bool {
        self.refresh.is_some()
    }

    /// Forces redrawing immediately,
    /// without waiting for the next refresh cycle of the background refresh loop.
    pub fn refresh(&self) -> Result<()> {
        if self.is_visible() {
            self.state.redraw(false)?;
        }
        Ok(())
    }

    /// Sets the visibility of the bars. Hidden bars are erased and not repainted
    /// until shown again; their counters and timers keep going.
    pub fn set_visible(&self, visible: bool) -> Result<()> {
        let was_visible = self.state.visible.swap(visible, Ordering::AcqRel);
        if self.is_running() {
            if !visible && was_visible {
                self.state.clear()?;
            } else if visible && !was_visible {
                self.state.redraw(false)?;
            }
        }
        Ok(())
    }

    /// Returns true if the bars are currently visible.
    pub fn is_visible(&self) -> bool {
        self.state.visible.load(Ordering::Acquire)
    }

    /// Renders the current frame without writing it anywhere.
    pub fn render(&self) -> Vec<String> {
        self.state.render(Instant::now(), Local::now())
    }

    /// Resets bar `index`: its counter goes back to zero, its elapsed time restarts and
    /// its reset count is incremented. Other bars are not affected.
    pub fn reset(&self, index: usize) -> Result<()> {
        let bar = self.get(index)?;
        bar.reset();
        debug!(index, resets = bar.reset_count(), "progress bar reset");
        Ok(())
    }

    /// Resets every bar.
    pub fn reset_all(&self) {
        for bar in self.bars() {
            bar.reset();
        }
        debug!("all progress bars reset");
    }

    /// Replaces the text shown in front of bar `index`.
    pub fn set_prepend(&self, index: usize, prepend: impl Into<String>) -> Result<()> {
        self.get(index)?.set_prepend(prepend);
        Ok(())
    }

    /// Sets (or clears) free text shown below the bars.
    pub fn set_info_line(&self, info: Option<String>) {
        *self.state.info_line.write() = info;
    }

    /// Appends a bar at the bottom of the block and returns its index.
    pub fn add_bar(&self, counter: Counter, prepend: impl Into<String>) -> usize {
        let options = &self.state.options;
        let bar = Bar::new(
            counter,
            prepend.into(),
            options.speed_calc_cycles,
            options.reset_calc_cycles,
            Instant::now(),
        );
        let mut bars = self.state.bars.write();
        bars.push(Arc::new(bar));
        bars.len() - 1
    }

    pub fn bar(&self, index: usize) -> Option<Arc<Bar>> {
        self.state.bars.read().get(index).cloned()
    }

    pub fn bars(&self) -> Vec<Arc<Bar>> {
        self.state.bars.read().clone()
    }

    /// The counter displayed by bar `index`.
    pub fn counter(&self, index: usize) -> Option<Counter> {
        self.bar(index).map(|bar| bar.counter().clone())
    }

    pub fn len(&self) -> usize {
        self.state.bars.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.bars.read().is_empty()
    }

    fn get(&self, index: usize) -> Result<Arc<Bar>> {
        self.bar(index).ok_or_else(|| {
            let len = self.len();
            warn!(index, len, "no such progress bar");
            Error::InvalidBar { index, len }
        })
    }
}

fn reserve(stream: Stream) -> Result<Reservation> {
    Reservation::acquire(stream).ok_or_else(|| {
        warn!(
            stream = stream.name(),
            "terminal already reserved, not starting the progress display"
        );
        Error::TerminalReserved {
            target: stream.name(),
        }
    })
}

impl Drop for Progress {
    fn drop(&mut self) {
        if let Err(e) = self.stop() {
            debug!(error = %e, "failed to stop progress display");
        }
    }
}
