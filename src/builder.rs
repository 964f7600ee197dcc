//! Fluent construction of a [`Progress`] display.
//!
//! [`Progress::new`] and [`Progress::multi`] cover the common cases. The builder adds
//! per-bar labels, an output target other than stdout, an info line below the bars and
//! every field of [`Options`].

use std::time::{Duration, Instant};

use crate::{
    bar::Bar,
    counter::Counter,
    options::{Options, Target},
    progress::{Progress, State},
    render::{BarStyle, LineFormatter, Theme},
    terminal::Width,
};

/// Builder for [`Progress`].
#[derive(Debug, Default)]
pub struct ProgressBuilder {
    bars: Vec<(Counter, String)>,
    options: Options,
    target: Target,
    info_line: Option<String>,
}

impl ProgressBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a bar without a label.
    #[must_use]
    pub fn bar(self, counter: Counter) -> Self {
        self.bar_with_prepend(counter, "")
    }

    /// Adds a bar with `prepend` shown in front of it.
    #[must_use]
    pub fn bar_with_prepend(mut self, counter: Counter, prepend: impl Into<String>) -> Self {
        self.bars.push((counter, prepend.into()));
        self
    }

    /// Adds one unlabeled bar per counter.
    #[must_use]
    pub fn bars(mut self, counters: impl IntoIterator<Item = Counter>) -> Self {
        self.bars
            .extend(counters.into_iter().map(|c| (c, String::new())));
        self
    }

    /// Replaces all options at once.
    #[must_use]
    pub fn options(mut self, options: Options) -> Self {
        self.options = options;
        self
    }

    #[must_use]
    pub fn refresh_period(mut self, period: Duration) -> Self {
        self.options.refresh_period = period;
        self
    }

    #[must_use]
    pub fn width(mut self, width: Width) -> Self {
        self.options.width = width;
        self
    }

    #[must_use]
    pub fn style(mut self, style: BarStyle) -> Self {
        self.options.style = style;
        self
    }

    #[must_use]
    pub fn speed_calc_cycles(mut self, cycles: usize) -> Self {
        self.options.speed_calc_cycles = cycles;
        self
    }

    #[must_use]
    pub fn reset_calc_cycles(mut self, cycles: usize) -> Self {
        self.options.reset_calc_cycles = cycles;
        self
    }

    /// Shows reset statistics in front of every bar.
    #[must_use]
    pub fn show_counter(mut self, show: bool) -> Self {
        self.options.show_counter = show;
        self
    }

    #[must_use]
    pub fn enable_ansi_escapes(mut self, enable: bool) -> Self {
        self.options.enable_ansi_escapes = Some(enable);
        self
    }

    #[must_use]
    pub fn colors(mut self, colors: bool) -> Self {
        self.options.colors = Some(colors);
        self
    }

    #[must_use]
    pub fn leave_on_stop(mut self, leave: bool) -> Self {
        self.options.leave_on_stop = leave;
        self
    }

    #[must_use]
    pub fn target(mut self, target: Target) -> Self {
        self.target = target;
        self
    }

    #[must_use]
    pub fn info_line(mut self, info: impl Into<String>) -> Self {
        self.info_line = Some(info.into());
        self
    }

    /// Builds the display. It does not paint anything until started.
    #[must_use]
    pub fn build(self) -> Progress {
        let ansi = self
            .options
            .enable_ansi_escapes
            .unwrap_or_else(|| self.target.is_tty());
        let colors = self.options.colors.unwrap_or(ansi);
        let formatter = LineFormatter::new(self.options.style, Theme::new(colors));

        let now = Instant::now();
        let bars = self
            .bars
            .into_iter()
            .map(|(counter, prepend)| {
                Bar::new(
                    counter,
                    prepend,
                    self.options.speed_calc_cycles,
                    self.options.reset_calc_cycles,
                    now,
                )
            })
            .collect();

        Progress::from_state(State::new(
            bars,
            self.info_line,
            formatter,
            self.target,
            ansi,
            self.options,
        ))
    }
}
