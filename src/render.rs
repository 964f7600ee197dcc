//! Formatting of a single progress line.
//!
//! Every function here is pure: it takes an [`Estimate`] and a width and returns a
//! string whose visible width never exceeds that width. Labels and statistics are
//! dropped, in order of decreasing verbosity, until the line fits.

use std::time::Duration;

use chrono::{DateTime, Local};
use console::Style;

use crate::{
    estimate::Estimate,
    humanize::{humanize_speed, humanize_time},
    terminal::{fit, visible_width},
};

const ETA_FORMAT: &str = "%Y%m%d_%H:%M:%S";

/// Visual layout of a bar.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum BarStyle {
    /// `2.41s [39.1c/s] [=========>          ] TTG 3.00s`
    #[default]
    Simple,
    /// `[TET-2.41s-[39.1c/s]-TTG-3.00s--> 43.0%  ETA 20161008_14:04:31 ORT 5.41s]`
    Fancy,
}

/// Colors of the label and of the bar.
#[derive(Clone, Debug)]
pub struct Theme {
    pub prepend: Style,
    pub bar: Style,
}

impl Theme {
    /// Red labels and a bright green bar, or no styling at all.
    pub fn new(colors: bool) -> Self {
        Theme {
            prepend: Style::new().red().force_styling(colors),
            bar: Style::new().green().bright().force_styling(colors),
        }
    }

    pub fn plain() -> Self {
        Self::new(false)
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::plain()
    }
}

/// Reset bookkeeping shown in counter mode.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ResetStats {
    /// Number of times the bar was reset.
    pub count: u64,
    /// Resets per second.
    pub rate: f64,
    /// Time since the bar was created; resets do not affect it.
    pub since_created: Duration,
}

/// Everything needed to format one line.
#[derive(Clone, Debug)]
pub struct LineContext<'a> {
    pub prepend: &'a str,
    pub estimate: &'a Estimate,
    pub width: usize,
    pub now: DateTime<Local>,
    /// Present when the bar is shown in counter mode.
    pub resets: Option<ResetStats>,
}

/// Turns bar statistics into a line of at most `width` columns.
#[derive(Clone, Debug, Default)]
pub struct LineFormatter {
    pub style: BarStyle,
    pub theme: Theme,
}

impl LineFormatter {
    pub fn new(style: BarStyle, theme: Theme) -> Self {
        LineFormatter { style, theme }
    }

    pub fn format(&self, ctx: &LineContext<'_>) -> String {
        let line = match ctx.resets {
            Some(resets) => self.format_with_resets(ctx, resets),
            None => self.format_bar(ctx.prepend, ctx.estimate, ctx.width, ctx.now),
        };
        fit(line, ctx.width)
    }

    fn format_with_resets(&self, ctx: &LineContext<'_>, resets: ResetStats) -> String {
        let prefix = format!(
            "{}{} [{}] {}",
            self.theme.prepend.apply_to(ctx.prepend),
            humanize_time(Some(resets.since_created)),
            humanize_speed(resets.rate),
            self.theme.bar.apply_to(format!("#{}", resets.count)),
        );
        match ctx.estimate.max {
            Some(0) => prefix,
            None => format!("{prefix} - {}", self.counts(ctx.estimate)),
            Some(_) => {
                let prefix = format!("{prefix} - ");
                let rest = ctx.width.saturating_sub(visible_width(&prefix));
                let bar = self.format_bar("", ctx.estimate, rest, ctx.now);
                prefix + &bar
            }
        }
    }

    fn format_bar(
        &self,
        prepend: &str,
        estimate: &Estimate,
        width: usize,
        now: DateTime<Local>,
    ) -> String {
        if estimate.bounded_max().is_none() {
            return format!(
                "{}{}",
                self.theme.prepend.apply_to(prepend),
                self.counts(estimate)
            );
        }
        match self.style {
            BarStyle::Simple => self.simple(prepend, estimate, width),
            BarStyle::Fancy => self.fancy(prepend, estimate, width, now),
        }
    }

    /// `TET [speed] #count`, used when there is no maximum.
    fn counts(&self, e: &Estimate) -> String {
        format!(
            "{} [{}] {}",
            humanize_time(Some(e.elapsed)),
            humanize_speed(e.rate),
            self.theme.bar.apply_to(format!("#{}", e.value)),
        )
    }

    fn simple(&self, prepend: &str, e: &Estimate, width: usize) -> String {
        let ratio = e.ratio().unwrap_or(0.0);
        let label = self.theme.prepend.apply_to(prepend).to_string();
        let stats = format!(
            "{}{} [{}] ",
            label,
            humanize_time(Some(e.elapsed)),
            humanize_speed(e.rate)
        );
        let ttg = format!(" TTG {}", humanize_time(e.ttg));

        // `[`, `>` and `]` take three columns.
        for (head, tail) in [(stats.as_str(), ttg.as_str()), (label.as_str(), "")] {
            let used = visible_width(head) + visible_width(tail) + 3;
            if let Some(inner) = width.checked_sub(used) {
                let filled = ((inner as f64 * ratio) as usize).min(inner);
                let bar = format!("[{}>{}]", "=".repeat(filled), " ".repeat(inner - filled));
                return format!("{head}{}{tail}", self.theme.bar.clone().bold().apply_to(bar));
            }
        }
        label
    }

    fn fancy(&self, prepend: &str, e: &Estimate, width: usize, now: DateTime<Local>) -> String {
        let ratio = e.ratio().unwrap_or(0.0);
        let percent = percent_label(ratio);
        let label = self.theme.prepend.apply_to(prepend).to_string();
        let avail = width.checked_sub(visible_width(prepend) + 2);

        let Some(text) = avail.and_then(|avail| fancy_text(e, now, &percent, avail)) else {
            return format!("{label}{}", percent.trim());
        };

        // Fill `ratio` of the text: blanks become `-` and the last one an arrow head.
        let len = text.len();
        let split = ((len as f64 * ratio).ceil() as usize).min(len);
        let mut done = text[..split].replace(' ', "-");
        if done.ends_with('-') {
            done.pop();
            done.push('>');
        }
        let bracket = self.theme.bar.clone().bold();
        format!(
            "{label}{}{}{}{}",
            bracket.apply_to("["),
            self.theme.bar.apply_to(done),
            &text[split..],
            bracket.apply_to("]"),
        )
    }
}

/// Percentage shown in the middle of a fancy bar. Rounded down, so an unfinished bar
/// never reads as complete.
fn percent_label(ratio: f64) -> String {
    if ratio < 1.0 {
        format!(" {:.1}% ", (ratio * 1000.0 + 1e-9).floor() / 10.0)
    } else {
        " 100% ".to_string()
    }
}

/// Picks the most detailed statistics layout that fits into `avail` columns and
/// centers the percentage between its two halves.
fn fancy_text(e: &Estimate, now: DateTime<Local>, percent: &str, avail: usize) -> Option<String> {
    let tet = humanize_time(Some(e.elapsed));
    let speed = format!("[{}]", humanize_speed(e.rate));
    let ttg = humanize_time(e.ttg);
    let eta = e
        .eta(now)
        .map_or_else(|| "--".to_string(), |t| t.format(ETA_FORMAT).to_string());
    let ort = humanize_time(e.overall());

    let layouts = [
        (format!("TET {tet} {speed:>12} TTG {ttg}"), format!("ETA {eta} ORT {ort}")),
        (format!("E {tet} {speed:>12} G {ttg}"), format!("A {eta} O {ort}")),
        (format!("E {tet} {speed:>12} G {ttg}"), format!("O {ort}")),
        (format!("E {tet} G {ttg}"), format!("O {ort}")),
        (format!("E {tet} G {ttg}"), String::new()),
        (String::new(), String::new()),
    ];
    layouts.into_iter().find_map(|(left, right)| {
        let pad = avail.checked_sub(left.len() + right.len() + percent.len())?;
        let (pad_left, pad_right) = (pad / 2, pad - pad / 2);
        Some(format!(
            "{left}{}{percent}{}{right}",
            " ".repeat(pad_left),
            " ".repeat(pad_right)
        ))
    })
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use chrono::{Local, TimeZone};

    use super::{percent_label, BarStyle, LineContext, LineFormatter, ResetStats, Theme};
    use crate::{estimate::Estimate, terminal::visible_width};

    fn estimate(value: u64, max: Option<u64>) -> Estimate {
        Estimate::new(value, max, 7.2, Duration::from_millis(5830))
    }

    fn render(style: BarStyle, colors: bool, prepend: &str, e: &Estimate, width: usize) -> String {
        let formatter = LineFormatter::new(style, Theme::new(colors));
        formatter.format(&LineContext {
            prepend,
            estimate: e,
            width,
            now: Local.with_ymd_and_hms(2016, 10, 11, 16, 52, 39).unwrap(),
            resets: None,
        })
    }

    #[test]
    fn simple_bar_fills_the_width() {
        let e = estimate(42, Some(100));
        let line = render(BarStyle::Simple, false, "", &e, 60);
        assert_eq!(line.chars().count(), 60);
        assert!(line.starts_with("5.83s [7.2c/s] [="), "{line}");
        assert!(line.ends_with("] TTG 9.00s"), "{line}");
    }

    #[test]
    fn simple_bar_proportion() {
        let e = estimate(50, Some(100));
        let line = render(BarStyle::Simple, false, "", &e, 50);
        // 50 - "5.83s [7.2c/s] ".len() - " TTG 7.00s".len() - 3 = 22 cells
        assert!(line.ends_with("] TTG 7.00s"), "{line}");
        assert_eq!(line.matches('=').count(), 11, "{line}");
    }

    #[test]
    fn no_max_shows_absolute_count() {
        let e = estimate(42, None);
        for style in [BarStyle::Simple, BarStyle::Fancy] {
            let line = render(style, false, "job: ", &e, 80);
            assert_eq!(line, "job: 5.83s [7.2c/s] #42");
        }
    }

    #[test]
    fn zero_max_shows_absolute_count() {
        let e = estimate(3, Some(0));
        let line = render(BarStyle::Simple, false, "", &e, 80);
        assert!(line.ends_with("#3"), "{line}");
        assert!(!line.contains('%'));
    }

    #[test]
    fn fancy_full_layout() {
        let e = estimate(42, Some(100));
        let line = render(BarStyle::Fancy, false, "", &e, 100);
        assert_eq!(line.chars().count(), 100);
        assert!(line.starts_with("[TET-5.83s-"), "{line}");
        assert!(line.contains(" 42.0% "), "{line}");
        assert!(line.contains("ETA 20161011_16:52:48"), "{line}");
        assert!(line.contains("ORT 00:00:14"), "{line}");
        assert!(line.ends_with(']'), "{line}");
    }

    #[test]
    fn fancy_degrades_on_narrow_terminals() {
        let e = estimate(42, Some(100));
        let medium = render(BarStyle::Fancy, false, "", &e, 40);
        assert!(!medium.contains("ETA"), "{medium}");
        assert!(medium.contains("42.0%"), "{medium}");

        let tiny = render(BarStyle::Fancy, false, "label: ", &e, 12);
        assert_eq!(tiny, "label: 42.0%");
    }

    #[test]
    fn fancy_complete_shows_hundred_percent() {
        let e = estimate(100, Some(100));
        let line = render(BarStyle::Fancy, false, "", &e, 60);
        assert!(line.contains("100%"), "{line}");
        assert!(!line.contains(' '), "fully done bar has no blanks: {line}");
    }

    #[test]
    fn unfinished_bar_never_reads_complete() {
        assert_eq!(percent_label(0.9996), " 99.9% ");
        assert_eq!(percent_label(0.29), " 29.0% ");
        assert_eq!(percent_label(1.0), " 100% ");

        let line = render(BarStyle::Fancy, false, "", &estimate(9_999, Some(10_000)), 80);
        assert!(line.contains("99.9%"), "{line}");
        assert!(!line.contains("100"), "{line}");
    }

    #[test]
    fn counter_mode_prefix() {
        let formatter = LineFormatter::new(BarStyle::Simple, Theme::plain());
        let now = Local::now();
        let resets = Some(ResetStats {
            count: 3,
            rate: 1.4 / 60.0,
            since_created: Duration::from_secs(35),
        });

        let bounded = estimate(42, Some(100));
        let line = formatter.format(&LineContext {
            prepend: "",
            estimate: &bounded,
            width: 80,
            now,
            resets,
        });
        assert!(line.starts_with("00:00:35 [1.4c/min] #3 - 5.83s [7.2c/s] [="), "{line}");
        assert_eq!(line.chars().count(), 80);

        let hidden = estimate(42, Some(0));
        let line = formatter.format(&LineContext {
            prepend: "",
            estimate: &hidden,
            width: 80,
            now,
            resets,
        });
        assert_eq!(line, "00:00:35 [1.4c/min] #3");

        let unbounded = estimate(42, None);
        let line = formatter.format(&LineContext {
            prepend: "",
            estimate: &unbounded,
            width: 80,
            now,
            resets,
        });
        assert_eq!(line, "00:00:35 [1.4c/min] #3 - 5.83s [7.2c/s] #42");
    }

    /// No combination of style, colors, label and width produces a line wider than the
    /// requested width.
    #[test]
    fn rendered_line_never_exceeds_width() {
        let prepends = ["", "_1_: ", "a rather long label for a bar: "];
        let estimates = [
            estimate(0, Some(100)),
            estimate(42, Some(100)),
            estimate(100, Some(100)),
            estimate(250, Some(100)),
            estimate(42, None),
            Estimate::new(1, Some(u64::MAX - 1), 0.0, Duration::from_secs(123_456)),
        ];
        for style in [BarStyle::Simple, BarStyle::Fancy] {
            for colors in [false, true] {
                for prepend in prepends {
                    for e in &estimates {
                        for width in 0..=120 {
                            let line = render(style, colors, prepend, e, width);
                            assert!(
                                visible_width(&line) <= width,
                                "{style:?} width {width}: {line:?}"
                            );
                        }
                    }
                }
            }
        }
    }
}
