//! Rate and time-to-go estimation.
//!
//! [`RateEstimator`] keeps a short rolling window of [`Sample`]s. Every time the observed
//! value changes, a new sample is pushed and the rate is computed against the sample
//! `window` updates ago (or against the origin while the window is still filling up).
//! If the value does not change between two updates, the previous rate is kept, so a
//! renderer polling faster than the counter moves does not see the speed collapse to
//! zero.

use std::{
    collections::VecDeque,
    time::{Duration, Instant},
};

use chrono::{DateTime, Local, TimeDelta};

/// Rates below this are considered zero and yield an unknown time to go.
pub const MIN_RATE: f64 = 1e-9;

/// A counter value observed at a point in time.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Sample {
    pub at: Instant,
    pub value: u64,
}

/// Windowed derivative of a monotonically growing value.
#[derive(Debug)]
pub struct RateEstimator {
    window: usize,
    history: VecDeque<Sample>,
    origin: Sample,
    last_value: u64,
    rate: f64,
}

impl RateEstimator {
    /// Creates an estimator which started measuring at `started`, with value 0.
    pub fn new(window: usize, started: Instant) -> Self {
        let window = window.max(1);
        RateEstimator {
            window,
            history: VecDeque::with_capacity(window + 1),
            origin: Sample {
                at: started,
                value: 0,
            },
            last_value: 0,
            rate: 0.0,
        }
    }

    /// Instant the measurement started (or was last restarted).
    pub fn started(&self) -> Instant {
        self.origin.at
    }

    /// Forgets all history and starts measuring again from zero at `now`.
    pub fn restart(&mut self, now: Instant) {
        self.history.clear();
        self.origin = Sample { at: now, value: 0 };
        self.last_value = 0;
        self.rate = 0.0;
    }

    /// Feeds the current value and returns the updated rate in counts per second.
    pub fn update(&mut self, value: u64, now: Instant) -> f64 {
        if value < self.last_value {
            // Counter went backwards: stall, and measure again from the new value.
            self.history.clear();
            self.origin = Sample { at: now, value };
            self.rate = 0.0;
        } else if value != self.last_value {
            self.history.push_back(Sample { at: now, value });
            let reference = if self.history.len() > self.window {
                self.history.pop_front()
            } else {
                None
            }
            .unwrap_or(self.origin);

            let dt = now.saturating_duration_since(reference.at).as_secs_f64();
            if dt > 0.0 {
                self.rate = value.saturating_sub(reference.value) as f64 / dt;
            }
        }
        self.last_value = value;
        self.rate
    }

    /// The most recently computed rate.
    pub fn rate(&self) -> f64 {
        self.rate
    }
}

/// Derived statistics of one bar at one instant.
#[derive(Clone, Debug, PartialEq)]
pub struct Estimate {
    pub value: u64,
    pub max: Option<u64>,
    /// Counts per second.
    pub rate: f64,
    /// Total elapsed time (TET).
    pub elapsed: Duration,
    /// Time to go (TTG); `None` when unknown.
    pub ttg: Option<Duration>,
}

impl Estimate {
    pub fn new(value: u64, max: Option<u64>, rate: f64, elapsed: Duration) -> Self {
        Estimate {
            value,
            max,
            rate,
            elapsed,
            ttg: time_to_go(value, max, rate),
        }
    }

    /// Maximum, if it is known and positive.
    pub fn bounded_max(&self) -> Option<u64> {
        self.max.filter(|&m| m > 0)
    }

    /// Completion ratio in `[0, 1]`, when the maximum is known and positive.
    pub fn ratio(&self) -> Option<f64> {
        self.bounded_max()
            .map(|max| (self.value as f64 / max as f64).clamp(0.0, 1.0))
    }

    /// Completion percentage in `[0, 100]`, when the maximum is known and positive.
    pub fn percent(&self) -> Option<f64> {
        self.ratio().map(|r| r * 100.0)
    }

    /// Wall-clock time of arrival, relative to `now`.
    pub fn eta(&self, now: DateTime<Local>) -> Option<DateTime<Local>> {
        let ttg = TimeDelta::from_std(self.ttg?).ok()?;
        now.checked_add_signed(ttg)
    }

    /// Overall run time (ORT): elapsed plus time to go.
    pub fn overall(&self) -> Option<Duration> {
        self.ttg.and_then(|ttg| self.elapsed.checked_add(ttg))
    }
}

/// `ceil((max - value) / rate)` seconds, or `None` if it cannot be estimated.
pub fn time_to_go(value: u64, max: Option<u64>, rate: f64) -> Option<Duration> {
    let max = max.filter(|&m| m > 0)?;
    if value >= max {
        return Some(Duration::ZERO);
    }
    if !rate.is_finite() || rate <= MIN_RATE {
        return None;
    }
    let secs = ((max - value) as f64 / rate).ceil();
    Duration::try_from_secs_f64(secs).ok()
}
