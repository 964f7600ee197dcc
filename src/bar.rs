//! Per-bar state: the counter being watched plus the timing needed to estimate speed.

use std::time::{Duration, Instant};

use parking_lot::{Mutex, RwLock};

use crate::{
    counter::Counter,
    estimate::{Estimate, RateEstimator},
    render::ResetStats,
};

/// One monitored counter and its rendering state.
///
/// The counter itself is lock-free. The estimator state is only touched by the refresh
/// thread and by [`Bar::reset`], so workers incrementing the counter never wait for a
/// frame to be drawn.
#[derive(Debug)]
pub struct Bar {
    counter: Counter,
    prepend: RwLock<String>,
    tracker: Mutex<RateEstimator>,
    resets: Mutex<Resets>,
}

#[derive(Debug)]
struct Resets {
    count: u64,
    created: Instant,
    rate: RateEstimator,
}

impl Bar {
    pub(crate) fn new(
        counter: Counter,
        prepend: String,
        speed_calc_cycles: usize,
        reset_calc_cycles: usize,
        now: Instant,
    ) -> Self {
        Bar {
            counter,
            prepend: RwLock::new(prepend),
            tracker: Mutex::new(RateEstimator::new(speed_calc_cycles, now)),
            resets: Mutex::new(Resets {
                count: 0,
                created: now,
                rate: RateEstimator::new(reset_calc_cycles, now),
            }),
        }
    }

    /// The counter this bar displays.
    pub fn counter(&self) -> &Counter {
        &self.counter
    }

    /// Text shown in front of the bar.
    pub fn prepend(&self) -> String {
        self.prepend.read().clone()
    }

    pub fn set_prepend(&self, prepend: impl Into<String>) {
        *self.prepend.write() = prepend.into();
    }

    /// Time since the bar was started or last reset.
    pub fn elapsed(&self) -> Duration {
        self.elapsed_at(Instant::now())
    }

    pub(crate) fn elapsed_at(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.tracker.lock().started())
    }

    /// How many times the bar has been reset.
    pub fn reset_count(&self) -> u64 {
        self.resets.lock().count
    }

    /// Samples the counter and returns up-to-date statistics.
    pub fn estimate(&self) -> Estimate {
        self.estimate_at(Instant::now())
    }

    pub(crate) fn estimate_at(&self, now: Instant) -> Estimate {
        let value = self.counter.get();
        let max = self.counter.max();
        let mut tracker = self.tracker.lock();
        let rate = tracker.update(value, now);
        let elapsed = now.saturating_duration_since(tracker.started());
        Estimate::new(value, max, rate, elapsed)
    }

    pub(crate) fn reset_stats_at(&self, now: Instant) -> ResetStats {
        let resets = self.resets.lock();
        ResetStats {
            count: resets.count,
            rate: resets.rate.rate(),
            since_created: now.saturating_duration_since(resets.created),
        }
    }

    /// Sets the counter back to zero, restarts the elapsed time and counts the reset.
    pub fn reset(&self) {
        self.reset_at(Instant::now());
    }

    pub(crate) fn reset_at(&self, now: Instant) {
        {
            let mut resets = self.resets.lock();
            resets.count += 1;
            let count = resets.count;
            resets.rate.update(count, now);
        }
        let mut tracker = self.tracker.lock();
        self.counter.reset();
        tracker.restart(now);
    }
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, Instant};

    use super::Bar;
    use crate::counter::Counter;

    fn bar(counter: Counter, now: Instant) -> Bar {
        Bar::new(counter, String::new(), 10, 5, now)
    }

    /// Resetting a bar restarts its elapsed time from zero.
    #[test]
    fn reset_restarts_elapsed_time() {
        let t0 = Instant::now();
        let b = bar(Counter::with_max(100), t0);
        b.counter().add(30);

        let t1 = t0 + Duration::from_secs(5);
        assert_eq!(b.estimate_at(t1).elapsed, Duration::from_secs(5));

        b.reset_at(t1);
        assert_eq!(b.elapsed_at(t1), Duration::ZERO);
        assert_eq!(b.counter().get(), 0);

        let e = b.estimate_at(t1 + Duration::from_secs(2));
        assert_eq!(e.elapsed, Duration::from_secs(2));
        assert_eq!(e.value, 0);
        assert_eq!(e.rate, 0.0);
    }

    #[test]
    fn reset_counts_and_rates_completions() {
        let t0 = Instant::now();
        let b = bar(Counter::with_max(10), t0);

        b.reset_at(t0 + Duration::from_secs(2));
        b.reset_at(t0 + Duration::from_secs(4));

        let stats = b.reset_stats_at(t0 + Duration::from_secs(10));
        assert_eq!(stats.count, 2);
        assert_eq!(stats.rate, 0.5);
        assert_eq!(stats.since_created, Duration::from_secs(10));
        assert_eq!(b.reset_count(), 2);
    }

    #[test]
    fn estimate_reads_counter_and_max() {
        let t0 = Instant::now();
        let counter = Counter::with_max(100);
        let b = bar(counter.clone(), t0);

        counter.add(20);
        let e = b.estimate_at(t0 + Duration::from_secs(2));
        assert_eq!(e.value, 20);
        assert_eq!(e.max, Some(100));
        assert_eq!(e.rate, 10.0);
        assert_eq!(e.ttg, Some(Duration::from_secs(8)));

        counter.set_max(None);
        let e = b.estimate_at(t0 + Duration::from_secs(3));
        assert_eq!(e.ttg, None);
        assert_eq!(e.percent(), None);
    }

    #[test]
    fn prepend_can_change() {
        let b = bar(Counter::new(), Instant::now());
        b.set_prepend("task: ");
        assert_eq!(b.prepend(), "task: ");
    }
}
