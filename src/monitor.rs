//! Wrapping a unit of work in a progress display.

use crate::{
    builder::ProgressBuilder,
    counter::Counter,
    error::Result,
    options::{Options, Target},
};

/// Runs `f` while a single bar displays the counter it is given, on stdout.
///
/// The display is started before `f` is called and stopped, showing the final state,
/// after it returns. When stdout is already used by another display, `f` runs without
/// a bar of its own.
///
/// ```no_run
/// use progression::{monitor, Options};
///
/// let sum = monitor(Some(1000), Options::default(), |counter| {
///     let mut sum = 0u64;
///     for i in 0..1000 {
///         sum += i;
///         counter.inc();
///     }
///     sum
/// })?;
/// assert_eq!(sum, 499_500);
/// # Ok::<(), progression::Error>(())
/// ```
pub fn monitor<R>(
    max: Option<u64>,
    options: Options,
    f: impl FnOnce(&Counter) -> R,
) -> Result<R> {
    monitor_on(Target::stdout(), max, options, f)
}

/// Like [`monitor`], writing to `target`.
pub fn monitor_on<R>(
    target: Target,
    max: Option<u64>,
    options: Options,
    f: impl FnOnce(&Counter) -> R,
) -> Result<R> {
    let counter = match max {
        Some(max) => Counter::with_max(max),
        None => Counter::new(),
    };
    ProgressBuilder::new()
        .options(options)
        .target(target)
        .bar(counter.clone())
        .build()
        .run(|_| f(&counter))
}
