//! # progression
//!
//! This crate displays one or more progress bars in a terminal, together with the
//! elapsed time, the current speed and the estimated time to go.
//!
//! The data model is a [`Counter`]: an atomic value and an optional maximum. Worker
//! threads update counters at whatever rate they like. A [`Progress`] display reads
//! them from a background thread, with a low frequency, and repaints its block of lines
//! in place. Updating a counter never waits for the display.
//!
//! Speed is estimated from the last few changes of the counter rather than from the
//! whole run, so it follows the work as it speeds up or slows down. The time to go is
//! only shown when the maximum is known; a stalled or decreasing counter shows `--`
//! instead of a bogus estimate.
//!
//! Lines always fit into the terminal width. With [`Width::Auto`] the width is
//! re-read before every frame, so resizing the terminal is picked up immediately.
//!
//! ## Example
//! ```rust
//! use std::io;
//! use progression::{Counter, Progress, Target};
//!
//! let counter = Counter::with_max(100);
//! let mut progress = Progress::builder()
//!     .bar_with_prepend(counter.clone(), "copy: ")
//!     .target(Target::writer(io::sink()))      // stdout by default
//!     .build();
//!
//! progress.start()?;                           // repaints periodically from now on
//! for _ in 0..100 {
//!     counter.inc();
//! }
//! progress.stop()?;                            // paints the final state
//! # Ok::<(), progression::Error>(())
//! ```
//!
//! Several counters are shown as stacked lines. Any of them can be reset without
//! disturbing the others, which also counts how many times that bar was completed:
//! ```rust
//! use std::io;
//! use progression::{Counter, Progress, Target};
//!
//! let counters = vec![Counter::with_max(25), Counter::with_max(25)];
//! let progress = Progress::builder()
//!     .bars(counters.clone())
//!     .show_counter(true)
//!     .target(Target::writer(io::sink()))
//!     .build();
//!
//! progress.run(|p| {
//!     for _ in 0..30 {
//!         counters[1].inc();
//!         if counters[1].get() >= 25 {
//!             p.reset(1).unwrap();
//!         }
//!     }
//! })?;
//! # Ok::<(), progression::Error>(())
//! ```

pub mod bar;
pub mod builder;
pub mod counter;
mod error;
pub mod estimate;
pub mod humanize;
mod monitor;
pub mod options;
pub mod progress;
pub mod render;
pub mod terminal;

pub use bar::Bar;
pub use builder::ProgressBuilder;
pub use counter::Counter;
pub use error::{Error, Result};
pub use estimate::Estimate;
pub use monitor::{monitor, monitor_on};
pub use options::{Options, Target};
pub use progress::Progress;
pub use render::BarStyle;
pub use terminal::Width;
