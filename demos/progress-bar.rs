use progression::{BarStyle, Counter, Progress};
use std::thread;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

const MAX: u64 = 200;

fn main() -> progression::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    for style in [BarStyle::Simple, BarStyle::Fancy] {
        let counter = Counter::with_max(MAX);
        let mut progress_bar = Progress::builder()
            .bar(counter.clone())
            .style(style)
            .refresh_period(Duration::from_millis(100))
            .build();
        progress_bar.start()?;

        // The counter can be moved to another thread:
        thread::spawn(move || {
            for _ in 0..MAX {
                counter.inc();
                thread::sleep(Duration::from_millis(15));
            }
        })
        .join()
        .unwrap();

        progress_bar.stop()?;
    }
    Ok(())
}
