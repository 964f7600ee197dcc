use progression::{BarStyle, Counter, Progress};
use rand::Rng;
use std::thread;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

const BARS: usize = 4;
const MAX: u64 = 25;

fn main() -> progression::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let counters: Vec<Counter> = (0..BARS).map(|_| Counter::with_max(MAX)).collect();
    let mut builder = Progress::builder()
        .style(BarStyle::Fancy)
        .show_counter(true)
        .refresh_period(Duration::from_millis(300));
    for (i, counter) in counters.iter().enumerate() {
        builder = builder.bar_with_prepend(counter.clone(), format!("_{}_:", i + 1));
    }

    builder.build().run(|progress| {
        let mut rng = rand::thread_rng();
        for _ in 0..400 {
            let i = rng.gen_range(0..BARS);
            counters[i].inc();
            if counters[i].get() > MAX {
                // start over and count one more completed run
                progress.reset(i).unwrap();
            }
            thread::sleep(Duration::from_millis(10));
        }
    })
}
