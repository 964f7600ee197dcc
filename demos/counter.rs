use progression::{monitor, Counter, Options, Progress};
use std::thread;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

fn ln_factorial(n: u64, counter: &Counter) -> f64 {
    let mut f = 0.0;
    for i in 1..=n {
        f += (i as f64).ln();
        counter.set(i);
        thread::sleep(Duration::from_micros(300));
    }
    f
}

fn main() -> progression::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let f = monitor(Some(5000), Options::default(), |counter| {
        ln_factorial(5000, counter)
    })?;
    println!("ln(5000!) = {f:.3}");

    // Without a maximum only the count and the speed are shown.
    let workers: Vec<Counter> = vec![Counter::new(), Counter::new()];
    let progress = Progress::multi(workers.clone());
    progress.set_info_line(Some("two unbounded workers".to_string()));
    progress.run(|_| {
        thread::scope(|s| {
            for worker in &workers {
                s.spawn(move || {
                    for _ in 0..2000 {
                        worker.inc();
                        thread::sleep(Duration::from_micros(500));
                    }
                });
            }
        });
    })
}
