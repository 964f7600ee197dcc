use std::{
    io::{self, Write},
    sync::Arc,
    thread,
    time::Duration,
};

use parking_lot::Mutex;
use progression::{monitor, BarStyle, Counter, Error, Options, Progress, Target, Width};

/// In-memory output shared between the display and the test.
#[derive(Clone, Default)]
struct Screen(Arc<Mutex<Vec<u8>>>);

impl Write for Screen {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Screen {
    fn text(&self) -> String {
        String::from_utf8_lossy(&self.0.lock()).into_owned()
    }
}

#[test]
fn workers_and_resets_under_a_running_display() {
    let screen = Screen::default();
    let counters: Vec<Counter> = (0..4).map(|_| Counter::with_max(25)).collect();
    let mut builder = Progress::builder()
        .style(BarStyle::Fancy)
        .show_counter(true)
        .width(Width::Fixed(100))
        .refresh_period(Duration::from_millis(5))
        .enable_ansi_escapes(false)
        .target(Target::writer(screen.clone()));
    for (i, c) in counters.iter().enumerate() {
        builder = builder.bar_with_prepend(c.clone(), format!("_{}_:", i + 1));
    }

    let resets = builder
        .build()
        .run(|progress| {
            thread::scope(|s| {
                for (i, counter) in counters.iter().enumerate() {
                    s.spawn(move || {
                        for _ in 0..60 {
                            counter.inc();
                            if counter.get() >= 25 {
                                progress.reset(i).unwrap();
                            }
                        }
                    });
                }
            });
            progress.bars().iter().map(|b| b.reset_count()).collect::<Vec<_>>()
        })
        .unwrap();

    assert_eq!(resets, vec![2, 2, 2, 2]);
    assert!(counters.iter().all(|c| c.get() == 10));

    let text = screen.text();
    let last_frame: Vec<&str> = text.lines().rev().take(4).collect();
    for line in last_frame {
        assert!(line.chars().count() <= 100, "{line}");
        assert!(line.contains("#2 - "), "{line}");
    }
}

#[test]
fn final_frame_is_painted_with_ansi() {
    let screen = Screen::default();
    let counter = Counter::with_max(10);
    let mut progress = Progress::builder()
        .bar(counter.clone())
        .width(Width::Fixed(50))
        .enable_ansi_escapes(true)
        .colors(false)
        .refresh_period(Duration::from_secs(3600))
        .target(Target::writer(screen.clone()))
        .build();

    progress.start().unwrap();
    counter.set(10);
    progress.stop().unwrap();

    let text = screen.text();
    assert!(text.ends_with("TTG 0.00ms\n"), "{text:?}");
}

#[test]
fn erase_on_stop_when_not_leaving_the_bars() {
    let screen = Screen::default();
    let mut progress = Progress::builder()
        .bar(Counter::with_max(10))
        .width(Width::Fixed(50))
        .enable_ansi_escapes(true)
        .leave_on_stop(false)
        .refresh_period(Duration::from_secs(3600))
        .target(Target::writer(screen.clone()))
        .build();

    progress.start().unwrap();
    progress.stop().unwrap();

    let erase = format!("{}{}", ansi_escapes::CursorLeft, ansi_escapes::EraseDown);
    assert!(screen.text().ends_with(&erase));
}

/// The only test touching stdout: two displays cannot own it at the same time, and
/// work wrapped by a nested display still runs.
#[test]
fn stdout_is_reserved_by_one_display() {
    let quiet = |b: progression::ProgressBuilder| {
        b.enable_ansi_escapes(false)
            .leave_on_stop(false)
            .refresh_period(Duration::from_secs(3600))
            .build()
    };
    let mut first = quiet(Progress::builder().bar(Counter::with_max(1)));
    let mut second = quiet(Progress::builder().bar(Counter::with_max(1)));

    first.start().unwrap();
    assert!(matches!(
        second.start(),
        Err(Error::TerminalReserved { target: "stdout" })
    ));
    assert!(!second.is_running());

    let mut ran = false;
    let result = monitor(Some(10), Options::default(), |counter| {
        ran = true;
        counter.add(10);
        42
    })
    .unwrap();
    assert!(ran);
    assert_eq!(result, 42);
    assert!(first.is_running());

    drop(first);
    second.start().unwrap();
    second.stop().unwrap();
}

#[test]
fn dropping_the_display_stops_the_refresh_thread() {
    let screen = Screen::default();
    let counter = Counter::with_max(10);
    {
        let mut progress = Progress::builder()
            .bar(counter.clone())
            .refresh_period(Duration::from_millis(1))
            .enable_ansi_escapes(false)
            .target(Target::writer(screen.clone()))
            .build();
        progress.start().unwrap();
        thread::sleep(Duration::from_millis(20));
    }
    let after_drop = screen.text().len();
    thread::sleep(Duration::from_millis(20));
    assert_eq!(screen.text().len(), after_drop);
}
