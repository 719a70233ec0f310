use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};

/// Counters for one generation run, shared across worker threads.
#[derive(Clone)]
pub struct RunProgress {
    inner: Arc<Inner>,
}

struct Inner {
    files_total: usize,
    pages_written: AtomicUsize,
    failures: AtomicUsize,
    started_at: Instant,
    bar: ProgressBar,
}

pub struct ProgressSnapshot {
    pub files_total: usize,
    pub pages_written: usize,
    pub failures: usize,
    pub elapsed_ms: u64,
}

impl RunProgress {
    /// Draws a bar on stderr; indicatif hides it when stderr is not a terminal.
    pub fn new(files_total: usize) -> Self {
        let bar = ProgressBar::new(files_total as u64);
        if let Ok(style) = ProgressStyle::with_template("{bar:30} {pos}/{len} {wide_msg}") {
            bar.set_style(style);
        }
        Self::with_bar(files_total, bar)
    }

    pub fn hidden(files_total: usize) -> Self {
        Self::with_bar(
            files_total,
            ProgressBar::with_draw_target(Some(files_total as u64), ProgressDrawTarget::hidden()),
        )
    }

    fn with_bar(files_total: usize, bar: ProgressBar) -> Self {
        Self {
            inner: Arc::new(Inner {
                files_total,
                pages_written: AtomicUsize::new(0),
                failures: AtomicUsize::new(0),
                started_at: Instant::now(),
                bar,
            }),
        }
    }

    /// Prints a line above the bar without tearing it.
    pub fn println(&self, line: &str) {
        self.inner.bar.suspend(|| println!("{}", line));
    }

    pub fn inc(&self) {
        self.inner.pages_written.fetch_add(1, Ordering::Relaxed);
        self.inner.bar.inc(1);
    }

    pub fn inc_error(&self) {
        self.inner.failures.fetch_add(1, Ordering::Relaxed);
        self.inner.bar.inc(1);
    }

    pub fn finish(&self) {
        self.inner.bar.finish_and_clear();
    }

    pub fn snapshot(&self) -> ProgressSnapshot {
        let files_total = self.inner.files_total;
        let pages_written = self.inner.pages_written.load(Ordering::Acquire);
        let failures = self.inner.failures.load(Ordering::Acquire);

        ProgressSnapshot {
            files_total,
            pages_written,
            failures,
            elapsed_ms: self.inner.started_at.elapsed().as_millis() as u64,
        }
    }
}
