use std::io::{self, Write};
use std::sync::atomic::{AtomicU64, Ordering};

use indicatif::{ProgressBar, ProgressStyle};
use parking_lot::RwLock;

const TEMPLATE: &str = "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta}) {msg}";

/// Bar currently drawn on the terminal, if any. Log output is written around it.
static ACTIVE_BAR: RwLock<Option<(u64, ProgressBar)>> = RwLock::new(None);
static NEXT_BAR_ID: AtomicU64 = AtomicU64::new(1);

/// Progress bar over the files of one batch run.
pub struct ProgressTracker {
    progress_bar: ProgressBar,
    // 0 for hidden bars, which are never registered
    id: u64,
}

impl ProgressTracker {
    pub fn new(len: usize, visible: bool) -> Self {
        if !visible {
            return Self::hidden();
        }

        let progress_bar = ProgressBar::new(len as u64);
        if let Ok(style) = ProgressStyle::with_template(TEMPLATE) {
            progress_bar.set_style(style.progress_chars("#>-"));
        }
        let id = NEXT_BAR_ID.fetch_add(1, Ordering::Relaxed);
        *ACTIVE_BAR.write() = Some((id, progress_bar.clone()));
        Self { progress_bar, id }
    }

    pub fn hidden() -> Self {
        Self {
            progress_bar: ProgressBar::hidden(),
            id: 0,
        }
    }

    pub fn start_file(&self, name: &str) {
        self.progress_bar.set_message(name.to_string());
    }

    pub fn finish_file(&self) {
        self.progress_bar.inc(1);
    }

    pub fn finish(&self) {
        self.release();
        self.progress_bar.finish_and_clear();
    }

    pub fn position(&self) -> u64 {
        self.progress_bar.position()
    }

    fn release(&self) {
        let mut active = ACTIVE_BAR.write();
        if active.as_ref().is_some_and(|(id, _)| *id == self.id) {
            *active = None;
        }
    }
}

impl Drop for ProgressTracker {
    fn drop(&mut self) {
        self.release();
    }
}

/// Stdout writer for the log subscriber.
///
/// While a bar is on screen each write runs inside `ProgressBar::suspend`, so
/// log lines are printed above the bar instead of being cut by its redraws.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogWriter;

impl LogWriter {
    pub const fn new() -> Self {
        Self
    }

    fn around_bar<T>(f: impl FnOnce() -> io::Result<T>) -> io::Result<T> {
        let bar = ACTIVE_BAR.read().as_ref().map(|(_, bar)| bar.clone());
        match bar {
            Some(bar) => bar.suspend(f),
            None => f(),
        }
    }
}

impl Write for LogWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        Self::around_bar(|| io::stdout().lock().write(buf))
    }

    fn write_all(&mut self, buf: &[u8]) -> io::Result<()> {
        Self::around_bar(|| {
            let mut stdout = io::stdout().lock();
            stdout.write_all(buf)?;
            stdout.flush()
        })
    }

    fn flush(&mut self) -> io::Result<()> {
        io::stdout().flush()
    }
}
