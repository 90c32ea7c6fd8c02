//! Rolling Logger
//!
//! A `tracing` subscriber that writes one log file per day through
//! `tracing-appender` and keeps the most recent lines in memory. `log`
//! records are bridged through `tracing-subscriber`, so callers can use
//! either facade.

use std::collections::VecDeque;
use std::io::{self, Write};
use std::path::Path;
use std::sync::{Arc, Mutex, OnceLock};

use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::prelude::*;

/// Number of daily files kept on disk
pub const MAX_LOG_FILES: usize = 7;

/// Number of formatted lines kept in memory
pub const RING_CAPACITY: usize = 200;

static RECENT: OnceLock<Arc<Mutex<RingBuffer>>> = OnceLock::new();

pub type InitResult<T> = Result<T, Box<dyn std::error::Error + Send + Sync + 'static>>;

/// Fixed-size buffer of recent log lines (oldest evicted first)
#[derive(Debug)]
pub struct RingBuffer {
    lines: VecDeque<String>,
    capacity: usize,
}

impl RingBuffer {
    pub fn new(capacity: usize) -> Self {
        Self {
            lines: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn push(&mut self, line: String) {
        if self.capacity == 0 {
            return;
        }
        if self.lines.len() == self.capacity {
            self.lines.pop_front();
        }
        self.lines.push_back(line);
    }

    pub fn lines(&self) -> Vec<String> {
        self.lines.iter().cloned().collect()
    }
}

/// `MakeWriter` that copies formatted records into a `RingBuffer`
#[derive(Clone)]
pub struct RingWriter {
    ring: Arc<Mutex<RingBuffer>>,
}

impl RingWriter {
    pub fn new(ring: Arc<Mutex<RingBuffer>>) -> Self {
        Self { ring }
    }
}

impl Write for RingWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let text = String::from_utf8_lossy(buf);
        let mut ring = self
            .ring
            .lock()
            .map_err(|_| io::Error::other("log ring lock poisoned"))?;
        for line in text.lines().filter(|l| !l.trim().is_empty()) {
            ring.push(line.trim_end().to_string());
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for RingWriter {
    type Writer = RingWriter;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

/// Keeps the background file writer alive; dropping it flushes pending lines
pub struct LoggerGuard {
    _file: WorkerGuard,
}

/// Daily `<app_name>.<YYYY-MM-DD>.log` files, at most `MAX_LOG_FILES` kept
fn file_appender(log_dir: &Path, app_name: &str) -> InitResult<RollingFileAppender> {
    let appender = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix(app_name)
        .filename_suffix("log")
        .max_log_files(MAX_LOG_FILES)
        .build(log_dir)?;
    Ok(appender)
}

/// Assemble the subscriber without installing it
fn build_subscriber(
    log_dir: &Path,
    app_name: &str,
    ring: Arc<Mutex<RingBuffer>>,
    echo_stderr: bool,
) -> InitResult<(impl tracing::Subscriber + Send + Sync, LoggerGuard)> {
    let (file_writer, guard) = tracing_appender::non_blocking(file_appender(log_dir, app_name)?);

    let subscriber = tracing_subscriber::registry()
        .with(LevelFilter::INFO)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(file_writer)
                .with_ansi(false)
                .with_target(true),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(RingWriter::new(ring))
                .with_ansi(false)
                .with_target(true),
        )
        .with(echo_stderr.then(|| tracing_subscriber::fmt::layer().with_writer(io::stderr)));

    Ok((subscriber, LoggerGuard { _file: guard }))
}

/// Install the global subscriber. Call once at startup and hold the guard
/// until shutdown.
pub fn init_logger(log_dir: impl AsRef<Path>, app_name: &str) -> InitResult<LoggerGuard> {
    let ring = RECENT
        .get_or_init(|| Arc::new(Mutex::new(RingBuffer::new(RING_CAPACITY))))
        .clone();
    let (subscriber, guard) = build_subscriber(log_dir.as_ref(), app_name, ring, true)?;
    subscriber.try_init()?;

    log::info!("{} logger initialized", app_name);
    Ok(guard)
}

fn ensure_initialized() -> io::Result<()> {
    if RECENT.get().is_none() {
        return Err(io::Error::other("logger not initialized"));
    }
    Ok(())
}

pub fn info(msg: &str) -> io::Result<()> {
    ensure_initialized()?;
    tracing::info!("{}", msg);
    Ok(())
}

pub fn error(msg: &str) -> io::Result<()> {
    ensure_initialized()?;
    tracing::error!("{}", msg);
    Ok(())
}

/// Most recent log lines, oldest first. Empty before `init_logger`.
pub fn recent_lines() -> Vec<String> {
    RECENT
        .get()
        .and_then(|ring| ring.lock().ok().map(|r| r.lines()))
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ring(capacity: usize) -> Arc<Mutex<RingBuffer>> {
        Arc::new(Mutex::new(RingBuffer::new(capacity)))
    }

    #[test]
    fn test_ring_buffer_evicts_oldest() {
        let mut buf = RingBuffer::new(2);
        buf.push("a".into());
        buf.push("b".into());
        buf.push("c".into());
        assert_eq!(buf.lines(), vec!["b".to_string(), "c".to_string()]);
    }

    #[test]
    fn test_zero_capacity_ring_keeps_nothing() {
        let mut buf = RingBuffer::new(0);
        buf.push("a".into());
        assert!(buf.lines().is_empty());
    }

    #[test]
    fn test_ring_writer_splits_lines() {
        let ring = ring(10);
        let mut writer = RingWriter::new(ring.clone());
        assert_eq!(writer.write(b"first\nsecond\n\n").unwrap(), 15);
        assert_eq!(
            ring.lock().unwrap().lines(),
            vec!["first".to_string(), "second".to_string()]
        );
    }

    #[test]
    fn test_subscriber_writes_daily_file_and_ring() {
        let dir = tempfile::tempdir().unwrap();
        let ring = ring(10);
        let (subscriber, guard) = build_subscriber(dir.path(), "Test", ring.clone(), false).unwrap();

        tracing::subscriber::with_default(subscriber, || {
            tracing::info!("hello from the test");
            tracing::debug!("filtered out");
        });
        drop(guard);

        let lines = ring.lock().unwrap().lines();
        assert_eq!(lines.len(), 1);
        assert!(lines[0].contains("hello from the test"));

        let files: Vec<String> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().into_string().unwrap())
            .collect();
        assert_eq!(files.len(), 1);
        assert!(files[0].starts_with("Test.") && files[0].ends_with(".log"), "{:?}", files);

        let content = std::fs::read_to_string(dir.path().join(&files[0])).unwrap();
        assert!(content.contains("hello from the test"));
        assert!(!content.contains("filtered out"));
    }
}
