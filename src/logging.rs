//! File logging backend for the `log` facade
//!
//! Writes every record at or above the configured level to `layoutview.log`
//! next to the executable. The file is truncated on each run.

use log::{Level, LevelFilter, Log, Metadata, Record};
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, OnceLock};
use std::time::SystemTime;

/// Global logger instance
static LOGGER: OnceLock<FileLogger> = OnceLock::new();

/// Logger that writes formatted lines to a single file
pub struct FileLogger {
    file: Mutex<Option<File>>,
    level: LevelFilter,
}

impl FileLogger {
    /// Create a logger writing to `path`; a file that cannot be opened
    /// disables output rather than failing startup
    pub fn new(path: &Path, level: LevelFilter) -> Self {
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(path)
            .ok();

        Self {
            file: Mutex::new(file),
            level,
        }
    }

    /// Get the log file path (same directory as executable)
    pub fn default_path() -> PathBuf {
        std::env::current_exe()
            .ok()
            .and_then(|p| p.parent().map(|p| p.to_path_buf()))
            .unwrap_or_else(|| PathBuf::from("."))
            .join("layoutview.log")
    }

    fn format_line(level: Level, target: &str, args: &std::fmt::Arguments) -> String {
        let timestamp = SystemTime::now()
            .duration_since(SystemTime::UNIX_EPOCH)
            .map(|d| d.as_millis())
            .unwrap_or(0);

        format!("[{:013}] [{:5}] [{}] {}\n", timestamp, level, target, args)
    }
}

impl Log for FileLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }

        let line = Self::format_line(record.level(), record.target(), record.args());
        if let Ok(mut guard) = self.file.lock() {
            if let Some(file) = guard.as_mut() {
                let _ = file.write_all(line.as_bytes());
            }
        }
    }

    fn flush(&self) {
        if let Ok(mut guard) = self.file.lock() {
            if let Some(file) = guard.as_mut() {
                let _ = file.flush();
            }
        }
    }
}

/// Install the global file logger. Repeated calls are no-ops.
pub fn init(level: LevelFilter) {
    init_at(&FileLogger::default_path(), level);
}

/// Install the global file logger writing to an explicit path
pub fn init_at(path: &Path, level: LevelFilter) {
    let logger = LOGGER.get_or_init(|| FileLogger::new(path, level));
    if log::set_logger(logger).is_ok() {
        log::set_max_level(level);
    }
}

/// Flush the log file
pub fn flush() {
    if let Some(logger) = LOGGER.get() {
        logger.flush();
    }
}
