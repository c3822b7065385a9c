use std::{
    fs::{File, OpenOptions},
    io::Write,
    path::Path,
    sync::{Mutex, OnceLock},
};

use chrono::Local;
use log::{Level, LevelFilter, Log, Metadata, Record, SetLoggerError};

use crate::config::{PROGRAM_LOG_FILE, PROGRAM_LOG_LEVEL};

enum LogTarget {
    Stderr,
    File(Mutex<File>),
}

pub struct Logger {
    level: Level,
    target: LogTarget,
}

impl Logger {
    fn format_line(record: &Record<'_>) -> String {
        let timestamp = Local::now().format("%Y-%m-%d %H:%M:%S%.3f");
        format!(
            "{} {} [{}] {}",
            timestamp,
            record.level(),
            record.target(),
            record.args()
        )
    }
}

impl Log for Logger {
    fn enabled(&self, metadata: &Metadata<'_>) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record<'_>) {
        if !self.enabled(record.metadata()) {
            return;
        }

        let line = Self::format_line(record);
        match &self.target {
            LogTarget::Stderr => eprintln!("{line}"),
            LogTarget::File(file) => {
                let mut file = file.lock().unwrap_or_else(|p| p.into_inner());
                let _ = writeln!(file, "{line}");
            }
        }
    }

    fn flush(&self) {
        if let LogTarget::File(file) = &self.target {
            let mut file = file.lock().unwrap_or_else(|p| p.into_inner());
            let _ = file.flush();
        }
    }
}

fn get_level_from_env() -> Level {
    std::env::var(PROGRAM_LOG_LEVEL)
        .ok()
        .and_then(|s| s.parse::<LevelFilter>().ok())
        .and_then(|filter| filter.to_level())
        .unwrap_or(Level::Warn)
}

/// Resolve the log target from the environment. Falls back to stderr when
/// the log file cannot be opened.
fn get_target_from_env() -> LogTarget {
    match std::env::var_os(PROGRAM_LOG_FILE) {
        Some(path) if !path.is_empty() => open_log_file(Path::new(&path))
            .map(|f| LogTarget::File(Mutex::new(f)))
            .unwrap_or(LogTarget::Stderr),
        _ => LogTarget::Stderr,
    }
}

fn open_log_file(path: &Path) -> Option<File> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).ok()?;
    }
    OpenOptions::new().create(true).append(true).open(path).ok()
}

pub fn init() -> Result<(), SetLoggerError> {
    _init(get_level_from_env(), get_target_from_env())
}

fn _init(level: Level, target: LogTarget) -> Result<(), SetLoggerError> {
    static LOGGER: OnceLock<Logger> = OnceLock::new();

    // Only the first call installs the logger; later calls must not
    // change the max level away from what the installed logger uses.
    let init_call = LOGGER.get().is_none();

    let logger = LOGGER.get_or_init(|| Logger { level, target });

    if init_call {
        log::set_logger(logger)?;
        log::set_max_level(logger.level.to_level_filter());
    }

    Ok(())
}

#[cfg(test)]
#[path = "logging_tests.rs"]
mod tests;
