use std::{path::PathBuf, thread};

pub const PROGRAM_NAME: &str = "dirbase";
pub const PROGRAM_LOG_LEVEL: &str = "DIRBASE_LOG_LEVEL";
/// When set, log lines are appended to this file instead of stderr.
pub const PROGRAM_LOG_FILE: &str = "DIRBASE_LOG_FILE";
/// Overrides the default baseline store location.
pub const STORE_PATH_ENV: &str = "DIRBASE_STORE";
pub const STORE_FILE_NAME: &str = "baseline.db";

/// Width of the zero-padded decimal key of a per-vertex entry.
/// Fixed width keeps lexicographic key order equal to numeric id order.
pub const VERTEX_KEY_WIDTH: usize = 9;

/// Smallest number of vertex ids handed to one fetch worker during a scoped read.
pub const FETCH_CHUNK_MIN: usize = 256;

/// Directory stems never descended into by the "normal" name policy.
pub const NORMAL_EXCLUDED_STEMS: &[&str] = &["CMakeFiles", "CMakeTmp"];
/// Directory extensions never descended into by the "normal" name policy.
pub const NORMAL_EXCLUDED_EXTS: &[&str] = &[".git", ".cache"];

/// Directory stems skipped by the "tooling" name policy (generated docs).
pub const TOOLING_EXCLUDED_STEMS: &[&str] = &["doc", "doxygen"];
pub const TOOLING_EXCLUDED_EXTS: &[&str] = &[".sbtools"];

fn xdg_or_cache(xdg_var: &str) -> PathBuf {
    match std::env::var_os(xdg_var) {
        Some(dir) if !dir.is_empty() => PathBuf::from(dir),
        _ => dirs::cache_dir().unwrap_or_else(|| PathBuf::from(".")),
    }
}

pub fn dirbase_dir() -> PathBuf {
    xdg_or_cache("XDG_CACHE_HOME").join(PROGRAM_NAME)
}

/// Default baseline store location, `$DIRBASE_STORE` if set.
pub fn default_store_path() -> PathBuf {
    match std::env::var_os(STORE_PATH_ENV) {
        Some(p) if !p.is_empty() => PathBuf::from(p),
        _ => dirbase_dir().join(STORE_FILE_NAME),
    }
}

/// Number of worker threads used for fan-out reads.
pub fn default_worker_count() -> usize {
    thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(4)
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
