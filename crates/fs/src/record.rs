use std::path::Path;

use bitflags::bitflags;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

bitflags! {
    /// Unix permission bits of a file. On platforms without mode bits the
    /// crawler synthesizes `0o444` (read-only) or `0o666`.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Permissions: u32 {
        const SETUID = 0o4000;
        const SETGID = 0o2000;
        const STICKY = 0o1000;
        const OWNER_READ = 0o400;
        const OWNER_WRITE = 0o200;
        const OWNER_EXEC = 0o100;
        const GROUP_READ = 0o040;
        const GROUP_WRITE = 0o020;
        const GROUP_EXEC = 0o010;
        const OTHERS_READ = 0o004;
        const OTHERS_WRITE = 0o002;
        const OTHERS_EXEC = 0o001;
    }
}

/// One regular file seen by the crawler.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FileRecord {
    /// Raw permission bits, see [`FileRecord::permissions`]
    pub permissions: u32,
    pub size: u64,
    /// Full normalized path
    pub path: String,
    /// File name without its final extension
    pub stem: String,
    /// Final extension including the leading dot, empty if none
    pub extension: String,
    /// Last modification time, seconds since Unix epoch
    pub mtime_secs: u64,
}

impl FileRecord {
    #[inline]
    pub fn permissions(&self) -> Permissions {
        Permissions::from_bits_truncate(self.permissions)
    }

    pub fn modified_at(&self) -> Option<DateTime<Utc>> {
        let secs = i64::try_from(self.mtime_secs).ok()?;
        DateTime::from_timestamp(secs, 0)
    }

    /// Diff identity: two records describe the same unchanged file iff
    /// both path and size match.
    #[inline]
    pub fn identity(&self) -> (&str, u64) {
        (self.path.as_str(), self.size)
    }
}

/// A directory and the files directly inside it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vertex {
    pub path: String,
    pub files: Vec<FileRecord>,
}

impl Vertex {
    pub fn new(path: String) -> Self {
        Self {
            path,
            files: Vec::new(),
        }
    }
}

/// Split a file name into (stem, extension) the way `std::path` does,
/// with the extension keeping its leading dot.
///
/// `"main.rs"` -> `("main", ".rs")`, `".git"` -> `(".git", "")`,
/// `"repo.git"` -> `("repo", ".git")`.
pub fn split_name(name: &str) -> (String, String) {
    let path = Path::new(name);
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(name)
        .to_owned();
    let extension = path
        .extension()
        .and_then(|s| s.to_str())
        .map(|e| format!(".{e}"))
        .unwrap_or_default();
    (stem, extension)
}

#[cfg(test)]
#[path = "record_tests.rs"]
mod tests;
