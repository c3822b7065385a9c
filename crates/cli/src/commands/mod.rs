pub mod baseline;
pub mod diff;
pub mod info;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use dirbase_runtime::default_store_path;

pub use baseline::BaselineArgs;
pub use diff::DiffArgs;
pub use info::InfoArgs;

#[derive(Parser, Debug)]
#[command(
    name = "dirbase",
    version,
    about = "dirbase - snapshot a directory tree and diff it later",
    propagate_version = true
)]
pub struct Cli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Crawl one or more roots and store them as the new baseline.
    ///
    /// Example:
    ///   dirbase baseline ~/src/project
    ///   dirbase baseline --policy tooling --order bfs /data /srv
    Baseline(BaselineArgs),

    /// Compare folders (or every baseline root) against the baseline.
    ///
    /// Example:
    ///   dirbase diff
    ///   dirbase diff --json ~/src/project/crates
    Diff(DiffArgs),

    /// Describe the stored baseline.
    Info(InfoArgs),
}

#[derive(Debug, Args)]
pub struct StoreOptions {
    /// Baseline store location (defaults to $DIRBASE_STORE, then the cache dir)
    #[arg(long, value_name = "PATH")]
    pub store: Option<PathBuf>,
}

impl StoreOptions {
    pub fn path(&self) -> PathBuf {
        self.store.clone().unwrap_or_else(default_store_path)
    }
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
