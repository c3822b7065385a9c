use std::{path::PathBuf, process::ExitCode};

use anyhow::{Context, Result};
use dirbase_codec::Encoding;
use dirbase_engine::BaselineStore;
use dirbase_fs::{PolicyKind, TraversalOrder};
use dirbase_indexer::write_baseline;
use clap::Args;
use log::error;

use crate::commands::StoreOptions;
use crate::printer::{StatusWriter, StderrWriter};

#[derive(Debug, Args)]
pub struct BaselineArgs {
    /// Directories to crawl
    #[arg(required = true, value_name = "ROOT")]
    pub roots: Vec<PathBuf>,

    #[command(flatten)]
    pub store: StoreOptions,

    /// Directories to skip: all (skip none), normal, tooling
    #[arg(long, default_value_t = PolicyKind::Normal)]
    pub policy: PolicyKind,

    /// Traversal order: dfs or bfs
    #[arg(long, default_value_t = TraversalOrder::Dfs)]
    pub order: TraversalOrder,

    /// Value encoding: binary or json
    #[arg(long, default_value_t = Encoding::Binary)]
    pub encoding: Encoding,
}

pub fn run(args: BaselineArgs) -> ExitCode {
    match execute(args) {
        Ok(code) => code,
        Err(e) => {
            error!("[error] {e:#}");
            eprintln!("[baseline] {e:#}");
            ExitCode::from(2)
        }
    }
}

fn execute(args: BaselineArgs) -> Result<ExitCode> {
    let location = args.store.path();

    let store = BaselineStore::open_write(&location)
        .with_context(|| format!("Failed to open store at {}", location.display()))?
        .with_encoding(args.encoding);

    let summary = write_baseline(&store, &args.roots, args.policy, args.order)
        .with_context(|| format!("Failed to write baseline to {}", location.display()))?;

    let mut status = StderrWriter;
    status.write_status(&format!("[baseline] store:    {}", location.display()))?;
    status.write_status(&format!(
        "[baseline] policy:   {} ({} dirs excluded)",
        args.policy, summary.stats.dirs_excluded
    ))?;
    status.write_status(&format!("[baseline] folders:  {}", summary.meta.vertex_count))?;
    status.write_status(&format!("[baseline] files:    {}", summary.meta.file_count))?;
    if summary.stats.entries_skipped > 0 {
        status.write_status(&format!(
            "[baseline] skipped:  {} entries",
            summary.stats.entries_skipped
        ))?;
    }

    Ok(ExitCode::SUCCESS)
}
