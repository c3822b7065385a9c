use std::process::ExitCode;

use anyhow::{Context, Result};
use dirbase_engine::BaselineStore;
use dirbase_fs::{PolicyKind, TraversalOrder};
use dirbase_indexer::diff_folders_detailed;
use clap::Args;
use log::{error, warn};

use crate::commands::StoreOptions;
use crate::printer::{ChangeKind, DiffPrintContext, DiffRow, OutputOptions};

#[derive(Debug, Args)]
pub struct DiffArgs {
    /// Folders to compare (default: every root of the baseline)
    #[arg(value_name = "FOLDER")]
    pub folders: Vec<String>,

    #[command(flatten)]
    pub store: StoreOptions,

    /// Override the policy recorded with the baseline
    #[arg(long)]
    pub policy: Option<PolicyKind>,

    /// Traversal order: dfs or bfs
    #[arg(long, default_value_t = TraversalOrder::Dfs)]
    pub order: TraversalOrder,

    #[command(flatten)]
    pub output: OutputOptions,
}

/// Exit status follows diff(1): 0 when nothing changed, 1 when something
/// did, 2 on error.
pub fn run(args: DiffArgs) -> ExitCode {
    match execute(args) {
        Ok(code) => code,
        Err(e) => {
            error!("[error] {e:#}");
            eprintln!("[diff] {e:#}");
            ExitCode::from(2)
        }
    }
}

fn execute(args: DiffArgs) -> Result<ExitCode> {
    let location = args.store.path();
    let store = BaselineStore::open_read(&location)
        .with_context(|| format!("Failed to open baseline at {}", location.display()))?;

    let policy = match args.policy {
        Some(kind) => kind,
        None => recorded_policy(&store)?,
    };

    let detail = diff_folders_detailed(&store, &args.folders, policy.build().as_ref(), args.order)
        .context("Failed to diff against baseline")?;
    let report = &detail.report;

    let ctx = DiffPrintContext {
        folders: &detail.scanned,
        missing: &detail.missing,
        modified: report.modified.len(),
        new: report.new.len(),
        deleted: report.deleted.len(),
    };

    let mut printer = args.output.make_printer();
    printer.begin(&ctx)?;

    let rows = report
        .modified
        .iter()
        .map(|r| (ChangeKind::Modified, r))
        .chain(report.new.iter().map(|r| (ChangeKind::New, r)))
        .chain(report.deleted.iter().map(|r| (ChangeKind::Deleted, r)));
    for (change, record) in rows {
        printer.print_row(&DiffRow { change, record }, &ctx)?;
    }

    printer.finish(&ctx)?;

    if report.is_empty() {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::from(1))
    }
}

fn recorded_policy(store: &BaselineStore) -> Result<PolicyKind> {
    let recorded = store.read_meta()?.and_then(|m| m.policy);

    match recorded.as_deref().map(str::parse::<PolicyKind>) {
        Some(Ok(kind)) => Ok(kind),
        Some(Err(e)) => {
            warn!("[diff] {e}, falling back to {}", PolicyKind::default());
            Ok(PolicyKind::default())
        }
        None => Ok(PolicyKind::default()),
    }
}
