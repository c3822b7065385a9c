use std::process::ExitCode;

use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use dirbase_engine::{BaselineStore, StoreError};
use clap::Args;
use log::error;

use crate::commands::StoreOptions;

#[derive(Debug, Args)]
pub struct InfoArgs {
    #[command(flatten)]
    pub store: StoreOptions,

    /// Print the baseline description as JSON
    #[arg(long)]
    pub json: bool,
}

pub fn run(args: InfoArgs) -> ExitCode {
    match execute(args) {
        Ok(code) => code,
        Err(e) => {
            error!("[error] {e:#}");
            eprintln!("[info] {e:#}");
            ExitCode::from(2)
        }
    }
}

fn execute(args: InfoArgs) -> Result<ExitCode> {
    let location = args.store.path();

    let store = match BaselineStore::open_read(&location) {
        Ok(store) => store,
        Err(StoreError::Unavailable { reason, .. }) => {
            eprintln!("[info] no baseline at {}: {reason}", location.display());
            // Absence is a soft failure
            return Ok(ExitCode::from(1));
        }
        Err(e) => return Err(e).context("Failed to open baseline"),
    };

    let meta = store.read_meta()?;
    let graph = store.read_graph()?;
    let size_bytes = store.engine().db().size_on_disk()?;

    if args.json {
        let obj = serde_json::json!({
            "location": location.display().to_string(),
            "vertices": graph.vertex_count(),
            "edges": graph.edge_count(),
            "size_bytes": size_bytes,
            "meta": meta,
        });
        println!("{obj}");
        return Ok(ExitCode::SUCCESS);
    }

    eprintln!("[info] location: {}", location.display());
    eprintln!("[info] folders:  {}", graph.vertex_count());
    eprintln!("[info] edges:    {}", graph.edge_count());
    eprintln!("[info] size:     {} bytes", size_bytes);

    match meta {
        Some(meta) => {
            let created = DateTime::from_timestamp(meta.created_secs as i64, 0)
                .map(|t| t.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S").to_string())
                .unwrap_or_else(|| "<unknown>".to_owned());

            eprintln!("[info] files:    {}", meta.file_count);
            eprintln!("[info] created:  {created}");
            eprintln!("[info] format:   v{}", meta.format_version);
            eprintln!("[info] policy:   {}", meta.policy.as_deref().unwrap_or("<unrecorded>"));
            for root in &meta.roots {
                eprintln!("[info] root:     {root}");
            }
        }
        None => {
            let files = store.read_all()?;
            eprintln!("[info] files:    {}", files.len());
        }
    }

    Ok(ExitCode::SUCCESS)
}
