use std::{path::Path, thread};

use dirbase_engine::{
    BaselineMeta, BaselineStore, DiffReport, FolderHierarchy, KvEngine, StoreError, diff,
};
use dirbase_fs::{
    CrawlStats, FileRecord, NamePolicy, PolicyKind, TraversalOrder, crawl, normalize_path,
};
use log::{info, warn};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum IndexerError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("{0} thread panicked")]
    WorkerPanicked(&'static str),

    #[error("no roots given and the baseline records none")]
    NoRoots,

    #[error("none of the {0} root(s) could be listed")]
    UnreadableRoots(usize),
}

pub type Result<T, E = IndexerError> = std::result::Result<T, E>;

/// What a baseline write produced.
#[derive(Debug, Clone)]
pub struct BaselineSummary {
    pub meta: BaselineMeta,
    pub stats: CrawlStats,
}

/// A diff plus what was learned on the way.
#[derive(Debug, Default)]
pub struct FolderDiff {
    pub report: DiffReport,
    /// Requested folders the baseline has no vertex for
    pub missing: Vec<String>,
    /// The folders that were crawled
    pub scanned: Vec<String>,
    pub stats: CrawlStats,
}

/// Crawl `roots` and compact the result into a persistable hierarchy.
pub fn build_hierarchy<R, P>(
    roots: &[R],
    policy: &P,
    order: TraversalOrder,
) -> (FolderHierarchy, CrawlStats)
where
    R: AsRef<Path>,
    P: NamePolicy + ?Sized,
{
    let out = crawl(roots, policy, order);
    let stats = out.stats;
    (FolderHierarchy::from_crawl(out), stats)
}

/// Crawl `roots` with the standard policy `kind` and replace the baseline
/// held by `store`.
pub fn write_baseline<E, R>(
    store: &BaselineStore<E>,
    roots: &[R],
    kind: PolicyKind,
    order: TraversalOrder,
) -> Result<BaselineSummary>
where
    E: KvEngine,
    R: AsRef<Path>,
{
    if roots.is_empty() {
        return Err(IndexerError::NoRoots);
    }

    let policy = kind.build();
    let (hierarchy, stats) = build_hierarchy(roots, policy.as_ref(), order);
    if hierarchy.vertexes.is_empty() {
        return Err(IndexerError::UnreadableRoots(roots.len()));
    }
    let meta = BaselineMeta::describe(&hierarchy).with_policy(kind.name());

    store.write_with_meta(&hierarchy, &meta)?;

    info!(
        "[indexer] baseline of {} root(s): {} dirs visited, {} excluded, {} files",
        roots.len(),
        stats.dirs_visited,
        stats.dirs_excluded,
        stats.files_recorded
    );

    Ok(BaselineSummary { meta, stats })
}

/// Diff the current state of `folders` against the stored baseline.
///
/// With no folders the whole baseline is compared against a fresh crawl of
/// the roots it was built from.
pub fn diff_folders<E, S, P>(
    store: &BaselineStore<E>,
    folders: &[S],
    policy: &P,
    order: TraversalOrder,
) -> Result<DiffReport>
where
    E: KvEngine,
    S: AsRef<str>,
    P: NamePolicy + ?Sized,
{
    diff_folders_detailed(store, folders, policy, order).map(|d| d.report)
}

/// [`diff_folders`], also reporting unknown folders and crawl statistics.
pub fn diff_folders_detailed<E, S, P>(
    store: &BaselineStore<E>,
    folders: &[S],
    policy: &P,
    order: TraversalOrder,
) -> Result<FolderDiff>
where
    E: KvEngine,
    S: AsRef<str>,
    P: NamePolicy + ?Sized,
{
    if folders.is_empty() {
        let roots = baseline_roots(store)?;
        let (scan, stats, baseline) = fork_join(
            || scan_files(&roots, policy, order),
            || store.read_all(),
        )?;

        return Ok(FolderDiff {
            report: diff(&scan, &baseline?),
            missing: Vec::new(),
            scanned: roots,
            stats,
        });
    }

    let paths: Vec<String> = folders
        .iter()
        .map(|f| {
            let raw = f.as_ref();
            normalize_path(Path::new(raw)).unwrap_or_else(|| raw.to_owned())
        })
        .collect();
    let (scan, stats, scoped) = fork_join(
        || scan_files(&paths, policy, order),
        || store.read_scoped(&paths),
    )?;
    let scoped = scoped?;

    Ok(FolderDiff {
        report: diff(&scan, &scoped.files),
        missing: scoped.missing,
        scanned: paths,
        stats,
    })
}

/// Roots the stored baseline was crawled from.
///
/// Baselines without a meta record fall back to the parentless vertices.
pub fn baseline_roots<E: KvEngine>(store: &BaselineStore<E>) -> Result<Vec<String>> {
    let roots = match store.read_meta()? {
        Some(meta) => meta.roots,
        None => {
            warn!("[indexer] baseline has no meta record, deriving roots from the graph");
            let vids = store.read_vids()?;
            store
                .read_graph()?
                .roots()
                .into_iter()
                .filter_map(|id| vids.get(id as usize).cloned())
                .collect()
        }
    };

    if roots.is_empty() {
        return Err(IndexerError::NoRoots);
    }
    Ok(roots)
}

fn scan_files<R, P>(roots: &[R], policy: &P, order: TraversalOrder) -> (Vec<FileRecord>, CrawlStats)
where
    R: AsRef<Path>,
    P: NamePolicy + ?Sized,
{
    let out = crawl(roots, policy, order);
    let files = out.vertexes.into_iter().flat_map(|v| v.files).collect();
    (files, out.stats)
}

/// Run the crawl and the store read side by side. They share no mutable
/// state; a panic in either is reported once both have finished.
fn fork_join<C, L, T>(crawl_fn: C, load_fn: L) -> Result<(Vec<FileRecord>, CrawlStats, T)>
where
    C: FnOnce() -> (Vec<FileRecord>, CrawlStats) + Send,
    L: FnOnce() -> T + Send,
    T: Send,
{
    thread::scope(|s| {
        let crawler = s.spawn(crawl_fn);
        let loader = s.spawn(load_fn);

        let crawled = crawler.join();
        let loaded = loader.join();

        let (files, stats) = crawled.map_err(|_| IndexerError::WorkerPanicked("crawler"))?;
        let loaded = loaded.map_err(|_| IndexerError::WorkerPanicked("baseline reader"))?;
        Ok((files, stats, loaded))
    })
}

#[cfg(test)]
#[path = "lib_tests.rs"]
mod tests;
