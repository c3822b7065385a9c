use std::{
    collections::{HashSet, VecDeque},
    fmt,
    fs::{self, DirEntry, Metadata, read_dir},
    io::Result,
    path::{Component, Path, PathBuf},
    str::FromStr,
    time::{SystemTime, UNIX_EPOCH},
};

use log::{debug, warn};

use crate::{
    policy::NamePolicy,
    record::{FileRecord, Vertex, split_name},
};

/// Frontier discipline. Only discovery order differs; the resulting
/// vertex and edge sets are the same.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TraversalOrder {
    /// Stack frontier, memory grows with tree depth.
    #[default]
    Dfs,
    /// Queue frontier, memory grows with tree width.
    Bfs,
}

impl fmt::Display for TraversalOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TraversalOrder::Dfs => f.write_str("dfs"),
            TraversalOrder::Bfs => f.write_str("bfs"),
        }
    }
}

impl FromStr for TraversalOrder {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "dfs" | "depth" => Ok(TraversalOrder::Dfs),
            "bfs" | "breadth" => Ok(TraversalOrder::Bfs),
            other => Err(format!("unknown traversal order '{other}' (expected dfs or bfs)")),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CrawlStats {
    pub dirs_visited: usize,
    pub dirs_excluded: usize,
    pub files_recorded: usize,
    /// Entries dropped: unreadable metadata, non UTF-8 names, unknown types
    pub entries_skipped: usize,
    /// Roots that could not be listed and produced no vertex
    pub roots_skipped: usize,
}

#[derive(Debug, Default)]
pub struct CrawlOutput {
    /// One vertex per visited directory, in discovery order
    pub vertexes: Vec<Vertex>,
    /// (parent path, child path) for every admitted subdirectory
    pub edges: Vec<(String, String)>,
    pub stats: CrawlStats,
}

enum Frontier {
    Stack(Vec<String>),
    Queue(VecDeque<String>),
}

impl Frontier {
    fn new(order: TraversalOrder) -> Self {
        match order {
            TraversalOrder::Dfs => Frontier::Stack(Vec::new()),
            TraversalOrder::Bfs => Frontier::Queue(VecDeque::new()),
        }
    }

    #[inline]
    fn push(&mut self, dir: String) {
        match self {
            Frontier::Stack(s) => s.push(dir),
            Frontier::Queue(q) => q.push_back(dir),
        }
    }

    #[inline]
    fn pop(&mut self) -> Option<String> {
        match self {
            Frontier::Stack(s) => s.pop(),
            Frontier::Queue(q) => q.pop_front(),
        }
    }
}

/// Make `p` absolute and fully resolved: no `.` or `..` components, no
/// trailing separator. Returns `None` for non UTF-8 paths.
///
/// Existing paths are canonicalized. For a path that does not exist, its
/// deepest existing ancestor is canonicalized and the rest is appended
/// after lexical cleanup.
pub fn normalize_path(p: &Path) -> Option<String> {
    let abs = std::path::absolute(p).ok()?;
    let resolved = match fs::canonicalize(&abs) {
        Ok(c) => c,
        Err(_) => resolve_existing_prefix(&lexical_clean(&abs)),
    };
    resolved.to_str().map(str::to_owned)
}

fn lexical_clean(abs: &Path) -> PathBuf {
    let mut clean = PathBuf::new();
    for component in abs.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                clean.pop();
            }
            other => clean.push(other),
        }
    }
    clean
}

fn resolve_existing_prefix(clean: &Path) -> PathBuf {
    for ancestor in clean.ancestors() {
        if let Ok(base) = fs::canonicalize(ancestor) {
            return match clean.strip_prefix(ancestor) {
                Ok(rest) if !rest.as_os_str().is_empty() => base.join(rest),
                _ => base,
            };
        }
    }
    clean.to_path_buf()
}

/// Walk every root iteratively and collect one vertex per directory.
///
/// Each directory is listed at most once: a visited set guards against
/// overlapping roots and revisits. Entries that are neither regular files
/// nor directories (symlinks included) are dropped without a record.
/// A root that cannot be listed yields no vertex and counts in
/// [`CrawlStats::roots_skipped`]; an unlistable subdirectory keeps an empty
/// vertex so its parent edge stays valid.
pub fn crawl<R, P>(roots: &[R], policy: &P, order: TraversalOrder) -> CrawlOutput
where
    R: AsRef<Path>,
    P: NamePolicy + ?Sized,
{
    let mut out = CrawlOutput::default();
    let mut visited: HashSet<String> = HashSet::new();
    let mut frontier = Frontier::new(order);

    for root in roots {
        let root = root.as_ref();
        match normalize_path(root) {
            Some(p) => {
                if visited.insert(p.clone()) {
                    frontier.push(p);
                }
            }
            None => {
                warn!("[crawl] skipping root {:?}: not a valid UTF-8 path", root);
            }
        }
    }

    debug!("[crawl] starting {order} crawl with {} root(s)", visited.len());

    let root_paths: HashSet<String> = visited.clone();

    while let Some(dir) = frontier.pop() {
        let mut vertex = Vertex::new(dir);
        let children = match scan_dir(&mut vertex, policy, &mut out.stats) {
            Ok(children) => children,
            Err(e) if root_paths.contains(&vertex.path) => {
                warn!("[crawl] skipping root {:?}: {e}", vertex.path);
                out.stats.roots_skipped += 1;
                continue;
            }
            Err(e) => {
                warn!("[crawl] read_dir({:?}) failed: {e}", vertex.path);
                Vec::new()
            }
        };

        for child in children {
            out.edges.push((vertex.path.clone(), child.clone()));
            if visited.insert(child.clone()) {
                frontier.push(child);
            }
        }

        vertex.files.sort_unstable_by(|a, b| a.path.cmp(&b.path));
        out.stats.dirs_visited += 1;
        out.stats.files_recorded += vertex.files.len();
        out.vertexes.push(vertex);
    }

    debug!(
        "[crawl] done: {} dirs, {} files, {} excluded dirs, {} skipped entries, {} skipped roots",
        out.stats.dirs_visited,
        out.stats.files_recorded,
        out.stats.dirs_excluded,
        out.stats.entries_skipped,
        out.stats.roots_skipped
    );

    out
}

/// List one directory. Regular files go into `vertex.files`; admitted
/// subdirectory paths are returned.
fn scan_dir<P>(vertex: &mut Vertex, policy: &P, stats: &mut CrawlStats) -> Result<Vec<String>>
where
    P: NamePolicy + ?Sized,
{
    let rd = read_dir(&vertex.path)?;
    let mut subdirs = Vec::new();

    for entry_res in rd {
        let entry = match entry_res {
            Ok(e) => e,
            Err(e) => {
                warn!("[crawl] error reading entry in {:?}: {e}", vertex.path);
                stats.entries_skipped += 1;
                continue;
            }
        };

        match inspect_entry(&entry, policy) {
            Ok(Inspected::File(rec)) => vertex.files.push(rec),
            Ok(Inspected::Dir(path)) => subdirs.push(path),
            Ok(Inspected::ExcludedDir) => stats.dirs_excluded += 1,
            Ok(Inspected::Skipped) => stats.entries_skipped += 1,
            Err(e) => {
                warn!("[crawl] inspect {:?} failed: {e}", entry.path());
                stats.entries_skipped += 1;
            }
        }
    }

    Ok(subdirs)
}

enum Inspected {
    File(FileRecord),
    Dir(String),
    ExcludedDir,
    Skipped,
}

fn inspect_entry<P>(entry: &DirEntry, policy: &P) -> Result<Inspected>
where
    P: NamePolicy + ?Sized,
{
    // file_type() does not follow symlinks
    let file_type = entry.file_type()?;

    let name_os = entry.file_name();
    let Some(name) = name_os.to_str() else {
        debug!("[crawl] skipping non UTF-8 name {:?}", entry.path());
        return Ok(Inspected::Skipped);
    };
    let Some(path) = entry.path().to_str().map(str::to_owned) else {
        return Ok(Inspected::Skipped);
    };
    let (stem, extension) = split_name(name);

    if file_type.is_dir() {
        if policy.admits(&stem, &extension) {
            return Ok(Inspected::Dir(path));
        }
        debug!("[crawl] name policy excludes {path}");
        return Ok(Inspected::ExcludedDir);
    }

    if !file_type.is_file() {
        return Ok(Inspected::Skipped);
    }

    let metadata = entry.metadata()?;

    Ok(Inspected::File(FileRecord {
        permissions: mode_bits(&metadata),
        size: metadata.len(),
        path,
        stem,
        extension,
        mtime_secs: to_unix_secs(metadata.modified().ok()),
    }))
}

#[cfg(unix)]
fn mode_bits(metadata: &Metadata) -> u32 {
    use std::os::unix::fs::PermissionsExt;
    metadata.permissions().mode() & 0o7777
}

#[cfg(not(unix))]
fn mode_bits(metadata: &Metadata) -> u32 {
    if metadata.permissions().readonly() {
        0o444
    } else {
        0o666
    }
}

fn to_unix_secs(t: Option<SystemTime>) -> u64 {
    t.and_then(|tt| tt.duration_since(UNIX_EPOCH).ok())
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

#[cfg(test)]
#[path = "crawler_tests.rs"]
mod tests;
