use std::time::{SystemTime, UNIX_EPOCH};

use dirbase_fs::{CrawlOutput, FileRecord, Vertex};
use serde::{Deserialize, Serialize};

use crate::graph::{FolderHierarchyGraph, compact};

pub const META_FORMAT_VERSION: u32 = 1;

/// The unit persisted as one baseline.
///
/// `vertexes[i]` has dense id `i`. `all_files` is the flattened union of
/// every vertex's files, in id order.
#[derive(Debug, Clone, Default)]
pub struct FolderHierarchy {
    pub vertexes: Vec<Vertex>,
    pub graph: FolderHierarchyGraph,
    pub all_files: Vec<FileRecord>,
}

impl FolderHierarchy {
    pub fn build(vertexes: Vec<Vertex>, edges: &[(String, String)]) -> Self {
        let compacted = compact(vertexes, edges);
        let all_files = compacted
            .vertexes
            .iter()
            .flat_map(|v| v.files.iter().cloned())
            .collect();

        Self {
            vertexes: compacted.vertexes,
            graph: compacted.graph,
            all_files,
        }
    }

    pub fn from_crawl(out: CrawlOutput) -> Self {
        Self::build(out.vertexes, &out.edges)
    }

    /// Paths of the vertices with no parent.
    pub fn root_paths(&self) -> Vec<String> {
        self.graph
            .roots()
            .into_iter()
            .filter_map(|id| self.vertexes.get(id as usize))
            .map(|v| v.path.clone())
            .collect()
    }

    pub fn vertex_paths(&self) -> Vec<String> {
        self.vertexes.iter().map(|v| v.path.clone()).collect()
    }
}

/// Describes how a baseline was produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BaselineMeta {
    pub format_version: u32,
    pub created_secs: u64,
    /// Name policy used for the crawl, if the writer recorded one
    pub policy: Option<String>,
    pub roots: Vec<String>,
    pub vertex_count: u64,
    pub edge_count: u64,
    pub file_count: u64,
}

impl BaselineMeta {
    pub fn describe(hierarchy: &FolderHierarchy) -> Self {
        let created_secs = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);

        Self {
            format_version: META_FORMAT_VERSION,
            created_secs,
            policy: None,
            roots: hierarchy.root_paths(),
            vertex_count: hierarchy.vertexes.len() as u64,
            edge_count: hierarchy.graph.edge_count() as u64,
            file_count: hierarchy.all_files.len() as u64,
        }
    }

    pub fn with_policy(mut self, policy: impl Into<String>) -> Self {
        self.policy = Some(policy.into());
        self
    }
}
