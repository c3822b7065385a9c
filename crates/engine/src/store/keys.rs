//! Logical key layout of a baseline.
//!
//! Well-known keys start with `_`, which sorts after every digit, so the
//! per-vertex keys form one contiguous, numerically ordered range.

use dirbase_runtime::VERTEX_KEY_WIDTH;

use crate::graph::VertexId;

/// Flattened `Vec<FileRecord>` of the whole tree
pub const FILES: &str = "_files_";
/// CSR folder graph
pub const GRAPH: &str = "_graph_";
/// Whole `Vec<Vertex>` dump, kept for readers of the older layout
pub const VERTEXES: &str = "_vertexes_";
/// Vertex paths, ascending, index == dense id
pub const VIDS: &str = "_vids_";
/// `BaselineMeta`
pub const META: &str = "_meta_";

/// Exclusive upper bound of the vertex key range (`':'` follows `'9'`).
pub const VERTEX_KEY_END: &str = ":";

/// Number of distinct ids a fixed-width decimal key can hold.
pub const MAX_VERTICES: u64 = 10u64.pow(VERTEX_KEY_WIDTH as u32);

#[inline]
pub fn vertex_key(id: VertexId) -> String {
    format!("{:0width$}", id, width = VERTEX_KEY_WIDTH)
}

pub fn parse_vertex_key(key: &[u8]) -> Option<VertexId> {
    if key.len() != VERTEX_KEY_WIDTH || !key.iter().all(u8::is_ascii_digit) {
        return None;
    }
    std::str::from_utf8(key).ok()?.parse().ok()
}
