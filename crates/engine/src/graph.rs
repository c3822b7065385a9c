use dirbase_fs::Vertex;
use hashbrown::HashMap;
use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::error::GraphError;

/// Dense vertex id: rank of the vertex path in sorted order.
pub type VertexId = u32;

/// Folder hierarchy in compressed sparse row form.
///
/// `edge_targets[vertex_offsets[v]..vertex_offsets[v + 1]]` are exactly the
/// children of `v`, sorted by id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FolderHierarchyGraph {
    vertex_offsets: Vec<u32>,
    edge_targets: Vec<VertexId>,
}

impl Default for FolderHierarchyGraph {
    fn default() -> Self {
        Self {
            vertex_offsets: vec![0],
            edge_targets: Vec::new(),
        }
    }
}

impl FolderHierarchyGraph {
    /// Build from raw CSR arrays, checking every layout invariant.
    pub fn from_parts(
        vertex_offsets: Vec<u32>,
        edge_targets: Vec<VertexId>,
    ) -> Result<Self, GraphError> {
        let graph = Self {
            vertex_offsets,
            edge_targets,
        };
        graph.validate()?;
        Ok(graph)
    }

    pub fn validate(&self) -> Result<(), GraphError> {
        let offsets = &self.vertex_offsets;
        let first = *offsets.first().ok_or(GraphError::MissingOffsets)?;
        if first != 0 {
            return Err(GraphError::NonZeroStart(first));
        }

        if let Some(vertex) = offsets.windows(2).position(|w| w[0] > w[1]) {
            return Err(GraphError::Decreasing { vertex });
        }

        let last = offsets[offsets.len() - 1];
        if last as usize != self.edge_targets.len() {
            return Err(GraphError::EndMismatch {
                last,
                edges: self.edge_targets.len(),
            });
        }

        let vertices = self.vertex_count();
        if let Some(&target) = self
            .edge_targets
            .iter()
            .find(|&&t| t as usize >= vertices)
        {
            return Err(GraphError::TargetOutOfRange { target, vertices });
        }

        Ok(())
    }

    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.vertex_offsets.len().saturating_sub(1)
    }

    #[inline]
    pub fn edge_count(&self) -> usize {
        self.edge_targets.len()
    }

    pub fn vertex_offsets(&self) -> &[u32] {
        &self.vertex_offsets
    }

    pub fn edge_targets(&self) -> &[VertexId] {
        &self.edge_targets
    }

    /// Children of `v`. Empty for leaves and out of range ids.
    #[inline]
    pub fn children(&self, v: VertexId) -> &[VertexId] {
        let v = v as usize;
        if v >= self.vertex_count() {
            return &[];
        }
        let begin = self.vertex_offsets[v] as usize;
        let end = self.vertex_offsets[v + 1] as usize;
        &self.edge_targets[begin..end]
    }

    /// Vertices no edge points at, ascending. These are the crawl roots.
    pub fn roots(&self) -> Vec<VertexId> {
        let mut has_parent = vec![false; self.vertex_count()];
        for &t in &self.edge_targets {
            if let Some(slot) = has_parent.get_mut(t as usize) {
                *slot = true;
            }
        }
        has_parent
            .iter()
            .enumerate()
            .filter(|(_, p)| !**p)
            .map(|(v, _)| v as VertexId)
            .collect()
    }

    /// Depth-first preorder over the subtrees of `starts`, each reachable
    /// vertex reported once. Out of range starts are ignored.
    pub fn descendants_preorder(&self, starts: &[VertexId]) -> Vec<VertexId> {
        let n = self.vertex_count();
        let mut seen = vec![false; n];
        let mut order = Vec::new();
        let mut stack: Vec<VertexId> = Vec::new();

        for &start in starts {
            if start as usize >= n || seen[start as usize] {
                continue;
            }
            stack.push(start);

            while let Some(v) = stack.pop() {
                if seen[v as usize] {
                    continue;
                }
                seen[v as usize] = true;
                order.push(v);

                // Reverse so the smallest child is popped first.
                for &child in self.children(v).iter().rev() {
                    if !seen[child as usize] {
                        stack.push(child);
                    }
                }
            }
        }

        order
    }
}

/// Output of [`compact`]: vertices in dense id order plus the CSR graph.
#[derive(Debug)]
pub struct Compacted {
    pub vertexes: Vec<Vertex>,
    pub graph: FolderHierarchyGraph,
    pub id_by_path: HashMap<String, VertexId>,
}

/// Assign dense ids by sorted path and encode `edges` as CSR.
///
/// Edges naming a path that is not a vertex are dropped.
pub fn compact(mut vertexes: Vec<Vertex>, edges: &[(String, String)]) -> Compacted {
    vertexes.sort_unstable_by(|a, b| a.path.cmp(&b.path));

    let before = vertexes.len();
    vertexes.dedup_by(|later, first| {
        if later.path == first.path {
            first.files.append(&mut later.files);
            true
        } else {
            false
        }
    });
    if vertexes.len() != before {
        warn!(
            "[compact] merged {} duplicate vertex path(s)",
            before - vertexes.len()
        );
    }

    let id_by_path: HashMap<String, VertexId> = vertexes
        .iter()
        .enumerate()
        .map(|(id, v)| (v.path.clone(), id as VertexId))
        .collect();

    let mut pairs: Vec<(VertexId, VertexId)> = Vec::with_capacity(edges.len());
    for (parent, child) in edges {
        match (id_by_path.get(parent), id_by_path.get(child)) {
            (Some(&p), Some(&c)) => pairs.push((p, c)),
            _ => warn!("[compact] dropping edge {parent} -> {child}: unknown vertex"),
        }
    }
    pairs.sort_unstable();
    pairs.dedup();

    let v = vertexes.len();
    let mut vertex_offsets = vec![0u32; v + 1];
    for &(src, _) in &pairs {
        vertex_offsets[src as usize + 1] += 1;
    }
    for i in 0..v {
        vertex_offsets[i + 1] += vertex_offsets[i];
    }
    let edge_targets = pairs.into_iter().map(|(_, dst)| dst).collect();

    let graph = FolderHierarchyGraph {
        vertex_offsets,
        edge_targets,
    };

    debug!(
        "[compact] {} vertices, {} edges",
        graph.vertex_count(),
        graph.edge_count()
    );

    Compacted {
        vertexes,
        graph,
        id_by_path,
    }
}

#[cfg(test)]
#[path = "graph_tests.rs"]
mod tests;
