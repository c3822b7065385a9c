mod diff;
mod error;
mod graph;
mod hierarchy;
mod store;

pub use diff::{DiffReport, diff};
pub use error::{GraphError, StoreError};
pub use graph::{Compacted, FolderHierarchyGraph, VertexId, compact};
pub use hierarchy::{BaselineMeta, FolderHierarchy, META_FORMAT_VERSION};
pub use store::{Access, BaselineStore, KvEngine, ScopedRead, SledEngine, WriteBatch, keys};
