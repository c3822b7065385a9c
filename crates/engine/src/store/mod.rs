use std::{
    fs,
    path::Path,
    thread,
};

use crossbeam::channel;
use dirbase_codec::{Encoding, decode, encode};
use dirbase_fs::{FileRecord, Vertex, normalize_path};
use dirbase_runtime::{FETCH_CHUNK_MIN, default_worker_count};
use log::{debug, info, warn};
use serde::{Serialize, de::DeserializeOwned};

use crate::{
    error::StoreError,
    graph::{FolderHierarchyGraph, VertexId},
    hierarchy::{BaselineMeta, FolderHierarchy},
};

pub mod keys;
mod kv;

pub use kv::{KvEngine, KvPair, SledEngine, WriteBatch};

/// A store handle is used for reading or for writing, never both.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Read,
    Write,
}

/// Result of a baseline load restricted to some folders.
#[derive(Debug, Default)]
pub struct ScopedRead {
    pub files: Vec<FileRecord>,
    /// Requested folders with no vertex in the baseline
    pub missing: Vec<String>,
    pub vertices_read: usize,
}

pub struct BaselineStore<E: KvEngine = SledEngine> {
    kv: E,
    access: Access,
    encoding: Encoding,
    workers: usize,
}

impl BaselineStore<SledEngine> {
    /// Open for writing, creating the store if it does not exist.
    pub fn open_write(path: &Path) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| StoreError::unavailable(path, e.to_string()))?;
        }
        let kv = SledEngine::open(path).map_err(|e| StoreError::unavailable(path, e.to_string()))?;

        debug!("[store] opened {} for writing", path.display());
        Ok(Self::with_engine(kv, Access::Write))
    }

    /// Open an existing baseline for reading.
    ///
    /// A missing path, an unopenable database, or a database holding no
    /// baseline is [`StoreError::Unavailable`]; it is never read as empty.
    pub fn open_read(path: &Path) -> Result<Self, StoreError> {
        if !path.is_dir() {
            return Err(StoreError::unavailable(path, "no store at this path"));
        }
        if let Some(absent) = SledEngine::MARKER_FILES
            .iter()
            .find(|name| !path.join(name).is_file())
        {
            return Err(StoreError::unavailable(
                path,
                format!("not a store directory (missing {absent})"),
            ));
        }
        let kv = SledEngine::open(path).map_err(|e| StoreError::unavailable(path, e.to_string()))?;

        for key in [keys::FILES, keys::GRAPH, keys::VIDS] {
            let present = kv
                .get(key.as_bytes())
                .map_err(|e| StoreError::unavailable(path, e.to_string()))?
                .is_some();
            if !present {
                return Err(StoreError::unavailable(
                    path,
                    format!("no baseline written (missing {key})"),
                ));
            }
        }

        debug!("[store] opened {} read-only", path.display());
        Ok(Self::with_engine(kv, Access::Read))
    }
}

impl<E: KvEngine> BaselineStore<E> {
    pub fn with_engine(kv: E, access: Access) -> Self {
        Self {
            kv,
            access,
            encoding: Encoding::default(),
            workers: default_worker_count(),
        }
    }

    /// Encoding used for values this handle writes. Reads accept any.
    pub fn with_encoding(mut self, encoding: Encoding) -> Self {
        self.encoding = encoding;
        self
    }

    /// Upper bound on threads used for the per-vertex fetch.
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    pub fn access(&self) -> Access {
        self.access
    }

    pub fn encoding(&self) -> Encoding {
        self.encoding
    }

    pub fn engine(&self) -> &E {
        &self.kv
    }

    fn ensure_writable(&self) -> Result<(), StoreError> {
        match self.access {
            Access::Write => Ok(()),
            Access::Read => Err(StoreError::ReadOnly),
        }
    }

    fn encode_value<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<Vec<u8>, StoreError> {
        encode(value, self.encoding).map_err(|e| StoreError::serialization(key, e))
    }

    fn get_value<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, StoreError> {
        match self.kv.get(key.as_bytes())? {
            Some(bytes) => decode(&bytes)
                .map(Some)
                .map_err(|e| StoreError::serialization(key, e)),
            None => Ok(None),
        }
    }

    fn get_required<T: DeserializeOwned>(&self, key: &str) -> Result<T, StoreError> {
        self.get_value(key)?
            .ok_or_else(|| StoreError::KeyNotFound(key.to_owned()))
    }

    /// Persist `hierarchy` as the new baseline.
    pub fn write(&self, hierarchy: &FolderHierarchy) -> Result<(), StoreError> {
        self.write_with_meta(hierarchy, &BaselineMeta::describe(hierarchy))
    }

    /// Persist `hierarchy` in one atomic batch, replacing any previous
    /// baseline including vertex entries beyond the new vertex count.
    pub fn write_with_meta(
        &self,
        hierarchy: &FolderHierarchy,
        meta: &BaselineMeta,
    ) -> Result<(), StoreError> {
        self.ensure_writable()?;

        let vertex_count = hierarchy.vertexes.len();
        if vertex_count as u64 > keys::MAX_VERTICES {
            return Err(StoreError::Inconsistent(format!(
                "{vertex_count} vertices exceed the key space of {}",
                keys::MAX_VERTICES
            )));
        }
        if hierarchy.graph.vertex_count() != vertex_count {
            return Err(StoreError::Inconsistent(format!(
                "graph has {} vertices, hierarchy has {vertex_count}",
                hierarchy.graph.vertex_count()
            )));
        }
        if let Some(w) = hierarchy
            .vertexes
            .windows(2)
            .find(|w| w[0].path >= w[1].path)
        {
            return Err(StoreError::Inconsistent(format!(
                "vertex paths not strictly ascending at {:?}",
                w[1].path
            )));
        }

        let vids: Vec<&str> = hierarchy.vertexes.iter().map(|v| v.path.as_str()).collect();

        let mut batch = WriteBatch::new();
        batch.put(keys::FILES, self.encode_value(keys::FILES, &hierarchy.all_files)?);
        batch.put(keys::GRAPH, self.encode_value(keys::GRAPH, &hierarchy.graph)?);
        batch.put(keys::VERTEXES, self.encode_value(keys::VERTEXES, &hierarchy.vertexes)?);
        batch.put(keys::VIDS, self.encode_value(keys::VIDS, &vids)?);
        batch.put(keys::META, self.encode_value(keys::META, meta)?);

        for (id, vertex) in hierarchy.vertexes.iter().enumerate() {
            let key = keys::vertex_key(id as VertexId);
            let value = self.encode_value(&key, vertex)?;
            batch.put(key, value);
        }

        // vertex_count <= MAX_VERTICES, so the id fits the key width
        let stale_from = keys::vertex_key(vertex_count as VertexId);
        let mut stale = 0usize;
        for item in self
            .kv
            .range(stale_from.as_bytes(), keys::VERTEX_KEY_END.as_bytes())
        {
            let (key, _) = item?;
            batch.delete(key);
            stale += 1;
        }

        let ops = batch.len();
        self.kv.put_batch(batch)?;
        self.kv.flush()?;

        info!(
            "[store] wrote baseline: {} vertices, {} edges, {} files ({} ops, {} stale vertex keys removed)",
            vertex_count,
            hierarchy.graph.edge_count(),
            hierarchy.all_files.len(),
            ops,
            stale
        );
        Ok(())
    }

    /// Every file of the baseline, straight from the flattened dump.
    pub fn read_all(&self) -> Result<Vec<FileRecord>, StoreError> {
        let files: Vec<FileRecord> = self.get_required(keys::FILES)?;
        debug!("[store] read_all: {} files", files.len());
        Ok(files)
    }

    pub fn read_meta(&self) -> Result<Option<BaselineMeta>, StoreError> {
        self.get_value(keys::META)
    }

    /// Vertex paths in id order. Fails if they are not strictly ascending,
    /// since scoped reads binary search them.
    pub fn read_vids(&self) -> Result<Vec<String>, StoreError> {
        let vids: Vec<String> = self.get_required(keys::VIDS)?;
        if let Some(w) = vids.windows(2).find(|w| w[0] >= w[1]) {
            return Err(StoreError::Inconsistent(format!(
                "{} not sorted at {:?}",
                keys::VIDS,
                w[1]
            )));
        }
        Ok(vids)
    }

    pub fn read_graph(&self) -> Result<FolderHierarchyGraph, StoreError> {
        let graph: FolderHierarchyGraph = self.get_required(keys::GRAPH)?;
        graph.validate()?;
        Ok(graph)
    }

    /// The whole-dump vertex list.
    pub fn read_vertexes(&self) -> Result<Vec<Vertex>, StoreError> {
        self.get_required(keys::VERTEXES)
    }

    pub fn read_vertex(&self, id: VertexId) -> Result<Option<Vertex>, StoreError> {
        self.get_value(&keys::vertex_key(id))
    }

    /// Load only the files under `folders` and their subfolders.
    ///
    /// Folders absent from the baseline are reported in
    /// [`ScopedRead::missing`] and skipped.
    pub fn read_scoped<S: AsRef<str>>(&self, folders: &[S]) -> Result<ScopedRead, StoreError> {
        let (vids, graph) = thread::scope(|s| {
            let vids_handle = s.spawn(|| self.read_vids());
            let graph = self.read_graph();
            let vids = vids_handle
                .join()
                .map_err(|_| StoreError::WorkerPanicked("vids fetch"))?;
            Ok::<_, StoreError>((vids?, graph?))
        })?;

        if vids.len() != graph.vertex_count() {
            return Err(StoreError::Inconsistent(format!(
                "{} vertex paths but {} graph vertices",
                vids.len(),
                graph.vertex_count()
            )));
        }

        let mut missing = Vec::new();
        let mut starts: Vec<VertexId> = Vec::with_capacity(folders.len());
        for folder in folders {
            let raw = folder.as_ref();
            let wanted = normalize_path(Path::new(raw)).unwrap_or_else(|| raw.to_owned());
            match vids.binary_search(&wanted) {
                Ok(id) => starts.push(id as VertexId),
                Err(_) => {
                    warn!("[store] folder {wanted} is not in the baseline, skipping");
                    missing.push(wanted);
                }
            }
        }

        let mut ids = graph.descendants_preorder(&starts);
        // Ascending ids keep every fetch chunk a contiguous key range.
        ids.sort_unstable();

        let vertexes = self.fetch_vertexes(&ids)?;
        let vertices_read = vertexes.len();
        let files: Vec<FileRecord> = vertexes.into_iter().flat_map(|v| v.files).collect();

        debug!(
            "[store] read_scoped: {} folder(s), {} vertices, {} files, {} missing",
            folders.len(),
            vertices_read,
            files.len(),
            missing.len()
        );

        Ok(ScopedRead {
            files,
            missing,
            vertices_read,
        })
    }

    /// Fetch vertices for sorted `ids`, in id order. Large requests are split
    /// into contiguous chunks read in parallel.
    fn fetch_vertexes(&self, ids: &[VertexId]) -> Result<Vec<Vertex>, StoreError> {
        if self.workers <= 1 || ids.len() <= FETCH_CHUNK_MIN {
            return self.fetch_chunk(ids);
        }

        let chunk_len = ids.len().div_ceil(self.workers).max(FETCH_CHUNK_MIN);
        let (tx, rx) = channel::unbounded::<(usize, Result<Vec<Vertex>, StoreError>)>();

        let panicked = thread::scope(|s| {
            let handles: Vec<_> = ids
                .chunks(chunk_len)
                .enumerate()
                .map(|(idx, part)| {
                    let tx = tx.clone();
                    s.spawn(move || {
                        let _ = tx.send((idx, self.fetch_chunk(part)));
                    })
                })
                .collect();

            handles.into_iter().any(|h| h.join().is_err())
        });
        drop(tx);

        if panicked {
            return Err(StoreError::WorkerPanicked("vertex fetch"));
        }

        let mut parts: Vec<(usize, Result<Vec<Vertex>, StoreError>)> = rx.iter().collect();
        parts.sort_unstable_by_key(|(idx, _)| *idx);

        let mut out = Vec::with_capacity(ids.len());
        for (_, part) in parts {
            out.extend(part?);
        }
        Ok(out)
    }

    fn fetch_chunk(&self, ids: &[VertexId]) -> Result<Vec<Vertex>, StoreError> {
        let mut out = Vec::with_capacity(ids.len());
        for &id in ids {
            match self.read_vertex(id)? {
                Some(v) => out.push(v),
                None => {
                    let err = StoreError::KeyNotFound(keys::vertex_key(id));
                    warn!("[store] {err}, skipping vertex");
                }
            }
        }
        Ok(out)
    }
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
