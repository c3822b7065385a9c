use super::*;
use crate::META_FORMAT_VERSION;

use serde::Serialize;

fn file(path: &str, size: u64) -> FileRecord {
    let name = path.rsplit('/').next().unwrap_or(path);
    let (stem, extension) = dirbase_fs::split_name(name);
    FileRecord {
        permissions: 0o644,
        size,
        path: path.to_owned(),
        stem,
        extension,
        mtime_secs: 1_700_000_000,
    }
}

fn vertex(path: &str, files: &[(&str, u64)]) -> Vertex {
    Vertex {
        path: path.to_owned(),
        files: files.iter().map(|(p, s)| file(p, *s)).collect(),
    }
}

fn edge(p: &str, c: &str) -> (String, String) {
    (p.to_owned(), c.to_owned())
}

/// /r            r.txt
/// ├── /r/a      a1, a2
/// │   └── /r/a/x  x1
/// └── /r/b      b1
fn sample() -> FolderHierarchy {
    FolderHierarchy::build(
        vec![
            vertex("/r", &[("/r/r.txt", 1)]),
            vertex("/r/a", &[("/r/a/a1", 10), ("/r/a/a2", 20)]),
            vertex("/r/a/x", &[("/r/a/x/x1", 30)]),
            vertex("/r/b", &[("/r/b/b1", 40)]),
        ],
        &[edge("/r", "/r/a"), edge("/r/a", "/r/a/x"), edge("/r", "/r/b")],
    )
}

fn temp_store() -> BaselineStore {
    let db = sled::Config::new()
        .temporary(true)
        .open()
        .expect("open temporary sled");
    BaselineStore::with_engine(SledEngine::from_db(db), Access::Write)
}

fn reader_of(store: &BaselineStore) -> BaselineStore {
    BaselineStore::with_engine(store.engine().clone(), Access::Read)
}

fn paths(files: &[FileRecord]) -> Vec<&str> {
    files.iter().map(|f| f.path.as_str()).collect()
}

#[test]
fn open_read_rejects_missing_path() {
    let tmp = tempfile::tempdir().expect("create temp dir");
    let err = BaselineStore::open_read(&tmp.path().join("nope.db"))
        .err()
        .expect("missing store");
    assert!(matches!(err, StoreError::Unavailable { .. }), "{err}");
}

#[test]
fn open_read_leaves_foreign_paths_untouched() {
    let tmp = tempfile::tempdir().expect("create temp dir");

    let empty_dir = tmp.path().join("empty");
    std::fs::create_dir(&empty_dir).expect("create empty dir");
    let err = BaselineStore::open_read(&empty_dir).err().expect("not a store");
    assert!(matches!(err, StoreError::Unavailable { .. }), "{err}");
    let entries = std::fs::read_dir(&empty_dir).expect("list dir").count();
    assert_eq!(entries, 0, "read-only open must not create files");

    let plain_file = tmp.path().join("file.db");
    std::fs::write(&plain_file, b"not sled").expect("write file");
    let err = BaselineStore::open_read(&plain_file).err().expect("not a dir");
    assert!(matches!(err, StoreError::Unavailable { .. }), "{err}");
    assert_eq!(std::fs::read(&plain_file).expect("read file"), b"not sled");
}

#[test]
fn open_read_rejects_store_without_baseline() {
    let tmp = tempfile::tempdir().expect("create temp dir");
    let path = tmp.path().join("empty.db");
    drop(BaselineStore::open_write(&path).expect("create store"));

    let err = BaselineStore::open_read(&path).err().expect("no baseline");
    assert!(matches!(err, StoreError::Unavailable { .. }), "{err}");
}

#[test]
fn write_then_open_read_from_disk() {
    let tmp = tempfile::tempdir().expect("create temp dir");
    let path = tmp.path().join("nested").join("baseline.db");
    let h = sample();
    {
        let store = BaselineStore::open_write(&path).expect("open write");
        store.write(&h).expect("write baseline");
    }

    let store = BaselineStore::open_read(&path).expect("open read");
    assert_eq!(store.access(), Access::Read);

    let mut got = store.read_all().expect("read all");
    let mut want = h.all_files.clone();
    got.sort_by(|a, b| a.path.cmp(&b.path));
    want.sort_by(|a, b| a.path.cmp(&b.path));
    assert_eq!(got, want);

    let meta = store.read_meta().expect("read meta").expect("meta present");
    assert_eq!(meta.format_version, META_FORMAT_VERSION);
    assert_eq!(meta.roots, vec!["/r".to_owned()]);
    assert_eq!(meta.vertex_count, 4);
    assert_eq!(meta.edge_count, 3);
    assert_eq!(meta.file_count, 5);
}

#[test]
fn read_handle_refuses_writes() {
    let store = temp_store();
    store.write(&sample()).expect("write baseline");

    let reader = reader_of(&store);
    let err = reader.write(&sample()).expect_err("read-only");
    assert!(matches!(err, StoreError::ReadOnly));
}

#[test]
fn read_scoped_returns_subtree_files() {
    let store = temp_store();
    store.write(&sample()).expect("write baseline");

    let got = store.read_scoped(&["/r/a"]).expect("scoped read");
    assert_eq!(paths(&got.files), vec!["/r/a/a1", "/r/a/a2", "/r/a/x/x1"]);
    assert_eq!(got.vertices_read, 2);
    assert!(got.missing.is_empty());

    let leaf = store.read_scoped(&["/r/b"]).expect("scoped read");
    assert_eq!(paths(&leaf.files), vec!["/r/b/b1"]);

    let whole = store.read_scoped(&["/r"]).expect("scoped read");
    assert_eq!(whole.files.len(), 5);
}

#[test]
fn read_scoped_reports_unknown_folders_and_continues() {
    let store = temp_store();
    store.write(&sample()).expect("write baseline");

    let got = store
        .read_scoped(&["/r/b", "/elsewhere", "/r/a/"])
        .expect("scoped read");

    assert_eq!(got.missing, vec!["/elsewhere".to_owned()]);
    assert_eq!(
        paths(&got.files),
        vec!["/r/a/a1", "/r/a/a2", "/r/a/x/x1", "/r/b/b1"]
    );
}

#[test]
fn read_scoped_overlapping_folders_yield_each_file_once() {
    let store = temp_store();
    store.write(&sample()).expect("write baseline");

    let got = store
        .read_scoped(&["/r/a/x", "/r", "/r/a"])
        .expect("scoped read");
    let mut seen = paths(&got.files);
    let total = seen.len();
    seen.sort();
    seen.dedup();
    assert_eq!(seen.len(), total);
    assert_eq!(total, 5);
}

#[test]
fn read_scoped_with_no_folders_is_empty() {
    let store = temp_store();
    store.write(&sample()).expect("write baseline");

    let got = store.read_scoped::<&str>(&[]).expect("scoped read");
    assert!(got.files.is_empty());
    assert_eq!(got.vertices_read, 0);
}

#[test]
fn rewrite_removes_stale_vertex_keys() {
    let store = temp_store();
    store.write(&sample()).expect("write baseline");
    assert!(store.read_vertex(3).expect("read vertex").is_some());

    let smaller = FolderHierarchy::build(vec![vertex("/s", &[("/s/f", 1)])], &[]);
    store.write(&smaller).expect("rewrite baseline");

    for id in 1..4 {
        assert!(
            store.read_vertex(id).expect("read vertex").is_none(),
            "vertex {id} should be gone"
        );
    }
    assert_eq!(store.read_vids().expect("vids"), vec!["/s".to_owned()]);
    assert_eq!(paths(&store.read_all().expect("read all")), vec!["/s/f"]);
}

#[test]
fn vertex_keys_sort_in_id_order() {
    let store = temp_store();
    store.write(&sample()).expect("write baseline");

    let ids: Vec<VertexId> = store
        .engine()
        .range(b"0", keys::VERTEX_KEY_END.as_bytes())
        .map(|item| item.expect("range item").0)
        .map(|key| keys::parse_vertex_key(&key).expect("vertex key"))
        .collect();
    assert_eq!(ids, vec![0, 1, 2, 3]);
    assert_eq!(keys::vertex_key(7), "000000007");
    assert_eq!(keys::parse_vertex_key(b"_files_"), None);
}

#[test]
fn legacy_vertex_dump_matches_per_vertex_keys() {
    let store = temp_store();
    let h = sample();
    store.write(&h).expect("write baseline");

    let dump = store.read_vertexes().expect("vertex dump");
    assert_eq!(dump, h.vertexes);
    for (id, v) in dump.iter().enumerate() {
        let single = store
            .read_vertex(id as VertexId)
            .expect("read vertex")
            .expect("vertex present");
        assert_eq!(&single, v);
    }
}

#[test]
fn undecodable_graph_is_a_serialization_error() {
    let store = temp_store();
    store.write(&sample()).expect("write baseline");
    store
        .engine()
        .put(keys::GRAPH.as_bytes(), b"garbage".to_vec())
        .expect("overwrite graph");

    match store.read_scoped(&["/r"]) {
        Err(StoreError::Serialization { key, .. }) => assert_eq!(key, keys::GRAPH),
        other => panic!("expected serialization error, got {other:?}"),
    }
}

#[test]
fn invalid_graph_layout_is_corrupt() {
    #[derive(Serialize)]
    struct RawGraph {
        vertex_offsets: Vec<u32>,
        edge_targets: Vec<u32>,
    }

    let store = temp_store();
    store.write(&sample()).expect("write baseline");
    let bad = RawGraph {
        vertex_offsets: vec![0, 3, 1, 1, 1],
        edge_targets: vec![1],
    };
    let bytes = encode(&bad, Encoding::Binary).expect("encode raw graph");
    store
        .engine()
        .put(keys::GRAPH.as_bytes(), bytes)
        .expect("overwrite graph");

    let err = store.read_graph().expect_err("corrupt graph");
    assert!(matches!(err, StoreError::CorruptGraph(_)), "{err}");
}

#[test]
fn missing_vertex_key_is_skipped() {
    let store = temp_store();
    store.write(&sample()).expect("write baseline");
    store
        .engine()
        .delete(keys::vertex_key(2).as_bytes())
        .expect("delete vertex");

    let got = store.read_scoped(&["/r/a"]).expect("scoped read");
    assert_eq!(paths(&got.files), vec!["/r/a/a1", "/r/a/a2"]);
    assert_eq!(got.vertices_read, 1);
}

#[test]
fn json_written_store_reads_back() {
    let store = temp_store().with_encoding(Encoding::Json);
    store.write(&sample()).expect("write baseline");

    let raw = store
        .engine()
        .get(keys::FILES.as_bytes())
        .expect("get files")
        .expect("files present");
    assert_eq!(dirbase_codec::peek_encoding(&raw).expect("tag"), Encoding::Json);

    let reader = reader_of(&store);
    assert_eq!(reader.encoding(), Encoding::Binary);
    let got = reader.read_scoped(&["/r/a/x"]).expect("scoped read");
    assert_eq!(paths(&got.files), vec!["/r/a/x/x1"]);
}

#[test]
fn write_rejects_mismatched_graph() {
    let store = temp_store();
    let mut h = sample();
    h.vertexes.pop();

    let err = store.write(&h).expect_err("inconsistent");
    assert!(matches!(err, StoreError::Inconsistent(_)), "{err}");
    assert!(store.read_all().is_err());
}

#[test]
fn parallel_fetch_matches_sequential() {
    let mut vertexes = vec![vertex("/p", &[])];
    let mut edges = Vec::new();
    for i in 0..600 {
        let dir = format!("/p/d{i:04}");
        let f = format!("{dir}/f");
        vertexes.push(vertex(&dir, &[(f.as_str(), i as u64)]));
        edges.push(edge("/p", &dir));
    }
    let h = FolderHierarchy::build(vertexes, &edges);

    let store = temp_store().with_workers(4);
    store.write(&h).expect("write baseline");

    let parallel = store.read_scoped(&["/p"]).expect("parallel read");
    let sequential = reader_of(&store)
        .with_workers(1)
        .read_scoped(&["/p"])
        .expect("sequential read");

    assert_eq!(parallel.vertices_read, 601);
    assert_eq!(parallel.files.len(), 600);
    assert_eq!(parallel.files, sequential.files);
    assert_eq!(parallel.files, h.all_files);
}
