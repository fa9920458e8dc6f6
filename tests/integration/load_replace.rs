use std::fs;
use std::path::Path;
use std::time::Duration;

use tempfile::tempdir;
use tripod::{Fetcher, NTriplesParser, NodeId, Partition, Store, StoreError, StoreOptions};

fn open_store(dir: &tempfile::TempDir) -> Store {
    Store::open(dir.path().join("store.db")).expect("open store")
}

fn write_doc(path: &Path, body: &str) {
    fs::write(path, body).expect("write document");
}

fn source_for(store: &Store, path: &Path) -> NodeId {
    let uri = format!("file://{}", path.display());
    store.node(&uri).expect("intern source uri")
}

#[test]
fn load_asserts_parsed_triples_under_the_source() {
    let dir = tempdir().expect("temp dir");
    let store = open_store(&dir);
    let doc = dir.path().join("doc.nt");
    write_doc(
        &doc,
        concat!(
            "<http://example.org/a> <http://example.org/p> <http://example.org/b> .\n",
            "<http://example.org/a> <http://example.org/p> \"hello\"@en .\n",
        ),
    );

    let source = source_for(&store, &doc);
    store.load(source).expect("load");

    assert_eq!(store.count(0, 0, 0, source, Partition::Any).expect("count"), 2);
    assert_eq!(store.all_sources().expect("sources"), vec![source]);

    let a = store.node("http://example.org/a").expect("a");
    let p = store.node("http://example.org/p").expect("p");
    assert_eq!(store.query(a, p, 0).expect("query").len(), 2);
}

#[test]
fn reload_replaces_previous_content() {
    let dir = tempdir().expect("temp dir");
    let store = open_store(&dir);
    let doc = dir.path().join("doc.nt");
    write_doc(
        &doc,
        concat!(
            "<http://example.org/a> <http://example.org/p> <http://example.org/b> .\n",
            "<http://example.org/a> <http://example.org/p> <http://example.org/c> .\n",
        ),
    );

    let source = source_for(&store, &doc);
    store.load(source).expect("first load");
    assert_eq!(store.count(0, 0, 0, source, Partition::Any).expect("count"), 2);

    write_doc(
        &doc,
        "<http://example.org/a> <http://example.org/p> <http://example.org/d> .\n",
    );
    store.load(source).expect("second load");

    assert_eq!(store.count(0, 0, 0, source, Partition::Any).expect("count"), 1);
    let a = store.node("http://example.org/a").expect("a");
    let p = store.node("http://example.org/p").expect("p");
    let d = store.node("http://example.org/d").expect("d");
    assert_eq!(store.query(a, p, 0).expect("query"), vec![tripod::Triple::new(a, p, d)]);
    // Still one provenance record for the source.
    assert_eq!(store.all_sources().expect("sources"), vec![source]);
}

#[test]
fn failed_parse_leaves_prior_content_intact() {
    let dir = tempdir().expect("temp dir");
    let store = open_store(&dir);
    let doc = dir.path().join("doc.nt");
    write_doc(
        &doc,
        "<http://example.org/a> <http://example.org/p> <http://example.org/b> .\n",
    );

    let source = source_for(&store, &doc);
    store.load(source).expect("load");

    write_doc(&doc, "<http://example.org/a> <http://example.org/p> .\n");
    let err = store.load(source).unwrap_err();
    assert!(matches!(err, StoreError::Parse { line: 1, .. }));

    // The earlier assertions survive a failed replace.
    assert_eq!(store.count(0, 0, 0, source, Partition::Any).expect("count"), 1);
}

#[test]
fn failed_fetch_leaves_store_unchanged() {
    let dir = tempdir().expect("temp dir");
    let store = open_store(&dir);

    let source = store
        .node(&format!("file://{}/missing.nt", dir.path().display()))
        .expect("source");
    let err = store.load(source).unwrap_err();
    assert!(matches!(err, StoreError::Fetch { .. }));
    assert!(store.all_sources().expect("sources").is_empty());
}

#[test]
fn slow_fetch_times_out() {
    struct SlowFetcher;

    impl Fetcher for SlowFetcher {
        fn fetch(&self, _uri: &str, timeout: Duration) -> tripod::Result<Vec<u8>> {
            std::thread::sleep(timeout + Duration::from_millis(50));
            Ok(Vec::new())
        }
    }

    let dir = tempdir().expect("temp dir");
    let store = Store::open_with(
        dir.path().join("store.db"),
        StoreOptions {
            fetch_timeout: Duration::from_millis(10),
        },
        Box::new(SlowFetcher),
        Box::new(NTriplesParser),
    )
    .expect("open store");

    let source = store.node("http://example.org/doc").expect("source");
    let err = store.load(source).unwrap_err();
    assert!(matches!(err, StoreError::Fetch { .. }));
    assert!(store.all_sources().expect("sources").is_empty());
}

#[test]
fn unload_removes_triples_and_provenance() {
    let dir = tempdir().expect("temp dir");
    let store = open_store(&dir);
    let doc = dir.path().join("doc.nt");
    write_doc(
        &doc,
        "<http://example.org/a> <http://example.org/p> <http://example.org/b> .\n",
    );

    let source = source_for(&store, &doc);
    store.load(source).expect("load");
    // A temporary assertion under the same source goes away with it.
    let a = store.node("http://example.org/a").expect("a");
    let p = store.node("http://example.org/p").expect("p");
    store.add_triple(a, p, a, source, true).expect("temp add");

    store.unload_source(source).expect("unload");
    assert_eq!(store.count(0, 0, 0, source, Partition::Any).expect("count"), 0);
    assert!(store.all_sources().expect("sources").is_empty());
}

#[test]
fn blank_node_labels_are_scoped_to_one_load() {
    let dir = tempdir().expect("temp dir");
    let store = open_store(&dir);
    let doc = dir.path().join("doc.nt");
    write_doc(
        &doc,
        concat!(
            "_:x <http://example.org/p> <http://example.org/a> .\n",
            "_:x <http://example.org/q> <http://example.org/b> .\n",
        ),
    );

    let source = source_for(&store, &doc);
    store.load(source).expect("load");

    let p = store.node("http://example.org/p").expect("p");
    let q = store.node("http://example.org/q").expect("q");
    let first_p = store.query(0, p, 0).expect("query p");
    let first_q = store.query(0, q, 0).expect("query q");
    assert_eq!(first_p.len(), 1);
    assert_eq!(first_q.len(), 1);
    assert_eq!(
        first_p[0].s, first_q[0].s,
        "one document-scoped label, one blank node"
    );

    store.load(source).expect("reload");
    let second_p = store.query(0, p, 0).expect("query p again");
    assert_eq!(second_p.len(), 1);
    assert_ne!(
        second_p[0].s, first_p[0].s,
        "a reload mints fresh blank nodes"
    );
}

#[test]
fn load_validates_its_source() {
    let dir = tempdir().expect("temp dir");
    let store = open_store(&dir);

    assert!(matches!(store.load(0), Err(StoreError::InvalidArgument(_))));
    let lit = store.literal("not a uri", 0, "").expect("literal");
    assert!(matches!(store.load(lit), Err(StoreError::InvalidArgument(_))));

    let blank = store.blank().expect("blank");
    assert!(matches!(store.load(blank), Err(StoreError::InvalidArgument(_))));

    // FileFetcher itself refuses non-file schemes.
    let http = store.node("http://example.org/doc").expect("http source");
    assert!(matches!(store.load(http), Err(StoreError::Fetch { .. })));
}
