use tempfile::tempdir;
use tripod::{Store, Triple};

fn open_store(dir: &tempfile::TempDir) -> Store {
    Store::open(dir.path().join("store.db")).expect("open store")
}

fn seed(store: &Store) -> Vec<Triple> {
    let s1 = store.node("http://example.org/s1").expect("s1");
    let s2 = store.node("http://example.org/s2").expect("s2");
    let p1 = store.node("http://example.org/p1").expect("p1");
    let p2 = store.node("http://example.org/p2").expect("p2");
    let o1 = store.node("http://example.org/o1").expect("o1");
    let o2 = store.literal("two", 0, "").expect("o2");
    let src = store.node("http://example.org/doc").expect("src");

    store.add_triple(s1, p1, o1, 0, false).expect("add");
    store.add_triple(s1, p2, o2, src, false).expect("add");
    store.add_triple(s2, p1, o2, 0, true).expect("add");
    vec![
        Triple::new(s1, p1, o1),
        Triple::new(s1, p2, o2),
        Triple::new(s2, p1, o2),
    ]
}

#[test]
fn every_single_position_pattern_finds_each_triple_once() {
    let dir = tempdir().expect("temp dir");
    let store = open_store(&dir);
    let triples = seed(&store);

    for t in &triples {
        for (s, p, o) in [(t.s, 0, 0), (0, t.p, 0), (0, 0, t.o), (0, 0, 0)] {
            let found = store.query(s, p, o).expect("query");
            let hits = found.iter().filter(|got| *got == t).count();
            assert_eq!(hits, 1, "pattern ({s},{p},{o}) should find {t:?} exactly once");
        }
    }
}

#[test]
fn matches_collapse_across_partitions_and_sources() {
    let dir = tempdir().expect("temp dir");
    let store = open_store(&dir);

    let s = store.node("http://example.org/s").expect("s");
    let p = store.node("http://example.org/p").expect("p");
    let o = store.node("http://example.org/o").expect("o");
    let src = store.node("http://example.org/doc").expect("src");

    store.add_triple(s, p, o, 0, false).expect("add");
    store.add_triple(s, p, o, src, false).expect("add sourced");
    store.add_triple(s, p, o, 0, true).expect("add temporary");

    let found = store.query(s, p, o).expect("query");
    assert_eq!(found, vec![Triple::new(s, p, o)]);
}

#[test]
fn sources_are_distinct_and_span_partitions() {
    let dir = tempdir().expect("temp dir");
    let store = open_store(&dir);

    let s = store.node("http://example.org/s").expect("s");
    let p = store.node("http://example.org/p").expect("p");
    let o = store.node("http://example.org/o").expect("o");
    let src_a = store.node("http://example.org/a").expect("src a");
    let src_b = store.node("http://example.org/b").expect("src b");

    store.add_triple(s, p, o, 0, false).expect("add");
    store.add_triple(s, p, o, src_a, false).expect("add a");
    store.add_triple(s, p, o, src_a, true).expect("add a temp");
    store.add_triple(s, p, o, src_b, true).expect("add b temp");

    let mut sources = store.sources(s, p, o).expect("sources");
    sources.sort_unstable();
    let mut expected = vec![0, src_a, src_b];
    expected.sort_unstable();
    assert_eq!(sources, expected);
}

#[test]
fn streaming_visitor_can_stop_early() {
    let dir = tempdir().expect("temp dir");
    let store = open_store(&dir);
    seed(&store);

    let mut seen = 0;
    store
        .for_each_match(0, 0, 0, |_| {
            seen += 1;
            seen < 2
        })
        .expect("stream");
    assert_eq!(seen, 2);
}

#[test]
fn unbound_query_scans_the_whole_store() {
    let dir = tempdir().expect("temp dir");
    let store = open_store(&dir);
    let triples = seed(&store);

    let found = store.query(0, 0, 0).expect("query all");
    assert_eq!(found.len(), triples.len());
}
