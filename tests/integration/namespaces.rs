use tempfile::tempdir;
use tripod::{Store, StoreError};

fn open_store(dir: &tempfile::TempDir) -> Store {
    Store::open(dir.path().join("store.db")).expect("open store")
}

#[test]
fn expand_concatenates_base_and_suffix() {
    let dir = tempdir().expect("temp dir");
    let store = open_store(&dir);

    store
        .add_namespace("ex", "http://example.org/ns#")
        .expect("bind");
    assert_eq!(
        store.expand("ex:Thing").expect("expand"),
        "http://example.org/ns#Thing"
    );
}

#[test]
fn expand_reports_precise_failures() {
    let dir = tempdir().expect("temp dir");
    let store = open_store(&dir);

    assert!(matches!(
        store.expand("no-delimiter"),
        Err(StoreError::MalformedQName(_))
    ));
    assert!(matches!(
        store.expand("nosuch:Thing"),
        Err(StoreError::UnknownPrefix(prefix)) if prefix == "nosuch"
    ));
}

#[test]
fn bindings_upsert_per_prefix() {
    let dir = tempdir().expect("temp dir");
    let store = open_store(&dir);

    store.add_namespace("ex", "http://old.example.org/").expect("bind");
    store.add_namespace("ex", "http://new.example.org/").expect("rebind");
    assert_eq!(
        store.expand("ex:x").expect("expand"),
        "http://new.example.org/x"
    );

    store.del_namespace("ex").expect("unbind");
    assert!(matches!(
        store.expand("ex:x"),
        Err(StoreError::UnknownPrefix(_))
    ));
    // Unbinding an absent prefix is a no-op.
    store.del_namespace("ex").expect("unbind again");
}

#[test]
fn reverse_expand_prefers_the_longest_base() {
    let dir = tempdir().expect("temp dir");
    let store = open_store(&dir);

    store.add_namespace("a", "http://example.org/").expect("bind a");
    store
        .add_namespace("b", "http://example.org/deep/")
        .expect("bind b");

    assert_eq!(
        store
            .reverse_expand("http://example.org/deep/x")
            .expect("reverse"),
        Some("b:x".to_owned())
    );
    assert_eq!(
        store.reverse_expand("http://example.org/x").expect("reverse"),
        Some("a:x".to_owned())
    );
    assert_eq!(
        store.reverse_expand("http://elsewhere.org/x").expect("reverse"),
        None
    );
}

#[test]
fn expansion_round_trips_through_reverse() {
    let dir = tempdir().expect("temp dir");
    let store = open_store(&dir);

    store
        .add_namespace("ex", "http://example.org/ns#")
        .expect("bind");
    let uri = "http://example.org/ns#Widget";
    let qname = store
        .reverse_expand(uri)
        .expect("reverse")
        .expect("binding matches");
    assert_eq!(store.expand(&qname).expect("expand"), uri);
}

#[test]
fn standard_prefixes_are_seeded() {
    let dir = tempdir().expect("temp dir");
    let store = open_store(&dir);

    assert_eq!(
        store.expand("rdfs:label").expect("expand"),
        "http://www.w3.org/2000/01/rdf-schema#label"
    );
    let bindings = store.namespaces().expect("list");
    assert!(bindings.iter().any(|(prefix, _)| prefix == "rdf"));
    assert!(bindings.iter().any(|(prefix, _)| prefix == "xsd"));
}
