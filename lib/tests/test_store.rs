use std::path::Path;
use trustynp::consts::{LABEL, TYPE};
use trustynp::util::read_file;
use trustynp::{GraphPattern, NamedNode, Quad, QuadStore, Term};

fn mosquito() -> QuadStore {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures/mosquito.trig");
    let (quads, _) = read_file(&path).unwrap();
    quads.into_iter().collect()
}

#[test]
fn test_match_by_graph() {
    let store = mosquito();
    assert_eq!(store.len(), 11);
    let assertion = Term::named("http://example.org/np1#assertion").unwrap();
    let in_assertion = store.match_all(None, None, None, GraphPattern::Named(&assertion));
    assert_eq!(in_assertion.len(), 2);
    assert!(store
        .match_all(None, None, None, GraphPattern::Default)
        .is_empty());
    assert_eq!(store.graphs().len(), 4);
}

#[test]
fn test_match_subject_predicate() {
    let store = mosquito();
    let mosquito = Term::named("http://example.org/mosquito").unwrap();
    let rdf_type = NamedNode::new(TYPE).unwrap();
    let types: Vec<&Term> = store
        .objects(Some(&mosquito), &rdf_type, GraphPattern::Any)
        .collect();
    assert_eq!(types, vec![&Term::named("http://example.org/Insect").unwrap()]);

    let label = NamedNode::new(LABEL).unwrap();
    let labelled: Vec<&Term> = store.subjects(Some(&label), None, GraphPattern::Any).collect();
    assert_eq!(labelled.len(), 1);
    assert_eq!(labelled[0].value(), "http://example.org/np1");
}

#[test]
fn test_match_one_in_insertion_order() {
    let store = mosquito();
    let first = store.match_one(None, None, None, GraphPattern::Any).unwrap();
    assert_eq!(first.subject.value(), "http://example.org/np1");
    assert_eq!(first.predicate.as_str(), TYPE);
    let missing = Term::named("http://example.org/nothing").unwrap();
    assert!(store
        .match_one(Some(&missing), None, None, GraphPattern::Any)
        .is_none());
}

#[test]
fn test_duplicates_are_tolerated() {
    let mut store = mosquito();
    let first = store.iter().next().unwrap().clone();
    store.add(first.clone());
    assert_eq!(store.len(), 12);
    assert_eq!(store.len_distinct(), 11);
    assert_eq!(store.distinct().len(), 11);
    assert!(store.contains(&first));
    assert!(!store.contains(
        &Quad::from_uris("http://example.org/x", TYPE, "http://example.org/y", None).unwrap()
    ));
}
